use crate::{bluetooth::DEFAULT_CHANNEL, error::BtAdbError, relay::DEFAULT_ADB_PORT};

use clap::{Args, Parser, Subcommand};
use std::fmt::Display;

#[derive(Debug, Parser)]
#[command(name = "btadb", about = "Relay an ADB byte stream over Bluetooth RFCOMM")]
pub struct Opts {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Run the relay daemon.
    #[command(name = "daemon", alias = "d")]
    Daemon(DaemonOpts),

    #[command(flatten)]
    Command(CommandOpts),
}

#[derive(Debug, Args)]
pub struct DaemonOpts {
    /// RFCOMM channel the debugging host connects to.
    #[arg(long, default_value_t = DEFAULT_CHANNEL)]
    pub channel: u8,

    /// Loopback port of the local debug daemon.
    #[arg(long, default_value_t = DEFAULT_ADB_PORT)]
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Subcommand)]
pub enum CommandOpts {
    #[command(name = "ping", alias = "p")]
    Ping,

    #[command(name = "status", alias = "s")]
    Status,

    #[command(name = "kill", alias = "k")]
    Kill,
}

impl Opts {
    pub fn from_env() -> Self {
        Opts::parse()
    }
}

impl From<CommandOpts> for u8 {
    fn from(value: CommandOpts) -> Self {
        match value {
            CommandOpts::Ping => 0,
            CommandOpts::Status => 1,
            CommandOpts::Kill => 2,
        }
    }
}

impl TryFrom<u8> for CommandOpts {
    type Error = BtAdbError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommandOpts::Ping),
            1 => Ok(CommandOpts::Status),
            2 => Ok(CommandOpts::Kill),
            _ => Err(BtAdbError::ParseError),
        }
    }
}

impl Display for CommandOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandOpts::Ping => write!(f, "Ping"),
            CommandOpts::Status => write!(f, "Status"),
            CommandOpts::Kill => write!(f, "Kill"),
        }
    }
}
