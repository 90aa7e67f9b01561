mod backoff;
mod bluetooth;
mod client;
mod daemon;
mod error;
mod global;
mod ipc;
mod logger;
mod opts;
mod relay;

use crate::{
    error::BtAdbResult,
    logger::{init_logger, LoggerType},
    opts::{Action, Opts},
};

#[tokio::main]
async fn main() -> BtAdbResult<()> {
    let opts = Opts::from_env();

    let level_filter = if opts.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    match &opts.action {
        Action::Daemon(daemon_opts) => {
            init_logger(LoggerType::Daemon, level_filter)?;
            daemon::start_daemon(daemon_opts).await
        }
        Action::Command(command) => {
            init_logger(LoggerType::Command, level_filter)?;
            client::send_command(command).await
        }
    }
}
