use crate::{bluetooth, error::BtAdbResult};

use std::net::Ipv4Addr;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

/// The two endpoint sources a relay service draws from. Production code
/// talks to BlueZ and the loopback debug daemon; tests substitute in-memory
/// streams.
pub trait Transport {
    type Remote: AsyncRead + AsyncWrite + Unpin + Send;
    type Local: AsyncRead + AsyncWrite + Unpin + Send;

    /// Blocks until a debugging host connects over RFCOMM.
    async fn accept_remote(&self) -> BtAdbResult<Self::Remote>;

    /// Dials the local debug daemon.
    async fn connect_local(&self) -> BtAdbResult<Self::Local>;
}

pub struct BluezTransport {
    channel: u8,
    port: u16,
}

impl BluezTransport {
    pub fn new(channel: u8, port: u16) -> Self {
        BluezTransport { channel, port }
    }
}

impl Transport for BluezTransport {
    type Remote = bluer::rfcomm::Stream;
    type Local = TcpStream;

    async fn accept_remote(&self) -> BtAdbResult<Self::Remote> {
        bluetooth::accept_connection(self.channel).await
    }

    async fn connect_local(&self) -> BtAdbResult<Self::Local> {
        let stream = TcpStream::connect((Ipv4Addr::LOCALHOST, self.port)).await?;
        stream.set_nodelay(true)?;

        log::info!("Connected to local debug daemon on port {}", self.port);
        Ok(stream)
    }
}
