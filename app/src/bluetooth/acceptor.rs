use crate::error::BtAdbResult;

use bluer::{
    rfcomm::{Listener, SocketAddr, Stream},
    Session,
};

/// Accepts one incoming RFCOMM connection on the advertised channel.
///
/// A fresh session is opened per call so that an adapter that went away
/// between attempts surfaces as an ordinary error, which the acquisition
/// loop turns into a retry.
pub async fn accept_connection(channel: u8) -> BtAdbResult<Stream> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    let adapter_addr = adapter.address().await?;

    // Cycle a kernel-assigned listener before claiming the advertised
    // channel; on a cold adapter the first bind can land on it.
    let throwaway = Listener::bind(SocketAddr::new(adapter_addr, 0)).await?;
    drop(throwaway);

    let listener = Listener::bind(SocketAddr::new(adapter_addr, channel)).await?;
    log::info!("Listening on {} channel {}", adapter_addr, channel);

    let (stream, peer) = listener.accept().await?;
    log::info!("Accepted connection from {}", peer.addr);

    Ok(stream)
}
