use super::{
    types::{EndpointPair, RunFlag},
    FORWARD_BUFFER_SIZE,
};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Copies bytes in both directions until either side fails, hits EOF, or
/// the run flag clears. Both endpoints are dropped (closed) before this
/// returns, whichever direction ended the session.
pub async fn relay_session<R, L>(pair: EndpointPair<R, L>, run: &RunFlag)
where
    R: AsyncRead + AsyncWrite + Unpin + Send,
    L: AsyncRead + AsyncWrite + Unpin + Send,
{
    let (mut remote_read, mut remote_write) = tokio::io::split(pair.remote);
    let (mut local_read, mut local_write) = tokio::io::split(pair.local);

    tokio::select! {
        _ = pump(&mut local_read, &mut remote_write, "local -> remote") => {}
        _ = pump(&mut remote_read, &mut local_write, "remote -> local") => {}
        _ = run.cancelled() => {
            log::debug!("Relay session cancelled");
        }
    }

    log::info!("Relay session ended. Releasing both endpoints.");
}

async fn pump<R, W>(src: &mut R, dst: &mut W, direction: &str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = [0u8; FORWARD_BUFFER_SIZE];

    loop {
        match src.read(&mut buffer).await {
            Ok(0) => {
                log::debug!("{direction}: stream closed");
                return;
            }
            Ok(len) => {
                if let Err(e) = dst.write_all(&buffer[..len]).await {
                    log::debug!("{direction}: write failed: {e}");
                    return;
                }
            }
            Err(e) => {
                log::debug!("{direction}: read failed: {e}");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};
    use tokio::{
        io::duplex,
        time::timeout,
    };

    #[tokio::test]
    async fn forwards_bytes_both_ways() {
        let (mut remote_peer, remote) = duplex(256);
        let (mut local_peer, local) = duplex(256);
        let run = Arc::new(RunFlag::new());

        let session = tokio::spawn({
            let run = run.clone();
            async move { relay_session(EndpointPair { remote, local }, &run).await }
        });

        let mut buffer = [0u8; 32];

        remote_peer.write_all(b"host-to-daemon").await.unwrap();
        let len = local_peer.read(&mut buffer).await.unwrap();
        assert_eq!(&buffer[..len], b"host-to-daemon");

        local_peer.write_all(b"daemon-to-host").await.unwrap();
        let len = remote_peer.read(&mut buffer).await.unwrap();
        assert_eq!(&buffer[..len], b"daemon-to-host");

        run.stop();
        timeout(Duration::from_secs(1), session)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn one_sided_failure_tears_down_both_endpoints() {
        let (remote_peer, remote) = duplex(256);
        let (mut local_peer, local) = duplex(256);
        let run = Arc::new(RunFlag::new());

        let session = tokio::spawn({
            let run = run.clone();
            async move { relay_session(EndpointPair { remote, local }, &run).await }
        });

        // Remote side dies mid-session while local -> remote is still idle.
        drop(remote_peer);

        timeout(Duration::from_secs(1), session)
            .await
            .unwrap()
            .unwrap();

        // The local endpoint was released along with the remote one.
        let mut buffer = [0u8; 8];
        let len = local_peer.read(&mut buffer).await.unwrap();
        assert_eq!(len, 0);
    }

    #[tokio::test]
    async fn stop_ends_an_idle_session() {
        let (mut remote_peer, remote) = duplex(256);
        let (mut local_peer, local) = duplex(256);
        let run = Arc::new(RunFlag::new());

        let session = tokio::spawn({
            let run = run.clone();
            async move { relay_session(EndpointPair { remote, local }, &run).await }
        });

        run.stop();
        timeout(Duration::from_secs(1), session)
            .await
            .unwrap()
            .unwrap();

        let mut buffer = [0u8; 8];
        assert_eq!(remote_peer.read(&mut buffer).await.unwrap(), 0);
        assert_eq!(local_peer.read(&mut buffer).await.unwrap(), 0);
    }
}
