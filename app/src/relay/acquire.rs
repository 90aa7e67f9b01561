use super::{
    transport::Transport,
    types::{EndpointPair, RunFlag},
};
use crate::backoff::{run_backoff_loop, Attempt, Backoff};

/// Obtains one live endpoint of each kind, retrying each side independently
/// with its own backoff. Returns `None` only when the run flag clears before
/// both endpoints exist.
pub async fn acquire<T: Transport>(
    transport: &T,
    run: &RunFlag,
    remote_backoff: &Backoff,
    local_backoff: &Backoff,
) -> Option<EndpointPair<T::Remote, T::Local>> {
    let accept_remote = run_backoff_loop(remote_backoff, run, move || async move {
        match transport.accept_remote().await {
            Ok(stream) => Attempt::Finish(stream),
            Err(e) => {
                log::debug!("Remote accept failed: {e}");
                Attempt::Continue
            }
        }
    });

    let connect_local = run_backoff_loop(local_backoff, run, move || async move {
        match transport.connect_local().await {
            Ok(stream) => Attempt::Finish(stream),
            Err(e) => {
                log::debug!("Local connect failed: {e}");
                Attempt::Continue
            }
        }
    });

    // The remote accept decides when the phase completes; once it has a
    // socket, a local loop stuck in a stale delay retries right away.
    let (remote, local) = tokio::join!(
        async {
            let remote = accept_remote.await;
            local_backoff.reset();
            remote
        },
        connect_local,
    );

    Some(EndpointPair {
        remote: remote?,
        local: local?,
    })
}
