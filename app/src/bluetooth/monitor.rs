use super::{POLLING_INTERVAL, SESSION_RETRY_DELAY};
use crate::{
    error::BtAdbResult,
    relay::{RelayService, Transport},
};

use bluer::{Address, Session};
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::time::sleep;

/// Watches the adapter for newly connected peers and cuts any pending
/// acquisition delay short when one shows up.
pub async fn start_connection_monitor<T: Transport>(service: Arc<RelayService<T>>) {
    while service.is_running() {
        if let Err(e) = watch_connections(&service).await {
            log::warn!("Bluetooth monitor is down: {e}. Restarting...");
        }

        sleep(Duration::from_millis(SESSION_RETRY_DELAY)).await;
    }
}

async fn watch_connections<T: Transport>(service: &Arc<RelayService<T>>) -> BtAdbResult<()> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;

    // Peers already connected when the monitor starts are not news.
    let mut connected = connected_peers(&adapter).await?;

    while service.is_running() {
        sleep(Duration::from_millis(POLLING_INTERVAL)).await;

        let now_connected = connected_peers(&adapter).await?;
        if has_new_peer(&connected, &now_connected) {
            log::debug!("New bluetooth connection. Retrying acquisition now.");
            service.hint_peer_connected();
        }

        connected = now_connected;
    }

    Ok(())
}

async fn connected_peers(adapter: &bluer::Adapter) -> BtAdbResult<HashSet<Address>> {
    let mut peers = HashSet::new();
    for addr in adapter.device_addresses().await? {
        if let Ok(device) = adapter.device(addr) {
            if device.is_connected().await.unwrap_or(false) {
                peers.insert(addr);
            }
        }
    }
    Ok(peers)
}

fn has_new_peer(previous: &HashSet<Address>, current: &HashSet<Address>) -> bool {
    current.difference(previous).next().is_some()
}
