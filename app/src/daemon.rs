use crate::{
    bluetooth,
    error::{BtAdbError, BtAdbResult},
    global::CONTROL_SOCKET,
    ipc::{
        connect_to_socket,
        message::{Message, MessageType},
        ControlReadSock, ControlWriteSock,
    },
    opts::{CommandOpts, DaemonOpts},
    relay::{BluezTransport, RelayService, Transport},
};

use std::{fs, sync::Arc, time::Duration};
use tokio::{
    net::{UnixListener, UnixStream},
    time::sleep,
};

pub async fn start_daemon(opts: &DaemonOpts) -> BtAdbResult<()> {
    if ping_daemon().await.is_ok() {
        log::error!("Daemon is already running.");
        return Err(BtAdbError::DaemonRunning);
    }

    if fs::metadata(CONTROL_SOCKET.as_str()).is_ok() {
        fs::remove_file(CONTROL_SOCKET.as_str())?;
        log::debug!("Removed stale socket: {}", CONTROL_SOCKET.as_str());
    }

    log::info!("---------- START BTADB DAEMON ----------");
    log::info!(
        "RFCOMM channel {} <-> loopback port {}",
        opts.channel,
        opts.port
    );

    let service = Arc::new(RelayService::new(
        BluezTransport::new(opts.channel, opts.port),
        opts.channel,
        opts.port,
    ));

    tokio::spawn(bluetooth::start_connection_monitor(service.clone()));

    let service_task = tokio::spawn({
        let service = service.clone();
        async move { service.run().await }
    });

    let listener = UnixListener::bind(CONTROL_SOCKET.as_str())?;
    log::info!("Control socket ready: {}", CONTROL_SOCKET.as_str());

    let run = service.run_flag();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let Ok((stream, _)) = accepted else {
                    break;
                };
                tokio::spawn(handle_connection(stream, service.clone()));
            }
            _ = run.cancelled() => break,
        }
    }

    let _ = service_task.await;
    let _ = fs::remove_file(CONTROL_SOCKET.as_str());
    log::info!("---------- BTADB DAEMON STOPPED ----------");

    Ok(())
}

pub async fn ping_daemon() -> BtAdbResult<()> {
    if fs::metadata(CONTROL_SOCKET.as_str()).is_err() {
        log::debug!("No control socket");
        return Err(BtAdbError::NoDaemon);
    }

    let stream = connect_to_socket(&CONTROL_SOCKET, 1, 100)
        .await
        .map_err(|_| BtAdbError::NoDaemon)?;

    stream.write_message(CommandOpts::Ping.into()).await?;
    let response = stream.read_message().await?;

    if response.message_type != MessageType::Response {
        return Err(BtAdbError::InvalidResponse);
    }

    Ok(())
}

async fn handle_connection<T: Transport>(
    stream: UnixStream,
    service: Arc<RelayService<T>>,
) -> BtAdbResult<()> {
    let message = stream.try_read_message(3).await?;
    let command = CommandOpts::try_from(message)?;
    log::info!("Control command: {command}");

    match command {
        CommandOpts::Ping => {
            stream.write_message(Message::response(b"Pong".to_vec())).await?;
        }
        CommandOpts::Status => {
            stream
                .write_message(Message::try_from(&service.status())?)
                .await?;
        }
        CommandOpts::Kill => {
            stream
                .write_message(Message::response(b"Daemon is shutting down...".to_vec()))
                .await?;
            sleep(Duration::from_millis(100)).await;
            service.shutdown();
        }
    }

    Ok(())
}
