use crate::{
    error::{BtAdbError, BtAdbResult},
    global::CONTROL_SOCKET,
    ipc::{connect_to_socket, message::MessageType, ControlReadSock, ControlWriteSock},
    opts::CommandOpts,
    relay::types::RelayStatus,
};

pub async fn send_command(command: &CommandOpts) -> BtAdbResult<()> {
    let stream = connect_to_socket(&CONTROL_SOCKET, 3, 100)
        .await
        .map_err(|_| BtAdbError::NoDaemon)?;

    log::info!("Send command to daemon: {command}");

    stream.write_message(command.clone().into()).await?;
    let response = stream.try_read_message(3).await?;

    if response.message_type != MessageType::Response || !response.is_valid() {
        return Err(BtAdbError::InvalidResponse);
    }

    match command {
        CommandOpts::Status => {
            let status = RelayStatus::try_from(response)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        _ => {
            println!(
                "{}",
                String::from_utf8(response.payload).map_err(|_| BtAdbError::ParseError)?
            );
        }
    }

    Ok(())
}
