use super::message::Message;
use crate::{
    error::{BtAdbError, BtAdbResult},
    global::BUFFER_SIZE,
};

use std::time::Duration;
use tokio::{net::UnixStream, time::sleep};

pub trait ControlReadSock {
    async fn read_bytes(&self, buffer: &mut [u8]) -> BtAdbResult<usize>;

    async fn read_message(&self) -> BtAdbResult<Message>;
    async fn try_read_message(&self, max_attempt: u8) -> BtAdbResult<Message>;
}

pub trait ControlWriteSock {
    async fn write_bytes(&self, buffer: &[u8]) -> BtAdbResult<usize>;

    async fn write_message(&self, message: Message) -> BtAdbResult<usize>;
}

impl ControlReadSock for UnixStream {
    async fn read_bytes(&self, buffer: &mut [u8]) -> BtAdbResult<usize> {
        if let Err(e) = self.readable().await {
            log::error!("Unreadable. Error: {e}");
            return Err(BtAdbError::IpcError);
        }

        match self.try_read(buffer) {
            Ok(len) if len > 0 => Ok(len),
            Ok(_) => {
                log::error!("Invalid message");
                Err(BtAdbError::InvalidMessage)
            }
            Err(e) => {
                log::debug!("Can't read from stream. Error: {e}");
                Err(BtAdbError::IpcError)
            }
        }
    }

    async fn read_message(&self) -> BtAdbResult<Message> {
        let mut buffer = vec![0; *BUFFER_SIZE];
        let byte_len = self.read_bytes(&mut buffer).await?;
        Message::try_from(&buffer[..byte_len])
    }

    async fn try_read_message(&self, max_attempt: u8) -> BtAdbResult<Message> {
        for attempt in 0..max_attempt {
            match self.read_message().await {
                Ok(message) => return Ok(message),
                Err(_) => {
                    log::warn!("Retry {}/{}", attempt + 1, max_attempt);
                    continue;
                }
            }
        }

        log::error!("Out of attempt");
        Err(BtAdbError::IpcError)
    }
}

impl ControlWriteSock for UnixStream {
    async fn write_bytes(&self, buffer: &[u8]) -> BtAdbResult<usize> {
        if let Err(e) = self.writable().await {
            log::error!("Unwritable. Error: {e}");
            return Err(BtAdbError::IpcError);
        }

        match self.try_write(buffer) {
            Ok(len) if len == buffer.len() => Ok(len),
            Ok(len) => {
                log::error!("Short write: {len}/{} bytes", buffer.len());
                Err(BtAdbError::IpcError)
            }
            Err(e) => {
                log::debug!("Can't write to stream. Error: {e}");
                Err(BtAdbError::IpcError)
            }
        }
    }

    async fn write_message(&self, message: Message) -> BtAdbResult<usize> {
        let buffer: Vec<u8> = message.into();
        self.write_bytes(&buffer).await
    }
}

pub async fn connect_to_socket(
    socket_path: &str,
    max_attempt: u8,
    delay: u64,
) -> BtAdbResult<UnixStream> {
    for attempt in 0..max_attempt {
        if let Ok(stream) = UnixStream::connect(socket_path).await {
            return Ok(stream);
        }
        log::debug!("Try connect: {} | Attempt: {}", socket_path, attempt + 1);
        sleep(Duration::from_millis(delay)).await;
    }

    log::warn!("Failed to connect to socket: {socket_path}");
    Err(BtAdbError::IpcError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::CommandOpts;

    #[tokio::test]
    async fn message_survives_a_socket_pair() {
        let (sender, receiver) = UnixStream::pair().unwrap();

        sender
            .write_message(Message::from(CommandOpts::Status))
            .await
            .unwrap();

        let message = receiver.try_read_message(3).await.unwrap();
        assert_eq!(CommandOpts::try_from(message).unwrap(), CommandOpts::Status);
    }

    #[tokio::test]
    async fn partial_write_is_an_error() {
        let (sender, receiver) = UnixStream::pair().unwrap();

        // Nothing drains the peer, so a frame far beyond the socket buffer
        // cannot go out in one write.
        let oversized = Message::response(vec![0u8; 4 << 20]);
        assert!(sender.write_message(oversized).await.is_err());

        drop(receiver);
    }
}
