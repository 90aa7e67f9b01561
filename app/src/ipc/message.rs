use crate::{error::BtAdbError, opts::CommandOpts, relay::types::RelayStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Command = 0,
    Response = 1,
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = BtAdbError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::Command),
            1 => Ok(MessageType::Response),
            _ => Err(BtAdbError::ParseError),
        }
    }
}

pub struct Message {
    pub message_type: MessageType,
    pub header: usize, // size of payload
    pub payload: Vec<u8>,
}

impl Message {
    pub fn response(payload: Vec<u8>) -> Self {
        Message {
            message_type: MessageType::Response,
            header: payload.len(),
            payload,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.payload.len() == self.header
    }
}

impl From<CommandOpts> for Message {
    fn from(opts: CommandOpts) -> Message {
        Message {
            message_type: MessageType::Command,
            header: size_of::<u8>(),
            payload: vec![opts.into()],
        }
    }
}

impl TryFrom<Message> for CommandOpts {
    type Error = BtAdbError;
    fn try_from(message: Message) -> Result<Self, Self::Error> {
        if message.message_type != MessageType::Command
            || !message.is_valid()
            || message.payload.is_empty()
        {
            return Err(BtAdbError::InvalidMessage);
        }
        CommandOpts::try_from(message.payload[0])
    }
}

impl TryFrom<&RelayStatus> for Message {
    type Error = BtAdbError;
    fn try_from(status: &RelayStatus) -> Result<Self, Self::Error> {
        let payload: Vec<u8> = bincode::serialize(status)?;
        Ok(Message {
            message_type: MessageType::Response,
            header: payload.len(),
            payload,
        })
    }
}

impl TryFrom<Message> for RelayStatus {
    type Error = BtAdbError;
    fn try_from(message: Message) -> Result<Self, Self::Error> {
        if !message.is_valid() {
            return Err(BtAdbError::InvalidMessage);
        }
        bincode::deserialize(&message.payload).map_err(BtAdbError::BincodeError)
    }
}

impl From<Message> for Vec<u8> {
    fn from(message: Message) -> Self {
        let mut buffer = Vec::new();

        buffer.push(u8::from(message.message_type));
        buffer.extend_from_slice(&message.header.to_le_bytes());
        buffer.extend_from_slice(&message.payload);

        buffer
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = BtAdbError;
    fn try_from(buffer: &[u8]) -> Result<Self, Self::Error> {
        let metadata_len: usize = size_of::<u8>() + size_of::<usize>();

        if buffer.len() < metadata_len {
            return Err(BtAdbError::ParseError);
        }

        let message_type = MessageType::try_from(buffer[0])?;
        let header: usize = usize::from_le_bytes(
            buffer[1..metadata_len]
                .try_into()
                .map_err(|_| BtAdbError::ParseError)?,
        );

        if buffer.len() < (metadata_len + header) {
            return Err(BtAdbError::ParseError);
        }

        let payload = buffer[metadata_len..].to_vec();
        Ok(Message {
            message_type,
            header,
            payload,
        })
    }
}
