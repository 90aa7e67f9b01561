use std::{fmt::Display, io, result::Result};

pub type BtAdbResult<T> = Result<T, BtAdbError>;

#[derive(Debug)]
pub enum BtAdbError {
    DaemonRunning,
    NoDaemon,
    BluetoothError(bluer::Error),
    BincodeError(bincode::Error),
    JsonError(serde_json::Error),
    IoError(io::Error),
    IpcError,
    ParseError,
    LoggerError,
    InvalidMessage,
    InvalidResponse,
}

impl From<io::Error> for BtAdbError {
    fn from(value: io::Error) -> Self {
        BtAdbError::IoError(value)
    }
}

impl From<bluer::Error> for BtAdbError {
    fn from(value: bluer::Error) -> Self {
        BtAdbError::BluetoothError(value)
    }
}

impl From<bincode::Error> for BtAdbError {
    fn from(value: bincode::Error) -> Self {
        BtAdbError::BincodeError(value)
    }
}

impl From<serde_json::Error> for BtAdbError {
    fn from(value: serde_json::Error) -> Self {
        BtAdbError::JsonError(value)
    }
}

impl Display for BtAdbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtAdbError::DaemonRunning => write!(f, "Daemon is already running"),
            BtAdbError::NoDaemon => write!(f, "No daemon found"),
            BtAdbError::BluetoothError(err) => write!(f, "Bluetooth error: {}", err),
            BtAdbError::BincodeError(err) => write!(f, "Serde bincode error: {}", err),
            BtAdbError::JsonError(err) => write!(f, "Serde json error: {}", err),
            BtAdbError::IoError(err) => write!(f, "IO error: {}", err),
            BtAdbError::IpcError => write!(f, "Control socket error"),
            BtAdbError::ParseError => write!(f, "Parse error"),
            BtAdbError::LoggerError => write!(f, "Cannot init logger"),
            BtAdbError::InvalidMessage => write!(f, "Invalid message"),
            BtAdbError::InvalidResponse => write!(f, "Invalid response"),
        }
    }
}
