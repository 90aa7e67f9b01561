pub mod acquire;
pub mod forward;
pub mod service;
pub mod transport;
pub mod types;

pub use service::RelayService;
pub use transport::{BluezTransport, Transport};

pub const DEFAULT_ADB_PORT: u16 = 5555;

const FORWARD_BUFFER_SIZE: usize = 1024;

const ACQUIRE_INITIAL_MS: u64 = 1000;
const ACQUIRE_MULTIPLIER: f64 = 2.0;
const ACQUIRE_MAX_MS: u64 = 60_000;
