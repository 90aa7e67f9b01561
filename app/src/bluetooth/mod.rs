pub mod acceptor;
pub mod monitor;

pub use acceptor::accept_connection;
pub use monitor::start_connection_monitor;

pub const DEFAULT_CHANNEL: u8 = 2;

const POLLING_INTERVAL: u64 = 500;
const SESSION_RETRY_DELAY: u64 = 2500;
