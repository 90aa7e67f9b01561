pub mod message;
pub mod utils;

pub use utils::connect_to_socket;

pub use utils::ControlReadSock;
pub use utils::ControlWriteSock;
