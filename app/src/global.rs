use once_cell::sync::Lazy;
use std::env;

pub static BUFFER_SIZE: Lazy<usize> = Lazy::new(|| 8192);

pub static CONTROL_SOCKET: Lazy<String> = Lazy::new(|| {
    env::var("XDG_RUNTIME_DIR")
        .map(|value| format!("{value}/btadb.sock"))
        .unwrap_or_else(|_| "/tmp/btadb.sock".to_string())
});
