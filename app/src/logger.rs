use crate::error::{BtAdbError, BtAdbResult};

use humantime::format_rfc3339_seconds;
use std::time::SystemTime;

pub enum LoggerType {
    Daemon,
    Command,
}

pub fn init_logger(log_type: LoggerType, filter: log::LevelFilter) -> BtAdbResult<()> {
    let logger = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {} - {}",
                format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(filter);

    let logger = match log_type {
        LoggerType::Daemon => {
            let logger = logger.chain(fern::log_file("/tmp/btadb-daemon.log")?);
            if log::LevelFilter::Debug == filter {
                logger.chain(std::io::stdout())
            } else {
                logger
            }
        }
        LoggerType::Command => logger.chain(std::io::stdout()),
    };

    logger.apply().map_err(|_| BtAdbError::LoggerError)
}
