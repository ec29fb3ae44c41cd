use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("Config: {}", .0)]
    Config(#[from] querylog_core::config::ConfigError),

    #[error("Alert: {}", .0)]
    Notify(#[from] querylog_core::alert::NotifyError),

    #[error("Query: {}", .0)]
    Query(#[from] querylog_core::Error),
}
