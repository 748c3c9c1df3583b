//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the crate logs through
//! the `log` facade; `env_logger` is only wired up here.

mod init;

pub use init::{init_logging, LoggingConfig};
