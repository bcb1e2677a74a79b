//! Logging setup.
//!
//! Everything logs through the `log` facade; the binary installs
//! `env_logger` once at startup.

mod init;

pub use init::{LoggingConfig, init_logging};
