//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code only uses the
//! `log` facade; the backend is `env_logger`, installed once by the binary.

mod init;

pub use init::{init_logging, LoggingConfig};
