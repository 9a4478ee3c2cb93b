//! # Core Runtime
//!
//! Application-level plumbing shared by the LMS data core: persisted
//! settings and the logging/tracing setup.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigStore, Settings};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
