pub mod config;
mod logging_config;

pub use config::{ConfigError, ProbeConfig};
pub use logging_config::LoggingConfig;
