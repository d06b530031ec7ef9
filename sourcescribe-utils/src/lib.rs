//! Ambient infrastructure shared by every crate in the workspace: structured
//! logging setup and configuration loading. Neither is part of the LLM
//! execution pipeline or capture orchestrator proper, but both are carried
//! the way the rest of the stack carries them rather than hand-rolled.

pub mod config;
pub mod logging;

pub use config::{ConfigSource, EnvConfigLoader};
pub use logging::{init_logging, LogFormat, LoggerConfig};
