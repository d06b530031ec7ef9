use tracing_subscriber::{fmt, EnvFilter};

/// Output shape for the process-wide log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for interactive terminals.
    Pretty,
    /// One JSON object per line, for log aggregators.
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// `RUST_LOG`-style filter directive, e.g. `"info,sourcescribe_llm=debug"`.
    pub filter: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

/// Install the global `tracing` subscriber. Call once at process startup
/// from the composition root; a second call is a programmer error and will
/// panic, matching `tracing_subscriber`'s own global-dispatch contract.
pub fn init_logging(config: &LoggerConfig) {
    let env_filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt().with_env_filter(env_filter).with_target(config.include_target);

    match config.format {
        LogFormat::Pretty => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
