use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output format selected by `RUST_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// JSON unless the variable is set to anything other than `json`.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None | Some("json") => LogFormat::Json,
            Some(_) => LogFormat::Text,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(Level::INFO.into())
}

/// Initialize the tracing subscriber.
/// Uses JSON format by default (production); `RUST_LOG_FORMAT=text` for humans.
pub fn init_tracing() {
    let format = LogFormat::from_env_value(std::env::var("RUST_LOG_FORMAT").ok().as_deref());

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .with(env_filter())
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}
