use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::models::error_models::{LinkError, Result};

///maps a configured level name, unknown names fall back to info
pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber. Records go to stderr so stdout only carries pull progress and client output.
/// `RUST_LOG` takes precedence over `log_level`.
pub fn init_logging(log_level: &str) -> Result<()> {
    let level = parse_level(log_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docker_link={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LinkError::Logging(err.to_string()))
}
