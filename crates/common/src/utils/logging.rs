use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing subscriber with compact, human-readable output.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,sqlx=warn`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, defaults to `info` with record services at `debug`
/// - Writes to stdout for consistent container logging behavior
pub fn init_logging_json() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,service::record_service=debug"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}
