//! Log filter setup shared by the stdio and HTTP binaries.

use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_VAR: &str = "GAINTRACK_LOG_LEVEL";
pub const DEFAULT_FILTER: &str = "info,rmcp=warn,serve_inner=warn";

/// `GAINTRACK_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_level_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    get(LOG_LEVEL_VAR)
        .or_else(|| get("RUST_LOG"))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

pub fn log_level() -> String {
    log_level_with(|k| std::env::var(k).ok())
}

/// Append rmcp overrides to `log_env`; an unparsable filter falls back to
/// [`DEFAULT_FILTER`].
pub fn env_filter(log_env: &str) -> EnvFilter {
    let combined = format!("{},rmcp=warn,serve_inner=warn", log_env);
    EnvFilter::try_new(combined).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global compact subscriber writing to stderr.
pub fn init(log_env: &str) {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(log_env))
        .init();
}
