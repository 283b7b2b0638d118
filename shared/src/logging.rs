//! Shared logging utilities for consistent tracing across a sync run

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::errors::{SharedError, SharedResult};
use crate::types::RunId;

/// Output format for the stdout subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(SharedError::InvalidValue {
                field: "log_format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Build the env filter directive for the given base level.
///
/// `RUST_LOG` wins when it is set so operators can widen a single target
/// without touching the CLI flags.
pub fn filter_directive(log_level: Option<&str>) -> String {
    if let Ok(from_env) = std::env::var("RUST_LOG") {
        if !from_env.trim().is_empty() {
            return from_env;
        }
    }
    let base_level = log_level.unwrap_or("info");
    format!("dealsync={base_level},shared={base_level},reqwest=warn,hyper=warn")
}

/// Initialize the global tracing subscriber
pub fn init_tracing_with_level(log_level: Option<&str>, format: LogFormat) -> SharedResult<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_new(filter_directive(log_level)).map_err(|e| {
        SharedError::LoggingError { message: e.to_string() }
    })?;

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| SharedError::LoggingError { message: e.to_string() })
}

/// Initialize tracing at `info` with the compact format
pub fn init_tracing() -> SharedResult<()> {
    init_tracing_with_level(None, LogFormat::Compact)
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for run-aware info logging
#[macro_export]
macro_rules! run_info {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::info!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware warning logging
#[macro_export]
macro_rules! run_warn {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware error logging
#[macro_export]
macro_rules! run_error {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::error!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware debug logging
#[macro_export]
macro_rules! run_debug {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(run_id: &RunId, details: &str) {
    info!(
        run = %run_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(run_id: &RunId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        run = %run_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(run_id: &RunId, message: &str) {
    info!(
        run = %run_id,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
