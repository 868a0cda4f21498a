//! Tracing subscriber bootstrap.

use tracing_subscriber::EnvFilter;

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, colored when attached to a terminal
    #[default]
    Pretty,
    /// One JSON object per line (for log shippers)
    Json,
}

/// Build the filter used by [`setup_logger`].
///
/// `RUST_LOG` takes precedence. Otherwise `app_name` and the server library
/// log at `default_level` and `tower_http` at `info`.
pub fn build_filter(app_name: &str, default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let target = app_name.replace('-', "_");
        EnvFilter::new(format!(
            "{target}={default_level},huddle_server={default_level},tower_http=info"
        ))
    })
}

/// Install the global tracing subscriber.
///
/// # Arguments
///
/// * `app_name` - Binary name, usually `env!("CARGO_BIN_NAME")`
/// * `default_level` - Level used when `RUST_LOG` is not set
/// * `format` - Output format
pub fn setup_logger(app_name: &str, default_level: &str, format: LogFormat) {
    let filter = build_filter(app_name, default_level);

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };

    match result {
        Ok(()) => tracing::debug!(app = app_name, level = default_level, "Logger initialized"),
        // Another subscriber (e.g. a test harness) is installed and receives this.
        Err(e) => tracing::warn!(error = %e, "Logger already initialized"),
    }
}
