//! Logging infrastructure for the sift compiler.
//!
//! The compiler itself only emits `tracing` events; this module installs a
//! subscriber for applications that do not bring their own.
//!
//! # Environment Variables
//!
//! - `SIFT_DEBUG=true|1|yes` - Enable debug logging
//! - `SIFT_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific log level
//! - `SIFT_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use sift_query::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! # Events
//!
//! ```rust,ignore
//! debug!(entity = %model.name(), filters = count, "Compiling entity filter");
//! trace!(property = %name, operator = ?op, "Creating value filter");
//! warn!(culture = %name, "Unknown culture, falling back to invariant");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }

    /// Name of the format as accepted by `SIFT_LOG_FORMAT`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Whether `SIFT_DEBUG` is switched on.
    pub debug: bool,
    /// Explicit level from `SIFT_LOG_LEVEL`, if valid.
    pub level: Option<&'static str>,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            debug: is_debug_enabled(),
            level: env::var("SIFT_LOG_LEVEL").ok().and_then(|l| parse_level(&l)),
            format: env::var("SIFT_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(LogFormat::Json),
        }
    }

    /// The effective level: explicit level, else `debug` when debugging, else `warn`.
    pub fn effective_level(&self) -> &'static str {
        match (self.level, self.debug) {
            (Some(level), _) => level,
            (None, true) => "debug",
            (None, false) => "warn",
        }
    }

    /// Whether any logging was requested at all.
    pub fn is_requested(&self) -> bool {
        self.debug || self.level.is_some()
    }
}

fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// Check if debug logging is enabled via the `SIFT_DEBUG` environment variable.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIFT_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level.
pub fn get_log_level() -> &'static str {
    LogSettings::from_env().effective_level()
}

/// Initialize the sift logging system.
///
/// Subsequent calls are no-ops. Nothing is installed unless `SIFT_DEBUG` or
/// `SIFT_LOG_LEVEL` is set, and only when the `tracing-subscriber` feature is on.
pub fn init() {
    INIT.call_once(|| {
        let settings = LogSettings::from_env();
        if !settings.is_requested() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = settings.effective_level();
            let filter = EnvFilter::try_new(format!("sift={},sift_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            match settings.format {
                LogFormat::Json => registry.with(fmt::layer().json()).init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
            }

            tracing::info!(
                level = level,
                format = settings.format.as_str(),
                "sift logging initialized"
            );
        }
    });
}

/// Debug event that is only emitted when `SIFT_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! sift_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Trace event that is only emitted when `SIFT_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! sift_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Json);
    }

    #[test]
    fn test_effective_level() {
        let mut settings = LogSettings {
            debug: false,
            level: None,
            format: LogFormat::Json,
        };
        assert_eq!(settings.effective_level(), "warn");
        assert!(!settings.is_requested());

        settings.debug = true;
        assert_eq!(settings.effective_level(), "debug");

        settings.level = parse_level("TRACE");
        assert_eq!(settings.effective_level(), "trace");
        assert!(settings.is_requested());
    }

    #[test]
    fn test_unknown_level_is_ignored() {
        assert_eq!(parse_level("verbose"), None);
    }
}
