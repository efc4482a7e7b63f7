//! Tracing setup.
//!
//! The level names follow the ones operators already set through
//! `LOG_LEVEL`. `RUST_LOG`, when present, takes precedence and accepts full
//! `EnvFilter` directives.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Minimum severity that is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Everything, including per-event watch traffic.
    Trace,
    /// Per-node scores and filter summaries.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Degraded behavior.
    Warning,
    /// Failures.
    Error,
    /// Same filter as [`LogLevel::Error`].
    Alert,
}

/// The `LOG_LEVEL` value named no known level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("LOG_LEVEL=\"{0}\" is empty or invalid")]
pub struct InvalidLogLevel(pub String);

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Alert => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "ALERT" => Ok(Self::Alert),
            _ => Err(InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Alert => "ALERT",
        };
        f.write_str(name)
    }
}

/// Install the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.filter_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels_case_insensitively() {
        assert_eq!("TRACE".parse(), Ok(LogLevel::Trace));
        assert_eq!("debug".parse(), Ok(LogLevel::Debug));
        assert_eq!(" Info ".parse(), Ok(LogLevel::Info));
        assert_eq!("warning".parse(), Ok(LogLevel::Warning));
        assert_eq!("Error".parse(), Ok(LogLevel::Error));
        assert_eq!("ALERT".parse(), Ok(LogLevel::Alert));
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert_eq!("".parse::<LogLevel>(), Err(InvalidLogLevel(String::new())));
        let err = "warn".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.to_string(), "LOG_LEVEL=\"warn\" is empty or invalid");
    }

    #[test]
    fn directives() {
        assert_eq!(LogLevel::default().filter_directive(), "info");
        assert_eq!(LogLevel::Warning.filter_directive(), "warn");
        assert_eq!(LogLevel::Alert.filter_directive(), "error");
    }

    #[test]
    fn display_round_trips() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Alert,
        ] {
            assert_eq!(level.to_string().parse(), Ok(level));
        }
    }
}
