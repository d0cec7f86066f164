// LogWarden - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Per-tick faults (Source, Detector) are contained by the checker; only
// Config errors can stop the process, and only at startup.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogWarden operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum WardenError {
    /// The log file could not be read this tick.
    Source(SourceError),

    /// The anomaly detector call failed this tick.
    Detector(DetectorError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for WardenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Log source unavailable: {e}"),
            Self::Detector(e) => write!(f, "Anomaly detector failed: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for WardenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Detector(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp errors
// ---------------------------------------------------------------------------

/// Why a line yielded no timestamp. Neither case is surfaced to the
/// operator; both drop the line from the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The line carries no bracketed access-log timestamp.
    NotFound,

    /// The bracketed token matched but is not a valid date/time.
    Malformed { raw: String },
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("no timestamp in line"),
            Self::Malformed { raw } => write!(f, "malformed timestamp '{raw}'"),
        }
    }
}

impl std::error::Error for TimestampError {}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors reading the monitored log file.
#[derive(Debug)]
pub enum SourceError {
    /// I/O error opening or reading the file (missing, permission denied, ...).
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<SourceError> for WardenError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Detector errors
// ---------------------------------------------------------------------------

/// Errors from the remote anomaly detector.
#[derive(Debug)]
pub enum DetectorError {
    /// Transport-level failure (DNS, TLS, connection reset, ...).
    Http { source: reqwest::Error },

    /// The request did not complete within the configured timeout.
    Timeout { secs: u64 },

    /// The service answered with a non-success status.
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    MalformedResponse { reason: String },

    /// The service answered successfully but with no findings text.
    EmptyResponse,
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { source } => write!(f, "HTTP request failed: {source}"),
            Self::Timeout { secs } => write!(f, "request timed out after {secs}s"),
            Self::Api { status, body } => write!(f, "API returned status {status}: {body}"),
            Self::MalformedResponse { reason } => write!(f, "malformed response: {reason}"),
            Self::EmptyResponse => f.write_str("response contained no findings text"),
        }
    }
}

impl std::error::Error for DetectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { source } => Some(source),
            _ => None,
        }
    }
}

impl From<DetectorError> for WardenError {
    fn from(e: DetectorError) -> Self {
        Self::Detector(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// A required value was supplied neither by config.toml nor the environment.
    MissingValue {
        field: &'static str,
        env_var: &'static str,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::MissingValue { field, env_var } => write!(
                f,
                "Config '{field}' is not set. Set it in config.toml or via {env_var}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for WardenError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogWarden results.
pub type Result<T> = std::result::Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_source_error_keeps_io_cause() {
        let err: WardenError = SourceError::Io {
            path: PathBuf::from("/var/log/httpd/access.log"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        }
        .into();

        let msg = err.to_string();
        assert!(msg.contains("access.log"), "got: {msg}");
        let inner = err.source().expect("top-level error should chain");
        assert!(inner.source().is_some(), "io cause should be preserved");
    }

    #[test]
    fn test_missing_value_names_env_var() {
        let err = ConfigError::MissingValue {
            field: "detector.api_key",
            env_var: "AZURE_OPENAI_API_KEY",
        };
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));
    }
}
