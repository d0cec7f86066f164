// LogWarden - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogWarden";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogWarden";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log source
// =============================================================================

/// Conventional Apache access log location.
pub const DEFAULT_LOG_PATH: &str = "/var/log/httpd/access.log";

// =============================================================================
// Trailing window
// =============================================================================

/// Default trailing window length in hours.
pub const DEFAULT_WINDOW_HOURS: i64 = 2;

/// Minimum configurable window length in hours.
pub const MIN_WINDOW_HOURS: i64 = 1;

/// Maximum configurable window length in hours (one week).
pub const MAX_WINDOW_HOURS: i64 = 168;

/// Default reference UTC offset in hours (JST).
pub const DEFAULT_REFERENCE_OFFSET_HOURS: i32 = 9;

/// Westernmost valid UTC offset in hours.
pub const MIN_REFERENCE_OFFSET_HOURS: i32 = -12;

/// Easternmost valid UTC offset in hours.
pub const MAX_REFERENCE_OFFSET_HOURS: i32 = 14;

/// chrono layout of the bracketed access-log timestamp without its offset.
pub const ACCESS_LOG_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

// =============================================================================
// Schedule
// =============================================================================

/// Default number of units between checks.
pub const DEFAULT_SCHEDULE_EVERY: u32 = 10;

/// Minimum configurable schedule count.
pub const MIN_SCHEDULE_EVERY: u32 = 1;

/// Maximum configurable schedule count.
pub const MAX_SCHEDULE_EVERY: u32 = 10_000;

/// How often the scheduler wakes to see whether a check is due (ms).
/// Fire times may lag the nominal boundary by up to this much.
pub const SCHEDULER_POLL_INTERVAL_MS: u64 = 1_000;

// =============================================================================
// Anomaly detector
// =============================================================================

/// Azure OpenAI REST API version.
pub const DEFAULT_API_VERSION: &str = "2024-11-01-preview";

/// Sampling temperature; zero keeps findings reproducible.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Maximum configurable sampling temperature.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Completion token budget for one findings report.
pub const DEFAULT_MAX_TOKENS: u32 = 3_000;

/// Maximum configurable completion token budget.
pub const MAX_MAX_TOKENS: u32 = 32_000;

/// Whole-request timeout for one detector call (seconds).
pub const DEFAULT_DETECTOR_TIMEOUT_SECS: u64 = 120;

/// Minimum configurable detector timeout (seconds).
pub const MIN_DETECTOR_TIMEOUT_SECS: u64 = 1;

/// Maximum configurable detector timeout (seconds).
pub const MAX_DETECTOR_TIMEOUT_SECS: u64 = 600;

/// Maximum number of response body bytes kept in an API error message.
pub const MAX_ERROR_BODY_PREVIEW: usize = 500;

/// Environment variable holding the Azure OpenAI endpoint URL.
pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";

/// Environment variable holding the Azure OpenAI deployment name.
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";

/// Legacy alias for `ENV_DEPLOYMENT`.
pub const ENV_DEPLOYMENT_ALIAS: &str = "AZURE_OPENAI_MODEL_4O_MINI";

/// Environment variable holding the Azure OpenAI API key.
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// Environment variable overriding the REST API version.
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
