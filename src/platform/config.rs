// LogWarden - platform/config.rs
//
// Platform config directory resolution, config.toml loading with startup
// validation, and environment overrides for detector credentials.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.
//
// Precedence: defaults < config.toml < environment < CLI (applied in main).
// The resulting AppConfig is immutable for the life of the process.

use crate::app::check::CheckSettings;
use crate::core::model::{ScheduleSpec, TimeUnit, TimestampPolicy};
use crate::util::constants;
use crate::util::error::ConfigError;
use chrono::{FixedOffset, Offset, TimeDelta, Utc};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogWarden configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logwarden/).
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub source: SourceSection,
    pub window: WindowSection,
    pub schedule: ScheduleSection,
    pub filter: FilterSection,
    pub detector: DetectorSection,
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Access log path.
    pub path: Option<String>,
}

/// `[window]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct WindowSection {
    /// Trailing window length in hours.
    pub hours: Option<i64>,
    /// UTC offset of "now" and of reinterpreted line timestamps.
    pub reference_offset_hours: Option<i32>,
    /// Honour the offset written in each line instead of the reference.
    pub honor_embedded_offset: Option<bool>,
}

/// `[schedule]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    /// Number of units between checks.
    pub every: Option<u32>,
    /// "S", "M", "H" or the spelled-out names.
    pub unit: Option<String>,
}

/// `[filter]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Send only 4xx/5xx lines to the detector.
    pub errors_only: Option<bool>,
}

/// `[detector]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DetectorSection {
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated configuration
// =============================================================================

/// Connection settings for the anomaly detector.
#[derive(Clone)]
pub struct DetectorConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_key: String::new(),
            api_version: constants::DEFAULT_API_VERSION.to_string(),
            temperature: constants::DEFAULT_TEMPERATURE,
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            timeout_secs: constants::DEFAULT_DETECTOR_TIMEOUT_SECS,
        }
    }
}

// Hand-written so the API key never reaches a log line.
impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DetectorConfig {
    /// Error on the first missing credential.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.endpoint, "detector.endpoint", constants::ENV_ENDPOINT),
            (&self.deployment, "detector.deployment", constants::ENV_DEPLOYMENT),
            (&self.api_key, "detector.api_key", constants::ENV_API_KEY),
        ];
        for (value, field, env_var) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingValue { field, env_var });
            }
        }
        Ok(())
    }
}

/// Validated application configuration.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Source --
    pub log_path: PathBuf,

    // -- Window --
    pub window_hours: i64,
    pub reference_offset_hours: i32,
    pub timestamp_policy: TimestampPolicy,

    // -- Schedule --
    pub schedule: ScheduleSpec,

    // -- Filter --
    pub errors_only: bool,

    // -- Detector --
    pub detector: DetectorConfig,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(constants::DEFAULT_LOG_PATH),
            window_hours: constants::DEFAULT_WINDOW_HOURS,
            reference_offset_hours: constants::DEFAULT_REFERENCE_OFFSET_HOURS,
            timestamp_policy: TimestampPolicy::default(),
            schedule: ScheduleSpec::new(constants::DEFAULT_SCHEDULE_EVERY, TimeUnit::default()),
            errors_only: false,
            detector: DetectorConfig::default(),
            log_level: None,
        }
    }
}

impl AppConfig {
    /// The reference offset as a chrono `FixedOffset`.
    pub fn reference_offset(&self) -> FixedOffset {
        // Range-checked at load time; UTC is the unreachable fallback.
        FixedOffset::east_opt(self.reference_offset_hours * 3_600).unwrap_or(Utc.fix())
    }

    /// Per-tick settings for the checker.
    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings {
            window_length: TimeDelta::hours(self.window_hours),
            reference_offset: self.reference_offset(),
            timestamp_policy: self.timestamp_policy,
            errors_only: self.errors_only,
        }
    }
}

/// Load and validate config.toml from `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning
/// so the operator is informed but the monitor still starts.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    validate(raw)
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    let mut out_of_range = |field: &str, value: String, expected: String, default: String| {
        let err = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        };
        warnings.push(format!("{err}. Using default ({default})."));
    };

    // -- Source --
    if let Some(path) = raw.source.path {
        if path.trim().is_empty() {
            out_of_range(
                "source.path",
                path,
                "a file path".to_string(),
                constants::DEFAULT_LOG_PATH.to_string(),
            );
        } else {
            config.log_path = PathBuf::from(path);
        }
    }

    // -- Window --
    if let Some(hours) = raw.window.hours {
        if (constants::MIN_WINDOW_HOURS..=constants::MAX_WINDOW_HOURS).contains(&hours) {
            config.window_hours = hours;
        } else {
            out_of_range(
                "window.hours",
                hours.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_WINDOW_HOURS,
                    constants::MAX_WINDOW_HOURS
                ),
                constants::DEFAULT_WINDOW_HOURS.to_string(),
            );
        }
    }

    if let Some(offset) = raw.window.reference_offset_hours {
        if (constants::MIN_REFERENCE_OFFSET_HOURS..=constants::MAX_REFERENCE_OFFSET_HOURS)
            .contains(&offset)
        {
            config.reference_offset_hours = offset;
        } else {
            out_of_range(
                "window.reference_offset_hours",
                offset.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_REFERENCE_OFFSET_HOURS,
                    constants::MAX_REFERENCE_OFFSET_HOURS
                ),
                constants::DEFAULT_REFERENCE_OFFSET_HOURS.to_string(),
            );
        }
    }

    if raw.window.honor_embedded_offset == Some(true) {
        config.timestamp_policy = TimestampPolicy::EmbeddedOffset;
    }

    // -- Schedule --
    let mut every = constants::DEFAULT_SCHEDULE_EVERY;
    if let Some(n) = raw.schedule.every {
        if (constants::MIN_SCHEDULE_EVERY..=constants::MAX_SCHEDULE_EVERY).contains(&n) {
            every = n;
        } else {
            out_of_range(
                "schedule.every",
                n.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_SCHEDULE_EVERY,
                    constants::MAX_SCHEDULE_EVERY
                ),
                constants::DEFAULT_SCHEDULE_EVERY.to_string(),
            );
        }
    }
    let mut unit = TimeUnit::default();
    if let Some(raw_unit) = raw.schedule.unit {
        match TimeUnit::parse(&raw_unit) {
            Some(u) => unit = u,
            None => out_of_range(
                "schedule.unit",
                raw_unit,
                "S, M or H".to_string(),
                TimeUnit::default().to_string(),
            ),
        }
    }
    config.schedule = ScheduleSpec::new(every, unit);

    // -- Filter --
    if let Some(errors_only) = raw.filter.errors_only {
        config.errors_only = errors_only;
    }

    // -- Detector --
    let detector = &mut config.detector;
    if let Some(endpoint) = raw.detector.endpoint {
        detector.endpoint = endpoint;
    }
    if let Some(deployment) = raw.detector.deployment {
        detector.deployment = deployment;
    }
    if let Some(api_key) = raw.detector.api_key {
        detector.api_key = api_key;
    }
    if let Some(api_version) = raw.detector.api_version {
        if !api_version.trim().is_empty() {
            detector.api_version = api_version;
        }
    }
    if let Some(t) = raw.detector.temperature {
        if (0.0..=constants::MAX_TEMPERATURE).contains(&t) {
            detector.temperature = t;
        } else {
            out_of_range(
                "detector.temperature",
                t.to_string(),
                format!("0.0-{}", constants::MAX_TEMPERATURE),
                constants::DEFAULT_TEMPERATURE.to_string(),
            );
        }
    }
    if let Some(tokens) = raw.detector.max_tokens {
        if (1..=constants::MAX_MAX_TOKENS).contains(&tokens) {
            detector.max_tokens = tokens;
        } else {
            out_of_range(
                "detector.max_tokens",
                tokens.to_string(),
                format!("1-{}", constants::MAX_MAX_TOKENS),
                constants::DEFAULT_MAX_TOKENS.to_string(),
            );
        }
    }
    if let Some(secs) = raw.detector.timeout_secs {
        if (constants::MIN_DETECTOR_TIMEOUT_SECS..=constants::MAX_DETECTOR_TIMEOUT_SECS)
            .contains(&secs)
        {
            detector.timeout_secs = secs;
        } else {
            out_of_range(
                "detector.timeout_secs",
                secs.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_DETECTOR_TIMEOUT_SECS,
                    constants::MAX_DETECTOR_TIMEOUT_SECS
                ),
                constants::DEFAULT_DETECTOR_TIMEOUT_SECS.to_string(),
            );
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            out_of_range(
                "logging.level",
                level,
                "error, warn, info, debug or trace".to_string(),
                constants::DEFAULT_LOG_LEVEL.to_string(),
            );
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Apply detector credential overrides from the environment.
///
/// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
/// Empty variables are ignored.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let detector = &mut config.detector;

    if let Some(v) = get(constants::ENV_ENDPOINT) {
        detector.endpoint = v;
    }
    if let Some(v) = get(constants::ENV_DEPLOYMENT).or_else(|| get(constants::ENV_DEPLOYMENT_ALIAS)) {
        detector.deployment = v;
    }
    if let Some(v) = get(constants::ENV_API_KEY) {
        detector.api_key = v;
    }
    if let Some(v) = get(constants::ENV_API_VERSION) {
        detector.api_version = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).unwrap())
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let (config, warnings) = parse("");
        assert!(warnings.is_empty());
        assert_eq!(config.log_path, PathBuf::from("/var/log/httpd/access.log"));
        assert_eq!(config.window_hours, 2);
        assert_eq!(config.reference_offset_hours, 9);
        assert_eq!(config.schedule, ScheduleSpec::new(10, TimeUnit::Seconds));
        assert_eq!(config.timestamp_policy, TimestampPolicy::ReferenceZone);
        assert_eq!(config.detector.api_version, "2024-11-01-preview");
        assert_eq!(config.detector.max_tokens, 3_000);
    }

    #[test]
    fn test_full_file_is_applied() {
        let (config, warnings) = parse(
            r#"
[source]
path = "/srv/www/logs/access_log"

[window]
hours = 6
reference_offset_hours = 0
honor_embedded_offset = true

[schedule]
every = 2
unit = "H"

[filter]
errors_only = true

[detector]
endpoint = "https://example.openai.azure.com"
deployment = "gpt-4o-mini"
api_key = "secret"
timeout_secs = 30

[logging]
level = "debug"
"#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.log_path, PathBuf::from("/srv/www/logs/access_log"));
        assert_eq!(config.window_hours, 6);
        assert_eq!(config.reference_offset(), FixedOffset::east_opt(0).unwrap());
        assert_eq!(config.timestamp_policy, TimestampPolicy::EmbeddedOffset);
        assert_eq!(config.schedule, ScheduleSpec::new(2, TimeUnit::Hours));
        assert!(config.errors_only);
        assert_eq!(config.detector.timeout_secs, 30);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.detector.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (config, warnings) = parse(
            r#"
[window]
hours = 0
reference_offset_hours = 15

[schedule]
every = 0
unit = "days"

[logging]
level = "loud"
"#,
        );
        assert_eq!(warnings.len(), 5, "{warnings:?}");
        assert_eq!(config.window_hours, 2);
        assert_eq!(config.reference_offset_hours, 9);
        assert_eq!(config.schedule, ScheduleSpec::new(10, TimeUnit::Seconds));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_check_settings_follow_config() {
        let (config, _) = parse("[window]\nhours = 3\n");
        let settings = config.check_settings();
        assert_eq!(settings.window_length, TimeDelta::hours(3));
        assert_eq!(
            settings.reference_offset,
            FixedOffset::east_opt(9 * 3_600).unwrap()
        );
    }

    #[test]
    fn test_env_overrides_file_and_alias_is_accepted() {
        let (mut config, _) = parse("[detector]\nendpoint = \"https://file.example\"\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("AZURE_OPENAI_ENDPOINT", "https://env.example"),
            ("AZURE_OPENAI_MODEL_4O_MINI", "gpt-4o-mini"),
            ("AZURE_OPENAI_API_KEY", "k"),
            ("AZURE_OPENAI_API_VERSION", ""),
        ]);

        apply_env(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.detector.endpoint, "https://env.example");
        assert_eq!(config.detector.deployment, "gpt-4o-mini");
        assert_eq!(config.detector.api_key, "k");
        assert_eq!(config.detector.api_version, "2024-11-01-preview");
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let detector = DetectorConfig {
            endpoint: "https://example.openai.azure.com".to_string(),
            deployment: "gpt-4o-mini".to_string(),
            ..DetectorConfig::default()
        };
        let err = detector.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingValue {
                field: "detector.api_key",
                ..
            }
        ));
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let detector = DetectorConfig {
            api_key: "super-secret".to_string(),
            ..DetectorConfig::default()
        };
        let text = format!("{detector:?}");
        assert!(!text.contains("super-secret"));
        assert!(text.contains("<redacted>"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.window_hours, 2);
    }

    #[test]
    fn test_unparseable_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[window\nhours = ").unwrap();

        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.window_hours, 2);
    }
}
