/// Configuration schema and defaults for crush.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[collapse]`, `[preprocessing]`, `[logging]`, and `[analytics]`.
///
/// Every field has a built-in default. Users only need to set the values they
/// want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::collapse::MIN_RUN_LENGTH;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level crush configuration.
///
/// Maps directly to the `~/.crush/config.toml` and `.crush.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrushConfig {
    pub collapse: CollapseConfig,
    pub preprocessing: PreprocessingConfig,
    pub logging: LoggingConfig,
    pub analytics: AnalyticsConfig,
}

// ---------------------------------------------------------------------------
// [collapse]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Shortest run of identical characters that gets deleted. Values below
    /// 2 are treated as 2.
    pub min_run_length: usize,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            min_run_length: MIN_RUN_LENGTH,
        }
    }
}

// ---------------------------------------------------------------------------
// [preprocessing]
// ---------------------------------------------------------------------------

/// Steps applied to the request before it is collapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Trim leading and trailing whitespace from the input.
    pub trim: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self { trim: true }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic log verbosity. Ordered from quietest to noisiest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a level name, case-insensitively.
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warn => write!(f, "WARN"),
            Self::Info => write!(f, "INFO"),
            Self::Debug => write!(f, "DEBUG"),
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the diagnostic log is written.
    pub enabled: bool,
    /// Path to the log file. `~` is expanded to the home directory.
    pub path: String,
    /// Log level: `"error"`, `"warn"`, `"info"`, `"debug"`.
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.crush/crush.log".to_string(),
            level: LogLevel::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [analytics]
// ---------------------------------------------------------------------------

/// Analytics (JSONL collapse log) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Whether every collapse is recorded.
    pub enabled: bool,
    /// Path to the JSONL file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.crush/collapse-log.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path expansion
// ---------------------------------------------------------------------------

/// Expand a leading `~` to the home directory.
///
/// Returns `None` only when the path needs the home directory and it cannot
/// be determined.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl CrushConfig {
    /// The annotated TOML written by `crush config init`.
    pub fn default_toml() -> String {
        r#"# crush configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CRUSH_*)
#   2. Project config (.crush.toml in current directory)
#   3. User global config (~/.crush/config.toml)
#   4. Built-in defaults

[collapse]
min_run_length = 3          # Delete runs of this many identical characters or more

[preprocessing]
trim = true                 # Strip surrounding whitespace before collapsing

[logging]
enabled = true
path = "~/.crush/crush.log"
level = "info"              # error | warn | info | debug

[analytics]
enabled = true
path = "~/.crush/collapse-log.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
