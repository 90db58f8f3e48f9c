/// Configuration system for crush.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::CrushConfig::default()`]
/// 2. **User global config** — `~/.crush/config.toml`
/// 3. **Project local config** — `.crush.toml` in the current working directory
/// 4. **Environment variables** — `CRUSH_*` overrides (highest precedence)
///
/// Later layers override earlier ones key by key: a file that only sets
/// `logging.level` leaves every other value from the previous layers intact.
///
/// # Usage
///
/// ```rust,ignore
/// use crush::config;
///
/// let cfg = config::load();
/// let handler = crush::handler::Handler::from_config(&cfg);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::collapse;

pub use schema::{CrushConfig, LogLevel};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved crush configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> CrushConfig {
    let mut config = load_files(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the given TOML files, in order, on top of the built-in defaults.
///
/// Missing or malformed files are skipped; a bad project file must never
/// stop a collapse from running.
fn load_files(paths: &[Option<PathBuf>]) -> CrushConfig {
    let Ok(mut merged) = toml::Value::try_from(CrushConfig::default()) else {
        return CrushConfig::default();
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read a TOML file as an untyped value, or `None` if it is absent or
/// malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // Reject files whose values have the wrong types.
    value.clone().try_into::<CrushConfig>().ok()?;
    Some(value)
}

/// Recursively overlay `overlay` onto `base`. Tables merge key by key; any
/// other value replaces what was there.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.crush/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".crush").join("config.toml"))
}

/// Path to the project local config: `.crush.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".crush.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CRUSH_MIN_RUN` — shortest deleted run (integer)
/// - `CRUSH_TRIM` — trim input before collapsing (`1`/`true`/`yes`/`on`)
/// - `CRUSH_LOG` — diagnostic log enabled
/// - `CRUSH_LOG_LEVEL` — `error`, `warn`, `info`, `debug`
/// - `CRUSH_ANALYTICS` — analytics log enabled
///
/// `lookup` is `std::env::var` in production; tests pass a closure.
fn apply_env_overrides(config: &mut CrushConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("CRUSH_MIN_RUN")
        && let Ok(n) = val.trim().parse::<usize>()
    {
        config.collapse.min_run_length = n;
    }
    if let Some(val) = lookup("CRUSH_TRIM") {
        config.preprocessing.trim = is_truthy(&val);
    }
    if let Some(val) = lookup("CRUSH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = lookup("CRUSH_LOG_LEVEL")
        && let Some(level) = LogLevel::parse(&val)
    {
        config.logging.level = level;
    }
    if let Some(val) = lookup("CRUSH_ANALYTICS") {
        config.analytics.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.crush/config.toml`.
///
/// Creates the `~/.crush/` directory if it doesn't exist. Returns an error
/// if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.crush/ directory")?;
    }

    fs::write(&path, CrushConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `logging.level`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&CrushConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    let updated = root
        .clone()
        .try_into::<CrushConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;
    validate(&updated)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Reject settings that would be accepted by the schema but not honored.
fn validate(config: &CrushConfig) -> Result<()> {
    if config.collapse.min_run_length < collapse::MIN_THRESHOLD {
        anyhow::bail!(
            "collapse.min_run_length must be at least {}, got {}",
            collapse::MIN_THRESHOLD,
            config.collapse.min_run_length
        );
    }
    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value is parsed according to the type of the value it replaces.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
