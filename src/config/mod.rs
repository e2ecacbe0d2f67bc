/// Configuration system for scrapedash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::ScrapedashConfig::default()`]
/// 2. **User global config**: `~/.scrapedash/config.toml`
/// 3. **Project local config**: `.scrapedash.toml` in the current directory
/// 4. **Environment variables**: `SCRAPEDASH_*` overrides (highest precedence)
///
/// TOML layers are merged key by key before deserializing, so a project file
/// that only sets `[source] file` keeps everything else from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use scrapedash::config;
///
/// let cfg = config::load();
/// let loader = ReportLoader::with_event_log(cfg.source.build(), cfg.logging.event_log());
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ScrapedashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Malformed files
/// are skipped with a warning rather than aborting the command.
pub fn load() -> ScrapedashConfig {
    let files = [global_config_path(), project_config_path()];
    let mut config = load_layers(files.iter().flatten().map(PathBuf::as_path));
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the given TOML files (later wins) over the built-in defaults.
pub fn load_layers<'a>(paths: impl IntoIterator<Item = &'a Path>) -> ScrapedashConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in paths {
        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };
        match toml::from_str::<toml::Value>(&content) {
            Ok(layer) => merge_values(&mut merged, layer),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file"),
        }
    }

    merged.try_into().unwrap_or_else(|e: toml::de::Error| {
        tracing::warn!(error = %e, "config layers do not match the schema, using defaults");
        ScrapedashConfig::default()
    })
}

/// Deep-merge `overlay` into `base`: tables merge recursively, any other
/// value in the overlay replaces the base value.
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

/// Path to the user global config: `~/.scrapedash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".scrapedash").join("config.toml"))
}

/// Path to the project local config: `.scrapedash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".scrapedash.toml"))
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
/// - `SCRAPEDASH_URL`: report host base URL
/// - `SCRAPEDASH_PATH`: report resource path
/// - `SCRAPEDASH_FILE`: local report file (takes precedence over the URL)
/// - `SCRAPEDASH_TIMEOUT_MS`: HTTP request timeout
/// - `SCRAPEDASH_ADDR`: dashboard listen address
/// - `SCRAPEDASH_LOG_LEVEL`: diagnostic log level
/// - `SCRAPEDASH_EVENTS`: load-event recording (`1`/`true`/`yes`/`on`)
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides(config: &mut ScrapedashConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("SCRAPEDASH_URL")
        && !val.is_empty()
    {
        config.source.url = val;
    }
    if let Some(val) = lookup("SCRAPEDASH_PATH")
        && !val.is_empty()
    {
        config.source.path = val;
    }
    if let Some(val) = lookup("SCRAPEDASH_FILE") {
        config.source.file = val;
    }
    if let Some(val) = lookup("SCRAPEDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.source.timeout_ms = ms;
    }
    if let Some(val) = lookup("SCRAPEDASH_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Some(val) = lookup("SCRAPEDASH_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
    if let Some(val) = lookup("SCRAPEDASH_EVENTS") {
        config.logging.events = is_truthy(&val);
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

/// Write the default annotated config to `~/.scrapedash/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, ScrapedashConfig::default_toml()).context("failed to write config file")?;
    Ok(())
}

/// Set a single dotted key (e.g. `source.file`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

/// Set a dotted key in the config file at `path`, creating it from defaults
/// when missing.
pub fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ScrapedashConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that would make the file unloadable
    root.clone()
        .try_into::<ScrapedashConfig>()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Parse according to the type of the existing value
    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn later_layers_override_earlier_ones_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[source]\nurl = \"http://reports.internal\"\ntimeout_ms = 5000\n",
        )
        .unwrap();
        fs::write(&project, "[source]\ntimeout_ms = 1000\n").unwrap();

        let config = load_layers([global.as_path(), project.as_path()]);
        assert_eq!(config.source.url, "http://reports.internal");
        assert_eq!(config.source.timeout_ms, 1000);
        assert_eq!(config.source.path, "/scrapedData.json");
    }

    #[test]
    fn malformed_layer_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        let bad = dir.path().join("bad.toml");
        fs::write(&good, "[server]\naddr = \"0.0.0.0:8000\"\n").unwrap();
        fs::write(&bad, "[server\naddr = ").unwrap();

        let config = load_layers([good.as_path(), bad.as_path()]);
        assert_eq!(config.server.addr, "0.0.0.0:8000");
    }

    #[test]
    fn missing_layers_yield_defaults() {
        let config = load_layers([Path::new("/nonexistent/scrapedash.toml")]);
        assert_eq!(config, ScrapedashConfig::default());
    }

    #[test]
    fn env_overrides_apply_last() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SCRAPEDASH_URL", "http://10.0.0.2:8080"),
            ("SCRAPEDASH_TIMEOUT_MS", "250"),
            ("SCRAPEDASH_EVENTS", "off"),
            ("SCRAPEDASH_ADDR", ""),
        ]);
        let mut config = ScrapedashConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.source.url, "http://10.0.0.2:8080");
        assert_eq!(config.source.timeout_ms, 250);
        assert!(!config.logging.events);
        // Empty values do not clear required settings
        assert_eq!(config.server.addr, "127.0.0.1:9747");
    }

    #[test]
    fn invalid_timeout_env_is_ignored() {
        let mut config = ScrapedashConfig::default();
        apply_env_overrides(&mut config, |k| {
            (k == "SCRAPEDASH_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.source.timeout_ms, 30_000);
    }

    #[test]
    fn set_toml_value_updates_typed_values() {
        let mut root: toml::Value =
            toml::from_str("[server]\nopen_browser = true\n[source]\ntimeout_ms = 1\nurl = \"a\"\n").unwrap();
        set_toml_value(&mut root, "server.open_browser", "no").unwrap();
        set_toml_value(&mut root, "source.timeout_ms", "42").unwrap();
        set_toml_value(&mut root, "source.url", "http://b").unwrap();

        assert_eq!(root["server"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["source"]["timeout_ms"].as_integer(), Some(42));
        assert_eq!(root["source"]["url"].as_str(), Some("http://b"));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[source]\nurl = \"a\"\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "v").is_err());
        assert!(set_toml_value(&mut root, "source.nope", "v").is_err());
        assert!(set_toml_value(&mut root, "source.", "v").is_err());
        assert!(set_toml_value(&mut root, "source.timeout_ms", "x").is_err());
    }

    #[test]
    fn set_config_value_at_creates_file_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        set_config_value_at(&path, "source.file", "./scrapedData.json").unwrap();

        let config = load_layers([path.as_path()]);
        assert_eq!(config.source.file, "./scrapedData.json");
        assert_eq!(config.server, schema::ServerConfig::default());
    }

    #[test]
    fn write_default_config_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, false).unwrap();
        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
        assert_eq!(load_layers([path.as_path()]), ScrapedashConfig::default());
    }
}
