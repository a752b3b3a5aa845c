//! Application configuration for plotsift.
//!
//! User config lives at `~/.plotsift/plotsift.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlotsiftError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "plotsift.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".plotsift";

// ---------------------------------------------------------------------------
// Config structs (matching plotsift.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lookup service settings.
    #[serde(default)]
    pub omdb: OmdbConfig,

    /// Listing layout.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[omdb]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// Endpoint queried with `?i=<id>&apikey=<key>`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Optional transport timeout per request, in seconds. Unset by default:
    /// a lookup waits as long as the server takes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://www.omdbapi.com/".into()
}
fn default_api_key_env() -> String {
    "OMDB_API_KEY".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Characters of the title shown per row.
    #[serde(default = "default_title_width")]
    pub title_width: usize,

    /// Characters of the plot shown per row.
    #[serde(default = "default_plot_width")]
    pub plot_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title_width: default_title_width(),
            plot_width: default_plot_width(),
        }
    }
}

fn default_title_width() -> usize {
    40
}
fn default_plot_width() -> usize {
    50
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.plotsift/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PlotsiftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.plotsift/plotsift.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PlotsiftError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PlotsiftError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the default config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_file_path()?)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| PlotsiftError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PlotsiftError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| PlotsiftError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

/// Read the OMDb API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.omdb.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PlotsiftError::config(format!(
            "OMDb API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://www.omdbapi.com/apikey.aspx"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("OMDB_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.omdb.timeout_secs, None);
        assert_eq!(parsed.output.title_width, 40);
        assert_eq!(parsed.output.plot_width, 50);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[omdb]
base_url = "http://localhost:8080/"

[output]
plot_width = 80
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.omdb.base_url, "http://localhost:8080/");
        assert_eq!(config.omdb.api_key_env, "OMDB_API_KEY");
        assert_eq!(config.output.title_width, 40);
        assert_eq!(config.output.plot_width, 80);
    }

    #[test]
    fn timeout_is_unset_unless_configured() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(!toml_str.contains("timeout_secs"));

        let config: AppConfig = toml::from_str("[omdb]\ntimeout_secs = 10\n").expect("parse");
        assert_eq!(config.omdb.timeout_secs, Some(10));
    }

    #[test]
    fn init_then_load() {
        let dir = std::env::temp_dir().join(format!("plotsift-config-{}", std::process::id()));
        let path = dir.join("nested").join(CONFIG_FILE_NAME);

        let written = init_config_at(&path).expect("init config");
        let loaded = load_config_from(&written).expect("load config");
        assert_eq!(loaded.omdb.base_url, "http://www.omdbapi.com/");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn api_key_resolution() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.omdb.api_key_env = "PLOTSIFT_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
