//! Application configuration for LakeSearch.
//!
//! User config lives at `~/.lakesearch/lakesearch.toml`.
//! Environment variables override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LakeSearchError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lakesearch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lakesearch";

// ---------------------------------------------------------------------------
// Config structs (matching lakesearch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata source (catalog API) settings.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Search engine settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Job store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Catalog walk policies.
    #[serde(default)]
    pub walker: WalkerConfig,
}

/// `[metadata]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Base URL of the workspace hosting the catalog API.
    #[serde(default)]
    pub base_url: String,

    /// Name of the env var holding the bearer token (never store the token).
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_env: default_token_env(),
        }
    }
}

fn default_token_env() -> String {
    "DATABRICKS_TOKEN".into()
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search engine host.
    #[serde(default = "default_search_host")]
    pub host: String,

    /// Search engine port.
    #[serde(default = "default_search_port")]
    pub port: u16,

    /// Core (collection) that holds the catalog documents.
    #[serde(default = "default_search_core")]
    pub core: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: default_search_host(),
            port: default_search_port(),
            core: default_search_core(),
        }
    }
}

fn default_search_host() -> String {
    "localhost".into()
}
fn default_search_port() -> u16 {
    8983
}
fn default_search_core() -> String {
    "unity_catalog".into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the local job database.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.lakesearch/jobs.db".into()
}

/// `[walker]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Maximum directory listing depth below a volume root.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Catalog names to skip in addition to the built-in system set.
    #[serde(default)]
    pub exclude_catalogs: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            exclude_catalogs: Vec::new(),
        }
    }
}

fn default_max_depth() -> u32 {
    10
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lakesearch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LakeSearchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lakesearch/lakesearch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config: file values (defaults if the file does not
/// exist) with environment overrides applied on top.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    let mut config = if path.exists() {
        load_config_from(&path)?
    } else {
        tracing::debug!(?path, "config file not found, using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load the application config from a specific file path. No environment
/// overrides are applied.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LakeSearchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LakeSearchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Overlay environment variables onto a loaded config. Empty values are
/// ignored, so an exported-but-blank variable does not clobber the file.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(host) = std::env::var("DATABRICKS_HOST") {
        if !host.is_empty() {
            config.metadata.base_url = host;
        }
    }
    if let Ok(host) = std::env::var("SOLR_HOST") {
        if !host.is_empty() {
            config.search.host = host;
        }
    }
    if let Ok(port) = std::env::var("SOLR_PORT") {
        if let Ok(port) = port.parse() {
            config.search.port = port;
        }
    }
    if let Ok(core) = std::env::var("SOLR_CORE") {
        if !core.is_empty() {
            config.search.core = core;
        }
    }
    if let Ok(path) = std::env::var("LAKESEARCH_DB") {
        if !path.is_empty() {
            config.storage.db_path = path;
        }
    }
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LakeSearchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LakeSearchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LakeSearchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the metadata source is reachable in principle: the base URL
/// must be set and parse as an absolute URL.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.metadata.base_url.is_empty() {
        return Err(LakeSearchError::config(
            "metadata base URL not configured. Set [metadata] base_url in the config \
             file or the DATABRICKS_HOST environment variable.",
        ));
    }
    url::Url::parse(&config.metadata.base_url).map_err(|e| {
        LakeSearchError::config(format!(
            "invalid metadata base URL {}: {e}",
            config.metadata.base_url
        ))
    })?;
    Ok(())
}

/// Read the bearer token from the env var named in the config.
pub fn resolve_token(config: &MetadataConfig) -> Result<String> {
    let var_name = &config.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(LakeSearchError::config(format!(
            "metadata API token not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Resolve the job database path, expanding a leading `~`.
pub fn resolve_db_path(config: &StorageConfig) -> Result<PathBuf> {
    expand_tilde(&config.db_path)
}

fn expand_tilde(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| LakeSearchError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
