//! Application configuration for RepliDocs.
//!
//! User config lives at `~/.replidocs/replidocs.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RepliDocsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "replidocs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".replidocs";

// ---------------------------------------------------------------------------
// Config structs (matching replidocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Chat-completion service settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Reader proxy settings.
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Retry and crop policy.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Language to start the session with. Prompted for when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Where the documentation snippet is written.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            language: None,
            output_path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "docs/documentation.txt".into()
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// DuckDuckGo HTML endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Number of candidates handed to the selector.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_max_results() -> usize {
    6
}
fn default_search_timeout() -> u64 {
    10
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API root (the client appends `/chat/completions`).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model ID used for both selection and verification.
    #[serde(default = "default_model")]
    pub model: String,

    /// Kept low so that link selection is reproducible.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// The expected answer is a bare URL or a one-word verdict.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f64 {
    0.14
}
fn default_max_tokens() -> u32 {
    100
}
fn default_llm_timeout() -> u64 {
    60
}

/// `[reader]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Proxy prefix; the target URL is appended verbatim.
    #[serde(default = "default_reader_base_url")]
    pub base_url: String,

    #[serde(default = "default_reader_timeout")]
    pub timeout_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_reader_base_url(),
            timeout_secs: default_reader_timeout(),
        }
    }
}

fn default_reader_base_url() -> String {
    "https://r.jina.ai/".into()
}
fn default_reader_timeout() -> u64 {
    60
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extra attempts for the select+verify step (total = retries + 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Size cap of the output artifact, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}
fn default_max_chars() -> usize {
    21_000
}

impl PipelineConfig {
    /// Total number of select+verify attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.replidocs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RepliDocsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.replidocs/replidocs.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| RepliDocsError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        RepliDocsError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RepliDocsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RepliDocsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RepliDocsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject values that would make every query fail in a confusing way.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.search.max_results == 0 {
        return Err(RepliDocsError::config("search.max_results must be at least 1"));
    }
    if config.pipeline.max_chars == 0 {
        return Err(RepliDocsError::config("pipeline.max_chars must be at least 1"));
    }
    for (key, value) in [
        ("search.endpoint", &config.search.endpoint),
        ("llm.base_url", &config.llm.base_url),
        ("reader.base_url", &config.reader.base_url),
    ] {
        Url::parse(value)
            .map_err(|e| RepliDocsError::config(format!("{key} is not a valid URL ({value}): {e}")))?;
    }
    Ok(())
}

/// Read the model-service API key from the configured env var.
///
/// Called lazily right before a model call, so a session without a key can
/// still start and only the query that needs the key fails.
pub fn read_api_key(api_key_env: &str) -> Result<String> {
    match std::env::var(api_key_env) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(RepliDocsError::MissingCredential {
            var: api_key_env.to_string(),
        }),
    }
}
