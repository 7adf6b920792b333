//! Application configuration for Content Factory.
//!
//! User config lives at `~/.content-factory/content-factory.toml`.
//! CLI flags override config file values, which override defaults.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ContentFactoryError, Result};
use crate::types::Model;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "content-factory.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".content-factory";

pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1..=4096;
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const TOP_P_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const PENALTY_RANGE: RangeInclusive<f32> = 0.0..=2.0;

// ---------------------------------------------------------------------------
// Config structs (matching content-factory.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Batch defaults.
    #[serde(default)]
    pub batch: BatchDefaultsConfig,
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub model: Model,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default)]
    pub presence_penalty: f32,

    #[serde(default)]
    pub frequency_penalty: f32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: Model::default(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    /// Parse the configured base URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            ContentFactoryError::config(format!("invalid base_url '{}': {e}", self.base_url))
        })
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com".into()
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    1.0
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[batch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDefaultsConfig {
    /// 1-based column index where outline sections start.
    #[serde(default = "default_outline_start")]
    pub outline_start_column: usize,

    /// Minimum ms between consecutive generation calls.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,

    /// Directory receiving documents and the summary table.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_summary_file_name")]
    pub summary_file_name: String,

    #[serde(default = "default_archive_file_name")]
    pub archive_file_name: String,

    /// Reject malformed article markup instead of ignoring it.
    #[serde(default)]
    pub strict_markup: bool,
}

impl Default for BatchDefaultsConfig {
    fn default() -> Self {
        Self {
            outline_start_column: default_outline_start(),
            pace_ms: default_pace_ms(),
            output_dir: default_output_dir(),
            summary_file_name: default_summary_file_name(),
            archive_file_name: default_archive_file_name(),
            strict_markup: false,
        }
    }
}

fn default_outline_start() -> usize {
    8
}
fn default_pace_ms() -> u64 {
    7_000
}
fn default_output_dir() -> String {
    "generated_articles".into()
}
fn default_summary_file_name() -> String {
    "generated_articles.csv".into()
}
fn default_archive_file_name() -> String {
    "generated_articles.zip".into()
}

// ---------------------------------------------------------------------------
// Generation settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: Model,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        }
    }
}

impl GenerationSettings {
    /// Check every parameter against the range the operator controls allow.
    pub fn validate(&self) -> Result<()> {
        if !MAX_TOKENS_RANGE.contains(&self.max_tokens) {
            return Err(out_of_range("max_tokens", self.max_tokens, &MAX_TOKENS_RANGE));
        }
        check_f32("temperature", self.temperature, &TEMPERATURE_RANGE)?;
        check_f32("top_p", self.top_p, &TOP_P_RANGE)?;
        check_f32("presence_penalty", self.presence_penalty, &PENALTY_RANGE)?;
        check_f32("frequency_penalty", self.frequency_penalty, &PENALTY_RANGE)?;
        Ok(())
    }
}

fn check_f32(name: &str, value: f32, range: &RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(name, value, range))
    }
}

fn out_of_range<T: std::fmt::Display>(name: &str, value: T, range: &RangeInclusive<T>) -> ContentFactoryError {
    ContentFactoryError::config(format!(
        "{name} = {value} is outside {}..={}",
        range.start(),
        range.end()
    ))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.content-factory/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentFactoryError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.content-factory/content-factory.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ContentFactoryError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ContentFactoryError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentFactoryError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentFactoryError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentFactoryError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the env var named in config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.generation.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(ContentFactoryError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
