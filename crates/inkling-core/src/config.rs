//! Application configuration.
//!
//! Configuration is a JSON file at `$XDG_CONFIG_HOME/inkling/config.json`
//! unless a path is given explicitly. Every field has a default, so a
//! missing file or a partial file is fine:
//!
//! ```json
//! {
//!   "gemini": { "apiKey": "..." },
//!   "ai": {
//!     "model": "gemini-3-flash-preview",
//!     "timeoutSecs": 120,
//!     "prompts": { "refine": "...", "single": "...", "transcribe": "..." }
//!   }
//! }
//! ```
//!
//! The `GEMINI_API_KEY` environment variable overrides `gemini.apiKey`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{InklingError, Result};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const DEFAULT_REFINE_PROMPT: &str = "请基于以下闪念灵感，一次性生成4篇不同风格的深度笔记（包括深度解析版、叙事故事版、多维分析版、精简摘要版）。灵感内容：";
const DEFAULT_SINGLE_PROMPT: &str = "基于核心灵感，生成一个独特的异构版本。要求风格鲜明，内容充实：";
const DEFAULT_TRANSCRIBE_PROMPT: &str = "请将这段语音内容转写成文字。只需返回转写后的文字内容。";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub gemini: GeminiConfig,
    pub ai: AiConfig,
}

/// Credentials for the model endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GeminiConfig {
    pub api_key: Option<String>,
}

/// Model selection and request settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    /// Model name used for every request
    pub model: String,

    /// Base URL of the generative language REST API
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Prompt prefixes prepended to the user's text
    pub prompts: Prompts,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompts: Prompts::default(),
        }
    }
}

/// Prompt prefixes for each kind of model call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prompts {
    pub refine: String,
    pub single: String,
    pub transcribe: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            refine: DEFAULT_REFINE_PROMPT.to_string(),
            single: DEFAULT_SINGLE_PROMPT.to_string(),
            transcribe: DEFAULT_TRANSCRIBE_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the XDG config directory
    /// when `path` is `None`, then applies the environment override.
    ///
    /// # Errors
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not. Malformed JSON is always an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| InklingError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_str(&raw).map_err(|e| InklingError::Configuration {
            message: format!("Invalid configuration in {}: {e}", path.display()),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Replaces the API key when `key` is present and non-empty.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
        self
    }

    /// The configured API key, if any non-blank key is set.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    fn default_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("inkling").find_config_file("config.json")
    }
}
