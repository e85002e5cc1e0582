use crate::parser::natural_language::segmenter::{
    DEFAULT_DESCRIPTION_INDICATORS, DEFAULT_LOCATION_INDICATORS, FieldSegmenter, IndicatorTable,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_VAR: &str = "EVENTPARSE_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub language_model: LanguageModelConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    OpenAI,
    Grok,
    DeepSeek,
}

impl LLMProvider {
    /// OpenAI-compatible chat completions endpoint
    pub fn endpoint(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::Grok => "https://api.x.ai/v1/chat/completions",
            LLMProvider::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "gpt-4o-mini",
            LLMProvider::Grok => "grok-2-latest",
            LLMProvider::DeepSeek => "deepseek-chat",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "OPENAI_API_KEY",
            LLMProvider::Grok => "XAI_API_KEY",
            LLMProvider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageModelConfig {
    pub provider: LLMProvider,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Overrides the provider's endpoint, e.g. for a local proxy
    pub endpoint: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: Option<u64>,
}

impl Default for LanguageModelConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            model: None,
            endpoint: None,
            temperature: 0.2,
            request_timeout_secs: Some(30),
        }
    }
}

impl LanguageModelConfig {
    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| self.provider.endpoint().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub default_duration_minutes: i64,
    pub default_timezone: String,
    pub untitled_title: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: crate::parser::rule_based::DEFAULT_DURATION_MINUTES,
            default_timezone: "UTC".to_string(),
            untitled_title: crate::event::UNTITLED_EVENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub location_indicators: Vec<String>,
    pub description_indicators: Vec<String>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            location_indicators: DEFAULT_LOCATION_INDICATORS.iter().map(|s| s.to_string()).collect(),
            description_indicators: DEFAULT_DESCRIPTION_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SegmentationConfig {
    pub fn indicator_table(&self) -> IndicatorTable {
        IndicatorTable::from_lists(
            self.location_indicators.as_slice(),
            self.description_indicators.as_slice(),
        )
    }
}

impl Config {
    /// Load the user config, writing the defaults on first use
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Segmenter built from the configured indicator words and placeholder
    pub fn segmenter(&self) -> FieldSegmenter {
        FieldSegmenter::new(self.segmentation.indicator_table())
            .with_untitled(self.parser.untitled_title.clone())
    }
}

fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let proj_dirs = ProjectDirs::from("com", "ducktape", "eventparse")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
