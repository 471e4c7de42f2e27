use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::processor::ProcessorConfig;
use crate::script::Script;

/// Application configuration module
/// This module handles the application configuration including discovery,
/// loading, command-line overrides and validation.
/// File name searched for in the target directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".code-translator.json";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Translation engine settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// File and script filters
    #[serde(default)]
    pub filters: FilterConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Ollama model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Source language code or name
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code or name
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System prompt template
    /// Placeholders: {source_language}, {target_language}, {context}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Texts longer than this are split at line boundaries
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    /// Whether identical texts are translated only once per run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            rate_limit: None,
            timeout_secs: default_timeout_secs(),
            max_chars_per_request: default_max_chars_per_request(),
            cache_enabled: true,
        }
    }
}

/// Processing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessingConfig {
    /// Also translate string literals
    #[serde(default)]
    pub translate_all: bool,

    /// Report without writing files
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum number of files processed concurrently
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Descend into subdirectories
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Files larger than this many bytes are skipped
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            translate_all: false,
            dry_run: false,
            max_workers: default_max_workers(),
            recursive: true,
            max_file_size: default_max_file_size(),
        }
    }
}

/// File and script filters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterConfig {
    /// Directory names that are never entered
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Extensions that are never read (with or without leading dot)
    #[serde(default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,

    /// Optional glob patterns; when non-empty only matching files are processed
    #[serde(default)]
    pub file_patterns: Vec<String>,

    /// Scripts treated as foreign text
    #[serde(default = "Script::defaults")]
    pub scripts: Vec<Script>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_dirs: default_skip_dirs(),
            skip_extensions: default_skip_extensions(),
            file_patterns: Vec::new(),
            scripts: Script::defaults(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Equivalent `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub translate_all: Option<bool>,
    pub dry_run: Option<bool>,
    pub max_workers: Option<usize>,
    pub recursive: Option<bool>,
    pub log_level: Option<LogLevel>,
}

fn default_model() -> String {
    "qwen2.5:1.5b".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_source_language() -> String {
    "zh".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_system_prompt() -> String {
    "You are a professional translator of source code documentation. Translate the following text from {source_language} to {target_language}. Preserve all formatting, line breaks, and special characters.{context} Only respond with the translated text, without any explanations or notes.".to_string()
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_chars_per_request() -> usize {
    2000
}

fn default_max_workers() -> usize {
    4
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_skip_dirs() -> Vec<String> {
    [
        ".git", ".svn", ".hg", "__pycache__", "node_modules", "venv", ".venv", "dist", "build",
        "target",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_skip_extensions() -> Vec<String> {
    [
        ".pyc", ".pyo", ".so", ".dll", ".exe", ".bin", ".obj", ".jpg", ".jpeg", ".png", ".gif",
        ".bmp", ".ico", ".svg", ".mp3", ".mp4", ".avi", ".mov", ".wav", ".zip", ".tar", ".gz",
        ".rar", ".7z", ".pdf", ".doc", ".docx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise the first `.code-translator.json`
    /// found from `start_dir` upwards is used, then the per-user config file,
    /// then the built-in defaults. Returns the file that was loaded, if any.
    pub fn discover(explicit: Option<&Path>, start_dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let found = Self::find_config_file(start_dir)
            .or_else(|| Self::user_config_path().filter(|p| p.is_file()));
        if let Some(path) = found {
            let config = Self::load(&path)?;
            return Ok((config, Some(path)));
        }

        debug!("No configuration file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Search `start_dir` and its ancestors for a project configuration file
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let start = start_dir
            .canonicalize()
            .unwrap_or_else(|_| start_dir.to_path_buf());
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Per-user configuration file location
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("code-translator").join("config.json"))
    }

    /// Apply command-line values on top of the loaded configuration
    pub fn merge_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(model) = &overrides.model {
            self.translation.model = model.clone();
        }
        if let Some(source) = &overrides.source_language {
            self.translation.source_language = source.clone();
        }
        if let Some(target) = &overrides.target_language {
            self.translation.target_language = target.clone();
        }
        if let Some(translate_all) = overrides.translate_all {
            self.processing.translate_all = translate_all;
        }
        if let Some(dry_run) = overrides.dry_run {
            self.processing.dry_run = dry_run;
        }
        if let Some(workers) = overrides.max_workers {
            self.processing.max_workers = workers;
        }
        if let Some(recursive) = overrides.recursive {
            self.processing.recursive = recursive;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let translation = &self.translation;

        crate::language_utils::get_language_name(&translation.source_language)
            .with_context(|| format!("Invalid source language: {}", translation.source_language))?;
        crate::language_utils::get_language_name(&translation.target_language)
            .with_context(|| format!("Invalid target language: {}", translation.target_language))?;
        if crate::language_utils::language_codes_match(
            &translation.source_language,
            &translation.target_language,
        ) {
            warn!(
                "Source and target language are both '{}'",
                translation.target_language
            );
        }

        if translation.model.trim().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }
        Url::parse(&translation.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", translation.endpoint))?;
        if !(0.0..=1.0).contains(&translation.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 1.0, got {}",
                translation.temperature
            ));
        }
        if translation.max_chars_per_request == 0 {
            return Err(anyhow!("max_chars_per_request must be at least 1"));
        }

        if self.processing.max_workers == 0 {
            return Err(anyhow!("max_workers must be at least 1"));
        }
        if self.filters.scripts.is_empty() {
            return Err(anyhow!("At least one script must be configured"));
        }
        for pattern in &self.filters.file_patterns {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid file pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Settings for the file processor
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            recursive: self.processing.recursive,
            max_workers: self.processing.max_workers,
            translate_all: self.processing.translate_all,
            dry_run: self.processing.dry_run,
            skip_dirs: self.filters.skip_dirs.iter().cloned().collect(),
            skip_extensions: self
                .filters
                .skip_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            max_file_size: self.processing.max_file_size,
            file_patterns: self.filters.file_patterns.clone(),
            scripts: self.filters.scripts.clone(),
        }
    }
}
