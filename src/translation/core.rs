/*!
 * Core translation service implementation.
 *
 * This module defines the `TranslationEngine` contract the file processor
 * depends on, and `TranslationService`, the engine backed by a local Ollama
 * server.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, trace};

use super::cache::TranslationCache;
use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::ollama::{GenerationRequest, Ollama};

/// Anything that can translate a span of text.
///
/// Implementations are shared between worker tasks as
/// `Arc<dyn TranslationEngine>`. Errors are soft: the caller keeps the
/// original text and carries on.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate `text`. `context_hint` describes what the text is,
    /// e.g. "code comment".
    async fn translate(&self, text: &str, context_hint: Option<&str>) -> Result<String, TranslationError>;
}

/// Translation engine backed by an Ollama model
#[derive(Debug, Clone)]
pub struct TranslationService {
    client: Ollama,
    config: TranslationConfig,
    /// English name of the source language, as used in prompts
    source_name: String,
    /// English name of the target language, as used in prompts
    target_name: String,
    cache: TranslationCache,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let source_name = language_utils::get_language_name(&config.source_language)
            .with_context(|| format!("Invalid source language: {}", config.source_language))?;
        let target_name = language_utils::get_language_name(&config.target_language)
            .with_context(|| format!("Invalid target language: {}", config.target_language))?;

        let client = Ollama::new_with_config(
            &config.endpoint,
            config.timeout_secs,
            config.retry_count,
            config.retry_backoff_ms,
            config.rate_limit,
        )?;

        Ok(Self {
            client,
            cache: TranslationCache::new(config.cache_enabled),
            config,
            source_name,
            target_name,
        })
    }

    /// The underlying Ollama client
    pub fn client(&self) -> &Ollama {
        &self.client
    }

    /// The translation cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Render the system prompt for one request
    pub fn build_system_prompt(&self, context_hint: Option<&str>) -> String {
        let context = context_hint
            .map(|hint| format!(" This is a {}.", hint))
            .unwrap_or_default();
        self.config
            .system_prompt
            .replace("{source_language}", &self.source_name)
            .replace("{target_language}", &self.target_name)
            .replace("{context}", &context)
    }

    async fn translate_chunk(&self, text: &str, context_hint: Option<&str>) -> Result<String, TranslationError> {
        let num_predict = u32::try_from(text.chars().count() * 2).unwrap_or(u32::MAX);
        let request = GenerationRequest::new(
            self.config.model.clone(),
            format!("Text to translate:\n{}\n\nTranslation:", text),
        )
        .system(self.build_system_prompt(context_hint))
        .temperature(self.config.temperature)
        .num_predict(num_predict);

        let response = self.client.complete(request).await?;
        let translated = Ollama::extract_text(&response);
        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse(text.to_string()));
        }
        Ok(translated)
    }
}

#[async_trait]
impl TranslationEngine for TranslationService {
    async fn translate(&self, text: &str, context_hint: Option<&str>) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let source = &self.config.source_language;
        let target = &self.config.target_language;
        if let Some(cached) = self.cache.get(text, source, target) {
            return Ok(cached);
        }

        let chunks = split_into_chunks(text, self.config.max_chars_per_request);
        if chunks.len() > 1 {
            debug!("Splitting {} characters into {} requests", text.chars().count(), chunks.len());
        }

        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            parts.push(self.translate_chunk(chunk, context_hint).await?);
        }
        let translated = parts.join("\n");
        trace!("Translated '{}' -> '{}'", text, translated);

        self.cache.store(text, source, target, &translated);
        Ok(translated)
    }
}

/// Split text at line boundaries into chunks of at most `max_chars`
/// characters. A single line longer than the limit stays whole.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in text.lines() {
        let line_chars = line.chars().count();
        if !current.is_empty() && current_chars + 1 + line_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(line);
        current_chars += line_chars;
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
