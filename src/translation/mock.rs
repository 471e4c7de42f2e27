/*!
 * Mock translation engine for testing.
 *
 * This module provides a scriptable engine that simulates different behaviors:
 * - `MockEngine::working()` - Always succeeds, using a dictionary when one is set
 * - `MockEngine::identity()` - Returns its input unchanged
 * - `MockEngine::intermittent(n)` - Fails every nth request
 * - `MockEngine::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::core::TranslationEngine;
use crate::errors::{ProviderError, TranslationError};

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a translation
    Working,
    /// Returns the text unchanged
    Identity,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty response
    Empty,
    /// Simulates slow response, then behaves like `Working`
    Slow { delay_ms: u64 },
}

/// Mock engine for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockEngine {
    behavior: MockBehavior,
    dictionary: Arc<HashMap<String, String>>,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Create a new mock engine with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            dictionary: Arc::new(HashMap::new()),
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock engine that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an engine that echoes its input
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// Create an intermittently failing mock engine
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock engine that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Use fixed translations for known texts
    pub fn with_dictionary<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.dictionary = Arc::new(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Number of translate calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous translate calls observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn working_translation(&self, text: &str) -> String {
        self.dictionary
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[TRANSLATED] {}", text))
    }

    async fn respond(&self, text: &str, count: usize) -> Result<String, TranslationError> {
        match self.behavior {
            MockBehavior::Working => Ok(self.working_translation(text)),

            MockBehavior::Identity => Ok(text.to_string()),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(TranslationError::Provider(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    }))
                } else {
                    Ok(self.working_translation(text))
                }
            }

            MockBehavior::Failing => Err(TranslationError::Provider(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            })),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.working_translation(text))
            }
        }
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    async fn translate(&self, text: &str, _context_hint: Option<&str>) -> Result<String, TranslationError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = self.respond(text, count).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
