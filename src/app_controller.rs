use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::processor::{FileProcessor, StatsSnapshot};
use crate::providers::Provider;
use crate::providers::ollama::ModelInfo;
use crate::translation::{TranslationEngine, TranslationService};

// @module: Application controller for source tree translation

/// Errors listed in the summary before the rest are elided
const MAX_REPORTED_ERRORS: usize = 10;

/// Exit status for an interrupted run
pub const EXIT_INTERRUPTED: i32 = 130;

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Models installed on the configured Ollama server
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let service = TranslationService::new(self.config.translation.clone())?;
        service
            .client()
            .list_models()
            .await
            .with_context(|| format!("Failed to list models at {}", service.client().base_url()))
    }

    /// Build the Ollama engine and make sure the server and model are usable
    pub async fn connect_engine(&self) -> Result<Arc<TranslationService>> {
        let service = TranslationService::new(self.config.translation.clone())?;
        let client = service.client();

        client
            .test_connection()
            .await
            .with_context(|| format!("Cannot reach Ollama at {}", client.base_url()))?;

        let pulled = client
            .verify_model(service.model())
            .await
            .with_context(|| format!("Model '{}' is not available", service.model()))?;
        if pulled {
            info!("Pulled model {}", service.model());
        }
        debug!("Using model {} at {}", service.model(), client.base_url());

        Ok(Arc::new(service))
    }

    /// Translate the tree at `path` with the Ollama engine
    pub async fn run(&self, path: &Path, show_progress: bool) -> Result<StatsSnapshot> {
        let service = self.connect_engine().await?;
        let snapshot = self.run_with_engine(path, service.clone(), show_progress).await?;

        let (hits, misses, hit_rate) = service.cache().stats();
        if hits + misses > 0 {
            debug!("Translation cache: {} hits, {} misses ({:.1}% hit rate)", hits, misses, hit_rate * 100.0);
        }
        Ok(snapshot)
    }

    /// Translate the tree at `path` with the given engine.
    ///
    /// Ctrl-C stops dispatching new files; the partial statistics are
    /// returned with `cancelled` set.
    pub async fn run_with_engine(
        &self,
        path: &Path,
        engine: Arc<dyn TranslationEngine>,
        show_progress: bool,
    ) -> Result<StatsSnapshot> {
        if !path.exists() {
            return Err(anyhow!("Path does not exist: {:?}", path));
        }

        let processor = FileProcessor::new(self.config.processor_config(), engine);
        if processor.config().dry_run {
            info!("Dry run: files will not be modified");
        }

        let cancel = processor.cancel_handle();
        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing files in progress");
                cancel.store(true, Ordering::SeqCst);
            }
        });

        let progress_bar = if show_progress {
            Self::create_progress_bar()
        } else {
            ProgressBar::hidden()
        };

        let start_time = Instant::now();
        let bar = progress_bar.clone();
        let result = processor
            .process_directory_with_progress(path, move |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })
            .await;
        signal_task.abort();

        progress_bar.finish_and_clear();
        let snapshot = result?;
        debug!("Processed {} in {}", path.display(), Self::format_duration(start_time.elapsed()));

        Ok(snapshot)
    }

    fn create_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    /// Log the summary table and the first errors
    pub fn print_summary(snapshot: &StatsSnapshot) {
        info!("{}", "=".repeat(50));
        info!("Translation summary{}", if snapshot.cancelled { " (interrupted)" } else { "" });
        info!("{}", "=".repeat(50));
        for line in Self::summary_rows(snapshot) {
            info!("{}", line);
        }

        if snapshot.has_errors() {
            error!("Errors ({}):", snapshot.errors.len());
            for message in snapshot.errors.iter().take(MAX_REPORTED_ERRORS) {
                error!("  - {}", message);
            }
            if snapshot.errors.len() > MAX_REPORTED_ERRORS {
                error!("  ... and {} more", snapshot.errors.len() - MAX_REPORTED_ERRORS);
            }
        }
    }

    /// Counter rows of the summary table
    pub fn summary_rows(snapshot: &StatsSnapshot) -> Vec<String> {
        [
            ("Files scanned", snapshot.files_scanned),
            ("Files with foreign text", snapshot.files_with_foreign_text),
            ("Files translated", snapshot.files_translated),
            ("Files skipped", snapshot.files_skipped),
            ("Elements translated", snapshot.elements_translated),
            ("Elements failed", snapshot.elements_failed),
            ("Notices", snapshot.notices.len()),
            ("Errors", snapshot.errors.len()),
        ]
        .iter()
        .map(|(label, value)| format!("{:<26}{:>8}", label, value))
        .collect()
    }

    /// Process exit status for a finished run
    pub fn exit_code(snapshot: &StatsSnapshot) -> i32 {
        if snapshot.cancelled {
            EXIT_INTERRUPTED
        } else if snapshot.has_errors() {
            1
        } else {
            0
        }
    }

    /// Format a duration as a human-readable string
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
