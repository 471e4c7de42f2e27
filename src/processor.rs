/*!
 * File processing orchestration.
 *
 * `FileProcessor` walks a tree, filters the candidate files and runs
 * extraction, translation, reconstruction and the optional write for each of
 * them on a bounded number of concurrent tasks. Every per-file failure is
 * recorded in the shared `ProcessingStats` and never aborts the run.
 */

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::ProcessError;
use crate::extractor::{Element, ExtractionMode, Extractor};
use crate::file_utils::{FileManager, WalkOptions};
use crate::grammar::detect_language;
use crate::reconstructor::Reconstructor;
use crate::script::{Script, ScriptPredicate};
use crate::translation::TranslationEngine;

/// Settings for a processing run
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub recursive: bool,
    /// Upper bound on files in flight, and therefore on outstanding engine calls
    pub max_workers: usize,
    /// Also translate string literals
    pub translate_all: bool,
    pub dry_run: bool,
    pub skip_dirs: HashSet<String>,
    /// Lower-cased, without the leading dot
    pub skip_extensions: HashSet<String>,
    pub max_file_size: u64,
    pub file_patterns: Vec<String>,
    pub scripts: Vec<Script>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        crate::app_config::Config::default().processor_config()
    }
}

impl ProcessorConfig {
    fn extraction_mode(&self) -> ExtractionMode {
        if self.translate_all {
            ExtractionMode::Aggressive
        } else {
            ExtractionMode::Conservative
        }
    }
}

/// Why a file was left out before reading it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Denylisted extension
    BinaryOrMedia,
    /// No grammar for the extension
    Unsupported,
    TooLarge { size: u64, limit: u64 },
    /// The file could not be stat'ed
    Unreadable(String),
}

/// Run-wide counters, safe to update from concurrent tasks
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_scanned: AtomicUsize,
    pub files_with_foreign_text: AtomicUsize,
    pub files_translated: AtomicUsize,
    pub files_skipped: AtomicUsize,
    pub elements_translated: AtomicUsize,
    pub elements_failed: AtomicUsize,
    errors: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl ProcessingStats {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Append to the error list
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.errors.lock().push(message);
    }

    /// Append to the informational notice list
    pub fn add_notice(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.notices.lock().push(message);
    }

    /// Plain copy of the current values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_scanned: self.files_scanned.load(Ordering::SeqCst),
            files_with_foreign_text: self.files_with_foreign_text.load(Ordering::SeqCst),
            files_translated: self.files_translated.load(Ordering::SeqCst),
            files_skipped: self.files_skipped.load(Ordering::SeqCst),
            elements_translated: self.elements_translated.load(Ordering::SeqCst),
            elements_failed: self.elements_failed.load(Ordering::SeqCst),
            errors: self.errors.lock().clone(),
            notices: self.notices.lock().clone(),
            cancelled: false,
        }
    }
}

/// Reportable copy of `ProcessingStats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub files_scanned: usize,
    pub files_with_foreign_text: usize,
    pub files_translated: usize,
    pub files_skipped: usize,
    pub elements_translated: usize,
    pub elements_failed: usize,
    pub errors: Vec<String>,
    pub notices: Vec<String>,
    /// The run was interrupted before every file was dispatched
    pub cancelled: bool,
}

impl StatsSnapshot {
    /// Whether any error was recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome of a file that contained foreign text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub path: PathBuf,
    pub elements_count: usize,
    /// Sizes in bytes
    pub original_size: usize,
    pub new_size: usize,
    /// The file on disk was replaced
    pub written: bool,
}

/// Processes files and directories with a translation engine
pub struct FileProcessor {
    config: ProcessorConfig,
    engine: Arc<dyn TranslationEngine>,
    extractor: Extractor,
    stats: ProcessingStats,
    cancelled: Arc<AtomicBool>,
}

impl FileProcessor {
    /// Create a processor that translates with `engine`
    pub fn new(config: ProcessorConfig, engine: Arc<dyn TranslationEngine>) -> Self {
        let extractor = Extractor::new(ScriptPredicate::new(&config.scripts));
        Self {
            config,
            engine,
            extractor,
            stats: ProcessingStats::default(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Statistics accumulated over the processor's lifetime
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Setting the flag stops dispatching new files; files already started finish
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Decide whether a file is left out without reading it
    pub fn should_skip_file(&self, path: &Path) -> Option<SkipReason> {
        if let Some(ext) = FileManager::extension_of(path) {
            if self.config.skip_extensions.contains(&ext) {
                return Some(SkipReason::BinaryOrMedia);
            }
        }
        if detect_language(path).is_none() {
            return Some(SkipReason::Unsupported);
        }

        match fs::metadata(path) {
            Ok(metadata) if metadata.len() > self.config.max_file_size => Some(SkipReason::TooLarge {
                size: metadata.len(),
                limit: self.config.max_file_size,
            }),
            Ok(_) => None,
            Err(e) => Some(SkipReason::Unreadable(e.to_string())),
        }
    }

    /// Process a single file.
    ///
    /// Returns `Ok(None)` when the file holds no foreign text. Failures are
    /// recorded in the stats before being returned.
    pub async fn process_file(&self, path: &Path) -> Result<Option<FileResult>, ProcessError> {
        let result = self.process_file_inner(path).await;
        if let Err(e) = &result {
            match e {
                ProcessError::Unsupported { .. } => ProcessingStats::bump(&self.stats.files_skipped),
                ProcessError::TooLarge { .. } => {
                    ProcessingStats::bump(&self.stats.files_skipped);
                    self.stats.add_notice(e.to_string());
                }
                ProcessError::Unreadable { .. } => {
                    ProcessingStats::bump(&self.stats.files_skipped);
                    self.stats.record_error(e.to_string());
                }
                _ => self.stats.record_error(e.to_string()),
            }
        }
        result
    }

    async fn process_file_inner(&self, path: &Path) -> Result<Option<FileResult>, ProcessError> {
        let language = detect_language(path).ok_or_else(|| ProcessError::Unsupported {
            path: path.to_path_buf(),
        })?;

        let bytes = tokio::fs::read(path).await.map_err(|e| ProcessError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if bytes.len() as u64 > self.config.max_file_size {
            return Err(ProcessError::TooLarge {
                path: path.to_path_buf(),
                size: bytes.len() as u64,
                limit: self.config.max_file_size,
            });
        }
        let content = String::from_utf8(bytes).map_err(|e| ProcessError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        ProcessingStats::bump(&self.stats.files_scanned);

        let elements = self
            .extractor
            .extract(&content, language, self.config.extraction_mode());
        if elements.is_empty() {
            debug!("{}: no foreign text", path.display());
            return Ok(None);
        }
        ProcessingStats::bump(&self.stats.files_with_foreign_text);
        debug!("{}: {} elements ({})", path.display(), elements.len(), language);

        let elements_count = elements.len();
        let translations = self.translate_elements(path, elements).await;

        let new_content = Reconstructor::reconstruct(&content, &translations).map_err(|source| {
            ProcessError::Reconstruct {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let written = if self.config.dry_run || new_content == content {
            false
        } else {
            self.write_file(path, new_content.clone()).await?;
            ProcessingStats::bump(&self.stats.files_translated);
            true
        };

        Ok(Some(FileResult {
            path: path.to_path_buf(),
            elements_count,
            original_size: content.len(),
            new_size: new_content.len(),
            written,
        }))
    }

    /// Translate every element; a failed element keeps its original text
    async fn translate_elements(&self, path: &Path, elements: Vec<Element>) -> Vec<(Element, String)> {
        let mut translations = Vec::with_capacity(elements.len());

        for element in elements {
            let hint = element.kind.context_hint();
            let translated = match self.engine.translate(&element.text, Some(hint)).await {
                Ok(translated) => translated,
                Err(source) => {
                    ProcessingStats::bump(&self.stats.elements_failed);
                    let failure = ProcessError::TranslationFailed {
                        path: path.to_path_buf(),
                        line: element.start_line + 1,
                        source,
                    };
                    self.stats.add_notice(format!("{}; keeping original text", failure));
                    element.text.clone()
                }
            };
            ProcessingStats::bump(&self.stats.elements_translated);
            translations.push((element, translated));
        }

        translations
    }

    async fn write_file(&self, path: &Path, content: String) -> Result<(), ProcessError> {
        let target = path.to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || FileManager::write_atomic(&target, &content)).await;

        let reason = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };
        Err(ProcessError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Pre-filter and process one file of a directory run
    async fn run_file(&self, path: &Path) {
        if self.is_cancelled() {
            return;
        }

        match self.should_skip_file(path) {
            Some(SkipReason::BinaryOrMedia) | Some(SkipReason::Unsupported) => {
                ProcessingStats::bump(&self.stats.files_skipped);
            }
            Some(SkipReason::TooLarge { size, limit }) => {
                ProcessingStats::bump(&self.stats.files_skipped);
                self.stats.add_notice(
                    ProcessError::TooLarge {
                        path: path.to_path_buf(),
                        size,
                        limit,
                    }
                    .to_string(),
                );
            }
            Some(SkipReason::Unreadable(reason)) => {
                ProcessingStats::bump(&self.stats.files_skipped);
                self.stats.record_error(
                    ProcessError::Unreadable {
                        path: path.to_path_buf(),
                        reason,
                    }
                    .to_string(),
                );
            }
            None => {
                if let Ok(Some(result)) = self.process_file(path).await {
                    debug!(
                        "{}: {} elements, {} -> {} bytes{}",
                        result.path.display(),
                        result.elements_count,
                        result.original_size,
                        result.new_size,
                        if result.written { "" } else { " (not written)" }
                    );
                }
            }
        }
    }

    /// Process every candidate file under `root`
    pub async fn process_directory(&self, root: &Path) -> Result<StatsSnapshot> {
        self.process_directory_with_progress(root, |_, _| {}).await
    }

    /// Process every candidate file under `root`, calling `progress(done, total)`
    /// after each file
    pub async fn process_directory_with_progress<F>(&self, root: &Path, progress: F) -> Result<StatsSnapshot>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let options = WalkOptions {
            recursive: self.config.recursive,
            skip_dirs: Some(&self.config.skip_dirs),
            file_patterns: &self.config.file_patterns,
        };
        let files = FileManager::collect_files(root, &options)?;
        let total = files.len();
        debug!("Found {} files under {}", total, root.display());

        let done = AtomicUsize::new(0);
        let progress = &progress;
        let done = &done;

        stream::iter(files)
            .map(|path| async move {
                self.run_file(&path).await;
                let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
                progress(completed, total);
            })
            .buffer_unordered(self.config.max_workers.max(1))
            .collect::<Vec<()>>()
            .await;

        let mut snapshot = self.stats.snapshot();
        snapshot.cancelled = self.is_cancelled();
        Ok(snapshot)
    }
}
