/*!
 * Error types for the code-translator application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Per-file errors never abort a run; they are recorded by the processor and
 * reported at the end.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors raised by a translation engine
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The engine answered with nothing usable
    #[error("Empty translation returned for '{0}'")]
    EmptyResponse(String),

    /// Any other engine-side failure
    #[error("Translation engine failure: {0}")]
    Engine(String),
}

/// Errors produced while rebuilding a file from translated elements
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReconstructError {
    /// The element no longer matches the content it was extracted from
    #[error("Element anchor mismatch at line {line}: expected '{expected}'")]
    AnchorMismatch {
        /// Zero-based line of the element
        line: usize,
        /// Text the element expected to find
        expected: String,
    },

    /// Two elements claim overlapping bytes
    #[error("Overlapping elements at lines {first} and {second}")]
    Overlap {
        /// Start line of the earlier element
        first: usize,
        /// Start line of the later element
        second: usize,
    },

    /// An element points outside the content
    #[error("Element span {start}..{end} is outside the content ({len} bytes)")]
    OutOfRange {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
        /// Content length
        len: usize,
    },
}

/// Errors for a single file task
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The file could not be stat'ed, read or decoded as UTF-8
    #[error("{path}: unreadable ({reason})")]
    Unreadable { path: PathBuf, reason: String },

    /// No registered language, or a denylisted extension
    #[error("{path}: unsupported file type")]
    Unsupported { path: PathBuf },

    /// File larger than the configured ceiling
    #[error("{path}: file too large ({size} bytes > {limit} bytes)")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// An element could not be translated
    #[error("{path}: translation failed at line {line}: {source}")]
    TranslationFailed {
        path: PathBuf,
        line: usize,
        #[source]
        source: TranslationError,
    },

    /// The rewritten content could not be persisted
    #[error("{path}: failed to write ({reason})")]
    WriteFailed { path: PathBuf, reason: String },

    /// The file could not be rebuilt safely
    #[error("{path}: {source}")]
    Reconstruct {
        path: PathBuf,
        #[source]
        source: ReconstructError,
    },
}
