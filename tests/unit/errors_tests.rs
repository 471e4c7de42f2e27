/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use code_translator::errors::{ProcessError, ProviderError, ReconstructError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 404,
        message: "model not found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("404"));
    assert!(display.contains("model not found"));
}

#[test]
fn test_translationError_fromProviderError_shouldWrap() {
    let error: TranslationError = ProviderError::ConnectionError("refused".to_string()).into();
    assert!(matches!(error, TranslationError::Provider(_)));
    assert!(error.to_string().contains("refused"));
}

#[test]
fn test_processError_shouldStartWithPath() {
    let error = ProcessError::TooLarge {
        path: PathBuf::from("src/big.py"),
        size: 2048,
        limit: 1024,
    };
    assert!(error.to_string().starts_with("src/big.py"));

    let error = ProcessError::Reconstruct {
        path: PathBuf::from("a.rs"),
        source: ReconstructError::Overlap { first: 1, second: 1 },
    };
    assert!(error.to_string().contains("Overlapping elements"));
}

#[test]
fn test_processError_translationFailed_shouldExposeSource() {
    use std::error::Error;

    let error = ProcessError::TranslationFailed {
        path: PathBuf::from("a.py"),
        line: 3,
        source: TranslationError::EmptyResponse("你好".to_string()),
    };
    assert!(error.source().is_some());
    assert!(error.to_string().contains("line 3"));
}
