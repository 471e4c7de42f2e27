/*!
 * End-to-end processing of source trees with a mock engine
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use code_translator::errors::{ProcessError, TranslationError};
use code_translator::processor::{FileProcessor, ProcessorConfig};
use code_translator::translation::{MockEngine, TranslationEngine};
use crate::common;

/// Engine that, on its first call, moves the target's directory aside and
/// leaves a regular file in its place so the atomic write has nowhere to go
struct DirectorySwapEngine {
    dir: PathBuf,
    moved_to: PathBuf,
    swapped: AtomicBool,
}

#[async_trait]
impl TranslationEngine for DirectorySwapEngine {
    async fn translate(&self, _text: &str, _context_hint: Option<&str>) -> Result<String, TranslationError> {
        if !self.swapped.swap(true, Ordering::SeqCst) {
            fs::rename(&self.dir, &self.moved_to).map_err(|e| TranslationError::Engine(e.to_string()))?;
            fs::write(&self.dir, "not a directory").map_err(|e| TranslationError::Engine(e.to_string()))?;
        }
        Ok("translated".to_string())
    }
}

#[tokio::test]
async fn test_process_directory_withSampleTree_shouldTranslateAndCountExactly() -> Result<()> {
    common::init_test_logging();
    let tree = common::create_sample_tree()?;
    let processor = common::processor_with(common::dictionary_engine(), ProcessorConfig::default());

    let stats = processor.process_directory(tree.path()).await?;

    assert_eq!(stats.files_scanned, 3);
    assert_eq!(stats.files_with_foreign_text, 2);
    assert_eq!(stats.files_translated, 2);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(stats.elements_translated, 5);
    assert_eq!(stats.elements_failed, 0);
    assert!(!stats.has_errors());
    assert!(!stats.cancelled);

    assert_eq!(
        fs::read_to_string(tree.path().join("app/loader.py"))?,
        "\"\"\"Data processing module\"\"\"\n\ndef load(path):\n    # Read the file\n    return open(path).read()  # Return the content\n\nMESSAGE = \"加载完成\"\n"
    );
    assert_eq!(
        fs::read_to_string(tree.path().join("app/math.rs"))?,
        "/// Compute the sum\nfn sum(a: i32, b: i32) -> i32 {\n    /* Simple addition */\n    a + b\n}\n"
    );
    // Untouched files stay byte-identical
    assert_eq!(fs::read_to_string(tree.path().join("web/add.js"))?, common::ENGLISH_SAMPLE);
    assert_eq!(fs::read_to_string(tree.path().join("node_modules/dep/index.js"))?, "// 依赖\n");
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withTranslateAll_shouldRewriteStrings() -> Result<()> {
    common::init_test_logging();
    let tree = common::create_sample_tree()?;
    let config = ProcessorConfig {
        translate_all: true,
        ..Default::default()
    };
    let processor = common::processor_with(common::dictionary_engine(), config);

    let stats = processor.process_directory(tree.path()).await?;

    assert_eq!(stats.elements_translated, 6);
    let python = fs::read_to_string(tree.path().join("app/loader.py"))?;
    assert!(python.ends_with("MESSAGE = \"Loading finished\"\n"));
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withDryRun_shouldLeaveDiskUnchanged() -> Result<()> {
    common::init_test_logging();
    let tree = common::create_sample_tree()?;
    let before = common::read_tree(tree.path())?;
    let config = ProcessorConfig {
        dry_run: true,
        translate_all: true,
        ..Default::default()
    };
    let engine = common::dictionary_engine();
    let processor = common::processor_with(engine.clone(), config);

    let stats = processor.process_directory(tree.path()).await?;

    assert_eq!(common::read_tree(tree.path())?, before);
    assert_eq!(stats.files_with_foreign_text, 2);
    assert_eq!(stats.files_translated, 0);
    assert_eq!(stats.elements_translated, 6);
    assert_eq!(engine.request_count(), 6);
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withFailingEngine_shouldKeepOriginalsAndContinue() -> Result<()> {
    common::init_test_logging();
    let tree = common::create_sample_tree()?;
    let before = common::read_tree(tree.path())?;
    let processor = common::processor_with(MockEngine::failing(), ProcessorConfig::default());

    let stats = processor.process_directory(tree.path()).await?;

    assert_eq!(common::read_tree(tree.path())?, before);
    assert_eq!(stats.elements_translated, 5);
    assert_eq!(stats.elements_failed, 5);
    assert_eq!(stats.files_translated, 0);
    assert_eq!(stats.notices.len(), 5);
    assert!(!stats.has_errors());
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withIntermittentEngine_shouldTranslateTheRest() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "notes.py", "# 一\n# 二\n# 三\n# 四\n")?;
    let processor = common::processor_with(MockEngine::intermittent(2), ProcessorConfig::default());

    let stats = processor.process_directory(temp_dir.path()).await?;

    assert_eq!(stats.elements_translated, 4);
    assert_eq!(stats.elements_failed, 2);
    assert_eq!(stats.files_translated, 1);
    assert_eq!(
        fs::read_to_string(&path)?,
        "# [TRANSLATED] 一\n# 二\n# [TRANSLATED] 三\n# 四\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withCorruptedFile_shouldRecordErrorAndContinue() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let broken = temp_dir.path().join("broken.py");
    fs::write(&broken, [0x23u8, 0x20, 0xff, 0xfe, 0x0a])?;
    let good = common::create_test_file(temp_dir.path(), "good.py", "# 你好\n")?;
    let processor = common::processor_with(MockEngine::working().with_dictionary([("你好", "hello")]), ProcessorConfig::default());

    let stats = processor.process_directory(temp_dir.path()).await?;

    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_translated, 1);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].contains("broken.py"));
    assert_eq!(fs::read(&broken)?, vec![0x23u8, 0x20, 0xff, 0xfe, 0x0a]);
    assert_eq!(fs::read_to_string(&good)?, "# hello\n");
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withOversizedFile_shouldSkipWithNotice() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "big.py", &"# 很长的注释\n".repeat(20))?;
    common::create_test_file(temp_dir.path(), "small.py", "# 短\n")?;
    let config = ProcessorConfig {
        max_file_size: 64,
        ..Default::default()
    };
    let processor = common::processor_with(MockEngine::working(), config);

    let stats = processor.process_directory(temp_dir.path()).await?;

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.notices.len(), 1);
    assert!(stats.notices[0].contains("too large"));
    assert!(!stats.has_errors());
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withMultilineDocstring_shouldKeepIndentation() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "calc.py",
        "def add(a, b):\n    \"\"\"\n    计算两个数的和\n    \"\"\"\n    return a + b\n",
    )?;
    let engine = MockEngine::working().with_dictionary([("计算两个数的和", "Add two numbers.\nReturns their sum.")]);
    let processor = common::processor_with(engine, ProcessorConfig::default());

    processor.process_directory(temp_dir.path()).await?;

    assert_eq!(
        fs::read_to_string(&path)?,
        "def add(a, b):\n    \"\"\"\n    Add two numbers.\n    Returns their sum.\n    \"\"\"\n    return a + b\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_process_directory_withMissingRoot_shouldFail() {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir().unwrap();
    let processor = common::processor_with(MockEngine::working(), ProcessorConfig::default());
    assert!(processor.process_directory(&temp_dir.path().join("missing")).await.is_err());
}

#[tokio::test]
async fn test_process_file_withFailingWrite_shouldRecordErrorAndLeaveFileUntouched() -> Result<()> {
    common::init_test_logging();
    let root = common::create_temp_dir()?;
    let original = "# 注释\nx = 1\n";
    let path = common::create_test_file(root.path(), "pkg/a.py", original)?;

    let engine = DirectorySwapEngine {
        dir: root.path().join("pkg"),
        moved_to: root.path().join("pkg.moved"),
        swapped: AtomicBool::new(false),
    };
    let processor = FileProcessor::new(ProcessorConfig::default(), Arc::new(engine));

    let result = processor.process_file(&path).await;
    assert!(matches!(result, Err(ProcessError::WriteFailed { .. })));

    let stats = processor.stats().snapshot();
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.elements_translated, 1);
    assert_eq!(stats.files_translated, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].contains("failed to write"));

    assert_eq!(fs::read_to_string(root.path().join("pkg.moved/a.py"))?, original);
    let leftovers: Vec<_> = fs::read_dir(root.path().join("pkg.moved"))?.collect();
    assert_eq!(leftovers.len(), 1);
    Ok(())
}
