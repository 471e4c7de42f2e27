/*!
 * Common test utilities for the code-translator test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use code_translator::processor::{FileProcessor, ProcessorConfig};
use code_translator::translation::MockEngine;

/// Route `log` output through the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file, and any missing parent directories, under `dir`
pub fn create_test_file(dir: &Path, relative_path: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Python module with a docstring, a line comment and a string literal
pub const PYTHON_SAMPLE: &str = "\"\"\"数据处理模块\"\"\"\n\ndef load(path):\n    # 读取文件\n    return open(path).read()  # 返回内容\n\nMESSAGE = \"加载完成\"\n";

/// Rust file with a doc comment and a block comment
pub const RUST_SAMPLE: &str = "/// 计算总和\nfn sum(a: i32, b: i32) -> i32 {\n    /* 简单加法 */\n    a + b\n}\n";

/// JavaScript file without any foreign text
pub const ENGLISH_SAMPLE: &str = "// Adds two numbers\nfunction add(a, b) {\n  return a + b; /* plain */\n}\n";

/// Dictionary used by the mock engine in most tests
pub fn sample_dictionary() -> Vec<(&'static str, &'static str)> {
    vec![
        ("数据处理模块", "Data processing module"),
        ("读取文件", "Read the file"),
        ("返回内容", "Return the content"),
        ("加载完成", "Loading finished"),
        ("计算总和", "Compute the sum"),
        ("简单加法", "Simple addition"),
    ]
}

/// Mock engine that knows the sample texts
pub fn dictionary_engine() -> MockEngine {
    MockEngine::working().with_dictionary(sample_dictionary())
}

/// Lays out a small mixed source tree and returns its root
pub fn create_sample_tree() -> Result<TempDir> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "app/loader.py", PYTHON_SAMPLE)?;
    create_test_file(dir.path(), "app/math.rs", RUST_SAMPLE)?;
    create_test_file(dir.path(), "web/add.js", ENGLISH_SAMPLE)?;
    create_test_file(dir.path(), "README.md", "# 说明\n")?;
    create_test_file(dir.path(), "assets/logo.png", "\u{89}PNG")?;
    create_test_file(dir.path(), "node_modules/dep/index.js", "// 依赖\n")?;
    Ok(dir)
}

/// Processor with default settings and the given engine
pub fn processor_with(engine: MockEngine, config: ProcessorConfig) -> FileProcessor {
    FileProcessor::new(config, Arc::new(engine))
}

/// Snapshot of every file under `root`, for before/after comparisons
pub fn read_tree(root: &Path) -> Result<Vec<(PathBuf, Vec<u8>)>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push((entry.path().to_path_buf(), fs::read(entry.path())?));
        }
    }
    Ok(files)
}
