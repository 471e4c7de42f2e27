/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use code_translator::file_utils::{FileManager, WalkOptions};
use crate::common;

fn relative_names(root: &std::path::Path, files: &[std::path::PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

#[test]
fn test_collect_files_withSkipDirs_shouldPruneThem() -> Result<()> {
    let tree = common::create_sample_tree()?;
    let skip: HashSet<String> = ["node_modules".to_string()].into_iter().collect();
    let options = WalkOptions {
        recursive: true,
        skip_dirs: Some(&skip),
        ..Default::default()
    };

    let files = FileManager::collect_files(tree.path(), &options)?;

    assert_eq!(
        relative_names(tree.path(), &files),
        vec!["README.md", "app/loader.py", "app/math.rs", "assets/logo.png", "web/add.js"]
    );
    Ok(())
}

#[test]
fn test_collect_files_withoutRecursion_shouldStayAtTopLevel() -> Result<()> {
    let tree = common::create_sample_tree()?;
    let options = WalkOptions {
        recursive: false,
        ..Default::default()
    };

    let files = FileManager::collect_files(tree.path(), &options)?;
    assert_eq!(relative_names(tree.path(), &files), vec!["README.md"]);
    Ok(())
}

#[test]
fn test_collect_files_withPatterns_shouldFilterRelativePaths() -> Result<()> {
    let tree = common::create_sample_tree()?;
    let patterns = vec!["app/*.py".to_string()];
    let options = WalkOptions {
        recursive: true,
        skip_dirs: None,
        file_patterns: &patterns,
    };

    let files = FileManager::collect_files(tree.path(), &options)?;
    assert_eq!(relative_names(tree.path(), &files), vec!["app/loader.py"]);
    Ok(())
}

#[test]
fn test_collect_files_withFileRoot_shouldReturnIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "one.py", "# 一\n")?;
    let files = FileManager::collect_files(&file, &WalkOptions::default())?;
    assert_eq!(files, vec![file]);
    Ok(())
}

#[test]
fn test_write_atomic_shouldReplaceContentAndLeaveNoTempFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "a.py", "# 旧\n")?;

    FileManager::write_atomic(&path, "# new\n")?;

    assert_eq!(fs::read_to_string(&path)?, "# new\n");
    assert_eq!(fs::read_dir(temp_dir.path())?.count(), 1);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_write_atomic_shouldKeepPermissions() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "run.py", "#!/usr/bin/env python\n# 脚本\n")?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;

    FileManager::write_atomic(&path, "#!/usr/bin/env python\n# script\n")?;

    assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o755);
    Ok(())
}
