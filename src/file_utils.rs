use anyhow::{Context, Result, anyhow};
use glob::Pattern;
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

// @module: File and directory utilities

/// Options for collecting candidate files
#[derive(Debug, Clone, Default)]
pub struct WalkOptions<'a> {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Directory names that are pruned before descending
    pub skip_dirs: Option<&'a HashSet<String>>,
    /// When non-empty, only files whose root-relative path matches one are kept
    pub file_patterns: &'a [String],
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Lower-cased extension without the dot
    pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Collect the regular files under `root` in a stable order.
    ///
    /// Skipped directories are pruned, never entered. A `root` that is a file
    /// is returned on its own.
    pub fn collect_files<P: AsRef<Path>>(root: P, options: &WalkOptions<'_>) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if Self::file_exists(root) {
            return Ok(vec![root.to_path_buf()]);
        }
        if !Self::dir_exists(root) {
            return Err(anyhow!("Path does not exist or is not a directory: {:?}", root));
        }

        let patterns = options
            .file_patterns
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid file pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;

        let max_depth = if options.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_pruned(entry, options.skip_dirs));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if !patterns.is_empty() {
                let relative = path.strip_prefix(root).unwrap_or(&path);
                if !patterns.iter().any(|p| p.matches_path(relative)) {
                    continue;
                }
            }
            files.push(path);
        }

        Ok(files)
    }

    fn is_pruned(entry: &DirEntry, skip_dirs: Option<&HashSet<String>>) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        match (skip_dirs, entry.file_name().to_str()) {
            (Some(skip), Some(name)) => skip.contains(name),
            _ => false,
        }
    }

    /// Replace the file at `path` with `content` atomically.
    ///
    /// The content goes to a temporary file in the same directory, which takes
    /// over the original permissions and is then renamed over the original.
    /// On failure the original is left untouched.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file().set_permissions(metadata.permissions())?;
        }
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
