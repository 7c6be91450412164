//! Input discovery for measurement files
//!
//! Inputs may be files, directories (walked recursively for measurement
//! extensions) or glob patterns. The result is sorted and deduplicated so
//! every run visits files in the same order.

use crate::constants::{
    COMPOSITE_FILE_SUFFIX, INVENTORY_FILE_NAME, MEASUREMENT_EXTENSIONS, SUMMARY_FILE_NAME,
};
use crate::error::{InventoryError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery for inventory runs
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    pattern: Option<glob::Pattern>,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep directory entries whose file name matches `pattern`
    pub fn with_pattern(mut self, pattern: Option<&str>) -> Result<Self> {
        self.pattern = pattern.map(compile_pattern).transpose()?;
        Ok(self)
    }

    /// Resolve inputs into a sorted list of measurement files
    pub fn discover(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_file() {
                files.push(input.clone());
            } else if input.is_dir() {
                files.extend(self.walk(input));
            } else {
                files.extend(expand_glob(input)?);
            }
        }

        files.sort();
        files.dedup();
        debug!("Discovered {} measurement files", files.len());
        Ok(files)
    }

    fn walk(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_measurement_file(path) && !is_generated_output(path))
            .filter(|path| self.matches_pattern(path))
            .collect()
    }

    fn matches_pattern(&self, path: &Path) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        path.file_name()
            .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    }
}

fn compile_pattern(pattern: &str) -> Result<glob::Pattern> {
    glob::Pattern::new(pattern).map_err(|e| InventoryError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Files matching a glob pattern; no match at all is an error
fn expand_glob(input: &Path) -> Result<Vec<PathBuf>> {
    let pattern = input.to_string_lossy();
    let paths = glob::glob(&pattern).map_err(|e| InventoryError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let files: Vec<PathBuf> = paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    if files.is_empty() {
        return Err(InventoryError::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    Ok(files)
}

fn is_measurement_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_ascii_lowercase();
        MEASUREMENT_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Tables written by earlier runs into an input directory
fn is_generated_output(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    name == INVENTORY_FILE_NAME
        || name == SUMMARY_FILE_NAME
        || stem.ends_with(COMPOSITE_FILE_SUFFIX)
}
