//! # KN Table Cache
//!
//! Caller-owned cache of parsed KN workbooks keyed by file path. Each entry
//! remembers the file's modification time; a lookup whose file has a
//! different modification time reloads it, so an edited table is never
//! served stale.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stability_core::gz::KnTableCache;
//!
//! let mut cache = KnTableCache::new();
//! let workbook = cache.get_or_load(Path::new("kn_tables.json"))?;
//! let row = workbook.row_for(9500.0, 0.0);
//! # Ok::<(), stability_core::StabilityError>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info};

use super::kn_table::KnWorkbook;
use crate::errors::{StabResult, StabilityError};

/// Read and parse a JSON KN workbook.
pub fn load_kn_workbook(path: &Path) -> StabResult<KnWorkbook> {
    let json = fs::read_to_string(path).map_err(|e| StabilityError::file_error("read", path.display().to_string(), e.to_string()))?;
    let workbook = KnWorkbook::from_json(&json)?;
    info!(
        path = %path.display(),
        sheets = workbook.sheets.len(),
        "loaded KN tables"
    );
    Ok(workbook)
}

#[derive(Debug)]
struct CachedWorkbook {
    modified: SystemTime,
    workbook: Arc<KnWorkbook>,
}

/// Parsed KN workbooks keyed by path and modification time.
#[derive(Debug, Default)]
pub struct KnTableCache {
    entries: HashMap<PathBuf, CachedWorkbook>,
}

impl KnTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached workbook, loading it when absent or changed on disk.
    pub fn get_or_load(&mut self, path: &Path) -> StabResult<Arc<KnWorkbook>> {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| StabilityError::file_error("stat", path.display().to_string(), e.to_string()))?;

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                return Ok(Arc::clone(&entry.workbook));
            }
            debug!(path = %path.display(), "KN tables changed on disk, reloading");
        }

        let workbook = Arc::new(load_kn_workbook(path)?);
        self.entries.insert(
            path.to_path_buf(),
            CachedWorkbook {
                modified,
                workbook: Arc::clone(&workbook),
            },
        );
        Ok(workbook)
    }

    /// Drop one entry. Returns true if it was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
