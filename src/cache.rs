use crate::error::{Error, Result};
use crate::models::MovieSummary;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Single-slot fallback store for the last successfully fetched result
/// list. Last write wins; readers get the whole slot or nothing.
pub trait ResultCache: Send + Sync {
    fn write(&self, movies: &[MovieSummary]) -> Result<()>;
    fn read(&self) -> Option<Vec<MovieSummary>>;
}

/// File-backed slot. Writes go to a temp file first and are renamed into
/// place so a crash mid-write never leaves a corrupt slot.
pub struct JsonCache {
    file_path: PathBuf,
}

impl JsonCache {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

impl ResultCache for JsonCache {
    fn write(&self, movies: &[MovieSummary]) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(movies)
            .map_err(|e| Error::Store(format!("failed to serialize cache slot: {e}")))?;
        let tmp_path = self.file_path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.file_path)?;
        debug!(path = ?self.file_path, count = movies.len(), "cache slot written");
        Ok(())
    }

    fn read(&self) -> Option<Vec<MovieSummary>> {
        let contents = match fs::read_to_string(&self.file_path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = ?self.file_path, "cache slot unreadable: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(movies) => Some(movies),
            Err(e) => {
                debug!(path = ?self.file_path, "cache slot corrupt: {}", e);
                None
            }
        }
    }
}
