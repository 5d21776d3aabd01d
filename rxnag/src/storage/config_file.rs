//! File-backed config storage
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous config intact.

use super::Storage;
use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Stores the config as a single file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the config file, used to resolve relative paths
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Vec<u8>> {
        let data = fs::read(&self.path)?;
        tracing::debug!("Read config: {:?} ({} bytes)", self.path, data.len());
        Ok(data)
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Wrote config: {:?} ({} bytes)", self.path, data.len());

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
