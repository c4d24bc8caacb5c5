//! Saving a converted book to disk
//!
//! The response body is written to a temporary file inside the destination
//! directory and then persisted under its final name, so a half-written book
//! never shows up under that name.

use bytes::Bytes;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::disposition::DEFAULT_FILENAME;
use super::types::DownloadedFile;

#[derive(Debug, Clone)]
pub struct DownloadTarget {
    dir: PathBuf,
}

impl DownloadTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` as `file_name` inside the target directory, replacing any existing file
    pub async fn save(&self, file_name: &str, data: Bytes) -> Result<DownloadedFile, String> {
        let file_name = safe_file_name(file_name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| format!("Failed to create directory: {}", e))?;

        let dir = self.dir.clone();
        let destination = self.dir.join(&file_name);
        let final_path = destination.clone();
        let bytes = data.len() as u64;

        tokio::task::spawn_blocking(move || -> Result<(), String> {
            let mut temp = NamedTempFile::new_in(&dir)
                .map_err(|e| format!("Failed to create temp file: {}", e))?;
            temp.write_all(&data)
                .map_err(|e| format!("Failed to write download: {}", e))?;
            temp.flush()
                .map_err(|e| format!("Failed to flush download: {}", e))?;
            temp.persist(&destination)
                .map_err(|e| format!("Failed to save download: {}", e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| format!("Download writer panicked: {}", e))??;

        debug!(
            "download_saved: {} bytes={}",
            final_path.display(),
            bytes
        );

        Ok(DownloadedFile {
            file_name,
            path: final_path,
            bytes,
        })
    }
}

/// Last path component of a server-supplied name; both `/` and `\` count as separators
pub fn safe_file_name(name: &str) -> String {
    let candidate = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let candidate: String = candidate.chars().filter(|c| !c.is_control()).collect();

    if candidate.is_empty() || candidate == "." || candidate == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        candidate
    }
}
