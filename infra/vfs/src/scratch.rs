//! Per-directory scratch store for resumable upload chunks.
//!
//! Chunks for an upload fingerprinted `F` targeting directory `D` live at
//! `D/.upload-temp/F.<index>`. Chunk writes are idempotent by index; the
//! scratch directory is removed as soon as it holds nothing.

use crate::engine::Vfs;
use crate::error::{VfsError, VfsResult};
use fhub_domain::constants::SCRATCH_DIR;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const MAX_FINGERPRINT_LEN: usize = 128;

/// Validates a client-supplied upload fingerprint before it becomes part of a
/// filename. Accepts `[A-Za-z0-9_.-]{1,128}`; anything else is rejected.
pub fn validate_fingerprint(fingerprint: &str) -> VfsResult<&str> {
    let ok = !fingerprint.is_empty()
        && fingerprint.len() <= MAX_FINGERPRINT_LEN
        && fingerprint
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if ok { Ok(fingerprint) } else { Err(VfsError::InvalidName(fingerprint.to_owned())) }
}

impl Vfs {
    /// `<dir>/.upload-temp`
    #[must_use]
    pub fn scratch_dir(&self, dir: &Path) -> PathBuf {
        dir.join(SCRATCH_DIR)
    }

    /// `<dir>/.upload-temp/<fingerprint>.<index>`
    #[must_use]
    pub fn chunk_path(&self, dir: &Path, fingerprint: &str, index: u32) -> PathBuf {
        self.scratch_dir(dir).join(format!("{fingerprint}.{index}"))
    }

    /// Persists one chunk, creating the target and scratch directories as
    /// needed. Overwrites are permitted: a retried chunk is byte-identical.
    ///
    /// The chunk is staged under a `.part` name and renamed into place, so a
    /// concurrent completeness check never counts a half-written chunk.
    pub async fn write_chunk(
        &self,
        dir: &Path,
        fingerprint: &str,
        index: u32,
        bytes: &[u8],
    ) -> VfsResult<()> {
        let scratch = self.scratch_dir(dir);
        fs::create_dir_all(&scratch).await?;

        let path = self.chunk_path(dir, fingerprint, index);
        let staging = scratch.join(format!("{fingerprint}.{index}.part"));
        {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
        }
        match fs::rename(&staging, &path).await {
            Ok(()) => {},
            // A concurrent retry of the same chunk already published it.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && path.exists() => {},
            Err(err) => {
                let _ = fs::remove_file(&staging).await;
                return Err(err.into());
            },
        }

        debug!(fingerprint, index, bytes = bytes.len(), "Chunk persisted");
        Ok(())
    }

    /// Sorted indices of the chunks currently on disk for a fingerprint.
    /// Returns an empty list when the scratch directory does not exist.
    pub async fn chunk_indices(&self, dir: &Path, fingerprint: &str) -> VfsResult<Vec<u32>> {
        let scratch = self.scratch_dir(dir);
        let mut reader = match fs::read_dir(&scratch).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{fingerprint}.");
        let mut indices = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(suffix) = name.strip_prefix(&prefix) else { continue };
            // Drop anything whose trailing component is not a bare integer.
            if let Ok(index) = suffix.parse::<u32>() {
                indices.push(index);
            }
        }

        indices.sort_unstable();
        Ok(indices)
    }

    /// Reads one chunk's bytes.
    pub async fn read_chunk(&self, dir: &Path, fingerprint: &str, index: u32) -> VfsResult<Vec<u8>> {
        let path = self.chunk_path(dir, fingerprint, index);
        Ok(fs::read(&path).await?)
    }

    /// Removes one chunk. Missing chunks are not an error.
    pub async fn delete_chunk(&self, dir: &Path, fingerprint: &str, index: u32) -> VfsResult<()> {
        let path = self.chunk_path(dir, fingerprint, index);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every chunk belonging to a fingerprint, then the scratch
    /// directory itself if nothing else is in flight there.
    pub async fn purge_chunks(&self, dir: &Path, fingerprint: &str) -> VfsResult<()> {
        for index in self.chunk_indices(dir, fingerprint).await? {
            self.delete_chunk(dir, fingerprint, index).await?;
        }

        // Only succeeds when empty; other uploads keep the directory alive.
        let _ = fs::remove_dir(self.scratch_dir(dir)).await;
        Ok(())
    }
}
