//! The resumable upload state machine.
//!
//! There is no durable session record: the chunk files on disk *are* the
//! state. Each chunk POST writes its chunk, counts what is present, and, if
//! it finds the set complete, races for the per-(directory, fingerprint)
//! assembly lock. Exactly one handler assembles; the others report progress
//! or observe the finished file.

use crate::error::TransferError;
use fhub_vfs::{Vfs, validate_fingerprint};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Result of accepting one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Chunk stored; more are needed.
    Progress { received: u32, total: u32 },
    /// This chunk completed the set and the file is fully published.
    Completed { file_name: String },
    /// The final file already exists and `replace` was not requested.
    /// Scratch has been purged.
    Conflict { file_name: String },
}

/// Resumable-state snapshot for a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStatus {
    pub uploaded_chunks: Vec<u32>,
    pub can_resume: bool,
}

/// One chunk POST, pre-validated by [`Transfer::put_chunk`].
#[derive(Debug)]
pub struct PutChunk<'a> {
    pub fingerprint: &'a str,
    pub file_name: &'a str,
    /// Logical path of the directory the file lands in.
    pub target_dir: &'a str,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub bytes: &'a [u8],
    pub replace: bool,
}

/// Upload feature state: the per-(directory, fingerprint) assembly locks.
///
/// Entries are created on demand and evicted once an assembly or cancel
/// settles the upload, so the map stays proportional to in-flight uploads.
#[derive(Debug, Default)]
pub struct Transfer {
    locks: Mutex<FxHashMap<(PathBuf, String), Arc<tokio::sync::Mutex<()>>>>,
}

impl Transfer {
    /// Reports which chunk indices are already on disk for a fingerprint.
    ///
    /// A missing scratch directory simply means nothing was uploaded yet.
    pub async fn status(
        &self,
        vfs: &Vfs,
        fingerprint: &str,
        target_dir: &str,
    ) -> Result<UploadStatus, TransferError> {
        validate_fingerprint(fingerprint)?;
        let dir = vfs.resolve(target_dir)?;

        let uploaded_chunks = vfs.chunk_indices(&dir, fingerprint).await?;
        let can_resume = !uploaded_chunks.is_empty();
        Ok(UploadStatus { uploaded_chunks, can_resume })
    }

    /// Counts how many of the required indices `0..total` are on disk.
    async fn received_of(
        vfs: &Vfs,
        dir: &Path,
        fingerprint: &str,
        total: u32,
    ) -> Result<u32, TransferError> {
        let present: BTreeSet<u32> =
            vfs.chunk_indices(dir, fingerprint).await?.into_iter().collect();
        Ok((0..total).filter(|i| present.contains(i)).count() as u32)
    }

    /// Accepts one chunk and drives the upload toward completion.
    ///
    /// See the module docs for the concurrency story; the observable contract
    /// is that [`Outcome::Completed`] is returned only once the final file is
    /// fully readable under its published name.
    pub async fn put_chunk(
        &self,
        vfs: &Vfs,
        req: PutChunk<'_>,
    ) -> Result<Outcome, TransferError> {
        validate_fingerprint(req.fingerprint)?;
        validate_file_name(req.file_name)?;
        if req.total_chunks == 0 {
            return Err(TransferError::BadRequest("totalChunks must be at least 1".into()));
        }
        if req.chunk_index >= req.total_chunks {
            return Err(TransferError::BadRequest(format!(
                "chunkIndex {} out of range for {} chunks",
                req.chunk_index, req.total_chunks
            )));
        }

        let dir = vfs.resolve(req.target_dir)?;
        fs::create_dir_all(&dir).await.map_err(TransferError::from_io)?;

        if let Err(err) = vfs.write_chunk(&dir, req.fingerprint, req.chunk_index, req.bytes).await
        {
            warn!(
                fingerprint = req.fingerprint,
                chunk_index = req.chunk_index,
                error = %err,
                "Chunk write failed"
            );
            return Err(err.into());
        }

        let received = Self::received_of(vfs, &dir, req.fingerprint, req.total_chunks).await?;
        if received < req.total_chunks {
            return Ok(Outcome::Progress { received, total: req.total_chunks });
        }

        // All indices look present; race for the assembly lock.
        let key = (dir.clone(), req.fingerprint.to_owned());
        let lock = Arc::clone(
            self.locks.lock().entry(key.clone()).or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        );

        let Ok(_guard) = lock.try_lock() else {
            // Another handler is assembling right now.
            return Ok(Outcome::Progress { received: req.total_chunks, total: req.total_chunks });
        };

        let outcome = assemble(vfs, &dir, &req).await;
        if !matches!(outcome, Ok(Outcome::Progress { .. })) {
            self.locks.lock().remove(&key);
        }
        outcome
    }

    /// Best-effort purge of all scratch state for a fingerprint.
    pub async fn cancel(
        &self,
        vfs: &Vfs,
        fingerprint: &str,
        target_dir: &str,
    ) -> Result<(), TransferError> {
        validate_fingerprint(fingerprint)?;
        let dir = vfs.resolve(target_dir)?;

        if let Err(err) = vfs.purge_chunks(&dir, fingerprint).await {
            // Cancel never fails loudly on missing or half-gone state.
            debug!(fingerprint, error = %err, "Upload cancel purge was incomplete");
        }
        self.locks.lock().remove(&(dir, fingerprint.to_owned()));

        info!(fingerprint, "Upload cancelled");
        Ok(())
    }

}

/// Runs under the assembly lock: re-check state, handle conflicts, then
/// concatenate chunks into a temp file and atomically publish it.
async fn assemble(vfs: &Vfs, dir: &Path, req: &PutChunk<'_>) -> Result<Outcome, TransferError> {
    let final_path = dir.join(req.file_name);

    // State may have moved while we waited for the lock.
    let received = Transfer::received_of(vfs, dir, req.fingerprint, req.total_chunks).await?;
    if received < req.total_chunks {
        if received == 0 && fs::metadata(&final_path).await.is_ok() {
            // A concurrent handler already assembled; idempotent success.
            return Ok(Outcome::Completed { file_name: req.file_name.to_owned() });
        }
        return Ok(Outcome::Progress { received, total: req.total_chunks });
    }

    if fs::metadata(&final_path).await.is_ok() {
        if req.replace {
            fs::remove_file(&final_path).await.map_err(TransferError::from_io)?;
        } else {
            // Leaving scratch behind would strand disk space forever.
            vfs.purge_chunks(dir, req.fingerprint).await?;
            info!(fingerprint = req.fingerprint, file = req.file_name, "Upload conflict");
            return Ok(Outcome::Conflict { file_name: req.file_name.to_owned() });
        }
    }

    let tmp = vfs.scratch_dir(dir).join(format!("{}.assembling", req.fingerprint));
    if let Err(source) = concatenate(vfs, dir, req, &tmp).await {
        let _ = fs::remove_file(&tmp).await;
        warn!(
            fingerprint = req.fingerprint,
            chunk_index = req.chunk_index,
            error = %source,
            "Upload assembly failed; chunks preserved for retry"
        );
        return Err(TransferError::Assembly { fingerprint: req.fingerprint.to_owned(), source });
    }

    if let Err(source) = fs::rename(&tmp, &final_path).await {
        let _ = fs::remove_file(&tmp).await;
        warn!(
            fingerprint = req.fingerprint,
            chunk_index = req.chunk_index,
            error = %source,
            "Publishing assembled upload failed"
        );
        return Err(TransferError::Assembly { fingerprint: req.fingerprint.to_owned(), source });
    }

    // Drop any stale chunks from earlier attempts and the scratch dir.
    vfs.purge_chunks(dir, req.fingerprint).await?;

    info!(
        fingerprint = req.fingerprint,
        file = req.file_name,
        chunks = req.total_chunks,
        "Upload assembled"
    );
    Ok(Outcome::Completed { file_name: req.file_name.to_owned() })
}

/// Appends chunks `0..total` in order, unlinking each one once written.
async fn concatenate(
    vfs: &Vfs,
    dir: &Path,
    req: &PutChunk<'_>,
    tmp: &Path,
) -> std::io::Result<()> {
    let mut writer = fs::File::create(tmp).await?;

    for index in 0..req.total_chunks {
        let bytes = vfs
            .read_chunk(dir, req.fingerprint, index)
            .await
            .map_err(std::io::Error::other)?;
        writer.write_all(&bytes).await?;
        vfs.delete_chunk(dir, req.fingerprint, index)
            .await
            .map_err(std::io::Error::other)?;
    }

    writer.sync_all().await?;
    Ok(())
}

impl TransferError {
    fn from_io(source: std::io::Error) -> Self {
        Self::Vfs(source.into())
    }
}

/// Final file names are single path segments.
fn validate_file_name(name: &str) -> Result<(), TransferError> {
    let ok = !name.is_empty()
        && name.len() <= 255
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);

    if ok {
        Ok(())
    } else {
        Err(TransferError::BadRequest(format!("invalid file name: {name:?}")))
    }
}
