//! Core directory operations over the sandboxed root.
//!
//! The [`Vfs`] handle is the single entry point for every filesystem syscall
//! in the workspace. It resolves logical paths (see [`crate::security`]),
//! maps raw I/O failures onto the crate's error taxonomy, and publishes new
//! files with an atomic temp-write-rename so readers never observe partial
//! content.

use crate::builder::VfsBuilder;
use crate::error::{VfsError, VfsResult};
use crate::security;
use crate::sort::natural_cmp;
use fhub_domain::entry::EntryKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// The internal shared state of a [`Vfs`] instance.
#[derive(Debug)]
pub struct VfsInner {
    /// Canonicalized physical root all logical paths resolve under.
    pub(crate) root: PathBuf,
    /// Age threshold for the startup scratch sweep.
    pub(crate) scratch_ttl: std::time::Duration,
    /// Unique counter for temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the sandboxed filesystem.
///
/// Internally reference-counted; clone freely across tasks.
#[derive(Debug, Clone)]
pub struct Vfs {
    pub(crate) inner: Arc<VfsInner>,
}

impl Deref for Vfs {
    type Target = VfsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// A directory entry as read from disk, before any URL decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Present for files only.
    pub size: Option<u64>,
    /// Modification time in Unix milliseconds.
    pub mtime: i64,
}

impl Vfs {
    #[must_use = "The filesystem is not initialized until you call .connect()"]
    pub fn builder() -> VfsBuilder {
        VfsBuilder::new()
    }

    /// The canonicalized physical root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a logical path to a physical path strictly under the root.
    ///
    /// # Errors
    /// Returns [`VfsError::PathEscaped`] if the path climbs above the root.
    pub fn resolve(&self, logical: &str) -> VfsResult<PathBuf> {
        security::resolve_logical(&self.root, logical)
    }

    /// Reads and sorts a directory: directories first, natural name order.
    ///
    /// # Errors
    /// `NotFound` if the directory is missing, `NotADirectory` if the path
    /// names a file, `Denied` on permission failure.
    pub async fn list(&self, logical: &str) -> VfsResult<Vec<RawEntry>> {
        let dir = self.resolve(logical)?;

        let meta = fs::metadata(&dir).await.map_err(|e| VfsError::classify(e, logical))?;
        if !meta.is_dir() {
            return Err(VfsError::NotADirectory { path: logical.to_owned() });
        }

        let mut reader =
            fs::read_dir(&dir).await.map_err(|e| VfsError::classify(e, logical))?;
        let mut entries = Vec::new();

        while let Some(item) = reader.next_entry().await.map_err(VfsError::from)? {
            let Ok(name) = item.file_name().into_string() else {
                // Skip names the wire format cannot represent.
                continue;
            };
            let Ok(meta) = item.metadata().await else {
                continue;
            };
            let kind = if meta.is_dir() { EntryKind::Dir } else { EntryKind::File };
            entries.push(RawEntry {
                name,
                kind,
                size: (kind == EntryKind::File).then(|| meta.len()),
                mtime: unix_ms(meta.modified().ok()),
            });
        }

        sort_entries(&mut entries);
        Ok(entries)
    }

    /// Filesystem metadata for a logical path.
    pub async fn metadata(&self, logical: &str) -> VfsResult<std::fs::Metadata> {
        let resolved = self.resolve(logical)?;
        fs::metadata(&resolved).await.map_err(|e| VfsError::classify(e, logical))
    }

    /// True when the logical path names an existing entry.
    pub fn exists(&self, logical: &str) -> VfsResult<bool> {
        Ok(self.resolve(logical)?.exists())
    }

    /// Creates a directory (with parents).
    ///
    /// # Errors
    /// `AlreadyExists` when the target is already a directory, `Conflict`
    /// when a file sits at the path.
    pub async fn mkdir(&self, logical: &str) -> VfsResult<()> {
        let dir = self.resolve(logical)?;

        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {
                return Err(VfsError::AlreadyExists { path: logical.to_owned() });
            },
            Ok(_) => return Err(VfsError::Conflict { path: logical.to_owned() }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => return Err(VfsError::classify(e, logical)),
        }

        fs::create_dir_all(&dir).await.map_err(|e| VfsError::classify(e, logical))?;
        debug!(path = logical, "Directory created");
        Ok(())
    }

    /// Removes a file or a directory tree.
    pub async fn remove(&self, logical: &str) -> VfsResult<()> {
        let target = self.resolve(logical)?;

        let meta = fs::metadata(&target).await.map_err(|e| VfsError::classify(e, logical))?;
        if meta.is_dir() {
            fs::remove_dir_all(&target).await.map_err(|e| VfsError::classify(e, logical))?;
        } else {
            fs::remove_file(&target).await.map_err(|e| VfsError::classify(e, logical))?;
        }
        debug!(path = logical, "Entry removed");
        Ok(())
    }

    /// Moves `src` to `dst`.
    ///
    /// # Errors
    /// `NotFound` when the source is missing, `AlreadyExists` when the
    /// destination is occupied.
    pub async fn rename(&self, src: &str, dst: &str) -> VfsResult<()> {
        let from = self.resolve(src)?;
        let to = self.resolve(dst)?;

        if fs::metadata(&from).await.is_err() {
            return Err(VfsError::NotFound { path: src.to_owned() });
        }
        if fs::metadata(&to).await.is_ok() {
            return Err(VfsError::AlreadyExists { path: dst.to_owned() });
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await.map_err(|e| VfsError::classify(e, dst))?;
        }

        fs::rename(&from, &to).await.map_err(|e| VfsError::classify(e, src))?;
        debug!(from = src, to = dst, "Entry moved");
        Ok(())
    }

    /// Recursively copies `src` to `dst`, content only (no ownership/xattrs).
    pub async fn copy(&self, src: &str, dst: &str) -> VfsResult<()> {
        let from = self.resolve(src)?;
        let to = self.resolve(dst)?;

        let meta = fs::metadata(&from).await.map_err(|e| VfsError::classify(e, src))?;
        if fs::metadata(&to).await.is_ok() {
            return Err(VfsError::AlreadyExists { path: dst.to_owned() });
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await.map_err(|e| VfsError::classify(e, dst))?;
        }

        let is_dir = meta.is_dir();
        tokio::task::spawn_blocking(move || copy_tree(&from, &to, is_dir))
            .await
            .map_err(|e| VfsError::Io { source: std::io::Error::other(e) })??;

        debug!(from = src, to = dst, "Entry copied");
        Ok(())
    }

    /// Reads an entire file as UTF-8, returning `(content, size, mtime_ms)`.
    ///
    /// # Errors
    /// `IsADirectory` when the path names a directory; `NotUtf8` when the
    /// bytes do not decode.
    pub async fn read_text(&self, logical: &str) -> VfsResult<(String, u64, i64)> {
        let file = self.resolve(logical)?;

        let meta = fs::metadata(&file).await.map_err(|e| VfsError::classify(e, logical))?;
        if meta.is_dir() {
            return Err(VfsError::IsADirectory { path: logical.to_owned() });
        }

        let bytes = fs::read(&file).await.map_err(|e| VfsError::classify(e, logical))?;
        let content = String::from_utf8(bytes)
            .map_err(|_| VfsError::NotUtf8 { path: logical.to_owned() })?;
        Ok((content, meta.len(), unix_ms(meta.modified().ok())))
    }

    /// Creates a new file with the given content (empty by default) and
    /// returns `(size, mtime_ms)`.
    ///
    /// The write is published atomically: content lands in a unique temp file
    /// that is fsynced and renamed onto the final name.
    ///
    /// # Errors
    /// `AlreadyExists` when the target is present.
    pub async fn create_file(&self, logical: &str, content: &[u8]) -> VfsResult<(u64, i64)> {
        let target = self.resolve(logical)?;

        if fs::metadata(&target).await.is_ok() {
            return Err(VfsError::AlreadyExists { path: logical.to_owned() });
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| VfsError::classify(e, logical))?;
        }

        let tmp = self.unique_tmp_path(&target);
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&tmp)
                .await
                .map_err(|e| VfsError::classify(e, logical))?;
            file.write_all(content).await?;
            file.sync_all().await?;
        }
        if let Err(err) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(VfsError::classify(err, logical));
        }

        let meta = fs::metadata(&target).await.map_err(|e| VfsError::classify(e, logical))?;
        debug!(path = logical, size = meta.len(), "File created");
        Ok((meta.len(), unix_ms(meta.modified().ok())))
    }

    /// A sibling temp name that cannot collide with concurrent writers.
    pub(crate) fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("vfs");
        target.with_file_name(format!(".{file_name}.fhubtmp.{counter}"))
    }
}

/// Directories first, then files; natural case-insensitive order per group.
///
/// Public so alternate listing sources can match the local ordering exactly.
pub fn sort_entries(entries: &mut [RawEntry]) {
    entries.sort_by(|a, b| {
        b.kind
            .is_dir()
            .cmp(&a.kind.is_dir())
            .then_with(|| natural_cmp(&a.name, &b.name))
    });
}

/// Converts a modification timestamp to Unix milliseconds (0 when unknown).
#[must_use]
pub(crate) fn unix_ms(time: Option<SystemTime>) -> i64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

fn copy_tree(from: &Path, to: &Path, is_dir: bool) -> VfsResult<()> {
    if !is_dir {
        std::fs::copy(from, to)?;
        return Ok(());
    }

    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(|e| VfsError::Io { source: std::io::Error::other(e) })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| VfsError::Io { source: std::io::Error::other(e) })?;
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest)?;
        }
        // Symlinks are skipped: the copy preserves content, nothing else.
    }
    Ok(())
}
