//! On-the-fly ZIP synthesis for directory and multi-item downloads.
//!
//! The producer runs as its own task and writes through a bounded in-memory
//! pipe; the HTTP response consumes the other end as a byte stream. The pipe
//! gives backpressure for free, and a dropped consumer (client disconnect)
//! fails the producer's next write, which aborts the archive and releases any
//! open file handles.

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use futures_util::io::AsyncWriteExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWrite, DuplexStream};
use tokio_util::io::ReaderStream;
use tracing::warn;

/// Pipe capacity between the archive producer and the HTTP consumer.
const PIPE_CAPACITY: usize = 256 * 1024;
/// Read buffer for spooling file content into the archive.
const COPY_BUF: usize = 64 * 1024;

/// One archive input: a display name and the resolved path behind it.
///
/// Files are added under `name`; directories are walked recursively and their
/// files added under `name/<relative path>`.
#[derive(Debug, Clone)]
pub struct ArchiveItem {
    pub name: String,
    pub path: PathBuf,
}

/// Streams a deflate-compressed ZIP of the given items.
///
/// Errors while archiving (missing file, I/O failure) abort the stream; bytes
/// already delivered stay delivered. There is no retry protocol.
#[must_use]
pub fn stream_archive(items: Vec<ArchiveItem>) -> ReaderStream<DuplexStream> {
    let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);

    tokio::spawn(async move {
        if let Err(err) = produce(writer, items).await {
            // Covers both real archiver failures and consumer disconnects.
            warn!(error = %err, "Archive stream aborted");
        }
    });

    ReaderStream::new(reader)
}

async fn produce(writer: DuplexStream, items: Vec<ArchiveItem>) -> std::io::Result<()> {
    let mut zip = ZipFileWriter::with_tokio(writer);

    for item in items {
        let meta = tokio::fs::metadata(&item.path).await?;
        if meta.is_dir() {
            for (entry_name, path) in collect_tree(item.name, item.path).await? {
                append_file(&mut zip, entry_name, &path).await?;
            }
        } else {
            append_file(&mut zip, item.name, &item.path).await?;
        }
    }

    zip.close().await.map_err(std::io::Error::other)?;
    Ok(())
}

/// Collects `(entry name, path)` pairs for every file under `root`, entry
/// names prefixed with the item's display name and `/`-separated.
async fn collect_tree(
    prefix: String,
    root: PathBuf,
) -> std::io::Result<Vec<(String, PathBuf)>> {
    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&root) {
            let entry = entry.map_err(std::io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(&root).map_err(std::io::Error::other)?;
            let mut name = prefix.clone();
            for component in rel.components() {
                name.push('/');
                name.push_str(&component.as_os_str().to_string_lossy());
            }
            files.push((name, entry.path().to_path_buf()));
        }
        Ok(files)
    })
    .await
    .map_err(std::io::Error::other)?
}

async fn append_file<W>(
    zip: &mut ZipFileWriter<W>,
    name: String,
    path: &Path,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let entry = ZipEntryBuilder::new(name.into(), Compression::Deflate).build();
    let mut entry_writer =
        zip.write_entry_stream(entry).await.map_err(std::io::Error::other)?;

    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = vec![0u8; COPY_BUF];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        entry_writer.write_all(&buf[..n]).await?;
    }

    entry_writer.close().await.map_err(std::io::Error::other)?;
    Ok(())
}
