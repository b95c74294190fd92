//! A sandboxed virtual filesystem rooted at a single storage directory.
//!
//! Every operation takes a *logical* path, a `/`-rooted string supplied by a
//! client, and resolves it against the configured root before touching the
//! disk. Resolution is strictly lexical: `.` and `..` are collapsed, and any
//! path that would climb above the root is rejected. No component of the
//! workspace constructs absolute paths from user input by any other route.
//!
//! # Capabilities
//!
//! - **Directory service**: list (sorted, directories first, natural name
//!   order), stat, mkdir, recursive delete, move, recursive copy, text read,
//!   file creation with an atomic temp-write-rename publish.
//! - **Chunk scratch store**: per-directory `.upload-temp` areas holding
//!   `<fingerprint>.<index>` chunk files for resumable uploads.
//! - **Archive streaming**: on-the-fly ZIP synthesis of files and directory
//!   trees with bounded buffering; dropping the consumer aborts the producer.
//! - **Self-healing**: abandoned scratch chunks are swept at startup.
//!
//! # Example
//!
//! ```rust
//! use fhub_vfs::Vfs;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fhub_vfs::VfsError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let vfs = Vfs::builder().root(&root).create(true).connect().await?;
//!
//!     vfs.create_file("/notes/todo.txt", b"ship it").await?;
//!     let (content, _, _) = vfs.read_text("/notes/todo.txt").await?;
//!     assert_eq!(content, "ship it");
//!     Ok(())
//! }
//! ```

mod archive;
mod builder;
mod engine;
mod error;
mod maintenance;
mod scratch;
mod security;
mod sort;

pub use archive::{ArchiveItem, stream_archive};
pub use builder::VfsBuilder;
pub use engine::{RawEntry, Vfs, sort_entries};
pub use error::{VfsError, VfsResult};
pub use scratch::validate_fingerprint;
pub use security::encode_segments;
