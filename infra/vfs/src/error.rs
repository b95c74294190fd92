/// Errors surfaced by the virtual filesystem.
///
/// Variants deliberately mirror the failure kinds the HTTP surface maps onto
/// status codes; the `path` carried is the logical path where available so
/// messages never leak the physical root.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("path escapes the storage root: {path}")]
    PathEscaped { path: String },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    #[error("is a directory: {path}")]
    IsADirectory { path: String },

    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    #[error("entry exists with a conflicting kind: {path}")]
    Conflict { path: String },

    #[error("permission denied: {path}")]
    Denied { path: String },

    #[error("not valid UTF-8: {path}")]
    NotUtf8 { path: String },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("i/o failure: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type VfsResult<T> = Result<T, VfsError>;

impl VfsError {
    /// Maps an I/O error to a path-aware variant where the kind is telling.
    pub(crate) fn classify(err: std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path: path.to_owned() },
            std::io::ErrorKind::PermissionDenied => Self::Denied { path: path.to_owned() },
            std::io::ErrorKind::InvalidData => Self::NotUtf8 { path: path.to_owned() },
            _ => Self::Io { source: err },
        }
    }
}
