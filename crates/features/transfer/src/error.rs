use fhub_kernel::prelude::ApiError;
use fhub_vfs::VfsError;

/// A specialized error enum for the upload feature.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Malformed upload input (bad fingerprint, index out of range, …).
    #[error("{0}")]
    BadRequest(String),

    /// I/O failure while concatenating chunks into the final file.
    /// Remaining chunks stay on disk so the client can retry.
    #[error("assembly failed for upload {fingerprint}: {source}")]
    Assembly {
        fingerprint: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::BadRequest(msg) => Self::BadRequest(msg.into()),
            TransferError::Assembly { fingerprint, source } => {
                Self::AssemblyFailed(format!("upload {fingerprint}: {source}").into())
            },
            TransferError::Vfs(VfsError::InvalidName(name)) => {
                Self::BadRequest(format!("invalid upload fingerprint: {name}").into())
            },
            TransferError::Vfs(inner) => inner.into(),
        }
    }
}
