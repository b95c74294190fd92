use fhub_kernel::prelude::ApiError;
use fhub_vfs::VfsError;

/// A specialized error enum for the share feature.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share not found")]
    NotFound,

    /// The share existed but its TTL has passed; it is gone now.
    #[error("share expired")]
    Gone,

    #[error("invalid share password")]
    AuthFailed,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl From<ShareError> for ApiError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::NotFound => Self::NotFound("share".into()),
            ShareError::Gone => Self::Gone,
            ShareError::AuthFailed => Self::AuthFailed,
            ShareError::BadRequest(msg) => Self::BadRequest(msg.into()),
            ShareError::Vfs(inner) => inner.into(),
        }
    }
}
