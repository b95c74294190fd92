use fhub_kernel::prelude::ApiError;
use fhub_vfs::VfsError;

/// A specialized error enum for the browse feature.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("{0}")]
    BadRequest(String),

    #[error("listing accelerator client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl From<BrowseError> for ApiError {
    fn from(err: BrowseError) -> Self {
        match err {
            BrowseError::BadRequest(msg) => Self::BadRequest(msg.into()),
            BrowseError::Client(e) => Self::Internal(e.to_string().into()),
            BrowseError::Vfs(inner) => inner.into(),
        }
    }
}
