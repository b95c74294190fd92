//! Resumable chunked upload feature slice.
//!
//! Chunks land in a hidden `.upload-temp` scratch area next to the target
//! file; the final file appears atomically once every index is present. See
//! [`coordinator`] for the state machine and its concurrency contract.

mod coordinator;
mod error;
mod routes;

pub use coordinator::{Outcome, PutChunk, Transfer, UploadStatus};
pub use error::TransferError;
pub use routes::router;

use fhub_kernel::prelude::{FeatureSlice, InitializedSlice};

impl FeatureSlice for Transfer {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initialize the upload feature.
///
/// # Errors
/// Currently infallible; the signature leaves room for config validation.
pub fn init() -> Result<InitializedSlice, TransferError> {
    tracing::info!("Transfer slice initialized");
    Ok(InitializedSlice::new(Transfer::default()))
}
