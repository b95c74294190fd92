//! Time-bounded share link feature slice.
//!
//! Shares are process-local and non-durable by design; a restart invalidates
//! every outstanding link. See [`registry`] for the lifecycle and expiry
//! rules.

mod error;
mod registry;
mod routes;

pub use error::ShareError;
pub use registry::{CreateShare, Shares, UpdateShare};
pub use routes::router;

use fhub_kernel::prelude::{FeatureSlice, InitializedSlice};

impl FeatureSlice for Shares {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initialize the share feature.
///
/// # Errors
/// Currently infallible; the signature leaves room for config validation.
pub fn init() -> Result<InitializedSlice, ShareError> {
    tracing::info!("Share slice initialized");
    Ok(InitializedSlice::new(Shares::default()))
}
