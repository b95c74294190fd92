//! Directory and file management feature slice: listings (with an optional
//! accelerator fast path), text reads, tree mutations, and downloads.

mod accelerator;
mod download;
mod error;
mod pagination;
mod routes;

pub use error::BrowseError;

use fhub_kernel::prelude::{ApiError, ApiResult, ApiState, FeatureSlice, InitializedSlice};
use std::time::Duration;
use utoipa_axum::router::OpenApiRouter;

/// How long a listing-accelerator round trip may take before the local
/// readdir path takes over.
const ACCELERATOR_TIMEOUT: Duration = Duration::from_secs(2);

/// Browse feature state: the HTTP client used for accelerated listings.
#[derive(Debug)]
pub struct Browse {
    pub(crate) http: reqwest::Client,
}

impl FeatureSlice for Browse {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initialize the browse feature.
///
/// # Errors
/// Fails only if the accelerator HTTP client cannot be constructed.
pub fn init() -> Result<InitializedSlice, BrowseError> {
    let http = reqwest::Client::builder().timeout(ACCELERATOR_TIMEOUT).build()?;

    tracing::info!("Browse slice initialized");
    Ok(InitializedSlice::new(Browse { http }))
}

/// All browse endpoints.
pub fn router() -> OpenApiRouter<ApiState> {
    routes::router().merge(download::router())
}

pub(crate) fn slice(state: &ApiState) -> ApiResult<&Browse> {
    state.try_get_slice::<Browse>().map_err(|e| ApiError::Internal(e.to_string().into()))
}
