//! Convenience re-exports for feature slices.

pub use crate::domain::config::ApiConfig;
pub use crate::domain::registry::{FeatureSlice, InitializedSlice};
#[cfg(feature = "server")]
pub use crate::server::error::{ApiError, ApiResult};
#[cfg(feature = "server")]
pub use crate::server::state::ApiState;
pub use crate::safe_nanoid;
