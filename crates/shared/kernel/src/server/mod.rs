//! Server-side plumbing shared by every feature slice.

pub mod error;
mod health;
pub mod response;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use response::MessageResponse;
pub use state::ApiState;
