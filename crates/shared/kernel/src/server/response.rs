use serde::Serialize;
use utoipa::ToSchema;

/// The `{ ok: true, message }` success envelope used by mutation endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }
}
