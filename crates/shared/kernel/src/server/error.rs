//! The HTTP error taxonomy and its JSON envelope.
//!
//! Feature slices convert their domain errors into [`ApiError`]; axum turns
//! it into a `{ "ok": false, "error": "..." }` body with the matching status
//! code. Nothing is retried server-side; the client owns retry policy.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fhub_vfs::VfsError;
use std::borrow::Cow;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input: missing field, bad integer, invalid fingerprint,
    /// index out of range.
    #[error("{0}")]
    BadRequest(Cow<'static, str>),

    /// The path gate rejected a traversal attempt.
    #[error("path escapes the storage root")]
    PathEscaped,

    /// Share password mismatch.
    #[error("invalid password")]
    AuthFailed,

    #[error("not found: {0}")]
    NotFound(Cow<'static, str>),

    /// A share that has expired (and has now been removed).
    #[error("share expired")]
    Gone,

    #[error("already exists: {0}")]
    AlreadyExists(Cow<'static, str>),

    /// The path exists but with the wrong kind (file where a directory was
    /// requested, or vice versa).
    #[error("conflict: {0}")]
    Conflict(Cow<'static, str>),

    /// Attempted to read a directory as a file.
    #[error("is a directory: {0}")]
    IsADirectory(Cow<'static, str>),

    /// I/O failure while concatenating chunks; scratch is preserved so the
    /// client can retry.
    #[error("assembly failed: {0}")]
    AssemblyFailed(Cow<'static, str>),

    #[error("internal error: {0}")]
    Internal(Cow<'static, str>),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::PathEscaped | Self::IsADirectory(_) => {
                StatusCode::BAD_REQUEST
            },
            Self::AuthFailed => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Gone => StatusCode::GONE,
            Self::AssemblyFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// The canonical "field is required" rejection.
    #[must_use]
    pub fn missing_field(name: &str) -> Self {
        Self::BadRequest(format!("{name} is required").into())
    }
}

/// Unwraps a required, non-blank request field.
pub fn require_field<'a>(value: Option<&'a str>, name: &str) -> ApiResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::missing_field(name)),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "ok": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<VfsError> for ApiError {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::PathEscaped { .. } => Self::PathEscaped,
            VfsError::NotFound { path } => Self::NotFound(path.into()),
            VfsError::NotADirectory { path } | VfsError::Conflict { path } => {
                Self::Conflict(path.into())
            },
            VfsError::IsADirectory { path } => Self::IsADirectory(path.into()),
            VfsError::AlreadyExists { path } => Self::AlreadyExists(path.into()),
            VfsError::NotUtf8 { path } => {
                Self::BadRequest(format!("not valid UTF-8: {path}").into())
            },
            VfsError::InvalidName(name) => {
                Self::BadRequest(format!("invalid name: {name}").into())
            },
            VfsError::Denied { path } => {
                Self::Internal(format!("permission denied: {path}").into())
            },
            VfsError::Io { source } => Self::Internal(source.to_string().into()),
        }
    }
}
