//! Multipart/JSON endpoints for the resumable upload engine.

use crate::coordinator::{Outcome, PutChunk, Transfer};
use axum::Json;
use axum::extract::{Multipart, State};
use fhub_domain::constants::UPLOADS_TAG;
use fhub_kernel::prelude::{ApiError, ApiResult, ApiState};
use fhub_kernel::server::MessageResponse;
use fhub_kernel::server::error::require_field;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(upload_status))
        .routes(routes!(upload_chunk))
        .routes(routes!(upload_cancel))
}

/// Query the resumable state of an upload
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UploadStatusRequest {
    /// Opaque client-chosen upload fingerprint.
    file_id: Option<String>,
    file_name: Option<String>,
    /// Logical path of the target directory.
    #[serde(alias = "path")]
    path_param: Option<String>,
    /// Accepted for forward compatibility; does not alter semantics.
    #[allow(dead_code)]
    chunk_size: Option<u64>,
    #[allow(dead_code)]
    total_chunks: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UploadStatusResponse {
    ok: bool,
    uploaded_chunks: Vec<u32>,
    can_resume: bool,
}

#[utoipa::path(
    post,
    path = "/upload-status",
    request_body = UploadStatusRequest,
    responses(
        (status = OK, description = "Chunk indices already persisted", body = UploadStatusResponse),
        (status = BAD_REQUEST, description = "Missing or malformed fields"),
    ),
    tag = UPLOADS_TAG,
)]
async fn upload_status(
    State(state): State<ApiState>,
    Json(body): Json<UploadStatusRequest>,
) -> ApiResult<Json<UploadStatusResponse>> {
    let file_id = require_field(body.file_id.as_deref(), "fileId")?;
    require_field(body.file_name.as_deref(), "fileName")?;
    let target_dir = body.path_param.as_deref().unwrap_or("/");

    let transfer = state.try_get_slice::<Transfer>().map_err(internal)?;
    let status = transfer.status(&state.vfs, file_id, target_dir).await?;

    Ok(Json(UploadStatusResponse {
        ok: true,
        uploaded_chunks: status.uploaded_chunks,
        can_resume: status.can_resume,
    }))
}

/// The multipart body of one chunk POST.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
struct UploadChunkForm {
    /// Logical path of the target directory.
    path: String,
    file_name: String,
    /// Opaque upload fingerprint.
    file_id: String,
    chunk_index: u32,
    total_chunks: u32,
    /// Raw chunk bytes.
    #[schema(value_type = String, format = Binary)]
    chunk: Vec<u8>,
    /// Overwrite the final file at assembly time.
    replace: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UploadChunkResponse {
    ok: bool,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    received: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload-chunk",
    request_body(content = UploadChunkForm, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Chunk accepted or upload completed", body = UploadChunkResponse),
        (status = BAD_REQUEST, description = "Missing or malformed fields"),
        (status = CONFLICT, description = "Final file exists and replace was not requested"),
    ),
    tag = UPLOADS_TAG,
)]
async fn upload_chunk(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadChunkResponse>> {
    let mut path = None;
    let mut file_name = None;
    let mut file_id = None;
    let mut chunk_index = None;
    let mut total_chunks = None;
    let mut chunk = None;
    let mut replace = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}").into()))?
    {
        match field.name() {
            Some("path") => path = Some(text(field, "path").await?),
            Some("fileName") => file_name = Some(text(field, "fileName").await?),
            Some("fileId") => file_id = Some(text(field, "fileId").await?),
            Some("chunkIndex") => {
                chunk_index = Some(integer(&text(field, "chunkIndex").await?, "chunkIndex")?);
            },
            Some("totalChunks") => {
                total_chunks = Some(integer(&text(field, "totalChunks").await?, "totalChunks")?);
            },
            Some("replace") => {
                let raw = text(field, "replace").await?;
                replace = matches!(raw.to_ascii_lowercase().as_str(), "true" | "1");
            },
            Some("chunk") => {
                chunk = Some(field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("unreadable chunk field: {e}").into())
                })?);
            },
            _ => {},
        }
    }

    let file_id = file_id.ok_or_else(|| missing("fileId"))?;
    let file_name = file_name.ok_or_else(|| missing("fileName"))?;
    let chunk_index = chunk_index.ok_or_else(|| missing("chunkIndex"))?;
    let total_chunks = total_chunks.ok_or_else(|| missing("totalChunks"))?;
    let chunk = chunk.ok_or_else(|| missing("chunk"))?;

    let transfer = state.try_get_slice::<Transfer>().map_err(internal)?;
    let outcome = transfer
        .put_chunk(
            &state.vfs,
            PutChunk {
                fingerprint: &file_id,
                file_name: &file_name,
                target_dir: path.as_deref().unwrap_or("/"),
                chunk_index,
                total_chunks,
                bytes: &chunk,
                replace,
            },
        )
        .await?;

    match outcome {
        Outcome::Progress { received, total } => Ok(Json(UploadChunkResponse {
            ok: true,
            complete: false,
            received: Some(received),
            total: Some(total),
            file_name: None,
        })),
        Outcome::Completed { file_name } => Ok(Json(UploadChunkResponse {
            ok: true,
            complete: true,
            received: None,
            total: None,
            file_name: Some(file_name),
        })),
        Outcome::Conflict { file_name } => Err(ApiError::AlreadyExists(file_name.into())),
    }
}

/// Abort an upload and purge its scratch chunks
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UploadCancelRequest {
    file_id: Option<String>,
    #[allow(dead_code)]
    file_name: Option<String>,
    path: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload-cancel",
    request_body = UploadCancelRequest,
    responses(
        (status = OK, description = "Scratch purged", body = MessageResponse),
        (status = BAD_REQUEST, description = "Missing or malformed fields"),
    ),
    tag = UPLOADS_TAG,
)]
async fn upload_cancel(
    State(state): State<ApiState>,
    Json(body): Json<UploadCancelRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let file_id = require_field(body.file_id.as_deref(), "fileId")?;
    let target_dir = body.path.as_deref().unwrap_or("/");

    let transfer = state.try_get_slice::<Transfer>().map_err(internal)?;
    transfer.cancel(&state.vfs, file_id, target_dir).await?;

    Ok(Json(MessageResponse::new("Upload cancelled")))
}

async fn text(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable field {name}: {e}").into()))
}

fn integer(raw: &str, name: &str) -> ApiResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a non-negative integer").into()))
}

fn missing(name: &str) -> ApiError {
    ApiError::missing_field(name)
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(err.to_string().into())
}
