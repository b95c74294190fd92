//! Directory and file management endpoints.

use crate::accelerator;
use crate::pagination::{self, Pagination};
use crate::slice;
use axum::Json;
use axum::extract::{Query, State};
use fhub_domain::constants::FILES_TAG;
use fhub_domain::entry::{DirectoryEntry, EntryKind};
use fhub_kernel::prelude::{ApiResult, ApiState};
use fhub_kernel::server::MessageResponse;
use fhub_kernel::server::error::require_field;
use fhub_vfs::{RawEntry, encode_segments};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_dir))
        .routes(routes!(read_file))
        .routes(routes!(make_dir))
        .routes(routes!(delete_entry, delete_entry_via_delete))
        .routes(routes!(move_entry))
        .routes(routes!(copy_entry))
        .routes(routes!(create_file))
}

/// Normalizes the `path` query/body parameter to a `/`-rooted logical path.
pub(crate) fn logical_path(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => "/".to_owned(),
        Some(p) if p.starts_with('/') => p.to_owned(),
        Some(p) => format!("/{p}"),
    }
}

/// `base + "/" + name` with exactly one separator.
pub(crate) fn join_logical(base: &str, name: &str) -> String {
    format!("{}/{name}", base.trim_end_matches('/'))
}

/// Maps a raw listing entry to the wire shape, attaching a public-base URL to
/// files.
fn decorate(entry: RawEntry, public_base: &str, logical_dir: &str) -> DirectoryEntry {
    let url = (entry.kind == EntryKind::File).then(|| {
        format!(
            "{}{}",
            public_base.trim_end_matches('/'),
            encode_segments(&join_logical(logical_dir, &entry.name))
        )
    });
    DirectoryEntry { name: entry.name, kind: entry.kind, size: entry.size, mtime: entry.mtime, url }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// Logical directory path; defaults to `/`.
    path: Option<String>,
    /// 1-based page number (page addressing).
    page: Option<String>,
    /// Entries per page, 1..=1000 (page addressing).
    page_size: Option<String>,
    /// Entries to skip (offset addressing).
    offset: Option<String>,
    /// Entries to return, 1..=1000 (offset addressing).
    limit: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
struct ListResponse {
    ok: bool,
    path: String,
    items: Vec<DirectoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

#[utoipa::path(
    get,
    path = "/list",
    params(ListQuery),
    responses(
        (status = OK, description = "Sorted directory listing", body = ListResponse),
        (status = BAD_REQUEST, description = "Traversal attempt or bad pagination"),
        (status = NOT_FOUND, description = "Directory does not exist"),
        (status = CONFLICT, description = "Path names a file"),
    ),
    tag = FILES_TAG,
)]
async fn list_dir(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let logical = logical_path(query.path.as_deref());
    let window = pagination::parse_window(
        query.page.as_deref(),
        query.page_size.as_deref(),
        query.offset.as_deref(),
        query.limit.as_deref(),
    )?;

    // The gate runs before any listing source, accelerated or not.
    state.vfs.resolve(&logical)?;

    let browse = slice(&state)?;
    let accelerated = match &state.config.storage.accelerator_url {
        Some(base) => accelerator::fetch_listing(&browse.http, base, &logical).await,
        None => None,
    };
    let raw = match accelerated {
        Some(entries) => {
            // The accelerator only serves listings for directories it knows;
            // its answer shape already matches the local path.
            entries
        },
        None => state.vfs.list(&logical).await?,
    };

    let public_base = &state.config.storage.public_base;
    let mut items: Vec<DirectoryEntry> =
        raw.into_iter().map(|entry| decorate(entry, public_base, &logical)).collect();
    let pagination = pagination::apply(window, &mut items);

    Ok(Json(ListResponse { ok: true, path: logical, items, pagination }))
}

#[derive(Debug, Deserialize, IntoParams)]
struct ReadQuery {
    /// Logical file path.
    path: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
struct ReadResponse {
    ok: bool,
    content: String,
    size: u64,
    mtime: i64,
}

#[utoipa::path(
    get,
    path = "/read",
    params(ReadQuery),
    responses(
        (status = OK, description = "File content as UTF-8", body = ReadResponse),
        (status = BAD_REQUEST, description = "Directory, traversal, or non-UTF-8 content"),
        (status = NOT_FOUND, description = "File does not exist"),
    ),
    tag = FILES_TAG,
)]
async fn read_file(
    State(state): State<ApiState>,
    Query(query): Query<ReadQuery>,
) -> ApiResult<Json<ReadResponse>> {
    let logical = logical_path(query.path.as_deref());
    let (content, size, mtime) = state.vfs.read_text(&logical).await?;
    Ok(Json(ReadResponse { ok: true, content, size, mtime }))
}

/// A request that names one path
#[derive(Debug, Deserialize, ToSchema)]
struct PathRequest {
    path: Option<String>,
}

#[utoipa::path(
    post,
    path = "/mkdir",
    request_body = PathRequest,
    responses(
        (status = OK, description = "Directory created", body = MessageResponse),
        (status = CONFLICT, description = "Already exists or a file is in the way"),
    ),
    tag = FILES_TAG,
)]
async fn make_dir(
    State(state): State<ApiState>,
    Json(body): Json<PathRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let path = require_field(body.path.as_deref(), "path")?;
    state.vfs.mkdir(&logical_path(Some(path))).await?;
    Ok(Json(MessageResponse::new("Directory created")))
}

#[utoipa::path(
    post,
    path = "/delete",
    request_body = PathRequest,
    responses(
        (status = OK, description = "Entry removed recursively", body = MessageResponse),
        (status = NOT_FOUND, description = "Entry does not exist"),
    ),
    tag = FILES_TAG,
)]
async fn delete_entry(
    State(state): State<ApiState>,
    Json(body): Json<PathRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let path = require_field(body.path.as_deref(), "path")?;
    state.vfs.remove(&logical_path(Some(path))).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

#[utoipa::path(
    delete,
    path = "/delete",
    request_body = PathRequest,
    responses(
        (status = OK, description = "Entry removed recursively", body = MessageResponse),
        (status = NOT_FOUND, description = "Entry does not exist"),
    ),
    tag = FILES_TAG,
)]
async fn delete_entry_via_delete(
    state: State<ApiState>,
    body: Json<PathRequest>,
) -> ApiResult<Json<MessageResponse>> {
    delete_entry(state, body).await
}

/// A request that names a source and a destination
#[derive(Debug, Deserialize, ToSchema)]
struct TransferRequest {
    source: Option<String>,
    destination: Option<String>,
}

#[utoipa::path(
    post,
    path = "/move",
    request_body = TransferRequest,
    responses(
        (status = OK, description = "Entry moved", body = MessageResponse),
        (status = NOT_FOUND, description = "Source does not exist"),
        (status = CONFLICT, description = "Destination already exists"),
    ),
    tag = FILES_TAG,
)]
async fn move_entry(
    State(state): State<ApiState>,
    Json(body): Json<TransferRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let source = require_field(body.source.as_deref(), "source")?;
    let destination = require_field(body.destination.as_deref(), "destination")?;
    state
        .vfs
        .rename(&logical_path(Some(source)), &logical_path(Some(destination)))
        .await?;
    Ok(Json(MessageResponse::new("Moved")))
}

#[utoipa::path(
    post,
    path = "/copy",
    request_body = TransferRequest,
    responses(
        (status = OK, description = "Entry copied recursively", body = MessageResponse),
        (status = NOT_FOUND, description = "Source does not exist"),
        (status = CONFLICT, description = "Destination already exists"),
    ),
    tag = FILES_TAG,
)]
async fn copy_entry(
    State(state): State<ApiState>,
    Json(body): Json<TransferRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let source = require_field(body.source.as_deref(), "source")?;
    let destination = require_field(body.destination.as_deref(), "destination")?;
    state
        .vfs
        .copy(&logical_path(Some(source)), &logical_path(Some(destination)))
        .await?;
    Ok(Json(MessageResponse::new("Copied")))
}

/// Create a new file, optionally with initial text content
#[derive(Debug, Deserialize, ToSchema)]
struct CreateFileRequest {
    path: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
struct CreateFileResponse {
    ok: bool,
    size: u64,
    mtime: i64,
}

#[utoipa::path(
    post,
    path = "/create",
    request_body = CreateFileRequest,
    responses(
        (status = OK, description = "File created", body = CreateFileResponse),
        (status = CONFLICT, description = "Target already exists"),
    ),
    tag = FILES_TAG,
)]
async fn create_file(
    State(state): State<ApiState>,
    Json(body): Json<CreateFileRequest>,
) -> ApiResult<Json<CreateFileResponse>> {
    let path = require_field(body.path.as_deref(), "path")?;
    let content = body.content.unwrap_or_default();
    let (size, mtime) =
        state.vfs.create_file(&logical_path(Some(path)), content.as_bytes()).await?;
    Ok(Json(CreateFileResponse { ok: true, size, mtime }))
}
