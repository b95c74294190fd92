//! HTTP surface for share management and anonymous share access.

use crate::registry::{CreateShare, Shares, UpdateShare};
use axum::Json;
use axum::body::Body;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use fhub_domain::constants::SHARES_TAG;
use fhub_domain::entry::{DirectoryEntry, EntryKind};
use fhub_domain::share::{ShareOptions, ShareView};
use fhub_kernel::prelude::{ApiError, ApiResult, ApiState};
use fhub_kernel::server::MessageResponse;
use fhub_vfs::encode_segments;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(create_share))
        .routes(routes!(list_shares))
        .routes(routes!(get_share, update_share, delete_share))
        .routes(routes!(access_share))
        .routes(routes!(download_shared))
}

/// Create a share link for a file or directory
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CreateShareRequest {
    path: Option<String>,
    /// Lifetime in seconds; omit or pass 0 for a share that never expires.
    expires_in: Option<i64>,
    password: Option<String>,
    #[serde(flatten)]
    options: ShareOptions,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CreateShareResponse {
    ok: bool,
    share_id: String,
    share_url: String,
    share: ShareView,
}

#[utoipa::path(
    post,
    path = "/share/create",
    request_body = CreateShareRequest,
    responses(
        (status = OK, description = "Share created", body = CreateShareResponse),
        (status = BAD_REQUEST, description = "Missing path or bad expiry"),
        (status = NOT_FOUND, description = "Target does not exist"),
    ),
    tag = SHARES_TAG,
)]
async fn create_share(
    State(state): State<ApiState>,
    Json(body): Json<CreateShareRequest>,
) -> ApiResult<Json<CreateShareResponse>> {
    let shares = slice(&state)?;
    let view = shares
        .create(
            &state.vfs,
            CreateShare {
                path: body.path.unwrap_or_default(),
                expires_in: body.expires_in,
                password: body.password,
                options: body.options,
            },
        )
        .await?;

    let share_url = format!("{}/{}", state.config.share.base_url, view.id);
    Ok(Json(CreateShareResponse { ok: true, share_id: view.id.clone(), share_url, share: view }))
}

#[derive(Debug, Serialize, ToSchema)]
struct SharesResponse {
    ok: bool,
    shares: Vec<ShareView>,
}

#[utoipa::path(
    get,
    path = "/share",
    responses((status = OK, description = "Active shares", body = SharesResponse)),
    tag = SHARES_TAG,
)]
async fn list_shares(State(state): State<ApiState>) -> ApiResult<Json<SharesResponse>> {
    let shares = slice(&state)?;
    Ok(Json(SharesResponse { ok: true, shares: shares.list() }))
}

#[derive(Debug, Serialize, ToSchema)]
struct ShareResponse {
    ok: bool,
    share: ShareView,
}

#[utoipa::path(
    get,
    path = "/share/{id}",
    params(("id" = String, Path, description = "Share id")),
    responses(
        (status = OK, description = "Share metadata", body = ShareResponse),
        (status = NOT_FOUND, description = "Unknown or expired share"),
    ),
    tag = SHARES_TAG,
)]
async fn get_share(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<ShareResponse>> {
    let shares = slice(&state)?;
    Ok(Json(ShareResponse { ok: true, share: shares.get(&id)? }))
}

/// Mutate a share's expiry, password, or presentation options
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UpdateShareRequest {
    /// New lifetime in seconds from now; omit or pass 0 to clear the expiry.
    expires_in: Option<i64>,
    /// Empty string clears the password.
    password: Option<String>,
    allow_uploads: Option<bool>,
    disable_viewer: Option<bool>,
    quick_download: Option<bool>,
    max_bandwidth: Option<u64>,
    title: Option<String>,
    description: Option<String>,
    theme: Option<String>,
    view_mode: Option<String>,
}

#[utoipa::path(
    put,
    path = "/share/{id}",
    params(("id" = String, Path, description = "Share id")),
    request_body = UpdateShareRequest,
    responses(
        (status = OK, description = "Updated share", body = ShareResponse),
        (status = NOT_FOUND, description = "Unknown or expired share"),
    ),
    tag = SHARES_TAG,
)]
async fn update_share(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
    Json(body): Json<UpdateShareRequest>,
) -> ApiResult<Json<ShareResponse>> {
    let shares = slice(&state)?;
    let view = shares.update(
        &id,
        UpdateShare {
            expires_in: body.expires_in,
            password: body.password,
            allow_uploads: body.allow_uploads,
            disable_viewer: body.disable_viewer,
            quick_download: body.quick_download,
            max_bandwidth: body.max_bandwidth,
            title: body.title,
            description: body.description,
            theme: body.theme,
            view_mode: body.view_mode,
        },
    )?;
    Ok(Json(ShareResponse { ok: true, share: view }))
}

#[utoipa::path(
    delete,
    path = "/share/{id}",
    params(("id" = String, Path, description = "Share id")),
    responses(
        (status = OK, description = "Share removed", body = MessageResponse),
        (status = NOT_FOUND, description = "Unknown share"),
    ),
    tag = SHARES_TAG,
)]
async fn delete_share(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    let shares = slice(&state)?;
    shares.delete(&id)?;
    Ok(Json(MessageResponse::new("Share deleted")))
}

/// Authenticate against a share and fetch its contents
#[derive(Debug, Default, Deserialize, ToSchema)]
struct AccessShareRequest {
    password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct AccessShareResponse {
    ok: bool,
    kind: EntryKind,
    share: ShareView,
    /// Directory shares: entries with share-scoped download URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<DirectoryEntry>>,
    /// File shares: the file's metadata and download URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<DirectoryEntry>,
}

#[utoipa::path(
    post,
    path = "/share/{id}/access",
    params(("id" = String, Path, description = "Share id")),
    request_body = AccessShareRequest,
    responses(
        (status = OK, description = "Share contents", body = AccessShareResponse),
        (status = UNAUTHORIZED, description = "Password mismatch"),
        (status = GONE, description = "Share missing or expired"),
    ),
    tag = SHARES_TAG,
)]
async fn access_share(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
    Json(body): Json<AccessShareRequest>,
) -> ApiResult<Json<AccessShareResponse>> {
    let shares = slice(&state)?;
    let share = shares.access(&id, body.password.as_deref())?;

    let base = format!("{}/{}", state.config.share.base_url, share.id);
    match share.kind {
        EntryKind::Dir => {
            let entries = state.vfs.list(&share.logical).await?;
            let items = entries
                .into_iter()
                .map(|entry| {
                    let url = (entry.kind == EntryKind::File)
                        .then(|| format!("{base}/download?path={}", encode_segments(&entry.name)));
                    DirectoryEntry {
                        name: entry.name,
                        kind: entry.kind,
                        size: entry.size,
                        mtime: entry.mtime,
                        url,
                    }
                })
                .collect();
            Ok(Json(AccessShareResponse {
                ok: true,
                kind: EntryKind::Dir,
                share: share.view(),
                items: Some(items),
                file: None,
            }))
        },
        EntryKind::File => {
            let meta = state.vfs.metadata(&share.logical).await?;
            let name = share
                .path
                .file_name()
                .map_or_else(|| "download".to_owned(), |n| n.to_string_lossy().into_owned());
            let file = DirectoryEntry {
                name,
                kind: EntryKind::File,
                size: Some(meta.len()),
                mtime: mtime_ms(&meta),
                url: Some(format!("{base}/download")),
            };
            Ok(Json(AccessShareResponse {
                ok: true,
                kind: EntryKind::File,
                share: share.view(),
                items: None,
                file: Some(file),
            }))
        },
    }
}

#[derive(Debug, Deserialize, IntoParams)]
struct SharedDownloadQuery {
    /// Child name inside a directory share; ignored for file shares.
    path: Option<String>,
    /// Share password when one is set.
    password: Option<String>,
}

#[utoipa::path(
    get,
    path = "/share/{id}/download",
    params(("id" = String, Path, description = "Share id"), SharedDownloadQuery),
    responses(
        (status = OK, description = "File content", content_type = "application/octet-stream"),
        (status = UNAUTHORIZED, description = "Password mismatch"),
        (status = GONE, description = "Share missing or expired"),
    ),
    tag = SHARES_TAG,
)]
async fn download_shared(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<SharedDownloadQuery>,
) -> ApiResult<Response> {
    let shares = slice(&state)?;
    let share = shares.access(&id, query.password.as_deref())?;

    let logical = match (share.kind, query.path.as_deref()) {
        (EntryKind::File, _) => share.logical.clone(),
        (EntryKind::Dir, Some(sub)) if !sub.is_empty() => {
            format!("{}/{}", share.logical.trim_end_matches('/'), sub)
        },
        (EntryKind::Dir, _) => {
            return Err(ApiError::BadRequest("path is required for directory shares".into()));
        },
    };

    // A crafted sub-path must not wander outside the shared tree.
    let target = state.vfs.resolve(&logical)?;
    if !target.starts_with(&share.path) {
        return Err(ApiError::PathEscaped);
    }

    stream_attachment(&state, &logical).await
}

/// Streams a file as an `attachment` download with length and no-cache
/// headers.
async fn stream_attachment(state: &ApiState, logical: &str) -> ApiResult<Response> {
    let meta = state.vfs.metadata(logical).await?;
    if meta.is_dir() {
        return Err(ApiError::IsADirectory(logical.to_owned().into()));
    }

    let path = state.vfs.resolve(logical)?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| ApiError::Internal(e.to_string().into()))?;

    let name = path
        .file_name()
        .map_or_else(|| "download".to_owned(), |n| n.to_string_lossy().into_owned())
        .replace('"', "_");

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
        (header::CONTENT_LENGTH, meta.len().to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        (header::CACHE_CONTROL, "no-cache".to_owned()),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

fn mtime_ms(meta: &std::fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

fn slice(state: &ApiState) -> ApiResult<&Shares> {
    state.try_get_slice::<Shares>().map_err(|e| ApiError::Internal(e.to_string().into()))
}
