//! Binary downloads: single files, directory archives, and multi-item
//! archives.

use crate::routes::{join_logical, logical_path};
use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use fhub_domain::constants::FILES_TAG;
use fhub_kernel::prelude::{ApiError, ApiResult, ApiState};
use fhub_kernel::server::error::require_field;
use fhub_vfs::{ArchiveItem, stream_archive};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(download)).routes(routes!(download_multiple))
}

#[derive(Debug, Deserialize, IntoParams)]
struct DownloadQuery {
    /// Logical path of a file (streamed raw) or directory (ZIP).
    path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/download",
    params(DownloadQuery),
    responses(
        (status = OK, description = "File bytes or a synthesized ZIP stream"),
        (status = NOT_FOUND, description = "Target does not exist"),
    ),
    tag = FILES_TAG,
)]
async fn download(
    State(state): State<ApiState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let logical = logical_path(query.path.as_deref());
    let meta = state.vfs.metadata(&logical).await?;

    if meta.is_dir() {
        let name = logical
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("files");
        let items =
            vec![ArchiveItem { name: name.to_owned(), path: state.vfs.resolve(&logical)? }];
        return Ok(zip_response(items, &format!("{name}.zip")));
    }

    file_response(&state, &logical, meta.len()).await
}

/// One entry of a multi-item download.
#[derive(Debug, Deserialize, ToSchema)]
struct DownloadItem {
    /// Display name inside the archive.
    name: Option<String>,
    /// Logical path; relative names are joined onto `basePath`.
    path: Option<String>,
}

/// Bundle several files/directories into one archive
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct DownloadMultipleRequest {
    items: Option<Vec<DownloadItem>>,
    base_path: Option<String>,
}

#[utoipa::path(
    post,
    path = "/download-multiple",
    request_body = DownloadMultipleRequest,
    responses(
        (status = OK, description = "A ZIP stream of all requested items"),
        (status = BAD_REQUEST, description = "Empty or malformed item list"),
        (status = NOT_FOUND, description = "An item does not exist"),
    ),
    tag = FILES_TAG,
)]
async fn download_multiple(
    State(state): State<ApiState>,
    Json(body): Json<DownloadMultipleRequest>,
) -> ApiResult<Response> {
    let items = body.items.unwrap_or_default();
    if items.is_empty() {
        return Err(ApiError::BadRequest("items must not be empty".into()));
    }
    let base = logical_path(body.base_path.as_deref());

    let mut archive_items = Vec::with_capacity(items.len());
    for item in items {
        let raw_path = require_field(item.path.as_deref(), "items[].path")?;
        let logical = if raw_path.starts_with('/') {
            raw_path.to_owned()
        } else {
            join_logical(&base, raw_path)
        };

        // Surface missing items as a clean 404 instead of a truncated stream.
        state.vfs.metadata(&logical).await?;

        let name = item
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                logical.rsplit('/').next().unwrap_or("item").to_owned()
            });
        archive_items.push(ArchiveItem { name, path: state.vfs.resolve(&logical)? });
    }

    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    Ok(zip_response(archive_items, &format!("files-{stamp}.zip")))
}

async fn file_response(state: &ApiState, logical: &str, len: u64) -> ApiResult<Response> {
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
        (header::CONTENT_LENGTH, len.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        (header::CACHE_CONTROL, "no-cache".to_owned()),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

fn zip_response(items: Vec<ArchiveItem>, archive_name: &str) -> Response {
    let safe_name = archive_name.replace('"', "_");
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_owned()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{safe_name}\"")),
        (header::CACHE_CONTROL, "no-cache".to_owned()),
    ];
    (headers, Body::from_stream(stream_archive(items))).into_response()
}
