use axum::http::header;
use axum::{Json, response::IntoResponse};
use fhub_domain::constants::{SERVICE_NAME, SYSTEM_TAG};
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Instant;
use utoipa::ToSchema;

static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Liveness report for load balancers and the ops dashboard.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    service: &'static str,
    version: &'static str,
    /// Seconds since this process started serving.
    uptime_secs: u64,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Service liveness", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        ok: true,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: STARTED.elapsed().as_secs(),
    };

    // Liveness answers must never come from a cache.
    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}
