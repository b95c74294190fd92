use axum::Router;
use axum::extract::DefaultBodyLimit;
use fhub::kernel::prelude::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Headroom on top of the configured chunk size for multipart framing and
/// the accompanying text fields.
const MULTIPART_SLACK: usize = 1024 * 1024;

#[derive(OpenApi)]
struct ApiDoc;

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();

    let body_limit = usize::try_from(state.config.upload.max_chunk_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_SLACK);

    let fs_api = OpenApiRouter::new()
        .merge(fhub::server::router::browse_router())
        .merge(fhub::server::router::transfer_router())
        .merge(fhub::server::router::share_router());

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(fhub::server::router::system_router())
        .nest("/api/fs", fs_api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    // Merge all routes and then apply the state to the final router
    Router::new().merge(openapi_routes).merge(scalar_routes)
}
