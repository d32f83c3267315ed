//! Triage API router.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /api/triage` (rate limited)
//! - `GET  /api/triage/health`
//! - `GET  /api/triage/stats`
//! - `GET  /api/triage/outbreak`
//!
//! Every route is wrapped by the access logger and CORS. Unknown paths
//! get a JSON 404.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, Uri};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the full API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer
/// of the rate-limited group). Handlers use `State<ApiContext>`.
/// The limiter is a route layer on the POST handler only, so a request
/// with any other method gets 405 without being counted.
pub fn triage_api_router(core: Arc<CoreState>, cors_origins: &[String]) -> Router {
    build_router(ApiContext::new(core), cors_origins)
}

pub(crate) fn build_router(ctx: ApiContext, cors_origins: &[String]) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let submit = Router::new()
        .route(
            "/",
            post(endpoints::triage::submit)
                .route_layer(axum::middleware::from_fn(middleware::rate::limit)),
        )
        .with_state(ctx.clone())
        // Extension must be outside the limiter so it can read ApiContext
        .layer(axum::Extension(ctx.clone()));

    let reads = Router::new()
        .route("/health", get(endpoints::health::triage))
        .route("/stats", get(endpoints::triage::stats))
        .route("/outbreak", get(endpoints::triage::outbreak))
        .with_state(ctx.clone());

    Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx)
        .nest("/api/triage", submit.merge(reads))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors_layer(cors_origins))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} not found", uri.path()))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
