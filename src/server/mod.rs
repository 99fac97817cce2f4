//! HTTP server for the tracking API.
//!
//! - `router`: builds the axum router (API routes, CORS, optional static files)
//! - `serve`: binds the configured address and runs until ctrl-c

pub mod error;
pub mod routes;
pub mod state;

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as CorsAny, CorsLayer};
use tower_http::services::ServeDir;

use crate::error::{AppError, Result};
use crate::models::{Config, ServerConfig};
use crate::services::TrackingService;

pub use error::ApiError;
pub use state::AppState;

/// Creates the tracker router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let router = routes::routes().method_not_allowed_fallback(not_found);

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(not_found.into_service()),
        ),
        None => router.fallback(not_found),
    };

    router
        .layer(middleware::from_fn(log_requests))
        .layer(build_cors_layer(config))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    log::error!("Handler panicked");
    ApiError::Panic.into_response()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(CorsAny);

    if config.cors_allowed_origins.is_empty() {
        return cors.allow_origin(CorsAny);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received");
}

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(config: &Config, service: Arc<TrackingService>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let app = router(AppState::new(service), &config.server);

    log::info!("Tracker server listening on http://{}", addr);
    log::info!("Health check: http://{}/api/health", addr);
    log::info!("Lookup: POST http://{}/api/track", addr);
    if let Some(dir) = &config.server.static_dir {
        log::info!("Serving static files from {}", dir);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("server error: {e}")))
}
