use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::database;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{require_user, ApiResponse, ApiResult};
use crate::state::AppState;

/// Room for the non-file form fields around the largest allowed upload.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the full router over `state`
pub fn app(state: AppState) -> Router {
    let upload_dir = state.config.media.upload_dir.clone();

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(contact_routes())
        // Protected
        .merge(protected_routes(&state))
        // Stored media
        .nest_service("/uploads", ServeDir::new(upload_dir))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.security.cors_origins)),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/logout", post(auth::logout_post))
}

fn contact_routes() -> Router<AppState> {
    use handlers::public::contact_post;

    Router::new()
        .route("/contact/", post(contact_post))
        .route("/contact", post(contact_post))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::{auth, reports};

    let body_limit = state.config.media.max_video_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/auth/me", get(auth::whoami_get))
        .route("/reports/", post(reports::report_post).get(reports::reports_get))
        .route("/reports", post(reports::report_post).get(reports::reports_get))
        .route("/reports/:id", get(reports::report_get).delete(reports::report_delete))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(from_fn_with_state(state.clone(), require_user))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Incident Report API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth/register, /auth/login, /auth/logout (public), /auth/me (protected)",
            "reports": "/reports/[:id] (protected)",
            "contact": "/contact/ (public)",
            "uploads": "/uploads/* (public, static)",
            "health": "/health (public)"
        }
    })))
}

async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    match database::health_check(&state.pool).await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}
