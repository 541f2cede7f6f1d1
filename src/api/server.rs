//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{handlers, models::ApiResponse, ApiError};
use crate::subtitles::{Downloader, SubtitleLibrary};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub library: SubtitleLibrary,
    pub downloader: Arc<Downloader>,
}

/// Build the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Browsers call the API from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        // Segment searches
        .route("/api/getVideoLinks/:word", get(video_links_handler))
        .route("/api/getVideos/:word", get(video_times_handler))
        .route("/api/getLink/:word", get(links_handler))
        // Subtitle downloads
        .route("/api/downloadSubtitle/:link", post(download_handler))
        .route("/api/downloadSubtitle/:link/:lang", post(download_with_lang_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("🌐 API server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check(&state.library).await))
}

async fn video_links_handler(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> impl IntoResponse {
    Json(handlers::video_links(&state.library, &word).await)
}

async fn video_times_handler(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> impl IntoResponse {
    Json(handlers::video_times(&state.library, &word).await)
}

async fn links_handler(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> impl IntoResponse {
    Json(handlers::links(&state.library, &word).await)
}

async fn download_handler(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let report = handlers::download_subtitle(&state, &link, None).await?;
    Ok(Json(ApiResponse::success(report)))
}

async fn download_with_lang_handler(
    State(state): State<AppState>,
    Path((link, lang)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let report = handlers::download_subtitle(&state, &link, Some(&lang)).await?;
    Ok(Json(ApiResponse::success(report)))
}
