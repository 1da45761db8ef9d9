//! HTTP service mode
//!
//! One pipeline invocation per inbound request over the full submitted
//! stroke batch. Requests are independent and stateless; the engine
//! handle inside the shared pipeline is the only process-wide resource
//! and is read-only after startup.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::config::CanvasProfile;
use crate::error::Error;
use crate::ink::StrokeSet;
use crate::pipeline::RecognitionPipeline;

/// Shared service state
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RecognitionPipeline>,
    profile: CanvasProfile,
}

impl AppState {
    pub fn new(pipeline: Arc<RecognitionPipeline>, profile: CanvasProfile) -> Self {
        Self { pipeline, profile }
    }
}

/// Create the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recognize", post(recognize))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RecognizeRequest {
    /// Array of strokes, each an array of `[x, y]` coordinate pairs
    #[serde(default)]
    strokes: Vec<Vec<[f64; 2]>>,
    /// Grid/scale hint; accepted for wire compatibility
    #[serde(rename = "gridSize", default)]
    grid_size: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RecognizeResponse {
    text: String,
}

async fn health() -> impl IntoResponse {
    #[derive(Serialize)]
    struct Health {
        status: &'static str,
        version: &'static str,
    }

    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn recognize(
    State(state): State<AppState>,
    Json(request): Json<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, ApiError> {
    if request.strokes.is_empty() {
        return Err(ApiError::BadRequest("No strokes provided".to_string()));
    }
    if let Some(grid) = request.grid_size {
        debug!(grid_size = grid, "Grid hint accepted");
    }

    let strokes = StrokeSet::from_coords(&request.strokes);
    info!(
        strokes = strokes.strokes().len(),
        points = strokes.point_count(),
        "Recognition request received"
    );

    // The pipeline is CPU-bound; keep it off the async workers.
    let pipeline = state.pipeline.clone();
    let profile = state.profile.clone();
    let text = tokio::task::spawn_blocking(move || pipeline.recognize(&strokes, &profile))
        .await
        .map_err(|e| ApiError::Internal(format!("pipeline task failed: {e}")))??;

    info!(text = %text, "Recognition request complete");
    Ok(Json(RecognizeResponse { text }))
}

/// Error responses on the wire: `{"error": "<message>"}` with the
/// matching status code
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NoImage(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => {
                error!(%message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
