//! Minimal web front end for manual track entry and sorted views.
//!
//! Each request opens its own store session; the only shared state is the
//! immutable [`Store`] handle.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::error::SorterError;
use crate::infrastructure::store::Store;

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/submit", post(handlers::submit))
        .route("/sorted_playlist", get(handlers::sorted_playlist))
        .route("/health", get(handlers::health))
        .with_state(state)
}

impl IntoResponse for SorterError {
    fn into_response(self) -> Response {
        let status = match &self {
            SorterError::Validation(_) | SorterError::Integrity(_) => StatusCode::BAD_REQUEST,
            SorterError::NotFound(_) => StatusCode::NOT_FOUND,
            SorterError::Configuration(_) | SorterError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::warn!("Request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
