//! JSON HTTP API for the storefront.

pub mod error;
mod orders;
mod products;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::discord::Notifier;
use crate::storage::Storage;

/// Shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub storage: Arc<dyn Storage>,
    pub notifier: Notifier,
}

impl ApiState {
    pub fn new(storage: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self { storage, notifier }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(products::router())
        .merge(orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
