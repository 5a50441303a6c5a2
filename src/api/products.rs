//! Product catalog handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use validator::Validate;

use crate::domain::{Product, ProductCreate};

use super::error::{AppError, AppResult};
use super::ApiState;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{id}", get(get_by_id))
}

/// List the catalog in creation order
pub async fn list(State(state): State<ApiState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.storage.get_products().await?))
}

pub async fn get_by_id(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .storage
        .get_product(&id)
        .await?
        .ok_or_else(AppError::product_not_found)?;
    Ok(Json(product))
}

pub async fn create(
    State(state): State<ApiState>,
    payload: Result<Json<ProductCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(payload) = payload?;
    payload.validate()?;
    let product = state.storage.create_product(payload).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}
