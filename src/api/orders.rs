//! Order API Handlers
//!
//! Every successful mutation enqueues a Discord notification; a full or disabled
//! queue never affects the response.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::discord::Notification;
use crate::domain::{NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems};

use super::error::{AppError, AppResult};
use super::ApiState;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(get_by_id))
        .route("/api/orders/code/{code}", get(get_by_code))
        .route("/api/orders/{id}/status", patch(update_status))
        .route("/api/orders/{id}/payment", patch(update_payment_link))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkUpdate {
    #[serde(default)]
    pub payment_link: Option<String>,
}

pub async fn list(State(state): State<ApiState>) -> AppResult<Json<Vec<OrderWithItems>>> {
    Ok(Json(state.storage.get_orders().await?))
}

pub async fn get_by_id(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderWithItems>> {
    let order = state
        .storage
        .get_order(&id)
        .await?
        .ok_or_else(AppError::order_not_found)?;
    Ok(Json(order))
}

pub async fn get_by_code(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> AppResult<Json<OrderWithItems>> {
    let order = state
        .storage
        .get_order_by_code(&code)
        .await?
        .ok_or_else(AppError::order_not_found)?;
    Ok(Json(order))
}

/// Splits a checkout body into the order fields and its items.
///
/// The items check runs first, so an empty cart is rejected before anything else.
fn parse_checkout(body: Value) -> AppResult<(NewOrder, Vec<NewOrderItem>)> {
    let Value::Object(mut fields) = body else {
        return Err(AppError::BadRequest("Request body must be a JSON object".to_string()));
    };
    let items = match fields.remove("items") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(AppError::BadRequest("Order must contain items".to_string())),
    };

    let order: NewOrder = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(json!({ "order": e.to_string() })))?;
    order.validate()?;

    let mut parsed = Vec::with_capacity(items.len());
    let mut item_errors = Map::new();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<NewOrderItem>(item) {
            Ok(item) => match item.validate() {
                Ok(()) => parsed.push(item),
                Err(errors) => {
                    item_errors.insert(
                        index.to_string(),
                        serde_json::to_value(&errors).unwrap_or(Value::Null),
                    );
                }
            },
            Err(e) => {
                item_errors.insert(index.to_string(), Value::String(e.to_string()));
            }
        }
    }
    if !item_errors.is_empty() {
        return Err(AppError::Validation(json!({ "items": item_errors })));
    }
    Ok((order, parsed))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<OrderWithItems>)> {
    let Json(body) = payload?;
    let (order, items) = parse_checkout(body)?;

    let created = state.storage.create_order(order, items).await?;
    info!(
        order_id = %created.order.id,
        order_code = %created.order.order_code,
        items = created.items.len(),
        "Order created"
    );
    state
        .notifier
        .notify(Notification::OrderCreated(created.clone()));
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> AppResult<Json<Order>> {
    let Json(payload) = payload?;
    let raw = payload
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Status is required".to_string()))?;
    let status: OrderStatus = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid status: {raw}")))?;

    let order = state
        .storage
        .update_order_status(&id, status)
        .await?
        .ok_or_else(AppError::order_not_found)?;
    info!(order_code = %order.order_code, %status, "Order status updated");

    announce(&state, &id, |full| Notification::StatusChanged(full, status)).await;
    Ok(Json(order))
}

#[instrument(skip(state, payload))]
pub async fn update_payment_link(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<PaymentLinkUpdate>, JsonRejection>,
) -> AppResult<Json<Order>> {
    let Json(payload) = payload?;
    let link = payload
        .payment_link
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty())
        .ok_or_else(|| AppError::BadRequest("Payment link is required".to_string()))?;

    let order = state
        .storage
        .update_order_payment_link(&id, link.clone())
        .await?
        .ok_or_else(AppError::order_not_found)?;
    info!(order_code = %order.order_code, "Payment link set");

    announce(&state, &id, |full| Notification::PaymentLinkSet(full, link)).await;
    Ok(Json(order))
}

/// Re-reads the order with its items for the notification.
async fn announce(state: &ApiState, id: &str, build: impl FnOnce(OrderWithItems) -> Notification) {
    match state.storage.get_order(id).await {
        Ok(Some(full)) => {
            state.notifier.notify(build(full));
        }
        Ok(None) => warn!(order_id = %id, "Order vanished before notification"),
        Err(e) => warn!(order_id = %id, error = %e, "Could not load order for notification"),
    }
}
