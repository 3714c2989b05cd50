//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::orders::{OrderDraft, OrderPatch};
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult};
use shared::models::{Order, OrderStatus, PaymentStatus, SplitPayment};

/// Create a new order
pub async fn create(
    State(state): State<ServerState>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<Json<Order>> {
    let order = state.manager.create_order(draft).await?;
    Ok(Json(order))
}

/// Query params for the date-range listing
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    #[serde(default)]
    pub branch_id: Option<i64>,
    /// YYYY-MM-DD (inclusive)
    pub start: String,
    /// YYYY-MM-DD (inclusive)
    pub end: String,
}

/// List orders by order-date range
pub async fn list_by_date_range(
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let start = parse_date(&query.start)
        .ok_or_else(|| AppError::validation(format!("Invalid date: {}", query.start)))?;
    let end = parse_date(&query.end)
        .ok_or_else(|| AppError::validation(format!("Invalid date: {}", query.end)))?;
    let orders = state
        .manager
        .fetch_by_date_range(query.branch_id, start, end)
        .await?;
    Ok(Json(orders))
}

/// List a customer's orders
pub async fn list_by_customer(
    State(state): State<ServerState>,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.manager.fetch_by_customer(customer_id).await?;
    Ok(Json(orders))
}

/// Query params for the settlement listing
#[derive(Debug, Deserialize)]
pub struct SettlementQuery {
    #[serde(default)]
    pub branch_id: Option<i64>,
    /// YYYY-MM-DD
    pub date: String,
}

/// List orders settled on one business day
pub async fn list_for_settlement(
    State(state): State<ServerState>,
    Query(query): Query<SettlementQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let day = parse_date(&query.date)
        .ok_or_else(|| AppError::validation(format!("Invalid date: {}", query.date)))?;
    let orders = state
        .manager
        .fetch_for_settlement(query.branch_id, day)
        .await?;
    Ok(Json(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.manager.get_order(id).await?;
    Ok(Json(order))
}

/// Edit an order
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> AppResult<Json<Order>> {
    let order = state.manager.update_order(id, patch).await?;
    Ok(Json(order))
}

/// Delete an order
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    state.manager.delete_order(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// Cancel an order (idempotent)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.manager.cancel_order(id).await?;
    Ok(Json(order))
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Lifecycle status transition
pub async fn transition_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state.manager.transition_status(id, req.status).await?;
    Ok(Json(order))
}

/// Payment transition request
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub status: PaymentStatus,
    #[serde(default)]
    pub split: Option<SplitPayment>,
    /// Optional explicit settlement timestamp (Unix millis)
    #[serde(default)]
    pub paid_at: Option<i64>,
}

/// Payment sub-state transition
pub async fn transition_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<PaymentRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .manager
        .transition_payment_status(id, req.status, req.split, req.paid_at)
        .await?;
    Ok(Json(order))
}

/// Mark fulfillment complete
pub async fn complete_fulfillment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.manager.complete_fulfillment(id).await?;
    Ok(Json(order))
}

/// Transfer request payload
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub processing_branch_id: i64,
}

/// Ask another branch to take the order over
pub async fn request_transfer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<TransferRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .manager
        .request_transfer(id, req.processing_branch_id)
        .await?;
    Ok(Json(order))
}

/// Accept a pending transfer
pub async fn accept_transfer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.manager.accept_transfer(id).await?;
    Ok(Json(order))
}

/// Delivery cost payload
#[derive(Debug, Deserialize)]
pub struct DeliveryCostRequest {
    #[serde(default)]
    pub actual_cost: Option<i64>,
    #[serde(default)]
    pub driver_cash: Option<i64>,
}

/// Record actual delivery cost / driver cash
pub async fn set_delivery_cost(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<DeliveryCostRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .manager
        .set_actual_delivery_cost(id, req.actual_cost, req.driver_cash)
        .await?;
    Ok(Json(order))
}
