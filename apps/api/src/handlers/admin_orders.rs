use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use butik_application::OrderQuery;
use butik_domain::{OrderId, OrderStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::{
    OrderResponse, OrderStatsResponse, ProofUrlResponse, StatusUpdateResponse, UpdateStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

pub async fn list_orders_handler(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()?;

    let orders = state
        .admin_order_service
        .list(&OrderQuery {
            search: query.search,
            status,
        })
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();

    Ok(Json(orders))
}

pub async fn order_stats_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<OrderStatsResponse>> {
    let stats = state.admin_order_service.stats().await?;

    let count = |status: OrderStatus| -> u64 {
        stats.by_status.get(&status).copied().unwrap_or(0) as u64
    };

    Ok(Json(OrderStatsResponse {
        total: stats.total as u64,
        pending_payment: count(OrderStatus::PendingPayment),
        payment_uploaded: count(OrderStatus::PaymentUploaded),
        processing: count(OrderStatus::Processing),
        shipped: count(OrderStatus::Shipped),
        completed: count(OrderStatus::Completed),
        cancelled: count(OrderStatus::Cancelled),
        revenue: stats.revenue,
    }))
}

pub async fn update_status_handler(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let status = OrderStatus::from_str(&payload.status)?;

    let outcome = state
        .admin_order_service
        .update_status(
            OrderId::from_uuid(order_id),
            status,
            payload.tracking_number.as_deref(),
        )
        .await?;

    Ok(Json(StatusUpdateResponse {
        order: OrderResponse::from(outcome.order),
        whatsapp_url: outcome.whatsapp_url,
    }))
}

pub async fn proof_url_handler(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<ProofUrlResponse>> {
    let url = state
        .admin_order_service
        .proof_url(OrderId::from_uuid(order_id))
        .await?;

    Ok(Json(ProofUrlResponse { url }))
}
