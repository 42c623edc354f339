use axum::Json;
use axum::extract::{Path, Query, State};
use butik_domain::OrderNumber;
use serde::Deserialize;

use crate::dto::{ConfirmOrderRequest, OrderResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackOrderQuery {
    pub code: String,
}

pub async fn track_order_handler(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    Query(query): Query<TrackOrderQuery>,
) -> ApiResult<Json<OrderResponse>> {
    let order_number = OrderNumber::parse(order_number)?;
    let order = state
        .order_tracking_service
        .find_order(&order_number, &query.code)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

pub async fn confirm_order_handler(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    Json(payload): Json<ConfirmOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order_number = OrderNumber::parse(order_number)?;
    let order = state
        .order_tracking_service
        .confirm_processing(&order_number, &payload.code)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}
