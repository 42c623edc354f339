use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use butik_domain::{ProductId, ProductInput, ShippingMethod};
use uuid::Uuid;

use crate::dto::{
    GoldPriceResponse, GoldPriceUpdateRequest, ProductInputRequest, ProductResponse,
    ShippingOptionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_products_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state
        .catalog_service
        .storefront_products()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(products))
}

pub async fn gold_price_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Option<GoldPriceResponse>>> {
    let price = state.catalog_service.gold_price().await?;

    Ok(Json(price.map(GoldPriceResponse::from)))
}

pub async fn shipping_options_handler() -> Json<Vec<ShippingOptionResponse>> {
    Json(
        ShippingMethod::all()
            .iter()
            .copied()
            .map(ShippingOptionResponse::from)
            .collect(),
    )
}

pub async fn admin_list_products_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state
        .catalog_service
        .all_products()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(products))
}

pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProductInputRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let product = state
        .catalog_service
        .create_product(product_input(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductInputRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .catalog_service
        .update_product(ProductId::from_uuid(product_id), product_input(payload))
        .await?;

    Ok(Json(ProductResponse::from(product)))
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .catalog_service
        .delete_product(ProductId::from_uuid(product_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_gold_price_handler(
    State(state): State<AppState>,
    Json(payload): Json<GoldPriceUpdateRequest>,
) -> ApiResult<Json<GoldPriceResponse>> {
    let price = state
        .catalog_service
        .set_gold_price(payload.buy_price, payload.sell_price)
        .await?;

    Ok(Json(GoldPriceResponse::from(price)))
}

fn product_input(payload: ProductInputRequest) -> ProductInput {
    ProductInput {
        name: payload.name,
        weight: payload.weight,
        price: payload.price,
        image_url: payload.image_url,
        sort_order: payload.sort_order,
        is_active: payload.is_active,
    }
}
