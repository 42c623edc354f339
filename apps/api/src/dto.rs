use std::collections::BTreeMap;

use butik_domain::{
    BrowserEnvironment, BrowserFingerprint, CheckoutSession, GoldPrice, Order, Product,
    ShippingMethod,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of a catalog product.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-response.ts"
)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub weight: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            weight: product.weight,
            price: product.price,
            image_url: product.image_url,
            sort_order: product.sort_order,
            is_active: product.is_active,
        }
    }
}

/// Incoming payload for product creation and updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-input-request.ts"
)]
pub struct ProductInputRequest {
    pub name: String,
    pub weight: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// API representation of the gold price board.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gold-price-response.ts"
)]
pub struct GoldPriceResponse {
    pub buy_price: i64,
    pub sell_price: i64,
    pub updated_at: String,
}

impl From<GoldPrice> for GoldPriceResponse {
    fn from(price: GoldPrice) -> Self {
        Self {
            buy_price: price.buy_price,
            sell_price: price.sell_price,
            updated_at: price.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for gold price updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gold-price-update-request.ts"
)]
pub struct GoldPriceUpdateRequest {
    pub buy_price: i64,
    pub sell_price: i64,
}

/// One shipping option with its fixed cost and delivery estimate.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/shipping-option-response.ts"
)]
pub struct ShippingOptionResponse {
    pub id: String,
    pub cost: i64,
    pub estimate: String,
}

impl From<ShippingMethod> for ShippingOptionResponse {
    fn from(method: ShippingMethod) -> Self {
        Self {
            id: method.as_str().to_owned(),
            cost: method.cost(),
            estimate: method.estimate().to_owned(),
        }
    }
}

/// One region of the administrative hierarchy.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/region-response.ts"
)]
pub struct RegionResponse {
    pub id: String,
    pub name: String,
}

/// Incoming payload to open a checkout session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/start-checkout-request.ts"
)]
pub struct StartCheckoutRequest {
    pub product_id: String,
    pub quantity: u32,
    /// Ambient browser signals for fingerprinting.
    #[ts(type = "Record<string, unknown>")]
    pub fingerprint: BrowserFingerprint,
    /// Environment probes for bot screening.
    #[ts(type = "Record<string, unknown>")]
    pub environment: BrowserEnvironment,
}

/// Incoming partial checkout form update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-form-request.ts"
)]
pub struct UpdateFormRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_detail: Option<String>,
    pub shipping_method: Option<String>,
    pub data_confirmed: Option<bool>,
}

/// Incoming region selection.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/select-region-request.ts"
)]
pub struct SelectRegionRequest {
    /// One of `province`, `regency`, `district`, `village`.
    pub level: String,
    pub id: String,
    pub name: String,
}

/// A checkout session as seen by the storefront.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/checkout-session-response.ts"
)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub order_number: String,
    pub step: String,
    pub step_number: u8,
    pub product_name: String,
    pub product_weight: String,
    pub product_price: i64,
    pub quantity: u32,
    pub shipping_method: String,
    pub shipping_cost: i64,
    pub total_price: i64,
    pub full_address: String,
}

impl CheckoutSessionResponse {
    pub fn from_session(session_id: &str, session: &CheckoutSession) -> Self {
        Self {
            session_id: session_id.to_owned(),
            order_number: session.order_number.to_string(),
            step: step_name(session),
            step_number: session.step.number(),
            product_name: session.product.name.clone(),
            product_weight: session.product.weight.clone(),
            product_price: session.product.price,
            quantity: session.quantity,
            shipping_method: session.form.shipping_method.as_str().to_owned(),
            shipping_cost: session.shipping_cost(),
            total_price: session.total_price(),
            full_address: session.full_address(),
        }
    }
}

fn step_name(session: &CheckoutSession) -> String {
    use butik_domain::CheckoutStep;
    match session.step {
        CheckoutStep::BuyerInfo => "buyer_info",
        CheckoutStep::Shipping => "shipping",
        CheckoutStep::InvoicePreview => "invoice_preview",
        CheckoutStep::Payment => "payment",
        CheckoutStep::ProofUpload => "proof_upload",
    }
    .to_owned()
}

/// Result of a forward navigation attempt.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/advance-response.ts"
)]
pub struct AdvanceResponse {
    pub moved: bool,
    pub session: CheckoutSessionResponse,
    /// Violated fields with inline messages; empty when `moved` is true.
    pub field_errors: BTreeMap<String, String>,
}

/// Receipt returned once an order is submitted.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-order-response.ts"
)]
pub struct SubmitOrderResponse {
    pub order_id: String,
    pub order_number: String,
    pub confirmation_code: String,
    pub total_price: i64,
}

/// API representation of an order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/order-response.ts"
)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub shipping_method: String,
    pub product_name: String,
    pub product_weight: String,
    pub product_price: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number.to_string(),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            shipping_method: order.shipping_method.as_str().to_owned(),
            product_name: order.product_name,
            product_weight: order.product_weight,
            product_price: order.product_price,
            quantity: order.quantity,
            total_price: order.total_price,
            status: order.status.as_str().to_owned(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for the buyer's payment confirmation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/confirm-order-request.ts"
)]
pub struct ConfirmOrderRequest {
    pub code: String,
}

/// Incoming payload for an admin status update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-status-request.ts"
)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub tracking_number: Option<String>,
}

/// Result of an admin status update.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/status-update-response.ts"
)]
pub struct StatusUpdateResponse {
    pub order: OrderResponse,
    pub whatsapp_url: Option<String>,
}

/// Dashboard counters.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/order-stats-response.ts"
)]
pub struct OrderStatsResponse {
    pub total: u64,
    pub pending_payment: u64,
    pub payment_uploaded: u64,
    pub processing: u64,
    pub shipped: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub revenue: i64,
}

/// Short-lived signed link to a payment proof.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/proof-url-response.ts"
)]
pub struct ProofUrlResponse {
    pub url: String,
}

/// Incoming payload for the one-time admin setup.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-setup-request.ts"
)]
pub struct AdminSetupRequest {
    pub setup_key: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Incoming admin login payload.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-login-request.ts"
)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// API representation of the authenticated admin.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-identity-response.ts"
)]
pub struct AdminIdentityResponse {
    pub admin_id: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::{
        AdminIdentityResponse, AdminLoginRequest, AdminSetupRequest, AdvanceResponse,
        CheckoutSessionResponse, ConfirmOrderRequest, GoldPriceResponse,
        GoldPriceUpdateRequest, HealthResponse, OrderResponse, OrderStatsResponse,
        ProductInputRequest, ProductResponse, ProofUrlResponse, RegionResponse,
        SelectRegionRequest, ShippingOptionResponse, StartCheckoutRequest, StatusUpdateResponse,
        SubmitOrderResponse, UpdateFormRequest, UpdateStatusRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        ProductResponse::export(&config)?;
        ProductInputRequest::export(&config)?;
        GoldPriceResponse::export(&config)?;
        GoldPriceUpdateRequest::export(&config)?;
        ShippingOptionResponse::export(&config)?;
        RegionResponse::export(&config)?;
        StartCheckoutRequest::export(&config)?;
        UpdateFormRequest::export(&config)?;
        SelectRegionRequest::export(&config)?;
        CheckoutSessionResponse::export(&config)?;
        AdvanceResponse::export(&config)?;
        SubmitOrderResponse::export(&config)?;
        OrderResponse::export(&config)?;
        ConfirmOrderRequest::export(&config)?;
        UpdateStatusRequest::export(&config)?;
        StatusUpdateResponse::export(&config)?;
        OrderStatsResponse::export(&config)?;
        ProofUrlResponse::export(&config)?;
        AdminSetupRequest::export(&config)?;
        AdminLoginRequest::export(&config)?;
        AdminIdentityResponse::export(&config)?;

        Ok(())
    }
}
