//! Order identity, status lifecycle, and confirmation codes.

use std::fmt::Write as _;
use std::str::FromStr;

use butik_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shipping::ShippingMethod;

/// Unique identifier for an order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random order identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Human-facing order number, `BMA-` plus 16 base36 characters.
///
/// Generated from cryptographically random bytes so numbers cannot be
/// enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generates a fresh random order number.
    pub fn generate() -> AppResult<Self> {
        let mut bytes = [0u8; 12];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!("failed to generate order number: {error}"))
        })?;

        let mut token = String::with_capacity(24);
        for byte in bytes {
            let _ = write!(token, "{:0>2}", to_base36(u32::from(byte)));
        }
        token.truncate(16);

        Ok(Self(format!("BMA-{}", token.to_uppercase())))
    }

    /// Wraps an order number received from a caller.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed.len() > 32 {
            return Err(AppError::Validation("invalid order number".to_owned()));
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// Returns the order number string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_owned();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Short server-issued code that lets a buyer view their order and trigger
/// the single self-service status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    const LENGTH: usize = 6;

    /// Generates a fresh random code of 6 uppercase alphanumerics.
    pub fn generate() -> AppResult<Self> {
        const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

        let mut bytes = [0u8; Self::LENGTH];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!("failed to generate confirmation code: {error}"))
        })?;

        let code: String = bytes
            .iter()
            .map(|byte| char::from(ALPHABET[(*byte as usize) % ALPHABET.len()]))
            .collect();

        Ok(Self(code))
    }

    /// Wraps a stored code value.
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Case-insensitive comparison against a buyer-entered code.
    #[must_use]
    pub fn matches(&self, entered: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(entered.trim())
    }

    /// Returns the code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Server-held order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order exists but no payment evidence yet.
    PendingPayment,
    /// Buyer uploaded payment proof; awaiting admin verification.
    PaymentUploaded,
    /// Payment verified, order being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Delivered and closed.
    Completed,
    /// Abandoned or rejected. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::PaymentUploaded => "payment_uploaded",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the fulfilment sequence; `cancelled` sits outside it.
    fn rank(&self) -> Option<u8> {
        match self {
            Self::PendingPayment => Some(0),
            Self::PaymentUploaded => Some(1),
            Self::Processing => Some(2),
            Self::Shipped => Some(3),
            Self::Completed => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a transition to `next` is permitted.
    ///
    /// Forward moves (including skips) are allowed; `cancelled` is reachable
    /// from any non-terminal state; re-setting the current status is a no-op
    /// and therefore permitted (idempotent writers).
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        if *self == next {
            return true;
        }

        if next == Self::Cancelled {
            return !self.is_terminal();
        }

        match (self.rank(), next.rank()) {
            (Some(current), Some(target)) => target > current,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending_payment" => Ok(Self::PendingPayment),
            "payment_uploaded" => Ok(Self::PaymentUploaded),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown order status '{value}'"
            ))),
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Row identifier.
    pub id: OrderId,
    /// Human-facing order number.
    pub order_number: OrderNumber,
    /// Buyer full name.
    pub customer_name: String,
    /// Buyer email.
    pub customer_email: String,
    /// Buyer WhatsApp number.
    pub customer_phone: String,
    /// Composed shipping address.
    pub customer_address: String,
    /// Selected shipping method.
    pub shipping_method: ShippingMethod,
    /// Product name snapshot at purchase time.
    pub product_name: String,
    /// Product weight label, e.g. "1 gram".
    pub product_weight: String,
    /// Unit price snapshot in rupiah.
    pub product_price: i64,
    /// Quantity ordered.
    pub quantity: i32,
    /// Total including shipping, in rupiah.
    pub total_price: i64,
    /// Object path of the uploaded payment proof, if any.
    pub payment_proof_url: Option<String>,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Code the buyer uses to view the order.
    pub confirmation_code: ConfirmationCode,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{ConfirmationCode, OrderNumber, OrderStatus};

    #[test]
    fn order_numbers_have_the_expected_shape() {
        let number = OrderNumber::generate().ok();
        let value = number.map(|n| n.as_str().to_owned()).unwrap_or_default();
        assert!(value.starts_with("BMA-"), "got {value}");
        assert_eq!(value.len(), 20);
        assert!(
            value[4..]
                .chars()
                .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
        );
    }

    #[test]
    fn confirmation_codes_match_case_insensitively() {
        let code = ConfirmationCode::from_string("AB12CD");
        assert!(code.matches("ab12cd"));
        assert!(code.matches(" AB12CD "));
        assert!(!code.matches("ab12ce"));
    }

    #[test]
    fn forward_transitions_are_allowed_including_skips() {
        assert!(OrderStatus::PaymentUploaded.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::PaymentUploaded.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn backward_transitions_are_rejected() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn cancelled_is_reachable_from_any_non_terminal_state() {
        assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn resetting_the_same_status_is_permitted() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Processing));
    }
}
