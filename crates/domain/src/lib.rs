//! Domain types and policy rules for the Butik Emas storefront.

#![forbid(unsafe_code)]

/// Weighted-sum bot heuristics over client-reported environment signals.
pub mod bot;
/// Checkout wizard state machine and step validation.
pub mod checkout;
/// Validated buyer identity and address value types.
pub mod customer;
/// Deterministic device fingerprinting.
pub mod fingerprint;
/// Order identity, status lifecycle, and confirmation codes.
pub mod order;
/// Catalog entities: bullion products and gold prices.
pub mod product;
/// Fixed carrier rate table.
pub mod shipping;

pub use bot::{BotDetectionResult, BrowserEnvironment, BOT_SCORE_THRESHOLD, detect};
pub use checkout::{
    CheckoutForm, CheckoutSession, CheckoutStep, FieldErrors, MAX_PROOF_BYTES, ProductSnapshot,
    ProofImage, RegionRef, RegionSelection,
};
pub use customer::{AddressDetail, CustomerDetails, CustomerName, EmailAddress, PhoneNumber};
pub use fingerprint::{BrowserFingerprint, fingerprint};
pub use order::{ConfirmationCode, Order, OrderId, OrderNumber, OrderStatus};
pub use product::{GoldPrice, Product, ProductId, ProductInput};
pub use shipping::ShippingMethod;

/// Formats an amount of rupiah with thousands separators, e.g. `Rp 1.250.000`.
#[must_use]
pub fn format_rupiah(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_rupiah;

    #[test]
    fn rupiah_groups_thousands() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(950), "Rp 950");
        assert_eq!(format_rupiah(55_000), "Rp 55.000");
        assert_eq!(format_rupiah(1_250_000), "Rp 1.250.000");
    }
}
