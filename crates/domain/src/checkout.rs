//! Checkout wizard state machine.
//!
//! The wizard is a linear five-step sequence. Transitions move forward or
//! backward by exactly one step; every forward edge has its own validation
//! function, and the terminal submission is handled by the application layer
//! once the session sits on the proof-upload step.

use std::collections::BTreeMap;

use butik_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::customer::{AddressDetail, CustomerDetails, CustomerName, EmailAddress, PhoneNumber};
use crate::order::OrderNumber;
use crate::shipping::ShippingMethod;

/// Maximum accepted payment-proof size: exactly 5 MiB is still accepted.
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Violated fields mapped to their inline messages, in stable field order.
pub type FieldErrors = BTreeMap<String, String>;

/// The five wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Buyer identity and region selection.
    BuyerInfo,
    /// Street address detail and shipping method.
    Shipping,
    /// Read-only invoice preview.
    InvoicePreview,
    /// Payment instructions (QRIS).
    Payment,
    /// Payment-proof upload and submission.
    ProofUpload,
}

impl CheckoutStep {
    /// 1-based step number shown in the progress indicator.
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Self::BuyerInfo => 1,
            Self::Shipping => 2,
            Self::InvoicePreview => 3,
            Self::Payment => 4,
            Self::ProofUpload => 5,
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::BuyerInfo => Some(Self::Shipping),
            Self::Shipping => Some(Self::InvoicePreview),
            Self::InvoicePreview => Some(Self::Payment),
            Self::Payment => Some(Self::ProofUpload),
            Self::ProofUpload => None,
        }
    }

    fn previous(&self) -> Option<Self> {
        match self {
            Self::BuyerInfo => None,
            Self::Shipping => Some(Self::BuyerInfo),
            Self::InvoicePreview => Some(Self::Shipping),
            Self::Payment => Some(Self::InvoicePreview),
            Self::ProofUpload => Some(Self::Payment),
        }
    }
}

/// One level of the Indonesian administrative hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    /// Region identifier from the wilayah directory.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Cascading province → regency → district → village selection.
///
/// Changing an ancestor always clears every descendant so a stale
/// combination can never be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSelection {
    /// Selected province, if any.
    pub province: Option<RegionRef>,
    /// Selected regency/city, if any.
    pub regency: Option<RegionRef>,
    /// Selected district, if any.
    pub district: Option<RegionRef>,
    /// Selected village, if any.
    pub village: Option<RegionRef>,
}

impl RegionSelection {
    /// Selects a province and resets regency, district, and village.
    pub fn select_province(&mut self, region: RegionRef) {
        self.province = Some(region);
        self.regency = None;
        self.district = None;
        self.village = None;
    }

    /// Selects a regency and resets district and village.
    pub fn select_regency(&mut self, region: RegionRef) {
        self.regency = Some(region);
        self.district = None;
        self.village = None;
    }

    /// Selects a district and resets the village.
    pub fn select_district(&mut self, region: RegionRef) {
        self.district = Some(region);
        self.village = None;
    }

    /// Selects a village.
    pub fn select_village(&mut self, region: RegionRef) {
        self.village = Some(region);
    }

    /// Whether all four levels are selected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.province.is_some()
            && self.regency.is_some()
            && self.district.is_some()
            && self.village.is_some()
    }
}

/// The wizard's raw working state, mutated as the buyer types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutForm {
    /// Buyer name as typed.
    pub name: String,
    /// Buyer email as typed.
    pub email: String,
    /// Buyer phone as typed.
    pub phone: String,
    /// Street address detail as typed.
    pub address_detail: String,
    /// Selected shipping method. Defaults to free pickup.
    pub shipping_method: ShippingMethod,
    /// Explicit data-accuracy confirmation checkbox.
    pub data_confirmed: bool,
}

/// Product fields frozen into the session when checkout opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product name.
    pub name: String,
    /// Weight label, e.g. "1 gram".
    pub weight: String,
    /// Unit price in rupiah.
    pub price: i64,
}

/// An uploaded payment-proof image, validated before storage.
#[derive(Debug, Clone)]
pub struct ProofImage {
    /// Original file name as uploaded.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl ProofImage {
    /// Validates size and MIME type.
    pub fn validate(&self) -> AppResult<()> {
        if self.bytes.len() > MAX_PROOF_BYTES {
            return Err(AppError::Validation(
                "Ukuran file maksimal 5MB".to_owned(),
            ));
        }

        if !self.content_type.starts_with("image/") {
            return Err(AppError::Validation("File harus berupa gambar".to_owned()));
        }

        Ok(())
    }

    /// Returns the lowercase file extension, if present.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// A single buyer's checkout wizard instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Pre-generated order number for this attempt.
    pub order_number: OrderNumber,
    /// Product snapshot.
    pub product: ProductSnapshot,
    /// Quantity ordered.
    pub quantity: u32,
    /// Current wizard step.
    pub step: CheckoutStep,
    /// Raw form state.
    pub form: CheckoutForm,
    /// Cascading region selection.
    pub region: RegionSelection,
    /// Device fingerprint captured at session start.
    pub fingerprint: String,
}

impl CheckoutSession {
    /// Opens a new session on step 1 with a fresh order number.
    pub fn open(product: ProductSnapshot, quantity: u32, fingerprint: String) -> AppResult<Self> {
        if quantity == 0 {
            return Err(AppError::Validation("quantity must be at least 1".to_owned()));
        }

        Ok(Self {
            order_number: OrderNumber::generate()?,
            product,
            quantity,
            step: CheckoutStep::BuyerInfo,
            form: CheckoutForm::default(),
            region: RegionSelection::default(),
            fingerprint,
        })
    }

    /// Shipping cost of the currently selected method.
    #[must_use]
    pub fn shipping_cost(&self) -> i64 {
        self.form.shipping_method.cost()
    }

    /// Total price: unit price times quantity plus shipping.
    #[must_use]
    pub fn total_price(&self) -> i64 {
        self.product.price * i64::from(self.quantity) + self.shipping_cost()
    }

    /// Attempts to advance one step, validating the edge being crossed.
    ///
    /// On failure every violated field is reported so the UI can flag them
    /// all at once. The proof-upload step has no forward edge; submission is
    /// a separate terminal action.
    pub fn advance(&mut self) -> Result<CheckoutStep, FieldErrors> {
        let errors = match self.step {
            CheckoutStep::BuyerInfo => self.validate_buyer_info(),
            CheckoutStep::Shipping => self.validate_shipping(),
            CheckoutStep::InvoicePreview | CheckoutStep::Payment => FieldErrors::new(),
            CheckoutStep::ProofUpload => {
                let mut blocked = FieldErrors::new();
                blocked.insert(
                    "step".to_owned(),
                    "gunakan submit untuk menyelesaikan pesanan".to_owned(),
                );
                blocked
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves one step back. Going back never loses entered data.
    pub fn back(&mut self) -> CheckoutStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Step 1 → 2 validation: identity fields, complete region hierarchy,
    /// and the data-accuracy confirmation.
    fn validate_buyer_info(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Err(error) = CustomerName::new(&self.form.name) {
            errors.insert("name".to_owned(), message_of(error));
        }
        if let Err(error) = EmailAddress::new(&self.form.email) {
            errors.insert("email".to_owned(), message_of(error));
        }
        if let Err(error) = PhoneNumber::new(&self.form.phone) {
            errors.insert("phone".to_owned(), message_of(error));
        }
        if self.region.province.is_none() {
            errors.insert("provinsi".to_owned(), "Pilih provinsi".to_owned());
        }
        if self.region.regency.is_none() {
            errors.insert("kabupaten".to_owned(), "Pilih kabupaten/kota".to_owned());
        }
        if self.region.district.is_none() {
            errors.insert("kecamatan".to_owned(), "Pilih kecamatan".to_owned());
        }
        if self.region.village.is_none() {
            errors.insert("kelurahan".to_owned(), "Pilih desa/kelurahan".to_owned());
        }
        if !self.form.data_confirmed {
            errors.insert(
                "data_confirmed".to_owned(),
                "Anda harus mengkonfirmasi kebenaran data".to_owned(),
            );
        }

        errors
    }

    /// Step 2 → 3 validation: address detail only; the shipping method is
    /// always valid because it defaults to pickup.
    fn validate_shipping(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Err(error) = AddressDetail::new(&self.form.address_detail) {
            errors.insert("address".to_owned(), message_of(error));
        }

        errors
    }

    /// Composes the full shipping address from the detail and region names.
    #[must_use]
    pub fn full_address(&self) -> String {
        let mut parts = vec![self.form.address_detail.trim().to_owned()];
        for region in [
            &self.region.village,
            &self.region.district,
            &self.region.regency,
            &self.region.province,
        ] {
            if let Some(region) = region {
                parts.push(region.name.clone());
            }
        }
        parts.join(", ")
    }

    /// Freezes the form into validated customer details for submission.
    pub fn customer_details(&self) -> AppResult<CustomerDetails> {
        Ok(CustomerDetails {
            name: CustomerName::new(&self.form.name)?,
            email: EmailAddress::new(&self.form.email)?,
            phone: PhoneNumber::new(&self.form.phone)?,
            address: self.full_address(),
        })
    }
}

fn message_of(error: AppError) -> String {
    match error {
        AppError::Validation(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CheckoutSession, CheckoutStep, MAX_PROOF_BYTES, ProductSnapshot, ProofImage, RegionRef,
    };
    use crate::shipping::ShippingMethod;

    fn snapshot() -> ProductSnapshot {
        ProductSnapshot {
            name: "Emas Batangan".to_owned(),
            weight: "1 gram".to_owned(),
            price: 1_250_000,
        }
    }

    fn region(id: &str, name: &str) -> RegionRef {
        RegionRef {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    fn session_with_valid_buyer_info() -> CheckoutSession {
        let mut session = CheckoutSession::open(snapshot(), 2, "fp_test".to_owned())
            .unwrap_or_else(|_| unreachable!("quantity is non-zero"));
        session.form.name = "Budi Santoso".to_owned();
        session.form.email = "budi@gmail.com".to_owned();
        session.form.phone = "08123456789".to_owned();
        session.form.data_confirmed = true;
        session.region.select_province(region("32", "Jawa Barat"));
        session.region.select_regency(region("3204", "Kabupaten Bandung"));
        session.region.select_district(region("320404", "Katapang"));
        session.region.select_village(region("3204041", "Banyusari"));
        session
    }

    #[test]
    fn short_name_blocks_step_one() {
        let mut session = session_with_valid_buyer_info();
        session.form.name = "Jo".to_owned();

        let result = session.advance();
        let errors = result.err().unwrap_or_default();
        assert!(errors.contains_key("name"));
        assert_eq!(session.step, CheckoutStep::BuyerInfo);
    }

    #[test]
    fn step_one_reports_every_violated_field_at_once() {
        let mut session = CheckoutSession::open(snapshot(), 1, "fp_test".to_owned())
            .unwrap_or_else(|_| unreachable!("quantity is non-zero"));

        let errors = session.advance().err().unwrap_or_default();
        for field in [
            "name",
            "email",
            "phone",
            "provinsi",
            "kabupaten",
            "kecamatan",
            "kelurahan",
            "data_confirmed",
        ] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn valid_buyer_info_advances_to_shipping() {
        let mut session = session_with_valid_buyer_info();
        assert_eq!(session.advance().ok(), Some(CheckoutStep::Shipping));
    }

    #[test]
    fn short_address_blocks_step_two() {
        let mut session = session_with_valid_buyer_info();
        let _ = session.advance();
        session.form.address_detail = "Jl. A 1".to_owned();

        assert!(session.advance().is_err());
        assert_eq!(session.step, CheckoutStep::Shipping);
    }

    #[test]
    fn preview_and_payment_are_pure_navigation() {
        let mut session = session_with_valid_buyer_info();
        session.form.address_detail = "Jl. Merdeka No. 45, RT 02".to_owned();
        let _ = session.advance();
        let _ = session.advance();
        assert_eq!(session.advance().ok(), Some(CheckoutStep::Payment));
        assert_eq!(session.advance().ok(), Some(CheckoutStep::ProofUpload));
    }

    #[test]
    fn back_never_goes_below_step_one() {
        let mut session = session_with_valid_buyer_info();
        assert_eq!(session.back(), CheckoutStep::BuyerInfo);
    }

    #[test]
    fn changing_province_resets_descendants() {
        let mut session = session_with_valid_buyer_info();
        session.region.select_province(region("31", "DKI Jakarta"));

        assert!(session.region.regency.is_none());
        assert!(session.region.district.is_none());
        assert!(session.region.village.is_none());
        assert!(!session.region.is_complete());
    }

    #[test]
    fn pickup_incurs_zero_shipping_cost() {
        let session = session_with_valid_buyer_info();
        assert_eq!(session.form.shipping_method, ShippingMethod::AmbilDiButik);
        assert_eq!(session.shipping_cost(), 0);
        assert_eq!(session.total_price(), 2_500_000);
    }

    #[test]
    fn carrier_method_adds_its_table_cost() {
        let mut session = session_with_valid_buyer_info();
        session.form.shipping_method = ShippingMethod::JneYes;
        assert_eq!(session.total_price(), 2_500_000 + 85_000);
    }

    #[test]
    fn proof_of_exactly_five_mebibytes_is_accepted() {
        let proof = ProofImage {
            file_name: "bukti.jpg".to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0u8; MAX_PROOF_BYTES],
        };
        assert!(proof.validate().is_ok());
    }

    #[test]
    fn proof_one_byte_over_the_limit_is_rejected() {
        let proof = ProofImage {
            file_name: "bukti.jpg".to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0u8; MAX_PROOF_BYTES + 1],
        };
        assert!(proof.validate().is_err());
    }

    #[test]
    fn non_image_proof_is_rejected() {
        let proof = ProofImage {
            file_name: "bukti.pdf".to_owned(),
            content_type: "application/pdf".to_owned(),
            bytes: vec![0u8; 16],
        };
        assert!(proof.validate().is_err());
    }

    #[test]
    fn full_address_appends_region_names_small_to_large() {
        let mut session = session_with_valid_buyer_info();
        session.form.address_detail = "Jl. Merdeka No. 45".to_owned();
        assert_eq!(
            session.full_address(),
            "Jl. Merdeka No. 45, Banyusari, Katapang, Kabupaten Bandung, Jawa Barat"
        );
    }
}
