//! Server-held checkout sessions and the terminal submission flow.
//!
//! The browser never decides anything: it reports fingerprint signals and
//! environment probes when a session opens, then drives the wizard through
//! this service. Every gate (bot screening, step validation, rate limiting)
//! runs here.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use butik_core::{AppError, AppResult};
use butik_domain::{
    BrowserEnvironment, BrowserFingerprint, CheckoutSession, CheckoutStep, ConfirmationCode,
    FieldErrors, OrderId, OrderNumber, ProductId, ProductSnapshot, ProofImage, RegionRef,
    ShippingMethod, fingerprint,
};
use uuid::Uuid;

use crate::abuse_control_service::AbuseControlService;
use crate::notification_service::NotificationService;
use crate::ports::{ObjectStorage, OrderRepository, ProductRepository, buckets};

/// Opaque handle for an open checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session identifier from an existing UUID value.
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

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Partial form update: only present fields are written.
#[derive(Debug, Clone, Default)]
pub struct FormUpdate {
    /// Buyer name as typed.
    pub name: Option<String>,
    /// Buyer email as typed.
    pub email: Option<String>,
    /// Buyer phone as typed.
    pub phone: Option<String>,
    /// Street address detail as typed.
    pub address_detail: Option<String>,
    /// Selected shipping method.
    pub shipping_method: Option<ShippingMethod>,
    /// Data-accuracy confirmation checkbox.
    pub data_confirmed: Option<bool>,
}

/// Which level of the region hierarchy a selection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLevel {
    /// Provinsi.
    Province,
    /// Kabupaten/kota.
    Regency,
    /// Kecamatan.
    District,
    /// Desa/kelurahan.
    Village,
}

/// Result of a forward navigation attempt.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The session moved to this step.
    Advanced(CheckoutStep),
    /// The current step's validation failed; the session did not move.
    Blocked(FieldErrors),
}

/// Receipt returned to the buyer after a successful submission.
#[derive(Debug, Clone)]
pub struct SubmittedOrder {
    /// Persisted order identifier.
    pub order_id: OrderId,
    /// Human-facing order number.
    pub order_number: OrderNumber,
    /// Code the buyer needs to view the order later.
    pub confirmation_code: ConfirmationCode,
    /// Total charged, in rupiah.
    pub total_price: i64,
}

/// Drives checkout sessions from opening through submission.
///
/// Sessions live in process memory, keyed by [`SessionId`]; a restart drops
/// open wizards, which matches how little they are worth before submission.
pub struct CheckoutService {
    sessions: Mutex<HashMap<Uuid, CheckoutSession>>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    storage: Arc<dyn ObjectStorage>,
    abuse: Arc<AbuseControlService>,
    notifications: Arc<NotificationService>,
}

impl CheckoutService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        storage: Arc<dyn ObjectStorage>,
        abuse: Arc<AbuseControlService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            products,
            orders,
            storage,
            abuse,
            notifications,
        }
    }

    /// Opens a checkout session for a product.
    ///
    /// The browser's environment probes are screened first: an automated
    /// environment never gets a session at all. The product is snapshotted
    /// so later price edits do not move an in-flight checkout.
    pub async fn start_session(
        &self,
        product_id: ProductId,
        quantity: u32,
        signals: &BrowserFingerprint,
        environment: &BrowserEnvironment,
    ) -> AppResult<(SessionId, CheckoutSession)> {
        self.abuse.screen_environment(environment)?;

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .filter(|product| product.is_active)
            .ok_or_else(|| AppError::NotFound("produk tidak ditemukan".to_owned()))?;

        let snapshot = ProductSnapshot {
            name: product.name,
            weight: product.weight,
            price: product.price,
        };
        let session = CheckoutSession::open(snapshot, quantity, fingerprint(signals))?;
        let session_id = SessionId::new();

        tracing::info!(
            session_id = %session_id,
            order_number = %session.order_number,
            "sesi checkout dibuka"
        );

        self.with_sessions(|sessions| {
            sessions.insert(session_id.as_uuid(), session.clone());
        })?;
        Ok((session_id, session))
    }

    /// Returns a snapshot of an open session.
    pub fn session(&self, session_id: SessionId) -> AppResult<CheckoutSession> {
        self.with_session(session_id, |session| session.clone())
    }

    /// Applies a partial form update. Field values are stored raw; they are
    /// validated when the buyer tries to cross the step's forward edge.
    pub fn update_form(&self, session_id: SessionId, update: FormUpdate) -> AppResult<CheckoutSession> {
        self.with_session(session_id, |session| {
            if let Some(name) = update.name {
                session.form.name = name;
            }
            if let Some(email) = update.email {
                session.form.email = email;
            }
            if let Some(phone) = update.phone {
                session.form.phone = phone;
            }
            if let Some(address_detail) = update.address_detail {
                session.form.address_detail = address_detail;
            }
            if let Some(shipping_method) = update.shipping_method {
                session.form.shipping_method = shipping_method;
            }
            if let Some(data_confirmed) = update.data_confirmed {
                session.form.data_confirmed = data_confirmed;
            }
            session.clone()
        })
    }

    /// Records a region selection, cascading resets to descendant levels.
    pub fn select_region(
        &self,
        session_id: SessionId,
        level: RegionLevel,
        region: RegionRef,
    ) -> AppResult<CheckoutSession> {
        self.with_session(session_id, |session| {
            match level {
                RegionLevel::Province => session.region.select_province(region),
                RegionLevel::Regency => session.region.select_regency(region),
                RegionLevel::District => session.region.select_district(region),
                RegionLevel::Village => session.region.select_village(region),
            }
            session.clone()
        })
    }

    /// Attempts to advance the wizard one step.
    pub fn advance(&self, session_id: SessionId) -> AppResult<StepOutcome> {
        self.with_session(session_id, |session| match session.advance() {
            Ok(step) => StepOutcome::Advanced(step),
            Err(errors) => StepOutcome::Blocked(errors),
        })
    }

    /// Moves the wizard one step back.
    pub fn back(&self, session_id: SessionId) -> AppResult<CheckoutStep> {
        self.with_session(session_id, |session| session.back())
    }

    /// Terminal action: validates the proof, runs the rate-limit gate,
    /// stores the proof, persists the order, and closes the session.
    ///
    /// The admission gate runs before any side effect, and the counters are
    /// recorded only after the order exists, so a failed submission never
    /// consumes allowance.
    pub async fn submit(&self, session_id: SessionId, proof: ProofImage) -> AppResult<SubmittedOrder> {
        let session = self.session(session_id)?;

        if session.step != CheckoutStep::ProofUpload {
            return Err(AppError::Validation(
                "Selesaikan langkah checkout terlebih dahulu".to_owned(),
            ));
        }
        proof.validate()?;
        let details = session.customer_details()?;

        let admission = self.abuse.evaluate(
            &session.fingerprint,
            details.phone.as_str(),
            details.email.as_str(),
        )?;
        if !admission.allowed {
            return Err(AppError::RateLimited(AbuseControlService::denial_message(
                &admission,
            )));
        }

        let object_name = random_object_name(proof.extension().as_deref())?;
        let content_type = proof.content_type.clone();
        self.storage
            .upload(buckets::PAYMENT_PROOFS, &object_name, &content_type, proof.bytes)
            .await?;
        let proof_url = self.storage.public_url(buckets::PAYMENT_PROOFS, &object_name);

        let confirmation_code = ConfirmationCode::generate()?;
        let order = self
            .orders
            .create_order_with_payment_proof(crate::ports::NewOrder {
                order_number: session.order_number.clone(),
                customer_name: details.name.as_str().to_owned(),
                customer_email: details.email.as_str().to_owned(),
                customer_phone: details.phone.as_str().to_owned(),
                customer_address: details.address,
                shipping_method: session.form.shipping_method,
                product_name: session.product.name.clone(),
                product_weight: session.product.weight.clone(),
                product_price: session.product.price,
                quantity: i32::try_from(session.quantity)
                    .map_err(|_| AppError::Validation("jumlah terlalu besar".to_owned()))?,
                total_price: session.total_price(),
                payment_proof_url: proof_url,
                confirmation_code: confirmation_code.clone(),
            })
            .await?;

        self.abuse.record(
            &session.fingerprint,
            details.phone.as_str(),
            details.email.as_str(),
        )?;

        // Alert failures must not undo a persisted order.
        if let Err(error) = self.notifications.notify_payment_proof(&order).await {
            tracing::warn!(
                order_number = %order.order_number,
                %error,
                "notifikasi admin gagal terkirim"
            );
        }

        self.with_sessions(|sessions| {
            sessions.remove(&session_id.as_uuid());
        })?;

        tracing::info!(
            order_number = %order.order_number,
            total_price = order.total_price,
            "pesanan berhasil dibuat"
        );

        Ok(SubmittedOrder {
            order_id: order.id,
            order_number: order.order_number,
            confirmation_code,
            total_price: order.total_price,
        })
    }

    /// Discards an open session, if it exists.
    pub fn abandon(&self, session_id: SessionId) -> AppResult<()> {
        self.with_sessions(|sessions| {
            sessions.remove(&session_id.as_uuid());
        })
    }

    fn with_sessions<T>(&self, apply: impl FnOnce(&mut HashMap<Uuid, CheckoutSession>) -> T) -> AppResult<T> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|error| AppError::Internal(format!("kunci sesi checkout rusak: {error}")))?;
        Ok(apply(&mut sessions))
    }

    fn with_session<T>(
        &self,
        session_id: SessionId,
        apply: impl FnOnce(&mut CheckoutSession) -> T,
    ) -> AppResult<T> {
        self.with_sessions(|sessions| {
            sessions
                .get_mut(&session_id.as_uuid())
                .map(apply)
                .ok_or_else(|| AppError::NotFound("sesi checkout tidak ditemukan".to_owned()))
        })?
    }
}

fn random_object_name(extension: Option<&str>) -> AppResult<String> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate object name: {error}")))?;

    let mut name = String::with_capacity(40);
    for byte in bytes {
        let _ = write!(name, "{byte:02x}");
    }
    if let Some(extension) = extension {
        let _ = write!(name, ".{extension}");
    }
    Ok(name)
}

#[cfg(test)]
mod tests;
