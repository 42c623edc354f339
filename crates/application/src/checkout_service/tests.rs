use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use butik_core::{AppError, AppResult};
use butik_domain::{
    BrowserEnvironment, BrowserFingerprint, CheckoutStep, Order, OrderId, OrderNumber,
    OrderStatus, Product, ProductId, ProductInput, ProofImage, RegionRef,
};
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::ports::{NewOrder, ObjectStorage, OrderRepository, ProductRepository};
use crate::{AbuseControlService, AdminMessenger, NotificationService};

use super::{CheckoutService, FormUpdate, RegionLevel, SessionId, StepOutcome};

struct FakeProductRepository {
    products: Vec<Product>,
}

#[async_trait]
impl ProductRepository for FakeProductRepository {
    async fn list_active(&self) -> AppResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|product| product.is_active)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        Ok(self.products.iter().find(|product| product.id == id).cloned())
    }

    async fn create(&self, _input: ProductInput) -> AppResult<Product> {
        Err(AppError::Internal("not used in these tests".to_owned()))
    }

    async fn update(&self, _id: ProductId, _input: ProductInput) -> AppResult<Product> {
        Err(AppError::Internal("not used in these tests".to_owned()))
    }

    async fn delete(&self, _id: ProductId) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeOrderRepository {
    orders: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderRepository for FakeOrderRepository {
    async fn create_order_with_payment_proof(&self, new_order: NewOrder) -> AppResult<Order> {
        let order = Order {
            id: OrderId::new(),
            order_number: new_order.order_number,
            customer_name: new_order.customer_name,
            customer_email: new_order.customer_email,
            customer_phone: new_order.customer_phone,
            customer_address: new_order.customer_address,
            shipping_method: new_order.shipping_method,
            product_name: new_order.product_name,
            product_weight: new_order.product_weight,
            product_price: new_order.product_price,
            quantity: new_order.quantity,
            total_price: new_order.total_price,
            payment_proof_url: Some(new_order.payment_proof_url),
            status: OrderStatus::PaymentUploaded,
            confirmation_code: new_order.confirmation_code,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.orders.lock().await.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .await
            .iter()
            .find(|order| order.id == id)
            .cloned())
    }

    async fn find_by_order_number(&self, order_number: &OrderNumber) -> AppResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .await
            .iter()
            .find(|order| order.order_number == *order_number)
            .cloned())
    }

    async fn find_for_customer(
        &self,
        order_number: &OrderNumber,
        confirmation_code: &str,
    ) -> AppResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .await
            .iter()
            .find(|order| {
                order.order_number == *order_number
                    && order.confirmation_code.matches(confirmation_code)
            })
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.lock().await.clone())
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| AppError::NotFound("order".to_owned()))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_pending_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut orders = self.orders.lock().await;
        let before = orders.len();
        orders.retain(|order| {
            order.status != OrderStatus::PendingPayment || order.created_at >= cutoff
        });
        Ok((before - orders.len()) as u64)
    }
}

#[derive(Default)]
struct FakeStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(
        &self,
        bucket: &str,
        object_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<()> {
        self.objects
            .lock()
            .await
            .insert(format!("{bucket}/{object_name}"), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, object_name: &str) -> String {
        format!("https://storage.test/{bucket}/{object_name}")
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        object_name: &str,
        _expires_in_seconds: u32,
    ) -> AppResult<String> {
        Ok(format!("https://storage.test/signed/{bucket}/{object_name}"))
    }
}

#[derive(Default)]
struct SilentMessenger;

#[async_trait]
impl AdminMessenger for SilentMessenger {
    async fn send_admin_alert(&self, _text: &str) -> AppResult<()> {
        Ok(())
    }
}

struct FixedClock {
    now: StdMutex<DateTime<Utc>>,
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|_| unreachable!())
    }
}

fn product(active: bool) -> Product {
    Product {
        id: ProductId::new(),
        name: "Emas Batangan Antam".to_owned(),
        weight: "1 gram".to_owned(),
        price: 1_250_000,
        image_url: None,
        sort_order: 1,
        is_active: active,
        created_at: Utc::now(),
    }
}

fn organic_environment() -> BrowserEnvironment {
    BrowserEnvironment {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) Chrome/127.0".to_owned(),
        plugin_count: Some(3),
        language_count: Some(2),
        screen_width: Some(1920),
        screen_height: Some(1080),
        color_depth: Some(24),
        hardware_concurrency: Some(8),
        has_chrome_object: Some(true),
        chrome_runtime_intact: Some(true),
        mouse_move_count: 20,
        elapsed_since_load_ms: 30_000,
        ..BrowserEnvironment::default()
    }
}

fn signals() -> BrowserFingerprint {
    BrowserFingerprint {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) Chrome/127.0".to_owned(),
        language: "id-ID".to_owned(),
        screen_resolution: "1920x1080x24".to_owned(),
        timezone: "Asia/Jakarta".to_owned(),
        platform: "Linux x86_64".to_owned(),
        cookie_enabled: true,
        do_not_track: None,
        plugins: vec!["PDF Viewer".to_owned()],
        canvas: "canvas-hash".to_owned(),
    }
}

fn valid_proof() -> ProofImage {
    ProofImage {
        file_name: "bukti.jpg".to_owned(),
        content_type: "image/jpeg".to_owned(),
        bytes: vec![0xFFu8; 1024],
    }
}

struct Harness {
    service: CheckoutService,
    orders: Arc<FakeOrderRepository>,
    storage: Arc<FakeStorage>,
    product_id: ProductId,
}

fn harness_with(products: Vec<Product>) -> Harness {
    let product_id = products
        .first()
        .map(|product| product.id)
        .unwrap_or_default();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock {
        now: StdMutex::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
                .single()
                .unwrap_or_else(|| unreachable!()),
        ),
    });
    let orders = Arc::new(FakeOrderRepository::default());
    let storage = Arc::new(FakeStorage::default());
    let abuse = Arc::new(AbuseControlService::new(Arc::clone(&clock)));
    let notifications = Arc::new(NotificationService::new(
        Arc::new(SilentMessenger),
        Arc::clone(&clock),
    ));
    let service = CheckoutService::new(
        Arc::new(FakeProductRepository { products }),
        Arc::clone(&orders) as Arc<dyn OrderRepository>,
        Arc::clone(&storage) as Arc<dyn ObjectStorage>,
        abuse,
        notifications,
    );
    Harness {
        service,
        orders,
        storage,
        product_id,
    }
}

async fn open_session(harness: &Harness) -> SessionId {
    let opened = harness
        .service
        .start_session(harness.product_id, 2, &signals(), &organic_environment())
        .await;
    opened
        .map(|(session_id, _)| session_id)
        .unwrap_or_else(|_| unreachable!("organic session must open"))
}

fn region(id: &str, name: &str) -> RegionRef {
    RegionRef {
        id: id.to_owned(),
        name: name.to_owned(),
    }
}

fn fill_buyer_info(harness: &Harness, session_id: SessionId, phone: &str, email: &str) {
    let update = FormUpdate {
        name: Some("Budi Santoso".to_owned()),
        email: Some(email.to_owned()),
        phone: Some(phone.to_owned()),
        address_detail: Some("Jl. Merdeka No. 45, RT 02".to_owned()),
        data_confirmed: Some(true),
        ..FormUpdate::default()
    };
    assert!(harness.service.update_form(session_id, update).is_ok());

    for (level, reference) in [
        (RegionLevel::Province, region("32", "Jawa Barat")),
        (RegionLevel::Regency, region("3204", "Kabupaten Bandung")),
        (RegionLevel::District, region("320404", "Katapang")),
        (RegionLevel::Village, region("3204041", "Banyusari")),
    ] {
        assert!(harness.service.select_region(session_id, level, reference).is_ok());
    }
}

fn advance_to_proof_upload(harness: &Harness, session_id: SessionId) {
    for expected in [
        CheckoutStep::Shipping,
        CheckoutStep::InvoicePreview,
        CheckoutStep::Payment,
        CheckoutStep::ProofUpload,
    ] {
        let outcome = harness.service.advance(session_id);
        match outcome {
            Ok(StepOutcome::Advanced(step)) => assert_eq!(step, expected),
            other => panic_blocked(&format!("{other:?}")),
        }
    }
}

fn panic_blocked(detail: &str) {
    unreachable!("wizard unexpectedly blocked: {detail}");
}

#[tokio::test]
async fn automated_environment_cannot_open_a_session() {
    let harness = harness_with(vec![product(true)]);
    let mut environment = organic_environment();
    environment.webdriver = true;
    environment.user_agent = "HeadlessChrome/127.0".to_owned();

    let result = harness
        .service
        .start_session(harness.product_id, 1, &signals(), &environment)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn inactive_product_cannot_be_checked_out() {
    let harness = harness_with(vec![product(false)]);
    let result = harness
        .service
        .start_session(harness.product_id, 1, &signals(), &organic_environment())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn full_walkthrough_persists_the_order_and_proof() {
    let harness = harness_with(vec![product(true)]);
    let session_id = open_session(&harness).await;
    fill_buyer_info(&harness, session_id, "08123456789", "budi@gmail.com");
    advance_to_proof_upload(&harness, session_id);

    let submitted = harness.service.submit(session_id, valid_proof()).await;
    assert!(submitted.is_ok());
    let receipt = submitted.unwrap_or_else(|_| unreachable!());
    // 2 x 1,250,000 plus free pickup.
    assert_eq!(receipt.total_price, 2_500_000);

    let orders = harness.orders.orders.lock().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::PaymentUploaded);
    assert_eq!(orders[0].order_number, receipt.order_number);
    assert!(
        orders[0]
            .customer_address
            .ends_with("Banyusari, Katapang, Kabupaten Bandung, Jawa Barat")
    );

    let objects = harness.storage.objects.lock().await;
    assert_eq!(objects.len(), 1);
    assert!(objects.keys().all(|key| key.starts_with("payment-proofs/")));

    // The session is gone once the order exists.
    drop(objects);
    drop(orders);
    assert!(matches!(
        harness.service.session(session_id),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn submission_requires_the_proof_upload_step() {
    let harness = harness_with(vec![product(true)]);
    let session_id = open_session(&harness).await;

    let result = harness.service.submit(session_id, valid_proof()).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn oversized_proof_does_not_create_an_order() {
    let harness = harness_with(vec![product(true)]);
    let session_id = open_session(&harness).await;
    fill_buyer_info(&harness, session_id, "08123456789", "budi@gmail.com");
    advance_to_proof_upload(&harness, session_id);

    let proof = ProofImage {
        file_name: "bukti.png".to_owned(),
        content_type: "image/png".to_owned(),
        bytes: vec![0u8; butik_domain::MAX_PROOF_BYTES + 1],
    };
    let result = harness.service.submit(session_id, proof).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(harness.orders.orders.lock().await.is_empty());
}

#[tokio::test]
async fn eleventh_order_for_one_phone_is_rate_limited() {
    let harness = harness_with(vec![product(true)]);

    for attempt in 0..10 {
        let session_id = open_session(&harness).await;
        // Fresh email each time so only the phone counter fills up.
        let email = format!("budi{attempt}@gmail.com");
        fill_buyer_info(&harness, session_id, "08123456789", &email);
        advance_to_proof_upload(&harness, session_id);
        assert!(harness.service.submit(session_id, valid_proof()).await.is_ok());
    }

    let session_id = open_session(&harness).await;
    fill_buyer_info(&harness, session_id, "08123456789", "budi99@gmail.com");
    advance_to_proof_upload(&harness, session_id);

    let result = harness.service.submit(session_id, valid_proof()).await;
    match result {
        Err(AppError::RateLimited(message)) => {
            assert!(message.contains("melebihi batas pemesanan"), "got {message}");
        }
        other => panic_blocked(&format!("{other:?}")),
    }
    assert_eq!(harness.orders.orders.lock().await.len(), 10);
    // The denied session survives so the buyer can retry later.
    assert!(harness.service.session(session_id).is_ok());
}

#[tokio::test]
async fn unknown_session_is_reported_as_missing() {
    let harness = harness_with(vec![product(true)]);
    let result = harness.service.advance(SessionId::new());
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
