//! Admin alerts and buyer WhatsApp message composition.

use std::sync::Arc;

use butik_core::AppResult;
use butik_domain::{Order, OrderStatus, PhoneNumber, format_rupiah};
use chrono::Duration;

use crate::clock::Clock;
use crate::ports::AdminMessenger;

/// New submissions older than this are assumed already seen by the admin
/// and are not re-announced.
const ALERT_MAX_AGE: Duration = Duration::hours(1);

/// Composes and delivers order notifications.
///
/// Delivery is best effort: callers treat a failed alert as a logging
/// matter, never as a reason to fail the order itself.
pub struct NotificationService {
    messenger: Arc<dyn AdminMessenger>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    /// Creates the service.
    #[must_use]
    pub fn new(messenger: Arc<dyn AdminMessenger>, clock: Arc<dyn Clock>) -> Self {
        Self { messenger, clock }
    }

    /// Announces a freshly submitted order to the admin channel.
    ///
    /// Skips silently when the order is older than [`ALERT_MAX_AGE`] or has
    /// no payment proof attached; both indicate the call arrived through a
    /// replayed or out-of-band path.
    pub async fn notify_payment_proof(&self, order: &Order) -> AppResult<()> {
        let age = self.clock.now() - order.created_at;
        if age > ALERT_MAX_AGE {
            tracing::warn!(
                order_number = %order.order_number,
                age_minutes = age.num_minutes(),
                "melewati notifikasi: pesanan sudah terlalu lama"
            );
            return Ok(());
        }

        let Some(proof_url) = order.payment_proof_url.as_deref() else {
            tracing::warn!(
                order_number = %order.order_number,
                "melewati notifikasi: pesanan tanpa bukti pembayaran"
            );
            return Ok(());
        };

        let message = payment_proof_message(order, proof_url);
        self.messenger.send_admin_alert(&message).await?;

        tracing::info!(
            order_number = %order.order_number,
            customer = %mask_name(&order.customer_name),
            phone = %mask_phone(&order.customer_phone),
            "notifikasi pesanan baru terkirim"
        );
        Ok(())
    }
}

/// Builds a `wa.me` deep link carrying the status message for the buyer.
///
/// Returns `None` for statuses with no buyer-facing copy and for phone
/// numbers that no longer validate.
#[must_use]
pub fn whatsapp_status_url(order: &Order, tracking_number: Option<&str>) -> Option<String> {
    let text = status_message(order, tracking_number)?;
    let phone = PhoneNumber::new(order.customer_phone.clone()).ok()?;

    let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    Some(format!("https://wa.me/{}?text={encoded}", phone.international()))
}

fn status_message(order: &Order, tracking_number: Option<&str>) -> Option<String> {
    let name = &order.customer_name;
    let number = order.order_number.as_str();

    match order.status {
        OrderStatus::Processing => Some(format!(
            "Halo {name}, pembayaran Anda untuk pesanan {number} telah kami \
             terima. Pesanan sedang kami proses. Terima kasih telah berbelanja \
             di Butik Mas Anandia."
        )),
        OrderStatus::Shipped => {
            let mut message = format!(
                "Halo {name}, pesanan {number} telah kami kirim melalui {}.",
                order.shipping_method
            );
            if let Some(tracking) = tracking_number {
                message.push_str(&format!(" Nomor resi: {tracking}."));
            }
            Some(message)
        }
        OrderStatus::Completed => Some(format!(
            "Halo {name}, pesanan {number} telah selesai. Terima kasih atas \
             kepercayaan Anda pada Butik Mas Anandia."
        )),
        OrderStatus::Cancelled => Some(format!(
            "Halo {name}, mohon maaf, pesanan {number} telah dibatalkan. \
             Silakan hubungi kami untuk informasi lebih lanjut."
        )),
        OrderStatus::PendingPayment | OrderStatus::PaymentUploaded => None,
    }
}

fn payment_proof_message(order: &Order, proof_url: &str) -> String {
    format!(
        "🔔 *PESANAN BARU*\n\n\
         No. Pesanan: {number}\n\
         Nama: {name}\n\
         WhatsApp: {phone}\n\
         Produk: {product} ({weight})\n\
         Jumlah: {quantity}\n\
         Total: {total}\n\
         Pengiriman: {shipping}\n\
         Alamat: {address}\n\n\
         KODE KONFIRMASI: `{code}`\n\
         Bukti bayar: {proof_url}",
        number = order.order_number,
        name = order.customer_name,
        phone = order.customer_phone,
        product = order.product_name,
        weight = order.product_weight,
        quantity = order.quantity,
        total = format_rupiah(order.total_price),
        shipping = order.shipping_method,
        address = order.customer_address,
        code = order.confirmation_code.as_str(),
    )
}

/// Keeps the first name, masks the rest. For log lines only.
fn mask_name(name: &str) -> String {
    match name.split_whitespace().next() {
        Some(first) => format!("{first} ***"),
        None => "***".to_owned(),
    }
}

/// Keeps the last four digits. For log lines only.
fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        return "***".to_owned();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("***{tail}")
}
