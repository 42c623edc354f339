//! Checkout abuse gates: per-identifier rate limiting and bot screening.

use std::sync::Arc;

use butik_core::{AppError, AppResult};
use butik_domain::{BrowserEnvironment, detect};
use chrono::Duration;

use crate::clock::Clock;
use crate::rate_limit_service::{Admission, RateLimiter, format_time_remaining};

/// Evaluates submission attempts against three independent limiters and
/// screens browser environments for automation.
///
/// Fingerprints get a shorter block than phone and email: a device hash is
/// cheap to rotate, contact details are not.
pub struct AbuseControlService {
    fingerprint: RateLimiter,
    phone: RateLimiter,
    email: RateLimiter,
}

impl AbuseControlService {
    /// Creates the service with the storefront's limiter settings.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            fingerprint: RateLimiter::new(
                10,
                Duration::hours(1),
                Duration::hours(6),
                Arc::clone(&clock),
            ),
            phone: RateLimiter::new(
                10,
                Duration::hours(1),
                Duration::hours(12),
                Arc::clone(&clock),
            ),
            email: RateLimiter::new(10, Duration::hours(1), Duration::hours(12), clock),
        }
    }

    /// Returns the most restrictive admission across all three identifiers.
    ///
    /// Any denial wins; among allowances the lowest remaining count is
    /// reported, so the caller always sees the tightest gate.
    pub fn evaluate(&self, fingerprint: &str, phone: &str, email: &str) -> AppResult<Admission> {
        let admissions = [
            self.fingerprint.check(fingerprint)?,
            self.phone.check(phone)?,
            self.email.check(email)?,
        ];

        let mut most_restrictive = admissions[0];
        for admission in &admissions[1..] {
            let tighter = match (most_restrictive.allowed, admission.allowed) {
                (true, false) => true,
                (false, true) => false,
                _ => admission.remaining < most_restrictive.remaining,
            };
            if tighter {
                most_restrictive = *admission;
            }
        }

        if !most_restrictive.allowed {
            tracing::warn!(
                reset_in_minutes = most_restrictive.reset_in.num_minutes(),
                "pengiriman pesanan ditolak oleh rate limiter"
            );
        } else if most_restrictive.remaining <= 1 {
            tracing::warn!(
                remaining = most_restrictive.remaining,
                "identitas mendekati batas pemesanan"
            );
        }

        Ok(most_restrictive)
    }

    /// Counts one accepted submission against all three identifiers.
    pub fn record(&self, fingerprint: &str, phone: &str, email: &str) -> AppResult<()> {
        self.fingerprint.record(fingerprint)?;
        self.phone.record(phone)?;
        self.email.record(email)
    }

    /// Drops idle limiter entries. Returns how many were removed in total.
    pub fn sweep(&self) -> AppResult<usize> {
        Ok(self.fingerprint.sweep()? + self.phone.sweep()? + self.email.sweep()?)
    }

    /// Rejects sessions whose browser environment scores as automated.
    pub fn screen_environment(&self, environment: &BrowserEnvironment) -> AppResult<()> {
        let verdict = detect(environment);
        if verdict.is_bot {
            tracing::warn!(
                confidence = verdict.confidence,
                reasons = ?verdict.reasons,
                "sesi checkout ditolak: lingkungan browser terindikasi otomatis"
            );
            return Err(AppError::Forbidden(
                "Permintaan tidak dapat diproses.".to_string(),
            ));
        }
        Ok(())
    }

    /// User-facing denial message for a blocked admission.
    #[must_use]
    pub fn denial_message(admission: &Admission) -> String {
        format!(
            "Anda telah melebihi batas pemesanan. Coba lagi dalam {}.",
            format_time_remaining(admission.reset_in)
        )
    }
}
