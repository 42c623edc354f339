//! Deterministic device fingerprinting.
//!
//! The storefront collects ambient browser signals and submits them with the
//! checkout session. The token is a pure function of the signal set: the same
//! device reports the same signals within a session, so repeated calls yield
//! the same token. Collisions across distinct devices are tolerated; the
//! token is a best-effort rate-limit key, not an identity.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Ambient browser signals reported by the storefront client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserFingerprint {
    /// Full user-agent string.
    pub user_agent: String,
    /// Primary language, e.g. `id-ID`.
    pub language: String,
    /// Screen dimensions as `WIDTHxHEIGHT`.
    pub screen_resolution: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Navigator platform value.
    pub platform: String,
    /// Whether cookies are enabled.
    pub cookie_enabled: bool,
    /// Do-not-track header value, when exposed.
    pub do_not_track: Option<String>,
    /// Installed plugin names.
    pub plugins: Vec<String>,
    /// Tail of the canvas draw output (rendering varies per device).
    pub canvas: String,
}

/// Derives the compact printable token for a signal set.
#[must_use]
pub fn fingerprint(signals: &BrowserFingerprint) -> String {
    let mut hasher = Sha256::new();

    // Field-by-field feeding with separators keeps the digest independent of
    // any serialization format.
    hasher.update(signals.user_agent.as_bytes());
    hasher.update([0]);
    hasher.update(signals.language.as_bytes());
    hasher.update([0]);
    hasher.update(signals.screen_resolution.as_bytes());
    hasher.update([0]);
    hasher.update(signals.timezone.as_bytes());
    hasher.update([0]);
    hasher.update(signals.platform.as_bytes());
    hasher.update([0]);
    hasher.update([u8::from(signals.cookie_enabled)]);
    hasher.update([0]);
    hasher.update(signals.do_not_track.as_deref().unwrap_or("-").as_bytes());
    hasher.update([0]);
    for plugin in &signals.plugins {
        hasher.update(plugin.as_bytes());
        hasher.update([1]);
    }
    hasher.update([0]);
    hasher.update(signals.canvas.as_bytes());

    let digest = hasher.finalize();
    let token = digest
        .iter()
        .take(8)
        .fold(String::with_capacity(16), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        });

    format!("fp_{token}")
}

#[cfg(test)]
mod tests {
    use super::{BrowserFingerprint, fingerprint};

    fn signals() -> BrowserFingerprint {
        BrowserFingerprint {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Chrome/127.0".to_owned(),
            language: "id-ID".to_owned(),
            screen_resolution: "1920x1080".to_owned(),
            timezone: "Asia/Jakarta".to_owned(),
            platform: "Linux x86_64".to_owned(),
            cookie_enabled: true,
            do_not_track: None,
            plugins: vec!["PDF Viewer".to_owned(), "Chrome PDF Viewer".to_owned()],
            canvas: "AAAF0klEQVR4".to_owned(),
        }
    }

    #[test]
    fn identical_signals_yield_identical_tokens() {
        assert_eq!(fingerprint(&signals()), fingerprint(&signals()));
    }

    #[test]
    fn tokens_are_compact_and_printable() {
        let token = fingerprint(&signals());
        assert!(token.starts_with("fp_"));
        assert_eq!(token.len(), 19);
        assert!(token[3..].chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn any_signal_change_changes_the_token() {
        let mut changed = signals();
        changed.screen_resolution = "1366x768".to_owned();
        assert_ne!(fingerprint(&signals()), fingerprint(&changed));
    }

    #[test]
    fn plugin_boundaries_are_unambiguous() {
        let mut merged = signals();
        merged.plugins = vec!["PDF ViewerChrome PDF Viewer".to_owned()];
        assert_ne!(fingerprint(&signals()), fingerprint(&merged));
    }
}
