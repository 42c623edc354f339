//! Weighted-sum bot heuristics.
//!
//! The storefront client reports its environment; the server runs an
//! unordered battery of independent checks, each adding a fixed weight to a
//! cumulative score when triggered. The weights and the threshold are policy
//! data in [`CHECKS`] and [`BOT_SCORE_THRESHOLD`], tunable without touching
//! the check implementations. A missing or unreadable signal leaves its
//! check untriggered: one flaky probe must never lock a real buyer out.

use serde::{Deserialize, Serialize};

/// Cumulative score at or above which the caller is classified as a bot.
pub const BOT_SCORE_THRESHOLD: u32 = 60;

/// Environment signals reported by the storefront client.
///
/// Optional fields model signals the probe could not read; those checks
/// fail open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserEnvironment {
    /// Full user-agent string.
    pub user_agent: String,
    /// `navigator.webdriver` or any webdriver script hook present.
    pub webdriver: bool,
    /// DOM automation or unwrapped automation markers present.
    pub automation_markers: bool,
    /// Number of installed plugins.
    pub plugin_count: Option<u32>,
    /// Number of configured languages.
    pub language_count: Option<u32>,
    /// Screen width in pixels.
    pub screen_width: Option<u32>,
    /// Screen height in pixels.
    pub screen_height: Option<u32>,
    /// Screen color depth in bits.
    pub color_depth: Option<u32>,
    /// Whether any touch input is available.
    pub touch_support: Option<bool>,
    /// Whether a WebGL context could be created.
    pub webgl_supported: Option<bool>,
    /// Unmasked WebGL renderer string, when exposed.
    pub webgl_renderer: Option<String>,
    /// Whether `window.chrome` exists.
    pub has_chrome_object: Option<bool>,
    /// Whether `chrome.runtime` looks intact (sendMessage present).
    pub chrome_runtime_intact: Option<bool>,
    /// Whether the Permissions API is available.
    pub has_permissions_api: Option<bool>,
    /// Whether the Notification API is available.
    pub has_notification_api: Option<bool>,
    /// Network round-trip estimate in milliseconds.
    pub connection_rtt_ms: Option<u32>,
    /// Reported device memory in gigabytes.
    pub device_memory_gb: Option<f64>,
    /// Reported logical CPU core count. Real browsers always expose this,
    /// so an absent value is itself suspicious.
    pub hardware_concurrency: Option<u32>,
    /// Mouse-move events observed since page load.
    pub mouse_move_count: u32,
    /// Milliseconds elapsed since page load when the probe ran.
    pub elapsed_since_load_ms: u64,
    /// Whether sessionStorage is available.
    pub has_session_storage: Option<bool>,
    /// Whether localStorage is available.
    pub has_local_storage: Option<bool>,
    /// Whether IndexedDB is available.
    pub has_indexed_db: Option<bool>,
    /// Whether a 2D canvas context is available.
    pub has_canvas: Option<bool>,
    /// Whether WebSocket is available.
    pub has_web_socket: Option<bool>,
}

/// Outcome of one scoring pass. Transient: recomputed per call, never
/// merged across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotDetectionResult {
    /// True when the cumulative score reached the threshold.
    pub is_bot: bool,
    /// Cumulative score clamped to 0–100.
    pub confidence: u32,
    /// Names of triggered checks, in table order.
    pub reasons: Vec<String>,
}

struct Check {
    reason: &'static str,
    weight: u32,
    triggered: fn(&BrowserEnvironment) -> bool,
}

/// The policy table: check name, weight, predicate. Checks are independent
/// and additive, so their order only affects the order of `reasons`.
const CHECKS: &[Check] = &[
    Check {
        reason: "Bot user agent detected",
        weight: 30,
        triggered: user_agent_has_bot_pattern,
    },
    Check {
        reason: "WebDriver detected",
        weight: 40,
        triggered: |env| env.webdriver,
    },
    Check {
        reason: "DOM automation detected",
        weight: 35,
        triggered: |env| env.automation_markers,
    },
    Check {
        reason: "No plugins detected",
        weight: 5,
        triggered: |env| env.plugin_count == Some(0),
    },
    Check {
        reason: "No languages detected",
        weight: 5,
        triggered: |env| env.language_count.unwrap_or(0) == 0,
    },
    Check {
        reason: "Invalid screen metrics",
        weight: 10,
        triggered: |env| {
            env.screen_width == Some(0) || env.screen_height == Some(0) || env.color_depth == Some(0)
        },
    },
    Check {
        reason: "Mobile device without touch support",
        weight: 5,
        triggered: mobile_without_touch,
    },
    Check {
        reason: "WebGL unavailable or software renderer",
        weight: 10,
        triggered: software_webgl,
    },
    Check {
        reason: "Chrome user agent without chrome object",
        weight: 15,
        triggered: inconsistent_chrome,
    },
    Check {
        reason: "Permissions API not available",
        weight: 10,
        triggered: |env| env.has_permissions_api == Some(false),
    },
    Check {
        reason: "Notification API not available",
        weight: 5,
        triggered: |env| env.has_notification_api == Some(false),
    },
    Check {
        reason: "Invalid RTT value",
        weight: 5,
        triggered: |env| env.connection_rtt_ms == Some(0),
    },
    Check {
        reason: "Battery anomaly",
        weight: 5,
        // Placeholder kept for weight-table stability; no reliable signal.
        triggered: |_| false,
    },
    Check {
        reason: "Suspiciously low device memory",
        weight: 8,
        triggered: |env| env.device_memory_gb.is_some_and(|gb| gb < 0.5),
    },
    Check {
        reason: "Invalid hardware concurrency",
        weight: 8,
        triggered: |env| match env.hardware_concurrency {
            None | Some(0) => true,
            Some(cores) => cores > 64,
        },
    },
    Check {
        reason: "No natural mouse movement detected",
        weight: 15,
        triggered: |env| env.elapsed_since_load_ms > 5_000 && env.mouse_move_count < 3,
    },
    Check {
        reason: "Keyboard anomaly",
        weight: 10,
        // Placeholder kept for weight-table stability; no reliable signal.
        triggered: |_| false,
    },
    Check {
        reason: "Missing critical browser features",
        weight: 20,
        triggered: missing_critical_features,
    },
];

const BOT_UA_PATTERNS: &[&str] = &[
    "bot", "crawl", "spider", "slurp", "mediapartners", "headless", "phantom", "selenium",
    "webdriver", "puppeteer", "playwright", "scraper", "curl", "wget", "python", "java", "perl",
    "ruby", "go-http", "okhttp", "apache", "http_request", "scrapy",
];

fn user_agent_has_bot_pattern(env: &BrowserEnvironment) -> bool {
    let ua = env.user_agent.to_lowercase();
    BOT_UA_PATTERNS.iter().any(|pattern| ua.contains(pattern))
}

fn mobile_without_touch(env: &BrowserEnvironment) -> bool {
    let ua = env.user_agent.to_lowercase();
    let mobile = ["mobile", "android", "iphone", "ipad"]
        .iter()
        .any(|marker| ua.contains(marker));

    mobile && env.touch_support == Some(false)
}

fn software_webgl(env: &BrowserEnvironment) -> bool {
    if env.webgl_supported == Some(false) {
        return true;
    }

    env.webgl_renderer
        .as_deref()
        .is_some_and(|renderer| renderer.contains("SwiftShader") || renderer.contains("llvmpipe"))
}

fn inconsistent_chrome(env: &BrowserEnvironment) -> bool {
    let claims_chrome = env.user_agent.contains("Chrome");

    if claims_chrome && env.has_chrome_object == Some(false) {
        return true;
    }

    env.has_chrome_object == Some(true) && env.chrome_runtime_intact == Some(false)
}

fn missing_critical_features(env: &BrowserEnvironment) -> bool {
    let missing = [
        env.has_session_storage,
        env.has_local_storage,
        env.has_indexed_db,
        env.has_canvas,
        env.has_web_socket,
    ]
    .iter()
    .filter(|feature| **feature == Some(false))
    .count();

    missing >= 3
}

/// Runs the full check battery against a signal set.
#[must_use]
pub fn detect(env: &BrowserEnvironment) -> BotDetectionResult {
    let mut score = 0u32;
    let mut reasons = Vec::new();

    for check in CHECKS {
        if (check.triggered)(env) {
            score += check.weight;
            reasons.push(check.reason.to_owned());
        }
    }

    BotDetectionResult {
        is_bot: score >= BOT_SCORE_THRESHOLD,
        confidence: score.min(100),
        reasons,
    }
}
