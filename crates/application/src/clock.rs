use chrono::{DateTime, Utc};

/// Wall-clock port so time-dependent policy is deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
