//! Wall clock.

use butik_application::Clock;
use chrono::{DateTime, Utc};

/// System wall clock implementation of the clock port.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
