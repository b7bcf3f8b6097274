use chrono::{DateTime, Utc};

use crate::domain::ports::Clock;

/// Wall clock. Tests swap in a manual implementation instead.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
