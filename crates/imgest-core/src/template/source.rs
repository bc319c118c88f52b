//! Clock and random-token sources injected into template resolution.

use chrono::{DateTime, FixedOffset, Local};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Wall clock used for the `%today_*%`, `%year%`, `%month%`, and `%timestamp%` tokens.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Source of short random tokens (`%random%` and empty-filename fallbacks).
pub trait TokenSource: Send + Sync {
    /// Returns `len` lowercase alphanumeric characters.
    fn token(&self, len: usize) -> String;
}

/// Thread-local RNG backed tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn token(&self, len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }
}
