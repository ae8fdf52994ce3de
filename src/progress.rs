//! Transfer progress tracking.
//!
//! A [`Progress`] is shared between the task moving bytes and any number of
//! observers. Both counters sit behind one reader/writer lock, so a reader
//! never sees `current` from one update paired with a stale `total`.

use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Counters {
    current: i64,
    total: i64,
}

/// Current/total counter pair for an upload or download.
#[derive(Debug, Default)]
pub struct Progress {
    counters: RwLock<Counters>,
}

impl Progress {
    /// Creates a tracker for a transfer of `total` units (usually bytes).
    #[must_use]
    pub fn new(total: i64) -> Self {
        Self {
            counters: RwLock::new(Counters { current: 0, total }),
        }
    }

    /// Overwrites the current position.
    pub fn set(&self, value: i64) {
        self.counters.write().current = value;
    }

    /// Advances the current position by `delta`, saturating on overflow.
    pub fn add(&self, delta: i64) {
        let mut counters = self.counters.write();
        counters.current = counters.current.saturating_add(delta);
    }

    #[must_use]
    pub fn get(&self) -> i64 {
        self.counters.read().current
    }

    /// Returns `(total, current)` read together.
    #[must_use]
    pub fn data(&self) -> (i64, i64) {
        let counters = self.counters.read();
        (counters.total, counters.current)
    }

    /// `current / total * 100`.
    ///
    /// With a zero total this follows IEEE-754: `NaN` when nothing has been
    /// transferred, infinity otherwise.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        let counters = self.counters.read();
        counters.current as f64 / counters.total as f64 * 100.0
    }

    /// Whether the transfer has reached its total.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let counters = self.counters.read();
        counters.current >= counters.total
    }
}
