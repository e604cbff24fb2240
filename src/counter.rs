use crate::counter_range::CounterRange;
use crate::telemetry::{InvariantChecker, InvariantViolation};
use crate::{Stones, STONES_LIMIT};

/// The outcome of a single [`Counter::advance`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Counter value after the step (before boundary handling).
    pub stones: Stones,
    /// The step would have left the representable range, so the counter was
    /// reset to its start value instead.
    pub overflowed: bool,
}

/// The stone counter of a session.
///
/// The value is always kept inside the active [`CounterRange`]; every write
/// goes through [`CounterRange::clean`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    value: Stones,
    range: CounterRange,
}

impl Counter {
    /// A counter at the start value of `range`.
    #[must_use]
    pub fn new(range: CounterRange) -> Self {
        Self {
            value: range.start(),
            range,
        }
    }

    /// The current value.
    #[must_use]
    pub fn value(&self) -> Stones {
        self.value
    }

    /// The active range.
    #[must_use]
    pub fn range(&self) -> CounterRange {
        self.range
    }

    /// Switches to a new range, folding the current value into it.
    pub fn set_range(&mut self, range: CounterRange) {
        self.range = range;
        self.value = range.clean(self.value);
    }

    /// Writes a cleaned `raw` and returns the stored value.
    pub fn set(&mut self, raw: Stones) -> Stones {
        self.value = self.range.clean(raw);
        self.value
    }

    /// Returns to the start value.
    pub fn reset(&mut self) {
        self.value = self.range.start();
    }

    /// Re-applies [`CounterRange::clean`] to the current value.
    pub fn canonicalize(&mut self) {
        self.value = self.range.clean(self.value);
    }

    /// Steps by `direction` (`+1` or `-1`).
    ///
    /// Bounded modes wrap modulo twice the size. The boundary itself is left
    /// in place for [`settle_boundary`](Self::settle_boundary).
    pub fn advance(&mut self, direction: i64) -> Advance {
        let stepped = self
            .value
            .as_i64()
            .checked_add(direction)
            .filter(|v| v.unsigned_abs() < STONES_LIMIT.unsigned_abs());

        let Some(mut value) = stepped else {
            self.value = self.range.start();
            return Advance {
                stones: self.value,
                overflowed: true,
            };
        };

        let mode = self.range.mode();
        if !mode.is_unbounded() {
            value %= 2 * mode.size();
        }
        self.value = Stones::new(value);
        Advance {
            stones: self.value,
            overflowed: false,
        }
    }

    /// If the counter sits on the boundary, normalizes it (to zero going
    /// forward, to full going in reverse) and returns `true`.
    pub fn settle_boundary(&mut self) -> bool {
        if !self.range.is_boundary(self.value) {
            return false;
        }
        let mode = self.range.mode();
        self.value = if mode.reverse() {
            Stones::new(mode.size())
        } else {
            Stones::new(self.value % mode.size())
        };
        true
    }
}

impl InvariantChecker for Counter {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.range.contains(self.value) {
            return Err(
                InvariantViolation::new("Counter", "value outside its range").with_details(
                    format!(
                        "value={}, min={}, max={}",
                        self.value,
                        self.range.min(),
                        self.range.max()
                    ),
                ),
            );
        }
        Ok(())
    }
}
