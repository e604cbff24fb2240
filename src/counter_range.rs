//! Legal counter values for a mode, and the rule that folds any value into them.

use crate::mode::ModeDescriptor;
use crate::{Stones, STONES_LIMIT};

/// The start, bounds and boundary rules for one [`ModeDescriptor`].
///
/// | mode | start | min | max | boundary at |
/// |------|-------|-----|-----|-------------|
/// | infinity | 0 | 0 | `STONES_LIMIT` | never |
/// | bounded, forward | 0 | `1 - size` | `size - 1` | `size` |
/// | bounded, reverse | `size` | 0 | `2 * size - 1` | 0 |
///
/// ```
/// use jugger_stones::{CounterRange, ModeDescriptor, Stones};
///
/// let range = CounterRange::new(ModeDescriptor::bounded(20, false));
/// assert_eq!(range.clean(Stones::new(45)), Stones::new(5));
/// assert_eq!(range.clean(Stones::new(-30)), Stones::new(0));
///
/// let reverse = CounterRange::new(ModeDescriptor::bounded(20, true));
/// assert_eq!(reverse.clean(Stones::new(0)), Stones::new(20));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CounterRange {
    mode: ModeDescriptor,
}

impl CounterRange {
    /// The range of `mode`.
    #[must_use]
    pub const fn new(mode: ModeDescriptor) -> Self {
        Self { mode }
    }

    /// The mode this range belongs to.
    #[must_use]
    pub const fn mode(&self) -> ModeDescriptor {
        self.mode
    }

    /// Value after a reset.
    #[must_use]
    pub const fn start(&self) -> Stones {
        if self.mode.reverse() {
            Stones::new(self.mode.size())
        } else {
            Stones::ZERO
        }
    }

    /// Smallest legal value.
    #[must_use]
    pub const fn min(&self) -> Stones {
        if self.mode.is_unbounded() || self.mode.reverse() {
            Stones::ZERO
        } else {
            Stones::new(1 - self.mode.size())
        }
    }

    /// Largest legal value.
    #[must_use]
    pub const fn max(&self) -> Stones {
        if self.mode.is_unbounded() {
            Stones::new(STONES_LIMIT)
        } else if self.mode.reverse() {
            Stones::new(2 * self.mode.size() - 1)
        } else {
            Stones::new(self.mode.size() - 1)
        }
    }

    /// Returns `true` if `value` lies within `min..=max`.
    #[must_use]
    pub const fn contains(&self, value: Stones) -> bool {
        value.as_i64() >= self.min().as_i64() && value.as_i64() <= self.max().as_i64()
    }

    /// Returns `true` if a tick landing on `value` crosses the boundary.
    #[must_use]
    pub const fn is_boundary(&self, value: Stones) -> bool {
        if self.mode.is_unbounded() {
            false
        } else if self.mode.reverse() {
            value.as_i64() == 0
        } else {
            value.as_i64() == self.mode.size()
        }
    }

    /// Returns `true` when a counter whose magnitude is `magnitude` is fewer
    /// than `threshold` stones away from the boundary. Always `false` in
    /// infinity mode.
    #[must_use]
    pub const fn is_boundary_approach(&self, magnitude: i64, threshold: i64) -> bool {
        if self.mode.is_unbounded() {
            false
        } else if self.mode.reverse() {
            magnitude < threshold
        } else {
            self.mode.size() - magnitude < threshold
        }
    }

    /// Folds `raw` into the legal range.
    ///
    /// Below `min` resets to `start`. Above `max` wraps modulo the full cycle
    /// (and once more modulo the size if still too large). In infinity mode
    /// large values are kept. Zero in a reverse mode means "full".
    #[must_use]
    pub const fn clean(&self, raw: Stones) -> Stones {
        let mut value = raw.as_i64();
        if value < self.min().as_i64() {
            value = self.start().as_i64();
        } else if value > self.max().as_i64() && !self.mode.is_unbounded() {
            let size = self.mode.size();
            value %= 2 * size;
            if value > self.max().as_i64() {
                value %= size;
            }
        }
        if self.mode.reverse() && value == 0 {
            value = self.mode.size();
        }
        Stones::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(size: i64) -> CounterRange {
        CounterRange::new(ModeDescriptor::bounded(size, false))
    }

    fn reverse(size: i64) -> CounterRange {
        CounterRange::new(ModeDescriptor::bounded(size, true))
    }

    fn infinity() -> CounterRange {
        CounterRange::new(ModeDescriptor::unbounded())
    }

    #[test]
    fn bounds_per_mode() {
        let bounds = |r: CounterRange| (r.start().as_i64(), r.min().as_i64(), r.max().as_i64());
        assert_eq!(bounds(forward(100)), (0, -99, 99));
        assert_eq!(bounds(reverse(100)), (100, 0, 199));
        assert_eq!(bounds(infinity()), (0, 0, STONES_LIMIT));
    }

    #[test]
    fn clean_forward() {
        let r = forward(20);
        assert_eq!(r.clean(Stones::new(7)), Stones::new(7));
        assert_eq!(r.clean(Stones::new(-19)), Stones::new(-19));
        assert_eq!(r.clean(Stones::new(-20)), Stones::new(0));
        assert_eq!(r.clean(Stones::new(20)), Stones::new(0));
        assert_eq!(r.clean(Stones::new(39)), Stones::new(19));
        assert_eq!(r.clean(Stones::new(45)), Stones::new(5));
    }

    #[test]
    fn clean_reverse() {
        let r = reverse(20);
        assert_eq!(r.clean(Stones::new(0)), Stones::new(20));
        assert_eq!(r.clean(Stones::new(-1)), Stones::new(20));
        assert_eq!(r.clean(Stones::new(39)), Stones::new(39));
        assert_eq!(r.clean(Stones::new(40)), Stones::new(20));
        assert_eq!(r.clean(Stones::new(41)), Stones::new(1));
    }

    #[test]
    fn clean_infinity_keeps_large_values() {
        let r = infinity();
        assert_eq!(r.clean(Stones::new(1_000_000)), Stones::new(1_000_000));
        assert_eq!(r.clean(Stones::new(-4)), Stones::new(0));
    }

    #[test]
    fn clean_is_idempotent_on_samples() {
        for r in [forward(1), forward(7), reverse(1), reverse(7), infinity()] {
            for raw in -30..30 {
                let once = r.clean(Stones::new(raw));
                assert_eq!(r.clean(once), once, "{:?} raw {}", r.mode(), raw);
                assert!(r.contains(once));
            }
        }
    }

    #[test]
    fn boundaries() {
        assert!(forward(20).is_boundary(Stones::new(20)));
        assert!(!forward(20).is_boundary(Stones::new(0)));
        assert!(reverse(20).is_boundary(Stones::new(0)));
        assert!(!infinity().is_boundary(Stones::new(0)));
    }

    #[test]
    fn boundary_approach() {
        assert!(forward(100).is_boundary_approach(91, 10));
        assert!(!forward(100).is_boundary_approach(90, 10));
        assert!(reverse(100).is_boundary_approach(9, 10));
        assert!(!reverse(100).is_boundary_approach(10, 10));
        assert!(!infinity().is_boundary_approach(0, 10));
    }
}
