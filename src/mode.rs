//! Resolution of raw [`Preferences`] into the active counting mode.
//!
//! A [`ModeDescriptor`] is the resolved, validated view of the mode selector.
//! [`ModePreferences`] owns the raw values and performs every fallback: unknown
//! selectors, non-finite custom values and non-positive intervals all degrade
//! to defaults and are reported as `Configuration` violations.

use std::sync::Arc;

use web_time::Duration;

use crate::counter_range::CounterRange;
use crate::preferences::{
    Preferences, CUSTOM_MODE, DEFAULT_INTERVAL_CUSTOM_SECS, DEFAULT_INTERVAL_MS, DEFAULT_MODE_SIZE,
    UNBOUNDED_MODE,
};
use crate::report_violation_to;
use crate::telemetry::{ViolationKind, ViolationObserver, ViolationSeverity};
use crate::MAX_MODE_SIZE;

/// Whether the counter wraps at a boundary or counts forever.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ModeKind {
    /// Counts `size` stones per half-cycle and sounds the gong at the boundary.
    Bounded,
    /// Infinity mode: counts up without a boundary.
    Unbounded,
}

/// The resolved counting mode.
///
/// Unbounded descriptors always report `reverse() == false` and carry a size of
/// 1 that nothing reads.
///
/// ```
/// use jugger_stones::{ModeDescriptor, ModeKind};
///
/// let mode = ModeDescriptor::bounded(100, true);
/// assert_eq!(mode.kind(), ModeKind::Bounded);
/// assert_eq!(mode.selector(), 100);
/// assert!(mode.reverse());
///
/// let infinity = ModeDescriptor::unbounded();
/// assert_eq!(infinity.selector(), -1);
/// assert!(!infinity.reverse_allowed());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ModeDescriptor {
    kind: ModeKind,
    size: i64,
    reverse: bool,
}

impl ModeDescriptor {
    /// A bounded mode of `size` stones. The size is clamped to
    /// `1..=MAX_MODE_SIZE`.
    #[must_use]
    pub const fn bounded(size: i64, reverse: bool) -> Self {
        let size = if size < 1 {
            1
        } else if size > MAX_MODE_SIZE {
            MAX_MODE_SIZE
        } else {
            size
        };
        Self {
            kind: ModeKind::Bounded,
            size,
            reverse,
        }
    }

    /// The infinity mode.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            kind: ModeKind::Unbounded,
            size: 1,
            reverse: false,
        }
    }

    /// Bounded or unbounded.
    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        self.kind
    }

    /// Stones per half-cycle.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.size
    }

    /// Whether the counter counts down from full.
    #[must_use]
    pub const fn reverse(&self) -> bool {
        self.reverse
    }

    /// Returns `true` for infinity mode.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self.kind, ModeKind::Unbounded)
    }

    /// Reverse counting is only meaningful for bounded modes.
    #[must_use]
    pub const fn reverse_allowed(&self) -> bool {
        matches!(self.kind, ModeKind::Bounded)
    }

    /// `+1` when counting up, `-1` when counting down.
    #[must_use]
    pub const fn direction(&self) -> i64 {
        if self.reverse {
            -1
        } else {
            1
        }
    }

    /// The preference selector for this mode: the size, or `-1` for infinity.
    #[must_use]
    pub const fn selector(&self) -> i64 {
        match self.kind {
            ModeKind::Bounded => self.size,
            ModeKind::Unbounded => UNBOUNDED_MODE,
        }
    }

    /// The legal counter range of this mode.
    #[must_use]
    pub const fn range(&self) -> CounterRange {
        CounterRange::new(*self)
    }
}

impl std::fmt::Display for ModeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.reverse) {
            (ModeKind::Unbounded, _) => write!(f, "infinity"),
            (ModeKind::Bounded, false) => write!(f, "{}", self.size),
            (ModeKind::Bounded, true) => write!(f, "{} reverse", self.size),
        }
    }
}

/// The behavior toggles read on every tick and every scored point.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PolicyFlags {
    /// Fire one tick as soon as the timer starts.
    pub immediate_start: bool,
    /// Play a gong when a point is scored while the timer runs.
    pub gong_after_point: bool,
    /// Pause when a point is scored.
    pub pause_after_point: bool,
    /// Pause when the counter crosses its boundary.
    pub pause_after_gong: bool,
}

/// Raw preferences plus the rules that resolve them into a mode.
///
/// Resolution never fails. Every fallback is reported to the observer (or to
/// tracing when none is set).
///
/// ```
/// use jugger_stones::{ModePreferences, Preferences};
///
/// let mut prefs = ModePreferences::new(Preferences::default(), None);
/// assert_eq!(prefs.current_mode().size(), 100);
///
/// // toggling into infinity remembers where we came from
/// assert!(prefs.toggle_mode_with_unbounded().is_unbounded());
/// assert_eq!(prefs.previous_mode().map(|m| m.size()), Some(100));
/// assert_eq!(prefs.toggle_mode_with_unbounded().size(), 100);
/// ```
#[derive(Clone)]
pub struct ModePreferences {
    preferences: Preferences,
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for ModePreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModePreferences")
            .field("preferences", &self.preferences)
            .field("has_observer", &self.violation_observer.is_some())
            .finish()
    }
}

impl ModePreferences {
    /// Wraps raw preferences. Fallbacks are reported to `violation_observer`.
    #[must_use]
    pub fn new(
        preferences: Preferences,
        violation_observer: Option<Arc<dyn ViolationObserver>>,
    ) -> Self {
        Self {
            preferences,
            violation_observer,
        }
    }

    /// The raw values, including any writes made by toggles.
    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Consumes `self`, returning the raw values.
    #[must_use]
    pub fn into_preferences(self) -> Preferences {
        self.preferences
    }

    /// Resolves the active mode.
    ///
    /// Selector `0` uses the floored custom size (minimum 1), `-1` is infinity
    /// and positive selectors are literal sizes. Anything else falls back to
    /// the default size. Reverse is ignored in infinity mode.
    ///
    /// Unusable values are reported on every call. The toggles resolve the
    /// mode internally without reporting.
    #[must_use]
    pub fn current_mode(&self) -> ModeDescriptor {
        self.resolve_mode(true)
    }

    fn resolve_mode(&self, report: bool) -> ModeDescriptor {
        let reverse = self.preferences.reverse;
        self.resolve_selector(self.preferences.mode, "mode", report)
            .map_or_else(
                || ModeDescriptor::bounded(DEFAULT_MODE_SIZE, reverse),
                |mode| match mode.kind {
                    ModeKind::Bounded => ModeDescriptor::bounded(mode.size, reverse),
                    ModeKind::Unbounded => mode,
                },
            )
    }

    /// The mode a toggle returns to, if one is remembered.
    ///
    /// Nothing is remembered when the stored previous mode equals the current
    /// one, or when a bounded mode has anything but infinity stored (toggling
    /// from a bounded mode always goes to infinity).
    #[must_use]
    pub fn previous_mode(&self) -> Option<ModeDescriptor> {
        self.remembered_mode(true)
    }

    fn remembered_mode(&self, report: bool) -> Option<ModeDescriptor> {
        let current = self.resolve_mode(false);
        let previous = self.preferences.mode_previous;
        if previous == current.selector() || (previous != UNBOUNDED_MODE && !current.is_unbounded())
        {
            return None;
        }
        let reverse = self.preferences.reverse;
        self.resolve_selector(previous, "modePrevious", report)
            .map(|mode| match mode.kind {
                ModeKind::Bounded => ModeDescriptor::bounded(mode.size, reverse),
                ModeKind::Unbounded => mode,
            })
    }

    /// Swaps between the current mode and infinity.
    ///
    /// Returns to the remembered previous mode when there is one. Otherwise
    /// goes to infinity from a bounded mode, or to the default size from
    /// infinity. The mode left behind becomes the new previous mode.
    pub fn toggle_mode_with_unbounded(&mut self) -> ModeDescriptor {
        let current = self.resolve_mode(false);
        let target = if self.remembered_mode(false).is_some() {
            self.preferences.mode_previous
        } else if current.is_unbounded() {
            DEFAULT_MODE_SIZE
        } else {
            UNBOUNDED_MODE
        };
        tracing::debug!(from = %current, target, "toggling mode");
        self.preferences.mode = target;
        self.preferences.mode_previous = current.selector();
        self.resolve_mode(false)
    }

    /// Flips the reverse flag. Returns `false` without changing anything in
    /// infinity mode.
    pub fn toggle_reverse(&mut self) -> bool {
        if !self.resolve_mode(false).reverse_allowed() {
            report_violation_to!(
                &self.violation_observer,
                ViolationSeverity::Warning,
                ViolationKind::CounterRange,
                "reverse toggle ignored in infinity mode"
            );
            return false;
        }
        self.preferences.reverse = !self.preferences.reverse;
        true
    }

    /// Sets the mode selector recorded in a history entry.
    ///
    /// Restoring infinity remembers the mode being left; restoring a bounded
    /// size forgets any remembered mode.
    pub fn set_mode_from_history(&mut self, selector: i64) {
        if selector == UNBOUNDED_MODE {
            self.preferences.mode_previous = self.resolve_mode(false).selector();
            self.preferences.mode = UNBOUNDED_MODE;
        } else {
            self.preferences.mode = selector;
            self.preferences.mode_previous = UNBOUNDED_MODE;
        }
    }

    /// Replaces the raw values the way a settings form writes them.
    ///
    /// The remembered mode is not a form field: it is kept as is, except
    /// that entering infinity remembers the mode being left and leaving
    /// infinity forgets it. Literal mode and interval selections are mirrored
    /// into the custom fields so switching to "custom" starts from them.
    pub fn apply_settings(&mut self, mut incoming: Preferences) {
        incoming.mode_previous = self.preferences.mode_previous;
        let previous = self.resolve_mode(false).selector();
        if incoming.mode == UNBOUNDED_MODE && previous != UNBOUNDED_MODE {
            incoming.mode_previous = previous;
        } else if previous == UNBOUNDED_MODE && incoming.mode != UNBOUNDED_MODE {
            incoming.mode_previous = UNBOUNDED_MODE;
        }

        if incoming.mode != CUSTOM_MODE && incoming.mode != UNBOUNDED_MODE {
            incoming.mode_custom = incoming.mode as f64;
        } else if !incoming.mode_custom.is_finite() || incoming.mode_custom == 0.0 {
            incoming.mode_custom = DEFAULT_MODE_SIZE as f64;
        }

        if incoming.interval != 0 {
            incoming.interval_custom = incoming.interval as f64 / 1000.0;
        } else if !incoming.interval_custom.is_finite() || incoming.interval_custom == 0.0 {
            incoming.interval_custom = DEFAULT_INTERVAL_CUSTOM_SECS;
        }

        self.preferences = incoming;
    }

    /// Resolves the tick interval.
    ///
    /// Selector `0` uses the custom seconds rounded to milliseconds. Non-finite
    /// custom values fall back to the default and non-positive intervals are
    /// raised to 1 ms.
    #[must_use]
    pub fn interval(&self) -> Duration {
        let mut millis = self.preferences.interval;
        if millis == 0 {
            let custom = self.preferences.interval_custom;
            if custom.is_finite() {
                millis = (custom * 1000.0).round() as i64;
            } else {
                report_violation_to!(
                    &self.violation_observer,
                    ViolationSeverity::Warning,
                    ViolationKind::Configuration,
                    "custom interval {} is not a number, using {} ms",
                    custom,
                    DEFAULT_INTERVAL_MS
                );
                millis = DEFAULT_INTERVAL_MS;
            }
        }
        if millis <= 0 {
            report_violation_to!(
                &self.violation_observer,
                ViolationSeverity::Warning,
                ViolationKind::Configuration,
                "interval {} ms is not positive, using 1 ms",
                millis
            );
            millis = 1;
        }
        Duration::from_millis(millis as u64)
    }

    /// The tick and point behavior flags.
    #[must_use]
    pub fn policy(&self) -> PolicyFlags {
        PolicyFlags {
            immediate_start: self.preferences.immediate_start,
            gong_after_point: self.preferences.gong_after_point,
            pause_after_point: self.preferences.pause_after_point,
            pause_after_gong: self.preferences.pause_after_gong,
        }
    }

    /// Resolves a raw selector without applying the reverse flag. Returns
    /// `None` for selectors below `-1`. Fallbacks are reported when `report`
    /// is set.
    fn resolve_selector(
        &self,
        selector: i64,
        field: &'static str,
        report: bool,
    ) -> Option<ModeDescriptor> {
        match selector {
            UNBOUNDED_MODE => Some(ModeDescriptor::unbounded()),
            CUSTOM_MODE => Some(ModeDescriptor::bounded(self.custom_size(report), false)),
            size if size > MAX_MODE_SIZE => {
                if report {
                    report_violation_to!(
                        &self.violation_observer,
                        ViolationSeverity::Warning,
                        ViolationKind::Configuration,
                        "{} {} exceeds the largest mode, clamping",
                        field,
                        size
                    );
                }
                Some(ModeDescriptor::bounded(MAX_MODE_SIZE, false))
            },
            size if size > 0 => Some(ModeDescriptor::bounded(size, false)),
            invalid => {
                if report {
                    report_violation_to!(
                        &self.violation_observer,
                        ViolationSeverity::Warning,
                        ViolationKind::Configuration,
                        "{} selector {} is not a mode, using {}",
                        field,
                        invalid,
                        DEFAULT_MODE_SIZE
                    );
                }
                None
            },
        }
    }

    fn custom_size(&self, report: bool) -> i64 {
        let custom = self.preferences.mode_custom;
        if !custom.is_finite() {
            if report {
                report_violation_to!(
                    &self.violation_observer,
                    ViolationSeverity::Warning,
                    ViolationKind::Configuration,
                    "custom mode {} is not a number, using {}",
                    custom,
                    DEFAULT_MODE_SIZE
                );
            }
            return DEFAULT_MODE_SIZE;
        }
        if custom == 0.0 {
            return DEFAULT_MODE_SIZE;
        }
        let size = custom.floor();
        if size > MAX_MODE_SIZE as f64 {
            if report {
                report_violation_to!(
                    &self.violation_observer,
                    ViolationSeverity::Warning,
                    ViolationKind::Configuration,
                    "custom mode {} exceeds the largest mode, clamping",
                    custom
                );
            }
            return MAX_MODE_SIZE;
        }
        (size as i64).max(1)
    }
}
