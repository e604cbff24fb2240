//! Structured telemetry pipeline for state violations.
//!
//! Nothing in the counter core is allowed to fail: bad configuration falls back
//! to defaults, out-of-range values are cleaned, an empty history resets. Those
//! recoveries are still worth knowing about, so instead of silently swallowing
//! them the core reports a [`StateViolation`] which can be:
//!
//! - Logged via tracing (default behavior)
//! - Collected programmatically for testing
//! - Sent to custom observers (metrics, alerting, etc.)
//!
//! # Example
//!
//! ```
//! use jugger_stones::telemetry::{CollectingObserver, ViolationKind};
//! use jugger_stones::{GameSessionBuilder, MemoryPreferenceStore, Preferences};
//! use std::sync::Arc;
//!
//! let observer = Arc::new(CollectingObserver::new());
//! let prefs = Preferences { mode: -7, ..Preferences::default() };
//! let session = GameSessionBuilder::new()
//!     .with_preference_store(MemoryPreferenceStore::new(prefs))
//!     .with_violation_observer(observer.clone())
//!     .start_session();
//!
//! // the unknown mode selector fell back to the default size
//! assert_eq!(session.mode().size(), 100);
//! assert!(observer.has_violation(ViolationKind::Configuration));
//! ```

use crate::Stones;
use parking_lot::Mutex;
use std::sync::Arc;

/// Severity of a state violation.
///
/// Severities are ordered from least to most severe, allowing filtering
/// and comparison operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// Unexpected but recoverable - operation continued with fallback.
    ///
    /// Example: a non-finite custom interval replaced by the default.
    Warning,
    /// Serious issue - operation may have degraded behavior.
    Error,
    /// Critical invariant broken - state may be corrupted.
    ///
    /// Example: the counter escaped its legal range.
    Critical,
}

impl ViolationSeverity {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories of state violations.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new categories may be
/// added in future versions. Always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// A preference value was unusable and a default was substituted.
    ///
    /// Examples:
    /// - Mode selector below `-1`
    /// - Non-finite or non-positive custom interval
    Configuration,
    /// The counter was asked to do something its mode does not allow.
    ///
    /// Examples:
    /// - Reverse toggle requested in infinity mode
    /// - Overflow guard reset near the integer limit
    CounterRange,
    /// Undo history anomalies.
    ///
    /// Examples:
    /// - Undo requested with an empty history
    History,
    /// Tick scheduling anomalies.
    ///
    /// Examples:
    /// - More ticks due than a single poll may fire
    Scheduler,
    /// Runtime invariant check failed.
    ///
    /// Only checked in debug builds or when the `paranoid` feature is enabled.
    Invariant,
}

impl ViolationKind {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::CounterRange => "counter_range",
            Self::History => "history",
            Self::Scheduler => "scheduler",
            Self::Invariant => "invariant",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recovered anomaly, as handed to a [`ViolationObserver`].
///
/// ```
/// use jugger_stones::telemetry::{StateViolation, ViolationKind, ViolationSeverity};
/// use jugger_stones::Stones;
///
/// let violation = StateViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::History,
///     "undo with an empty history",
///     "game_session.rs:42",
/// )
/// .with_stones(Stones::new(12));
///
/// assert_eq!(
///     violation.to_string(),
///     "[warning/history] undo with an empty history (at game_session.rs:42, stones=12)"
/// );
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct StateViolation {
    /// How bad it is.
    pub severity: ViolationSeverity,
    /// Which part of the state machine noticed it.
    pub kind: ViolationKind,
    /// What happened and which fallback was used.
    pub message: String,
    /// `file:line` of the report.
    pub location: &'static str,
    /// Counter value when the anomaly was noticed. Serialized as `null` when
    /// the report is not about the counter.
    pub stones: Option<Stones>,
}

impl StateViolation {
    /// A violation without a counter value.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            stones: None,
        }
    }

    /// Attaches the counter value.
    #[must_use]
    pub fn with_stones(mut self, stones: Stones) -> Self {
        self.stones = Some(stones);
        self
    }

    /// One-line JSON, for hosts that ship violations to a log collector.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

impl std::fmt::Display for StateViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} (at {}",
            self.severity, self.kind, self.message, self.location
        )?;
        if let Some(stones) = self.stones {
            write!(f, ", stones={stones}")?;
        }
        f.write_str(")")
    }
}

/// Receives every [`StateViolation`] a session reports.
///
/// With the `sync-send` feature, observers must be `Send + Sync`.
///
/// ```
/// use jugger_stones::telemetry::{StateViolation, ViolationObserver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct CountingObserver(AtomicUsize);
///
/// impl ViolationObserver for CountingObserver {
///     fn on_violation(&self, _violation: &StateViolation) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
#[cfg(feature = "sync-send")]
pub trait ViolationObserver: Send + Sync {
    /// Called once per report.
    fn on_violation(&self, violation: &StateViolation);
}

/// Receives every [`StateViolation`] a session reports.
#[cfg(not(feature = "sync-send"))]
pub trait ViolationObserver {
    /// Called once per report.
    fn on_violation(&self, violation: &StateViolation);
}

/// Logs violations through `tracing`: warnings at `warn`, the rest at
/// `error`. Used whenever no observer is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &StateViolation) {
        let kind = violation.kind.as_str();
        let location = violation.location;
        let stones = violation.stones.map(Stones::as_i64);
        match violation.severity {
            ViolationSeverity::Warning => {
                tracing::warn!(kind, location, ?stones, "{}", violation.message);
            },
            ViolationSeverity::Error | ViolationSeverity::Critical => {
                tracing::error!(
                    severity = violation.severity.as_str(),
                    kind,
                    location,
                    ?stones,
                    "{}",
                    violation.message
                );
            },
        }
    }
}

/// Keeps every violation in memory. Meant for tests.
///
/// ```
/// use jugger_stones::telemetry::{
///     CollectingObserver, StateViolation, ViolationKind, ViolationObserver, ViolationSeverity,
/// };
///
/// let observer = CollectingObserver::new();
/// observer.on_violation(&StateViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::History,
///     "undo with empty history",
///     "test.rs:1",
/// ));
///
/// assert_eq!(observer.len(), 1);
/// assert!(observer.has_violation(ViolationKind::History));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    violations: Mutex<Vec<StateViolation>>,
}

impl CollectingObserver {
    /// An observer with nothing collected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything collected so far.
    #[must_use]
    pub fn violations(&self) -> Vec<StateViolation> {
        self.violations.lock().clone()
    }

    /// Number of violations collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Whether any violation of `kind` was collected.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.lock().iter().any(|v| v.kind == kind)
    }

    /// The violations of `kind`, oldest first.
    #[must_use]
    pub fn violations_of_kind(&self, kind: ViolationKind) -> Vec<StateViolation> {
        self.violations
            .lock()
            .iter()
            .filter(|v| v.kind == kind)
            .cloned()
            .collect()
    }

    /// Forgets everything collected.
    pub fn clear(&self) {
        self.violations.lock().clear();
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &StateViolation) {
        self.violations.lock().push(violation.clone());
    }
}

/// Hands `violation` to `observer`, or to [`TracingObserver`] without one.
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &StateViolation,
) {
    match observer {
        Some(observer) => observer.on_violation(violation),
        None => TracingObserver.on_violation(violation),
    }
}

/// Builds a [`StateViolation`] at the call site and logs it via
/// [`TracingObserver`].
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $($fmt:tt)+) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::StateViolation::new(
            $severity,
            $kind,
            format!($($fmt)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};
}

/// Builds a [`StateViolation`] at the call site and hands it to an
/// `Option<Arc<dyn ViolationObserver>>`. A leading `stones = value,` attaches
/// the counter value.
///
/// ```
/// use jugger_stones::{report_violation_to, telemetry::{CollectingObserver, ViolationKind, ViolationObserver, ViolationSeverity}};
/// use jugger_stones::Stones;
/// use std::sync::Arc;
///
/// let collecting = Arc::new(CollectingObserver::new());
/// let observer: Option<Arc<dyn ViolationObserver>> = Some(collecting.clone());
/// report_violation_to!(&observer, ViolationSeverity::Warning, ViolationKind::History,
///     stones = Stones::new(3), "history empty, resetting {} teams", 2);
/// assert_eq!(collecting.violations()[0].stones, Some(Stones::new(3)));
/// ```
#[macro_export]
macro_rules! report_violation_to {
    ($observer:expr, $severity:expr, $kind:expr, stones = $stones:expr, $($fmt:tt)+) => {{
        let violation = $crate::telemetry::StateViolation::new(
            $severity,
            $kind,
            format!($($fmt)+),
            concat!(file!(), ":", line!()),
        )
        .with_stones($stones);
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, $severity:expr, $kind:expr, $($fmt:tt)+) => {{
        let violation = $crate::telemetry::StateViolation::new(
            $severity,
            $kind,
            format!($($fmt)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};
}

/// Asserts that no violations have been collected.
#[macro_export]
macro_rules! assert_no_violations {
    ($observer:expr) => {{
        let violations = $observer.violations();
        assert!(
            violations.is_empty(),
            "Expected no violations, but found {}:\n{:#?}",
            violations.len(),
            violations
        );
    }};
}

/// Asserts that a violation of the specified kind was collected.
#[macro_export]
macro_rules! assert_violation {
    ($observer:expr, $kind:expr) => {{
        assert!(
            $observer.has_violation($kind),
            "Expected violation of kind {:?}, but found: {:#?}",
            $kind,
            $observer.violations()
        );
    }};
}

// ==========================================
// Runtime Invariant Checking
// ==========================================

/// A broken invariant, as returned by [`InvariantChecker::check_invariants`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvariantViolation {
    /// The checked type, e.g. `"Counter"`.
    pub type_name: &'static str,
    /// The rule that does not hold.
    pub invariant: String,
    /// Offending values, if the checker recorded them.
    pub details: Option<String>,
}

impl InvariantViolation {
    /// A violation of `invariant` in `type_name`, without details.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
            details: None,
        }
    }

    /// Records the offending values.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {} ({})", self.type_name, self.invariant, details),
            None => write!(f, "{}: {}", self.type_name, self.invariant),
        }
    }
}

/// Implemented by the counter, history, scoreboard and session.
///
/// ```
/// use jugger_stones::telemetry::{InvariantChecker, InvariantViolation};
///
/// struct Tally {
///     points: i64,
/// }
///
/// impl InvariantChecker for Tally {
///     fn check_invariants(&self) -> Result<(), InvariantViolation> {
///         if self.points < 0 {
///             return Err(InvariantViolation::new("Tally", "points went negative")
///                 .with_details(format!("points={}", self.points)));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait InvariantChecker {
    /// `Ok` when every invariant holds, otherwise the first broken one.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Runs `check_invariants` on a value in debug builds (or with the `paranoid`
/// feature) and reports a `Critical`/`Invariant` violation to the given
/// observer when it fails.
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! debug_check_invariants {
    ($observer:expr, $value:expr, $context:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(violation) = $value.check_invariants() {
            $crate::report_violation_to!(
                $observer,
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{} ({})",
                violation,
                $context
            );
        }
    }};
}

/// Release builds without `paranoid` skip the check.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! debug_check_invariants {
    ($observer:expr, $value:expr, $context:expr) => {{}};
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(ViolationSeverity::Warning < ViolationSeverity::Error);
        assert!(ViolationSeverity::Error < ViolationSeverity::Critical);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ViolationKind::Configuration.as_str(), "configuration");
        assert_eq!(ViolationKind::CounterRange.as_str(), "counter_range");
        assert_eq!(ViolationKind::History.as_str(), "history");
        assert_eq!(ViolationKind::Scheduler.as_str(), "scheduler");
        assert_eq!(ViolationKind::Invariant.as_str(), "invariant");
    }

    #[test]
    fn violation_display_includes_stones() {
        let violation = StateViolation::new(
            ViolationSeverity::Error,
            ViolationKind::CounterRange,
            "overflow guard",
            "test.rs:10",
        );
        assert_eq!(
            violation.to_string(),
            "[error/counter_range] overflow guard (at test.rs:10)"
        );
        assert!(violation
            .with_stones(Stones::new(50))
            .to_string()
            .ends_with(", stones=50)"));
    }

    #[test]
    fn collecting_observer_filters_by_kind() {
        let observer = CollectingObserver::new();
        assert!(observer.is_empty());

        for (kind, message) in [
            (ViolationKind::Configuration, "first"),
            (ViolationKind::Invariant, "second"),
            (ViolationKind::Configuration, "third"),
        ] {
            observer.on_violation(&StateViolation::new(
                ViolationSeverity::Warning,
                kind,
                message,
                "test.rs:1",
            ));
        }

        assert_eq!(observer.len(), 3);
        assert!(!observer.has_violation(ViolationKind::History));
        let config: Vec<String> = observer
            .violations_of_kind(ViolationKind::Configuration)
            .into_iter()
            .map(|v| v.message)
            .collect();
        assert_eq!(config, ["first", "third"]);

        observer.clear();
        assert!(observer.is_empty());
    }

    #[test]
    fn report_violation_to_uses_given_observer() {
        let collecting = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collecting.clone());
        report_violation_to!(
            &observer,
            ViolationSeverity::Warning,
            ViolationKind::Scheduler,
            stones = Stones::new(9),
            "dropped {} ticks",
            3
        );
        let violations = collecting.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "dropped 3 ticks");
        assert_eq!(violations[0].stones, Some(Stones::new(9)));
        assert!(violations[0].location.contains("telemetry.rs"));
    }

    #[test]
    fn report_violation_to_none_falls_back_to_tracing() {
        let observer: Option<Arc<dyn ViolationObserver>> = None;
        report_violation_to!(
            &observer,
            ViolationSeverity::Warning,
            ViolationKind::Scheduler,
            "no observer"
        );
    }

    #[test]
    fn report_violation_logs_without_observer() {
        report_violation!(
            ViolationSeverity::Error,
            ViolationKind::Scheduler,
            "clock went backwards by {} ms",
            5
        );
    }

    struct Broken;

    impl InvariantChecker for Broken {
        fn check_invariants(&self) -> Result<(), InvariantViolation> {
            Err(InvariantViolation::new("Broken", "always"))
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    fn debug_check_invariants_reports_to_observer() {
        let collecting = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collecting.clone());
        debug_check_invariants!(&observer, Broken, "in test");
        let violations = collecting.violations_of_kind(ViolationKind::Invariant);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, ViolationSeverity::Critical);
        assert_eq!(violations[0].message, "Broken: always (in test)");
    }

    #[test]
    fn invariant_violation_display() {
        let violation =
            InvariantViolation::new("Counter", "value above max").with_details("value=12, max=9");
        assert_eq!(
            violation.to_string(),
            "Counter: value above max (value=12, max=9)"
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn violation_serializes_to_json() {
        let json = StateViolation::new(
            ViolationSeverity::Warning,
            ViolationKind::History,
            "empty",
            "test.rs:1",
        )
        .with_stones(Stones::new(7))
        .to_json()
        .unwrap();
        assert!(json.contains(r#""severity":"warning""#));
        assert!(json.contains(r#""kind":"history""#));
        assert!(json.contains(r#""stones":7"#));
    }
}
