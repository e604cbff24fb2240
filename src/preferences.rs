//! User preferences consumed by the counter core.
//!
//! The core never touches persistence itself. It reads and writes a
//! [`Preferences`] value through an injected [`PreferenceStore`]; how (and
//! whether) that store persists anything is up to the host.
//!
//! # Selector conventions
//!
//! | Field | `0` | `-1` | positive |
//! |-------|-----|------|----------|
//! | `mode` | use `mode_custom` | infinity | literal stone count |
//! | `interval` | use `interval_custom` seconds | - | literal milliseconds |

/// Mode selector meaning "use the custom mode size".
pub const CUSTOM_MODE: i64 = 0;
/// Mode selector meaning "infinity mode" (unbounded counting).
pub const UNBOUNDED_MODE: i64 = -1;
/// Default bounded mode size, also the fallback when leaving infinity mode
/// without a remembered size.
pub const DEFAULT_MODE_SIZE: i64 = 100;
/// Default tick interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: i64 = 1500;
/// Default custom interval in seconds.
pub const DEFAULT_INTERVAL_CUSTOM_SECS: f64 = 1.5;

/// The raw preference values the counter core reads.
///
/// Values are stored exactly as a settings form would write them; validation
/// and fallback happen when [`ModePreferences`](crate::ModePreferences)
/// resolves them, never here.
///
/// # Forward Compatibility
///
/// New fields may be added in future versions. Construct instances with the
/// `..Preferences::default()` pattern.
///
/// # Example
///
/// ```
/// use jugger_stones::Preferences;
///
/// let quick = Preferences {
///     mode: 20,
///     interval: 1000,
///     pause_after_gong: true,
///     ..Preferences::default()
/// };
/// assert!(!quick.reverse);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Mode selector: `0` custom, `-1` infinity, positive literal size.
    ///
    /// Default: 100
    pub mode: i64,
    /// The mode to return to when toggling out of infinity mode.
    ///
    /// Default: -1 (nothing remembered)
    pub mode_previous: i64,
    /// Size used when `mode` is `0`. Floored, minimum 1.
    ///
    /// Default: 100.0
    pub mode_custom: f64,
    /// Interval selector in milliseconds; `0` means use `interval_custom`.
    ///
    /// Default: 1500
    pub interval: i64,
    /// Custom interval in (fractional) seconds.
    ///
    /// Default: 1.5
    pub interval_custom: f64,
    /// Count down from full instead of up from zero (bounded modes only).
    pub reverse: bool,
    /// Fire one tick immediately when the timer starts.
    pub immediate_start: bool,
    /// Play the gong cue when a point is scored while the timer runs.
    pub gong_after_point: bool,
    /// Pause the timer when a point is scored.
    pub pause_after_point: bool,
    /// Pause the timer when the counter crosses its boundary.
    pub pause_after_gong: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE_SIZE,
            mode_previous: UNBOUNDED_MODE,
            mode_custom: DEFAULT_MODE_SIZE as f64,
            interval: DEFAULT_INTERVAL_MS,
            interval_custom: DEFAULT_INTERVAL_CUSTOM_SECS,
            reverse: false,
            immediate_start: false,
            gong_after_point: false,
            pause_after_point: false,
            pause_after_gong: false,
        }
    }
}

impl Preferences {
    /// Creates preferences with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for refereed matches: 100 stones at 1.5 s, a gong and a pause
    /// whenever a point is scored.
    #[must_use]
    pub fn tournament() -> Self {
        Self {
            gong_after_point: true,
            pause_after_point: true,
            ..Self::default()
        }
    }

    /// Preset for training: infinity mode, remembering the default size.
    #[must_use]
    pub fn training() -> Self {
        Self {
            mode: UNBOUNDED_MODE,
            mode_previous: DEFAULT_MODE_SIZE,
            ..Self::default()
        }
    }

    /// Preset for a reverse countdown of `size` stones that pauses at the gong.
    #[must_use]
    pub fn reverse_countdown(size: i64) -> Self {
        Self {
            mode: size,
            mode_custom: size as f64,
            reverse: true,
            pause_after_gong: true,
            ..Self::default()
        }
    }

    /// Parses a JSON preference document leniently.
    ///
    /// Numbers may be given as strings, booleans as `"true"`/`"1"` or numbers.
    /// Unknown keys are ignored and unusable values fall back to the default
    /// for that key. Only a document that is not a JSON object is an error.
    ///
    /// ```
    /// use jugger_stones::Preferences;
    ///
    /// let prefs = Preferences::from_json(r#"{"mode":"40","reverse":"1","interval":null}"#)?;
    /// assert_eq!(prefs.mode, 40);
    /// assert!(prefs.reverse);
    /// assert_eq!(prefs.interval, 0);
    /// # Ok::<(), jugger_stones::StonesError>(())
    /// ```
    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> crate::StonesResult<Self> {
        lenient::parse(text)
    }

    /// Serializes these preferences as a JSON document.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

#[cfg(feature = "json")]
mod lenient {
    use serde_json::{Map, Value};

    use super::Preferences;
    use crate::telemetry::{ViolationKind, ViolationSeverity};
    use crate::{StonesError, StonesResult};

    pub(super) fn parse(text: &str) -> StonesResult<Preferences> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| StonesError::PreferenceParse {
                context: e.to_string(),
            })?;
        let Value::Object(map) = value else {
            return Err(StonesError::PreferenceParse {
                context: "preference document is not an object".to_owned(),
            });
        };

        let defaults = Preferences::default();
        Ok(Preferences {
            mode: integer(&map, "mode").unwrap_or(defaults.mode),
            mode_previous: integer(&map, "modePrevious").unwrap_or(defaults.mode_previous),
            mode_custom: number(&map, "modeCustom").unwrap_or(defaults.mode_custom),
            interval: integer(&map, "interval").unwrap_or(defaults.interval),
            interval_custom: number(&map, "intervalCustom").unwrap_or(defaults.interval_custom),
            reverse: boolean(&map, "reverse").unwrap_or(defaults.reverse),
            immediate_start: boolean(&map, "immediateStart").unwrap_or(defaults.immediate_start),
            gong_after_point: boolean(&map, "gongAfterPoint").unwrap_or(defaults.gong_after_point),
            pause_after_point: boolean(&map, "pauseAfterPoint")
                .unwrap_or(defaults.pause_after_point),
            pause_after_gong: boolean(&map, "pauseAfterGong").unwrap_or(defaults.pause_after_gong),
        })
    }

    /// Numeric coercion: numbers pass through, strings are parsed (blank is
    /// zero), booleans are 0/1, null is zero. Non-finite results are rejected.
    fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
        let coerced = match map.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => Some(0.0),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null => Some(0.0),
            Value::Array(_) | Value::Object(_) => None,
        };
        match coerced {
            Some(n) if n.is_finite() => Some(n),
            _ => {
                crate::report_violation!(
                    ViolationSeverity::Warning,
                    ViolationKind::Configuration,
                    "preference {} is not a usable number, using the default",
                    key
                );
                None
            },
        }
    }

    fn integer(map: &Map<String, Value>, key: &str) -> Option<i64> {
        number(map, key).map(|n| n.floor() as i64)
    }

    fn boolean(map: &Map<String, Value>, key: &str) -> Option<bool> {
        Some(match map.get(key)? {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true" || s == "1",
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::Null => false,
            Value::Array(_) | Value::Object(_) => true,
        })
    }
}

/// The injected preferences collaborator.
///
/// The session reads the full [`Preferences`] after every configuration write
/// and writes back whenever a toggle changes a persisted value.
#[cfg(feature = "sync-send")]
pub trait PreferenceStore: Send + Sync {
    /// Returns the current preference values.
    fn load(&self) -> Preferences;

    /// Replaces the stored preference values.
    fn store(&mut self, preferences: &Preferences);
}

/// The injected preferences collaborator.
///
/// The session reads the full [`Preferences`] after every configuration write
/// and writes back whenever a toggle changes a persisted value.
#[cfg(not(feature = "sync-send"))]
pub trait PreferenceStore {
    /// Returns the current preference values.
    fn load(&self) -> Preferences;

    /// Replaces the stored preference values.
    fn store(&mut self, preferences: &Preferences);
}

/// A [`PreferenceStore`] that keeps preferences in memory only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPreferenceStore {
    preferences: Preferences,
}

impl MemoryPreferenceStore {
    /// Creates a store holding the given preferences.
    #[must_use]
    pub fn new(preferences: Preferences) -> Self {
        Self { preferences }
    }

    /// Returns the stored preferences.
    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Preferences {
        self.preferences.clone()
    }

    fn store(&mut self, preferences: &Preferences) {
        self.preferences = preferences.clone();
    }
}
