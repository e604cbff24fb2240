use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// This enum contains all error messages this library can return.
///
/// Counter and mode anomalies are never errors: they degrade to a well-defined
/// default state and are reported through [`telemetry`](crate::telemetry). Only
/// caller mistakes that cannot be repaired locally surface here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StonesError {
    /// A team index past the second team was used.
    InvalidTeamIndex {
        /// The index that was given.
        index: usize,
        /// The highest valid index.
        max_index: usize,
    },
    /// A team color was not a `#rrggbb` hex string.
    InvalidColor {
        /// The rejected color text.
        color: String,
    },
    /// You made an invalid request, usually by using wrong parameters for function calls.
    InvalidRequest {
        /// Further specifies why the request was invalid.
        info: String,
    },
    /// A preference document could not be parsed at all.
    PreferenceParse {
        /// A description of what failed to parse.
        context: String,
    },
}

impl Display for StonesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StonesError::InvalidTeamIndex { index, max_index } => {
                write!(
                    f,
                    "Invalid team index {}: must be less than or equal to {}",
                    index, max_index
                )
            },
            StonesError::InvalidColor { color } => {
                write!(f, "Invalid team color {:?}: expected #rrggbb", color)
            },
            StonesError::InvalidRequest { info } => {
                write!(f, "Invalid Request: {}", info)
            },
            StonesError::PreferenceParse { context } => {
                write!(f, "Preference parse error: {}", context)
            },
        }
    }
}

impl Error for StonesError {}

/// Convenience alias used throughout the crate.
pub type StonesResult<T> = Result<T, StonesError>;
