use std::collections::VecDeque;

use crate::score_board::Team;
use crate::telemetry::{InvariantChecker, InvariantViolation};
use crate::Stones;

/// Default number of undo snapshots kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// An immutable snapshot of the undoable session state.
///
/// `mode_size` uses the preference selector convention: `-1` is infinity,
/// anything else is a bounded size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    /// Team 1 at snapshot time.
    pub team1: Team,
    /// Team 2 at snapshot time.
    pub team2: Team,
    /// Counter value at snapshot time.
    pub stones: Stones,
    /// Mode selector at snapshot time.
    pub mode_size: i64,
    /// Reverse flag at snapshot time.
    pub reverse: bool,
}

/// A bounded undo stack of [`HistoryEntry`] snapshots.
///
/// Pushing a snapshot equal to one already stored moves it to the top instead
/// of storing it twice. Once full, the oldest snapshot is evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    /// An empty stack holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Pushes a snapshot, deduplicating and evicting as needed.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.retain(|existing| *existing != entry);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Removes and returns the most recent snapshot.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// The most recent snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing can be undone.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored snapshots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl InvariantChecker for HistoryStack {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.entries.len() > self.capacity {
            return Err(
                InvariantViolation::new("HistoryStack", "more entries than capacity").with_details(
                    format!("len={}, capacity={}", self.entries.len(), self.capacity),
                ),
            );
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries.iter().skip(i + 1).any(|other| other == entry) {
                return Err(InvariantViolation::new("HistoryStack", "duplicate entry")
                    .with_details(format!("index={}", i)));
            }
        }
        Ok(())
    }
}
