use std::collections::vec_deque::Drain;
use std::iter::FusedIterator;

use crate::StonesEvent;

/// A zero-allocation iterator that drains queued [`StonesEvent`]s.
///
/// Obtain one from [`GameSession::events`](crate::GameSession::events).
/// Events not consumed before the drain is dropped are discarded.
///
/// ```
/// use jugger_stones::{GameSessionBuilder, StonesEvent};
///
/// let mut session = GameSessionBuilder::new().start_session();
/// session.start();
/// for event in session.events() {
///     match event {
///         StonesEvent::TimerStarted => {},
///         _ => unreachable!(),
///     }
/// }
/// assert_eq!(session.events().len(), 0);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct EventDrain<'a> {
    inner: Drain<'a, StonesEvent>,
}

impl<'a> EventDrain<'a> {
    pub(crate) fn from_drain(drain: Drain<'a, StonesEvent>) -> Self {
        Self { inner: drain }
    }
}

impl Iterator for EventDrain<'_> {
    type Item = StonesEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for EventDrain<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for EventDrain<'_> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl FusedIterator for EventDrain<'_> {}

impl std::fmt::Debug for EventDrain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDrain")
            .field("remaining", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::iter_with_drain)]
mod tests {
    use super::*;
    use crate::{Cue, Stones};
    use std::collections::VecDeque;

    fn cue(stones: i64) -> StonesEvent {
        StonesEvent::Cue {
            cue: Cue::Stone,
            stones: Stones::new(stones),
        }
    }

    fn queue(len: i64) -> VecDeque<StonesEvent> {
        (1..=len).map(cue).collect()
    }

    #[test]
    fn drain_yields_all_events_in_order() {
        let mut queue = queue(3);
        let events: Vec<_> = EventDrain::from_drain(queue.drain(..)).collect();
        assert_eq!(events, vec![cue(1), cue(2), cue(3)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_is_fused() {
        let mut queue = queue(1);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert!(drain.next().is_some());
        assert!(drain.next().is_none());
        assert!(drain.next().is_none());
    }

    #[test]
    fn double_ended_iteration() {
        let mut queue = queue(3);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(drain.next_back(), Some(cue(3)));
        assert_eq!(drain.next(), Some(cue(1)));
        assert_eq!(drain.next_back(), Some(cue(2)));
        assert!(drain.next().is_none());
    }

    #[test]
    fn exact_size_is_accurate() {
        let mut queue = queue(2);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(drain.size_hint(), (2, Some(2)));
        let _ = drain.next();
        assert_eq!(drain.len(), 1);
    }

    #[test]
    fn debug_format_shows_remaining_count() {
        let mut queue = queue(2);
        let drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(format!("{drain:?}"), "EventDrain { remaining: 2 }");
    }
}
