use super::{Event, EventKind};
use crate::time::SimTime;
use std::cmp::Ordering;

/// Helper struct for the timeline. Holds the event kind alongside the data necessary to sort events within the priority
/// queue, namely the execution time and a record of the event's insertion sequence.
///
/// The implementation of [`Ord`] on this struct cares first about the execution time, comparing the insertion
/// sequences only to break ties.
#[derive(Debug, Clone, Copy)]
pub(super) struct ScheduledEvent {
    pub execution_time: SimTime,
    pub kind: EventKind,
    pub insertion_sequence: usize,
}

impl ScheduledEvent {
    pub fn into_event(self) -> Event {
        Event {
            time: self.execution_time.into_inner(),
            kind: self.kind,
        }
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.execution_time
            .cmp(&other.execution_time)
            .then_with(|| self.insertion_sequence.cmp(&other.insertion_sequence))
    }
}
