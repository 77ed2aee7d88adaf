mod scheduled_event;

use crate::time::{sim_time, SimTime};
use crate::{Error, Result};
use scheduled_event::ScheduledEvent;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// The two things that can happen in an M/M/c queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A customer joins the system.
    Arrival,
    /// A server finishes with a customer.
    Departure,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Arrival => write!(f, "arrival"),
            Self::Departure => write!(f, "departure"),
        }
    }
}

/// An event popped from the timeline: when it happens and what it is.
///
/// Events are plain values, never mutated after creation and discarded once processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
}

/// Priority queue of scheduled events.
///
/// Events pop in ascending order of execution time, with ties broken by the order in which they were pushed onto the
/// queue. Popping an event advances the timeline's clock to that event's execution time.
///
/// # Errors
///
/// Scheduling compares the desired execution time against the current clock time. Attempting to schedule an event for
/// a time that is already past results in an [`Error::BackInTime`] without modifying the queue. Popping from an empty
/// timeline results in an [`Error::EmptyTimeline`].
#[derive(Debug)]
pub struct EventTimeline {
    events: BinaryHeap<Reverse<ScheduledEvent>>,
    last_execution_time: SimTime,
    events_added: usize,
    events_popped: usize,
}

impl Default for EventTimeline {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl EventTimeline {
    /// Construct a new [`EventTimeline`] with no scheduled events and a clock initialized to the provided time.
    pub fn new(start_time: f64) -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: sim_time(start_time),
            events_added: 0,
            events_popped: 0,
        }
    }

    /// Schedule an event of the given kind at the specified time.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time, returns an [`Error::BackInTime`] with no modifications to the
    /// queue.
    pub fn schedule(&mut self, time: f64, kind: EventKind) -> Result<()> {
        let execution_time = sim_time(time);
        if execution_time < self.last_execution_time {
            return Err(Error::BackInTime {
                current: self.last_execution_time.into_inner(),
                requested: time,
            });
        }

        let insertion_sequence = self.increment_event_count();
        self.events.push(Reverse(ScheduledEvent {
            execution_time,
            kind,
            insertion_sequence,
        }));
        Ok(())
    }

    /// Schedule an event of the given kind `delay` time units after the current clock time.
    ///
    /// # Errors
    ///
    /// A negative `delay` yields an [`Error::BackInTime`].
    pub fn schedule_with_delay(&mut self, delay: f64, kind: EventKind) -> Result<()> {
        let time = self.last_execution_time.into_inner() + delay;
        self.schedule(time, kind)
    }

    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Remove and return the event with the smallest execution time, advancing the clock to match it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::EmptyTimeline`] if nothing is scheduled.
    pub fn pop_earliest(&mut self) -> Result<Event> {
        let Reverse(scheduled) = self.events.pop().ok_or(Error::EmptyTimeline {
            clock: self.last_execution_time.into_inner(),
            events_processed: self.events_popped,
        })?;
        self.last_execution_time = scheduled.execution_time;
        self.events_popped += 1;
        Ok(scheduled.into_event())
    }

    /// The execution time of the most recently popped event, or the start time if nothing has been popped yet.
    pub fn current_time(&self) -> f64 {
        self.last_execution_time.into_inner()
    }

    /// Number of events currently scheduled.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl std::fmt::Display for EventTimeline {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventTimeline with {} scheduled events at current time {}",
            self.events.len(),
            self.last_execution_time.into_inner()
        )
    }
}
