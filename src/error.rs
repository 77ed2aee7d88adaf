use thiserror::Error;

/// Errors that may be encountered while configuring, running, or summarizing a simulation.
///
/// Parameter problems ([`InvalidParameter`], [`Unstable`]) are reported eagerly, before any event executes.
/// [`EmptyTimeline`], [`LogicError`] and [`BackInTime`] indicate a broken invariant inside the engine: they carry the
/// clock and event counts at the point of failure and abort the run. [`InsufficientData`] and [`DivideByZero`] come
/// from the metrics aggregator when a run recorded nothing to summarize.
///
/// [`InvalidParameter`]: Error::InvalidParameter
/// [`Unstable`]: Error::Unstable
/// [`EmptyTimeline`]: Error::EmptyTimeline
/// [`LogicError`]: Error::LogicError
/// [`BackInTime`]: Error::BackInTime
/// [`InsufficientData`]: Error::InsufficientData
/// [`DivideByZero`]: Error::DivideByZero
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A rate, server count, customer count or replication count was out of range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    /// The engine asked for the next event while none was scheduled.
    #[error("event timeline is empty at time {clock} after {events_processed} events")]
    EmptyTimeline { clock: f64, events_processed: usize },

    /// The queue state contradicted the event being processed.
    #[error("{message} (clock {clock}, {events_processed} events processed, {customers_served} customers served)")]
    LogicError {
        message: &'static str,
        clock: f64,
        events_processed: usize,
        customers_served: usize,
    },

    /// An event was scheduled for a time that has already passed.
    #[error("event time {requested} is less than current simulation time {current}")]
    BackInTime { current: f64, requested: f64 },

    /// A mean was requested over an empty sequence of observations.
    #[error("no observations recorded for {metric}")]
    InsufficientData { metric: &'static str },

    /// A ratio was requested with a zero denominator.
    #[error("cannot compute {metric}: denominator is zero")]
    DivideByZero { metric: &'static str },

    /// Closed-form results exist only while the traffic intensity stays below one.
    #[error("system is unstable: traffic intensity {rho} must be less than 1")]
    Unstable { rho: f64 },
}

impl Error {
    pub(crate) fn invalid<T>(name: &'static str, value: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}

/// [`std::result::Result`]`<T, `[`mmc_sim::Error`]`>`
///
/// A type alias that simplifies the signatures of various functions in this crate.
///
/// [`mmc_sim::Error`]: Error
pub type Result<T> = std::result::Result<T, Error>;
