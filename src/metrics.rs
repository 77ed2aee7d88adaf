//! Reduction of a run's observations into summary statistics.

use crate::{Error, Result};
use serde::Serialize;

/// The raw observations recorded by a simulation run.
///
/// Both sequences only ever grow while the engine runs and are read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationLog {
    /// Number of customers in the system at the instant each event was processed, before the event took effect.
    pub queue_lengths: Vec<usize>,
    /// Time from arrival to departure, one entry per departed customer.
    pub response_times: Vec<f64>,
}

/// Upper bound on the customers reserved for up front; longer runs grow the log as they go.
const MAX_RESERVED_CUSTOMERS: usize = 1 << 16;

impl ObservationLog {
    pub fn with_capacity(customers: usize) -> Self {
        let customers = customers.min(MAX_RESERVED_CUSTOMERS);
        Self {
            queue_lengths: Vec::with_capacity(customers * 2),
            response_times: Vec::with_capacity(customers),
        }
    }
}

/// Point estimates computed from one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub avg_queue_length: f64,
    pub avg_response_time: f64,
    /// Total time in system divided by `c * clock`.
    ///
    /// Time spent waiting counts as busy time here, so this overstates how busy the servers were whenever customers
    /// queue. See [`service_utilization`](Metrics::service_utilization) for the time-average of busy servers.
    pub utilization: f64,
    /// Time-average number of busy servers divided by `c`.
    pub service_utilization: f64,
}

impl Metrics {
    /// Reduce a run's observations.
    ///
    /// `busy_server_time` is the integral of the busy-server count over the run, i.e. the total server-time spent
    /// serving customers.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientData`] if either observation sequence is empty.
    /// * [`Error::DivideByZero`] if `clock` is zero.
    pub fn compute(log: &ObservationLog, clock: f64, server_count: usize, busy_server_time: f64) -> Result<Self> {
        let avg_queue_length = mean(
            log.queue_lengths.iter().map(|&length| length as f64),
            "avg_queue_length",
        )?;
        let avg_response_time = mean(log.response_times.iter().copied(), "avg_response_time")?;

        let capacity = server_count as f64 * clock;
        if capacity == 0.0 {
            return Err(Error::DivideByZero { metric: "utilization" });
        }
        let utilization = log.response_times.iter().sum::<f64>() / capacity;
        let service_utilization = busy_server_time / capacity;

        Ok(Self {
            avg_queue_length,
            avg_response_time,
            utilization,
            service_utilization,
        })
    }
}

/// Arithmetic mean, failing on empty input.
pub(crate) fn mean<I>(values: I, metric: &'static str) -> Result<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (count, total) = values
        .into_iter()
        .fold((0usize, 0.0), |(count, total), value| (count + 1, total + value));
    if count == 0 {
        return Err(Error::InsufficientData { metric });
    }
    Ok(total / count as f64)
}
