//! Closed-form steady-state results for M/M/c queues, for comparison against simulated estimates.

use crate::simulation::validate_rate;
use crate::{Error, Result};
use serde::Serialize;

/// Steady-state quantities of a stable M/M/c queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TheoreticalMetrics {
    /// Per-server utilization, λ / (c·μ).
    pub rho: f64,
    /// Mean number of customers waiting for a server.
    pub lq: f64,
    /// Mean time in system, waiting plus service.
    pub w: f64,
    /// Mean time spent waiting for a server.
    pub wq: f64,
    /// Mean number of customers in the system.
    pub l: f64,
    /// Probability that an arriving customer has to wait (Erlang C).
    pub prob_wait: f64,
}

/// Erlang C results for an M/M/c queue.
///
/// With one server this reduces to the familiar M/M/1 formulas `Lq = ρ²/(1-ρ)` and `W = 1/(μ-λ)`.
///
/// # Errors
///
/// * [`Error::InvalidParameter`] if a rate is not strictly positive or `server_count` is zero.
/// * [`Error::Unstable`] if `ρ >= 1`, where no steady state exists. A simulation of the same system still runs, but its
///   estimates grow with the run length instead of converging.
pub fn theoretical_mmc(arrival_rate: f64, service_rate: f64, server_count: usize) -> Result<TheoreticalMetrics> {
    validate_rate("arrival_rate", arrival_rate)?;
    validate_rate("service_rate", service_rate)?;
    if server_count == 0 {
        return Err(Error::invalid("server_count", server_count));
    }

    let servers = server_count as f64;
    let offered_load = arrival_rate / service_rate;
    let rho = offered_load / servers;
    if rho >= 1.0 {
        return Err(Error::Unstable { rho });
    }

    // Erlang B by recurrence stays within [0, 1] for any load, then converts to Erlang C
    let blocking = (1..=server_count).fold(1.0, |blocking: f64, k| {
        offered_load * blocking / (k as f64 + offered_load * blocking)
    });
    let prob_wait = blocking / (1.0 - rho * (1.0 - blocking));

    let lq = prob_wait * rho / (1.0 - rho);
    let wq = lq / arrival_rate;
    let w = wq + 1.0 / service_rate;

    Ok(TheoreticalMetrics {
        rho,
        lq,
        w,
        wq,
        l: arrival_rate * w,
        prob_wait,
    })
}
