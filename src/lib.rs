//! # Overview
//!
//! mmc-sim is a discrete-event simulator for M/M/c queues: Poisson arrivals at rate λ, exponential service at rate μ
//! on each of c parallel servers, and an unbounded FIFO line. It estimates mean queue length, mean time in system and
//! server utilization, and provides the matching closed-form (Erlang C) results for comparison.
//!
//! The engine is built from a few small pieces:
//!
//! * [`Variates`] draws exponential durations from an explicitly seeded generator owned by each run, so a fixed seed
//!   reproduces a run bit for bit.
//! * [`EventTimeline`] is a binary-heap priority queue of pending arrivals and departures, popped in ascending time
//!   order with ties broken by insertion order.
//! * [`Simulation`] pops events, updates the [`QueueState`], schedules follow-up events and records observations
//!   until the requested number of customers has departed.
//! * [`Metrics`] reduces the recorded observations to point estimates.
//!
//! ```no_run
//! let result = mmc_sim::run_simulation(0.8, 1.0, 2, 10_000, Some(7))?;
//! let theory = mmc_sim::theoretical_mmc(0.8, 1.0, 2)?;
//! println!("simulated W = {}, theoretical W = {}", result.avg_response_time, theory.w);
//! # Ok::<(), mmc_sim::Error>(())
//! ```
//!
//! Independent runs share nothing, so [`run_replications()`] spreads them over threads, handing each one its own
//! generator seeded from a master stream.
//!
//! [`Variates`]: variates::Variates
//! [`EventTimeline`]: timeline::EventTimeline
//! [`Simulation`]: simulation::Simulation
//! [`QueueState`]: simulation::QueueState
//! [`Metrics`]: metrics::Metrics

mod error;
mod time;

pub mod config;
pub mod logging;
pub mod metrics;
pub mod replication;
pub mod simulation;
pub mod theory;
pub mod timeline;
pub mod variates;

pub use error::{Error, Result};
pub use replication::run_replications;
pub use simulation::{run_simulation, simulate, QueueParameters, SimulationResult};
pub use theory::theoretical_mmc;
pub use time::SimTime;
