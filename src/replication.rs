//! Independent replications of one M/M/c configuration, run in parallel.
//!
//! Every replication owns its own [`Variates`] seeded from a stream drawn off a master generator, so replications
//! share no random state and the whole batch is reproducible from a single seed regardless of how threads interleave.

use crate::metrics::{mean, Metrics};
use crate::simulation::{simulate, QueueParameters};
use crate::variates::Variates;
use crate::{Error, Result};

use serde::Serialize;
use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, info};

/// Mean and sample standard deviation of one metric across replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    /// Zero when only one replication was run.
    pub std_dev: f64,
}

impl MetricSummary {
    fn from_values(values: &[f64], metric: &'static str) -> Result<Self> {
        let mean = mean(values.iter().copied(), metric)?;
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
            (squares / (values.len() - 1) as f64).sqrt()
        };
        Ok(Self { mean, std_dev })
    }
}

/// Results of a batch of replications, in replication order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub seeds: Vec<u64>,
    pub runs: Vec<Metrics>,
    pub avg_queue_length: MetricSummary,
    pub avg_response_time: MetricSummary,
    pub utilization: MetricSummary,
    pub service_utilization: MetricSummary,
}

impl ReplicationSummary {
    fn from_runs(seeds: Vec<u64>, runs: Vec<Metrics>) -> Result<Self> {
        let column = |select: fn(&Metrics) -> f64| runs.iter().map(select).collect::<Vec<f64>>();
        Ok(Self {
            avg_queue_length: MetricSummary::from_values(&column(|m| m.avg_queue_length), "avg_queue_length")?,
            avg_response_time: MetricSummary::from_values(&column(|m| m.avg_response_time), "avg_response_time")?,
            utilization: MetricSummary::from_values(&column(|m| m.utilization), "utilization")?,
            service_utilization: MetricSummary::from_values(
                &column(|m| m.service_utilization),
                "service_utilization",
            )?,
            seeds,
            runs,
        })
    }
}

/// Run `replications` independent simulations of the same configuration and summarize their metrics.
///
/// Replications are spread over at most [`thread::available_parallelism()`] scoped threads.
///
/// # Errors
///
/// * [`Error::InvalidParameter`] if `replications` is zero or `parameters` fail validation.
/// * The first error, in replication order, returned by any individual run.
pub fn run_replications(
    parameters: QueueParameters,
    replications: usize,
    seed: Option<u64>,
) -> Result<ReplicationSummary> {
    if replications == 0 {
        return Err(Error::invalid("replications", replications));
    }
    parameters.validate()?;

    let mut master = Variates::from_optional_seed(seed);
    let seeds: Vec<u64> = (0..replications).map(|_| master.next_seed()).collect();
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(replications);
    info!(replications, workers, "running replications");

    let mut outcomes: Vec<Option<Result<Metrics>>> = vec![None; replications];
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let seeds = &seeds;
                scope.spawn(move || {
                    (worker..replications)
                        .step_by(workers)
                        .map(|index| {
                            debug!(index, seed = seeds[index], "replication started");
                            let metrics = simulate(parameters, Some(seeds[index])).and_then(|sim| sim.metrics());
                            (index, metrics)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(results) => {
                    for (index, metrics) in results {
                        outcomes[index] = Some(metrics);
                    }
                },
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
    });

    let runs = outcomes
        .into_iter()
        .flatten()
        .collect::<Result<Vec<Metrics>>>()?;
    ReplicationSummary::from_runs(seeds, runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_statistics() {
        let summary = MetricSummary::from_values(&[1.0, 2.0, 3.0], "x").unwrap();
        assert_eq!(2.0, summary.mean);
        assert_eq!(1.0, summary.std_dev);

        let single = MetricSummary::from_values(&[4.0], "x").unwrap();
        assert_eq!(0.0, single.std_dev);
    }

    #[test]
    fn zero_replications_rejected() {
        let parameters = QueueParameters::new(0.5, 1.0, 1, 10);
        assert!(matches!(
            run_replications(parameters, 0, Some(1)),
            Err(Error::InvalidParameter { name: "replications", .. })
        ));
    }

    #[test]
    fn zero_customer_replications_report_insufficient_data() {
        let parameters = QueueParameters::new(0.5, 1.0, 1, 0);
        assert!(matches!(
            run_replications(parameters, 3, Some(1)),
            Err(Error::InsufficientData { .. })
        ));
    }
}
