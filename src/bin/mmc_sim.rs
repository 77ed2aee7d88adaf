//! Runs one configured M/M/c simulation and writes the results as JSON to stdout.
//!
//! Usage: `mmc-sim [config.toml]`. Without a path the built-in defaults are used.

use mmc_sim::config::SimulationConfig;
use mmc_sim::logging::init_logging;
use mmc_sim::replication::ReplicationSummary;
use mmc_sim::theory::TheoreticalMetrics;
use mmc_sim::{run_replications, simulate, theoretical_mmc, Error, SimulationResult};

use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, warn};

#[derive(Serialize)]
struct Report {
    config: SimulationConfig,
    theory: Option<TheoreticalMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<SimulationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replications: Option<ReplicationSummary>,
}

fn run(config: SimulationConfig) -> Result<Report, Box<dyn std::error::Error>> {
    let parameters = config.parameters();

    let theory = match theoretical_mmc(parameters.arrival_rate, parameters.service_rate, parameters.server_count) {
        Ok(theory) => Some(theory),
        Err(Error::Unstable { rho }) => {
            warn!(rho, "no steady state exists; simulated metrics will not converge");
            None
        },
        Err(e) => return Err(e.into()),
    };

    let (result, replications) = if config.replications > 1 {
        (None, Some(run_replications(parameters, config.replications, config.seed)?))
    } else {
        (Some(simulate(parameters, config.seed)?.into_result()?), None)
    };

    Ok(Report {
        config,
        theory,
        result,
        replications,
    })
}

fn main() -> ExitCode {
    init_logging();

    let config = match std::env::args_os().nth(1) {
        Some(path) => SimulationConfig::from_file(path),
        None => Ok(SimulationConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(%e, "could not load configuration");
            return ExitCode::FAILURE;
        },
    };

    let report = match run(config) {
        Ok(report) => report,
        Err(e) => {
            error!(%e, "simulation failed");
            return ExitCode::FAILURE;
        },
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!(%e, "could not serialize results");
            ExitCode::FAILURE
        },
    }
}
