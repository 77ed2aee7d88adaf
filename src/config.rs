//! Loading run configuration from TOML.
//!
//! Parameters are resolved once at startup, either from a file or from the defaults below, and handed to the engine
//! as a plain [`QueueParameters`] value.

use crate::simulation::QueueParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// Configuration Struct
// ------------------------------------------------------------------------------------------------

/// Everything needed to launch a simulation.
///
/// Missing fields fall back to [`SimulationConfig::default()`]: λ = 0.8, μ = 1.0, one server, 10 000 customers,
/// entropy seeding and a single replication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Mean arrivals per unit time (λ)
    pub arrival_rate: f64,
    /// Mean completions per unit time at one server (μ)
    pub service_rate: f64,
    /// Number of parallel servers (c)
    pub server_count: usize,
    /// Customers that must depart before a run ends
    pub total_customers: usize,
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
    /// Independent runs to perform
    pub replications: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate: 0.8,
            service_rate: 1.0,
            server_count: 1,
            total_customers: 10_000,
            seed: None,
            replications: 1,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Error Types and Validation
// ------------------------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] crate::Error),
}

impl SimulationConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters().validate()?;
        if self.replications == 0 {
            return Err(crate::Error::invalid("replications", self.replications).into());
        }
        Ok(())
    }

    pub fn parameters(&self) -> QueueParameters {
        QueueParameters::new(
            self.arrival_rate,
            self.service_rate,
            self.server_count,
            self.total_customers,
        )
    }
}
