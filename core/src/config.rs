use crate::{checked_from_secs, SimTime, US_PER_SEC};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cycles must be a positive number")]
    NonPositiveDuration,
    #[error("cycles must be at most {max}, got {got}")]
    DurationTooLong { got: u64, max: u64 },
    #[error("consume rate must be a positive number of seconds, got {0}")]
    NonPositiveRate(f64),
    #[error("consume rate of {0} seconds exceeds the simulated time range")]
    RateOutOfRange(f64),
    #[error("generation probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("at least one consumer is required")]
    NoConsumers,
    #[error("consumer `{0}` is listed more than once")]
    DuplicateConsumer(String),
    #[error("{0} capacity must be at least 1")]
    ZeroCapacity(&'static str),
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Producer stops generating at this many seconds.
    pub duration_secs: u64,
    /// Minimum seconds between two drains of one consumer.
    pub consume_interval_secs: f64,
    pub consumers: Vec<String>,
    pub generation_probability: f64,
    /// Fixed seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
    pub input_capacity: usize,
    pub output_capacity: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            duration_secs: 20,
            consume_interval_secs: 1.0,
            consumers: vec![
                "Consumer1".to_string(),
                "Consumer2".to_string(),
                "Consumer3".to_string(),
            ],
            generation_probability: 0.3,
            seed: None,
            input_capacity: 10,
            output_capacity: 1,
        }
    }
}

impl DemoConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Producer stop time in virtual time, `None` when it does not fit.
    pub fn stop_time(&self) -> Option<SimTime> {
        self.duration_secs.checked_mul(US_PER_SEC)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::NonPositiveDuration);
        }
        if self.stop_time().is_none() {
            return Err(ConfigError::DurationTooLong {
                got: self.duration_secs,
                max: SimTime::MAX / US_PER_SEC,
            });
        }
        // Also rejects NaN.
        if !(self.consume_interval_secs.is_finite() && self.consume_interval_secs > 0.0) {
            return Err(ConfigError::NonPositiveRate(self.consume_interval_secs));
        }
        if checked_from_secs(self.consume_interval_secs).is_none() {
            return Err(ConfigError::RateOutOfRange(self.consume_interval_secs));
        }
        if !(0.0..=1.0).contains(&self.generation_probability) {
            return Err(ConfigError::InvalidProbability(self.generation_probability));
        }
        if self.consumers.is_empty() {
            return Err(ConfigError::NoConsumers);
        }
        let mut seen = HashSet::new();
        for name in &self.consumers {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateConsumer(name.clone()));
            }
        }
        if self.input_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("input"));
        }
        if self.output_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("output"));
        }
        Ok(())
    }
}
