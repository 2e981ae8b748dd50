//! Application settings.
//!
//! Cadences are configuration, not core behavior: each poller accepts an
//! arbitrary positive interval, and these defaults simply mirror what the
//! dashboard ships with. Settings load from an optional TOML file overlaid
//! with `PULSECHECK_*` environment variables.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::DEFAULT_HISTORY_POINTS;

/// Top-level settings for the polling layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the PulseCheck backend.
    pub api_url: String,
    /// Polling cadence per resource, in milliseconds.
    pub intervals: Intervals,
    /// Capacity of the metrics history buffer.
    pub history_points: usize,
    /// Tail length requested when polling pod logs.
    pub log_tail: u32,
}

/// Per-resource polling intervals in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Intervals {
    pub cluster_ms: u64,
    pub pods_ms: u64,
    pub metrics_ms: u64,
    pub nodes_ms: u64,
    pub pod_detail_ms: u64,
    pub logs_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            intervals: Intervals::default(),
            history_points: DEFAULT_HISTORY_POINTS,
            log_tail: 100,
        }
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            cluster_ms: 5000,
            pods_ms: 5000,
            metrics_ms: 5000,
            nodes_ms: 10_000,
            pod_detail_ms: 5000,
            logs_ms: 3000,
        }
    }
}

impl Intervals {
    pub fn cluster(&self) -> Duration {
        Duration::from_millis(self.cluster_ms)
    }

    pub fn pods(&self) -> Duration {
        Duration::from_millis(self.pods_ms)
    }

    pub fn metrics(&self) -> Duration {
        Duration::from_millis(self.metrics_ms)
    }

    pub fn nodes(&self) -> Duration {
        Duration::from_millis(self.nodes_ms)
    }

    pub fn pod_detail(&self) -> Duration {
        Duration::from_millis(self.pod_detail_ms)
    }

    pub fn logs(&self) -> Duration {
        Duration::from_millis(self.logs_ms)
    }
}

impl Settings {
    /// Load settings from an optional file plus `PULSECHECK_*` environment
    /// variables (e.g. `PULSECHECK_API_URL`). Missing keys fall back to the
    /// defaults above.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("PULSECHECK").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values a poller cannot run with.
    fn validate(&self) -> Result<()> {
        let intervals = [
            ("cluster_ms", self.intervals.cluster_ms),
            ("pods_ms", self.intervals.pods_ms),
            ("metrics_ms", self.intervals.metrics_ms),
            ("nodes_ms", self.intervals.nodes_ms),
            ("pod_detail_ms", self.intervals.pod_detail_ms),
            ("logs_ms", self.intervals.logs_ms),
        ];
        for (name, ms) in intervals {
            anyhow::ensure!(ms > 0, "intervals.{} must be positive", name);
        }
        Ok(())
    }
}
