//! Configuration sections and their defaults

use banker_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consumer workload settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_consumers")]
    pub consumers: usize,
    /// How long a consumer holds a grant before releasing it
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    /// Pause between consecutive attempts of one consumer
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    /// Seed for maximum assignment and request generation
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    #[must_use]
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    #[must_use]
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            consumers: default_consumers(),
            hold_ms: default_hold_ms(),
            pause_ms: default_pause_ms(),
            seed: None,
        }
    }
}

/// Where each consumer's maximum demand comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaximumPolicy {
    /// Uniform draw in `[0, capacity[j]]` per consumer and resource type
    #[default]
    Random,
    /// Rows taken verbatim from `demand.maxima`
    Table,
}

/// Maximum-demand assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DemandConfig {
    #[serde(default)]
    pub policy: MaximumPolicy,
    #[serde(default)]
    pub maxima: Vec<Vec<u32>>,
}

/// Console output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub color: ColorChoice,
}

// Default value functions for serde
fn default_consumers() -> usize {
    5
}

fn default_hold_ms() -> u64 {
    500
}

fn default_pause_ms() -> u64 {
    300
}
