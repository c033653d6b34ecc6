//! Configuration loading for DishaNav

use crate::error::{NavError, Result};
use serde::Deserialize;
use std::path::Path;

/// Navigation engine tuning parameters.
///
/// All distances are meters, all durations seconds, all angles degrees.
/// Loadable from a TOML file; every field has a sensible default so a
/// partial (or absent) file works.
#[derive(Clone, Debug, Deserialize)]
pub struct NavConfig {
    /// Distance at which the current target waypoint counts as reached (meters)
    #[serde(default = "default_waypoint_reach_distance")]
    pub waypoint_reach_distance: f32,

    /// Distance from the target waypoint beyond which a re-route is triggered (meters)
    #[serde(default = "default_max_off_path_distance")]
    pub max_off_path_distance: f32,

    /// Maximum perpendicular distance from a path segment for the
    /// plane-crossing waypoint test to count (meters)
    #[serde(default = "default_corner_cut_tolerance")]
    pub corner_cut_tolerance: f32,

    /// Minimum planar displacement between fixes to record a heading sample (meters)
    #[serde(default = "default_min_movement_for_heading")]
    pub min_movement_for_heading: f32,

    /// Minimum planar displacement between fixes to update the velocity estimate (meters)
    #[serde(default = "default_min_movement_for_velocity")]
    pub min_movement_for_velocity: f32,

    /// Seconds without qualifying movement before movement heading is invalidated
    #[serde(default = "default_heading_staleness_secs")]
    pub heading_staleness_secs: f32,

    /// Maximum heading samples kept for circular-mean smoothing
    #[serde(default = "default_heading_history_len")]
    pub heading_history_len: usize,

    /// Fix-to-consumption latency compensated by dead reckoning (seconds)
    #[serde(default = "default_latency_compensation_secs")]
    pub latency_compensation_secs: f32,

    /// Delay before the first instruction is announced after starting (seconds)
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: f32,

    /// Delay between the arrival announcement and automatic session teardown (seconds)
    #[serde(default = "default_arrival_teardown_secs")]
    pub arrival_teardown_secs: f32,

    /// Minimum change in absolute turn angle before a new instruction
    /// replaces the previously emitted one (degrees)
    #[serde(default = "default_hysteresis_threshold_deg")]
    pub hysteresis_threshold_deg: f32,
}

// Default value functions
fn default_waypoint_reach_distance() -> f32 {
    1.5
}
fn default_max_off_path_distance() -> f32 {
    5.0
}
fn default_corner_cut_tolerance() -> f32 {
    3.0
}
fn default_min_movement_for_heading() -> f32 {
    0.3
}
fn default_min_movement_for_velocity() -> f32 {
    0.1
}
fn default_heading_staleness_secs() -> f32 {
    3.0
}
fn default_heading_history_len() -> usize {
    5
}
fn default_latency_compensation_secs() -> f32 {
    0.1
}
fn default_settle_delay_secs() -> f32 {
    1.5
}
fn default_arrival_teardown_secs() -> f32 {
    3.0
}
fn default_hysteresis_threshold_deg() -> f32 {
    10.0
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            waypoint_reach_distance: default_waypoint_reach_distance(),
            max_off_path_distance: default_max_off_path_distance(),
            corner_cut_tolerance: default_corner_cut_tolerance(),
            min_movement_for_heading: default_min_movement_for_heading(),
            min_movement_for_velocity: default_min_movement_for_velocity(),
            heading_staleness_secs: default_heading_staleness_secs(),
            heading_history_len: default_heading_history_len(),
            latency_compensation_secs: default_latency_compensation_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            arrival_teardown_secs: default_arrival_teardown_secs(),
            hysteresis_threshold_deg: default_hysteresis_threshold_deg(),
        }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
