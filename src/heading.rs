//! Movement-based heading estimation.
//!
//! Travel direction is derived from position deltas rather than device
//! orientation, because an on-body camera does not reliably track the
//! body's direction of travel. Samples are smoothed with a circular mean
//! over a short history; when movement stops long enough the estimate is
//! invalidated and the orientation quaternion takes over as a fallback.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::NavConfig;
use crate::core::{circular_mean_deg, normalize_deg, Orientation, Position};

/// Smoothed travel-direction estimator.
#[derive(Clone, Debug)]
pub struct HeadingEstimator {
    /// Recent heading samples in degrees, oldest first
    history: VecDeque<f32>,
    /// Position of the previous fix
    last_position: Option<Position>,
    /// Time of the last qualifying movement
    last_movement_time: Option<Instant>,
    /// Minimum planar displacement to record a sample (meters)
    min_movement: f32,
    /// Staleness window after which movement heading is invalidated
    staleness: Duration,
    /// Maximum samples kept
    max_samples: usize,
}

impl HeadingEstimator {
    /// Create an estimator from engine configuration.
    pub fn new(config: &NavConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.heading_history_len),
            last_position: None,
            last_movement_time: None,
            min_movement: config.min_movement_for_heading,
            staleness: Duration::from_secs_f32(config.heading_staleness_secs),
            max_samples: config.heading_history_len.max(1),
        }
    }

    /// Feed a new position fix.
    ///
    /// Records a heading sample only when the planar displacement since the
    /// previous fix exceeds the movement threshold; smaller deltas are
    /// treated as noise and skipped for this cycle.
    pub fn observe(&mut self, position: Position, now: Instant) {
        let previous = match self.last_position {
            Some(p) => p,
            None => {
                self.last_position = Some(position);
                return;
            }
        };
        self.last_position = Some(position);

        if previous.distance_2d(&position) < self.min_movement {
            return;
        }

        let sample = normalize_deg(previous.bearing_to_deg(&position));
        if self.history.len() >= self.max_samples {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        self.last_movement_time = Some(now);
    }

    /// Whether movement heading has gone stale (no qualifying movement
    /// within the staleness window).
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_movement_time {
            Some(t) => now.duration_since(t) >= self.staleness,
            None => true,
        }
    }

    /// Current smoothed heading in degrees.
    ///
    /// Uses the circular mean of recent movement samples while fresh; once
    /// stale the history is cleared and the heading falls back to the
    /// direction vector derived from `orientation`.
    pub fn heading_deg(&mut self, now: Instant, orientation: &Orientation) -> f32 {
        if self.is_stale(now) && !self.history.is_empty() {
            debug!("Movement heading stale, falling back to orientation");
            self.history.clear();
        }

        match circular_mean_deg(self.history.make_contiguous()) {
            Some(mean) if !self.is_stale(now) => normalize_deg(mean),
            _ => normalize_deg(orientation.heading_deg()),
        }
    }

    /// Drop all smoothing state (called on session start).
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_position = None;
        self.last_movement_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> HeadingEstimator {
        HeadingEstimator::new(&NavConfig::default())
    }

    #[test]
    fn test_heading_from_movement() {
        let mut est = estimator();
        let t0 = Instant::now();

        est.observe(Position::ZERO, t0);
        est.observe(Position::new(1.0, 0.0, 0.0), t0 + Duration::from_millis(200));

        let heading = est.heading_deg(t0 + Duration::from_millis(200), &Orientation::IDENTITY);
        assert!(heading.abs() < 1e-3, "heading = {}", heading);
    }

    #[test]
    fn test_small_displacement_ignored() {
        let mut est = estimator();
        let t0 = Instant::now();

        est.observe(Position::ZERO, t0);
        est.observe(
            Position::new(0.05, 0.0, 0.0),
            t0 + Duration::from_millis(200),
        );

        // No qualifying movement yet: falls back to orientation (+Z facing)
        let heading = est.heading_deg(t0 + Duration::from_millis(200), &Orientation::IDENTITY);
        assert!((heading - 90.0).abs() < 1e-3, "heading = {}", heading);
    }

    #[test]
    fn test_wraparound_safe_smoothing() {
        let mut est = estimator();
        let t0 = Instant::now();
        let mut pos = Position::ZERO;

        // Alternate headings near ±180°: steps mostly along -X with a small
        // alternating Z component
        est.observe(pos, t0);
        for i in 1..=6u32 {
            let dz = if i % 2 == 0 { 0.02 } else { -0.02 };
            pos = pos + Position::new(-1.0, 0.0, dz);
            est.observe(pos, t0 + Duration::from_millis(200 * i as u64));
        }

        let heading = est.heading_deg(t0 + Duration::from_millis(1300), &Orientation::IDENTITY);
        assert!(
            heading.abs() > 170.0,
            "circular mean must stay near ±180, got {}",
            heading
        );
    }

    #[test]
    fn test_staleness_falls_back_to_quaternion() {
        let mut est = estimator();
        let t0 = Instant::now();

        est.observe(Position::ZERO, t0);
        est.observe(Position::new(1.0, 0.0, 0.0), t0 + Duration::from_millis(200));

        // 4 seconds without movement: fallback to orientation heading
        let later = t0 + Duration::from_secs(4);
        assert!(est.is_stale(later));

        let heading = est.heading_deg(later, &Orientation::IDENTITY);
        assert!((heading - 90.0).abs() < 1e-3, "heading = {}", heading);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut est = estimator();
        let t0 = Instant::now();
        let mut pos = Position::ZERO;

        est.observe(pos, t0);
        for i in 1..=20u32 {
            pos = pos + Position::new(1.0, 0.0, 0.0);
            est.observe(pos, t0 + Duration::from_millis(100 * i as u64));
        }

        assert!(est.history.len() <= 5);
    }
}
