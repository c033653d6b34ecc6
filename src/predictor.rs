//! Dead-reckoning position prediction.
//!
//! Pose fixes arrive sparsely (one every ~200ms at best) and are already
//! stale by the time they are consumed. The predictor extrapolates a "now"
//! position from the last fix and an estimated planar velocity to
//! compensate for that fix-to-consumption latency.

use std::time::Instant;

use crate::config::NavConfig;
use crate::core::Position;

/// Minimum fix spacing for a usable velocity estimate (seconds).
const MIN_VELOCITY_DT: f32 = 1e-3;

/// Short-horizon position extrapolator.
#[derive(Clone, Debug)]
pub struct DeadReckoner {
    /// Previous fix, if any
    last_fix: Option<(Position, Instant)>,
    /// Estimated planar velocity (vx, vz) in m/s
    velocity: (f32, f32),
    /// Minimum displacement for a velocity update (meters)
    min_movement: f32,
    /// Latency compensation horizon (seconds)
    latency: f32,
}

impl DeadReckoner {
    /// Create a predictor from engine configuration.
    pub fn new(config: &NavConfig) -> Self {
        Self {
            last_fix: None,
            velocity: (0.0, 0.0),
            min_movement: config.min_movement_for_velocity,
            latency: config.latency_compensation_secs,
        }
    }

    /// Feed a new position fix, updating the velocity estimate.
    ///
    /// Displacements below the movement threshold (or fixes closer together
    /// than the dt epsilon) leave the estimate untouched for this cycle.
    pub fn observe(&mut self, position: Position, now: Instant) {
        if let Some((prev_pos, prev_time)) = self.last_fix {
            let dt = now.duration_since(prev_time).as_secs_f32();
            let displacement = prev_pos.distance_2d(&position);

            if dt > MIN_VELOCITY_DT && displacement >= self.min_movement {
                self.velocity = ((position.x - prev_pos.x) / dt, (position.z - prev_pos.z) / dt);
            }
        }
        self.last_fix = Some((position, now));
    }

    /// Extrapolate a current position from the given fix.
    #[inline]
    pub fn predict(&self, position: Position) -> Position {
        Position::new(
            position.x + self.velocity.0 * self.latency,
            position.y,
            position.z + self.velocity.1 * self.latency,
        )
    }

    /// Estimated planar velocity (vx, vz) in m/s.
    #[inline]
    pub fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    /// Zero the velocity estimate (the user is assumed stationary).
    pub fn mark_stationary(&mut self) {
        self.velocity = (0.0, 0.0);
    }

    /// Drop all state (called on session start).
    pub fn reset(&mut self) {
        self.last_fix = None;
        self.velocity = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reckoner() -> DeadReckoner {
        DeadReckoner::new(&NavConfig::default())
    }

    #[test]
    fn test_velocity_from_fix_pair() {
        let mut dr = reckoner();
        let t0 = Instant::now();

        dr.observe(Position::ZERO, t0);
        dr.observe(Position::new(0.5, 0.0, 0.0), t0 + Duration::from_millis(500));

        let (vx, vz) = dr.velocity();
        assert!((vx - 1.0).abs() < 0.01, "vx = {}", vx);
        assert!(vz.abs() < 0.01, "vz = {}", vz);
    }

    #[test]
    fn test_prediction_adds_latency_offset() {
        let mut dr = reckoner();
        let t0 = Instant::now();

        dr.observe(Position::ZERO, t0);
        dr.observe(Position::new(1.0, 0.0, 0.0), t0 + Duration::from_secs(1));

        // 1 m/s along +X, 0.1s latency => 0.1m ahead
        let predicted = dr.predict(Position::new(1.0, 0.0, 0.0));
        assert!((predicted.x - 1.1).abs() < 0.01, "x = {}", predicted.x);
        assert!(predicted.z.abs() < 0.01);
    }

    #[test]
    fn test_sub_threshold_displacement_keeps_velocity() {
        let mut dr = reckoner();
        let t0 = Instant::now();

        dr.observe(Position::ZERO, t0);
        dr.observe(Position::new(1.0, 0.0, 0.0), t0 + Duration::from_secs(1));
        let before = dr.velocity();

        // 5cm wiggle is below the 0.1m threshold
        dr.observe(
            Position::new(1.05, 0.0, 0.0),
            t0 + Duration::from_millis(1200),
        );
        assert_eq!(dr.velocity(), before);
    }

    #[test]
    fn test_mark_stationary_zeroes_velocity() {
        let mut dr = reckoner();
        let t0 = Instant::now();

        dr.observe(Position::ZERO, t0);
        dr.observe(Position::new(1.0, 0.0, 0.0), t0 + Duration::from_secs(1));
        dr.mark_stationary();

        assert_eq!(dr.velocity(), (0.0, 0.0));
        let predicted = dr.predict(Position::new(1.0, 0.0, 0.0));
        assert_eq!(predicted, Position::new(1.0, 0.0, 0.0));
    }
}
