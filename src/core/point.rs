//! Position type for the fixed map coordinate frame.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A position in the map frame (meters, f32).
///
/// Y is vertical; all planar operations work in the (x, z) plane.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters (vertical, ignored by planar operations)
    pub y: f32,
    /// Z coordinate in meters
    pub z: f32,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Origin
    pub const ZERO: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Full 3D Euclidean distance to another position
    #[inline]
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Planar (x, z) distance to another position
    #[inline]
    pub fn distance_2d(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Squared planar distance (faster, avoids sqrt)
    #[inline]
    pub fn distance_2d_squared(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// Planar bearing from this position to another, in degrees.
    ///
    /// Computed as `atan2(dz, dx)`; positive angles are CCW toward +Z.
    #[inline]
    pub fn bearing_to_deg(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dz.atan2(dx).to_degrees()
    }
}

impl Add for Position {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Position::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Position {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Position::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Position {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Position::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}
