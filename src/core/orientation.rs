//! Orientation quaternion supplied by the external localization source.

use serde::{Deserialize, Serialize};

/// A unit quaternion describing device orientation in the map frame.
///
/// Used only to derive a planar forward direction when movement-based
/// heading is unavailable. The caller is trusted to supply a valid unit
/// quaternion; malformed input degrades heading quality but cannot panic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W (scalar) component
    pub w: f32,
}

impl Orientation {
    /// Create a new orientation quaternion
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation (forward along +Z)
    pub const IDENTITY: Orientation = Orientation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Planar forward direction (x, z) obtained by rotating the local
    /// forward axis by this quaternion.
    #[inline]
    pub fn forward_2d(&self) -> (f32, f32) {
        let fx = 2.0 * (self.x * self.z + self.w * self.y);
        let fz = 1.0 - 2.0 * (self.x * self.x + self.y * self.y);
        (fx, fz)
    }

    /// Heading in degrees derived from the planar forward direction.
    #[inline]
    pub fn heading_deg(&self) -> f32 {
        let (fx, fz) = self.forward_2d();
        fz.atan2(fx).to_degrees()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_faces_forward() {
        let (fx, fz) = Orientation::IDENTITY.forward_2d();

        assert!(fx.abs() < 1e-6);
        assert!((fz - 1.0).abs() < 1e-6);
        assert!((Orientation::IDENTITY.heading_deg() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        // 90 degree rotation about the vertical axis
        let half = std::f32::consts::FRAC_PI_4;
        let q = Orientation::new(0.0, half.sin(), 0.0, half.cos());
        let (fx, fz) = q.forward_2d();

        assert!((fx - 1.0).abs() < 1e-5);
        assert!(fz.abs() < 1e-5);
    }

    #[test]
    fn test_malformed_quaternion_does_not_panic() {
        let q = Orientation::new(0.0, 0.0, 0.0, 0.0);
        let _ = q.heading_deg();
    }
}
