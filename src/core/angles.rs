//! Angle helpers for heading math in degrees.

/// Normalize an angle in degrees to (-180, 180].
#[inline]
pub fn normalize_deg(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Circular mean of angles in degrees.
///
/// Averages via unit-vector components so the result is correct across
/// the ±180° discontinuity, where an arithmetic mean is invalid.
/// Returns `None` for an empty slice or when the vector sum degenerates
/// (e.g. two exactly opposed headings).
pub fn circular_mean_deg(angles: &[f32]) -> Option<f32> {
    if angles.is_empty() {
        return None;
    }

    let mut sum_cos = 0.0f32;
    let mut sum_sin = 0.0f32;
    for &a in angles {
        let rad = a.to_radians();
        sum_cos += rad.cos();
        sum_sin += rad.sin();
    }

    // Degenerate when headings cancel out
    if sum_cos.abs() < 1e-6 && sum_sin.abs() < 1e-6 {
        return None;
    }

    Some(sum_sin.atan2(sum_cos).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wraps_over() {
        assert!((normalize_deg(190.0) - (-170.0)).abs() < 1e-5);
        assert!((normalize_deg(-190.0) - 170.0).abs() < 1e-5);
        assert!((normalize_deg(540.0) - 180.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_keeps_half_open_interval() {
        assert_eq!(normalize_deg(180.0), 180.0);
        assert_eq!(normalize_deg(-180.0), 180.0);
    }

    #[test]
    fn test_circular_mean_simple() {
        let mean = circular_mean_deg(&[10.0, 20.0, 30.0]).unwrap();
        assert!((mean - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_circular_mean_across_wraparound() {
        // Arithmetic mean of {179, -179} would be 0; circular mean is ±180
        let mean = circular_mean_deg(&[179.0, -179.0, 179.0, -179.0, 179.0]).unwrap();
        assert!(mean.abs() > 170.0, "mean = {}", mean);
    }

    #[test]
    fn test_circular_mean_empty() {
        assert!(circular_mean_deg(&[]).is_none());
    }
}
