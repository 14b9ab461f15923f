//! Shader-style scalar and vector helpers.
//!
//! Every helper here is total: out-of-range inputs are clamped and
//! degenerate vectors fall back to a safe default instead of producing NaN.

use glam::DVec3;

/// Fallback normal for degenerate surfaces (the undisplaced plane normal).
pub const UP: DVec3 = DVec3::Z;

/// Smooth interpolation between edges (Hermite polynomial).
///
/// Clamped to [0, 1] outside the edges. Coincident edges degrade to a hard
/// step at the edge.
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend between two colors. `t` is not clamped, matching GLSL `mix`.
#[inline]
pub fn mix(a: DVec3, b: DVec3, t: f64) -> DVec3 {
    a + (b - a) * t
}

/// `|base|^exp`. Fractional powers of negative bases are undefined, so the
/// sign is always dropped first.
#[inline]
pub fn safe_pow(base: f64, exp: f64) -> f64 {
    base.abs().powf(exp)
}

/// Normalize `v`, or return `fallback` when `v` has zero or non-finite length.
///
/// Divides by the length (rather than multiplying by its reciprocal) so that
/// axis-aligned inputs normalize to exact unit components.
#[inline]
pub fn safe_normalize(v: DVec3, fallback: DVec3) -> DVec3 {
    let len = v.length();
    if len > f64::MIN_POSITIVE && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.1, 0.4, -5.0), 0.0);
        assert_eq!(smoothstep(0.1, 0.4, 0.1), 0.0);
        assert_eq!(smoothstep(0.1, 0.4, 0.4), 1.0);
        assert_eq!(smoothstep(0.1, 0.4, 12.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_smoothstep_monotonic() {
        let mut prev = smoothstep(0.2, 0.7, -1.0);
        for i in 0..=300 {
            let x = -1.0 + i as f64 * 0.01;
            let v = smoothstep(0.2, 0.7, x);
            assert!(v >= prev, "smoothstep decreased at x={x}");
            assert!((0.0..=1.0).contains(&v));
            prev = v;
        }
    }

    #[test]
    fn test_smoothstep_coincident_edges() {
        assert_eq!(smoothstep(0.5, 0.5, 0.49), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
    }

    #[test]
    fn test_safe_pow_negative_base() {
        assert_eq!(safe_pow(-0.5, 2.0), 0.25);
        assert!(safe_pow(-0.3, 0.75).is_finite());
    }

    #[test]
    fn test_safe_normalize() {
        assert_eq!(safe_normalize(DVec3::new(0.0, 0.0, 3.0), UP), DVec3::Z);
        assert_eq!(safe_normalize(DVec3::ZERO, UP), UP);
        assert_eq!(safe_normalize(DVec3::new(f64::NAN, 0.0, 1.0), UP), UP);
        let n = safe_normalize(DVec3::new(1.0, 2.0, -2.0), UP);
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mix() {
        let a = DVec3::new(0.0, 0.5, 1.0);
        let b = DVec3::new(1.0, 0.5, 0.0);
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
        assert_eq!(mix(a, b, 0.5), DVec3::splat(0.5));
    }
}
