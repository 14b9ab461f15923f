//! Per-fragment compositing: edge shape, rim term, dual falloff curves and
//! height-based color.
//!
//! Color and alpha use different response curves: color rises sub-linearly
//! (exponent 0.75), alpha super-linearly (exponent 1.5). Below full intensity
//! alpha always falls off faster than brightness.

use glam::{DVec2, DVec3};

use crate::layer::EffectiveLayer;
use crate::math::{mix, safe_normalize, safe_pow, smoothstep, UP};
use crate::pattern::ray_pattern;

const COLOR_EXPONENT: f64 = 0.75;
const ALPHA_EXPONENT: f64 = 1.5;
const GLOW_STRENGTH: f64 = 0.8;
const MIN_GLOW: f64 = 0.1;

/// Shaded fragment. `color` is already premultiplied by `color_intensity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentSample {
    pub color_intensity: f64,
    pub alpha_intensity: f64,
    pub color: DVec3,
    pub alpha: f64,
}

impl FragmentSample {
    /// Fully transparent black, the fallback for any non-finite result.
    pub const TRANSPARENT: FragmentSample = FragmentSample {
        color_intensity: 0.0,
        alpha_intensity: 0.0,
        color: DVec3::ZERO,
        alpha: 0.0,
    };

    fn is_finite(&self) -> bool {
        self.color_intensity.is_finite()
            && self.alpha_intensity.is_finite()
            && self.color.is_finite()
            && self.alpha.is_finite()
    }
}

/// Fade in from the bottom edge and out towards the top.
#[inline]
pub fn vertical_shape(uv: DVec2) -> f64 {
    smoothstep(0.0, 0.3, uv.y) * (1.0 - smoothstep(0.7, 1.0, uv.y))
}

/// Fade at the left and right edges.
#[inline]
pub fn horizontal_shape(uv: DVec2) -> f64 {
    smoothstep(0.0, 0.2, uv.x) * (1.0 - smoothstep(0.8, 1.0, uv.x))
}

#[inline]
pub fn edge_shape(uv: DVec2) -> f64 {
    vertical_shape(uv) * horizontal_shape(uv)
}

/// View-dependent rim term in [0, 1]: 1 at grazing angles, 0 head-on.
#[inline]
pub fn fresnel(view_dir: DVec3, normal: DVec3, power: f64) -> f64 {
    let v = safe_normalize(view_dir, -UP);
    let n = safe_normalize(normal, UP);
    let facing = 1.0 - v.dot(n).abs();
    let rim = safe_pow(facing, power).clamp(0.0, 1.0);
    if rim.is_nan() {
        0.0
    } else {
        rim
    }
}

/// Color and alpha response curves for a pattern / rim / shape triple.
///
/// Returns `(color_intensity, alpha_intensity)`.
#[inline]
pub fn intensity_curves(pattern: f64, rim: f64, shape: f64) -> (f64, f64) {
    let base = pattern * shape;
    let glow = rim * GLOW_STRENGTH * shape;
    let min_glow = MIN_GLOW * shape;
    let total = base + glow + min_glow;

    (
        safe_pow(total, COLOR_EXPONENT),
        safe_pow(total, ALPHA_EXPONENT),
    )
}

/// Mix low/high colors by intensity, then blend toward the top color near
/// the upper edge.
#[inline]
pub fn height_color(uv: DVec2, color_intensity: f64, layer: &EffectiveLayer) -> DVec3 {
    let color = mix(layer.color_low, layer.color_high, color_intensity);
    let y_mix = smoothstep(0.6, 0.9, uv.y);
    mix(color, layer.color_top, y_mix)
}

/// Shade one fragment of a layer.
///
/// `normal` must be the displaced surface normal (interpolated from the
/// vertex stage); `view_dir` points from the camera to the fragment.
pub fn shade(
    uv: DVec2,
    normal: DVec3,
    view_dir: DVec3,
    time: f64,
    layer: &EffectiveLayer,
) -> FragmentSample {
    let pattern = ray_pattern(uv, time, layer);
    let shape = edge_shape(uv);
    let rim = fresnel(view_dir, normal, layer.rim_power);

    let (color_intensity, alpha_intensity) = intensity_curves(pattern, rim, shape);
    let color = height_color(uv, color_intensity, layer);

    let sample = FragmentSample {
        color_intensity,
        alpha_intensity,
        color: color * color_intensity,
        alpha: alpha_intensity,
    };

    if sample.is_finite() {
        sample
    } else {
        FragmentSample::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_shape_fully_open() {
        let uv = DVec2::new(0.5, 0.5);
        assert!((edge_shape(uv) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_left_edge_fully_transparent() {
        let layer = EffectiveLayer {
            ray_sharpness: 0.0,
            rim_power: 0.0,
            ..EffectiveLayer::default()
        };
        for i in 0..=10 {
            let uv = DVec2::new(0.0, i as f64 / 10.0);
            assert_eq!(horizontal_shape(uv), 0.0);
            let s = shade(uv, DVec3::X, DVec3::NEG_Z, 3.0, &layer);
            assert_eq!(s.alpha, 0.0);
            assert_eq!(s.color, DVec3::ZERO);
        }
    }

    #[test]
    fn test_shape_closes_at_all_edges() {
        assert_eq!(edge_shape(DVec2::new(1.0, 0.5)), 0.0);
        assert_eq!(edge_shape(DVec2::new(0.5, 0.0)), 0.0);
        assert_eq!(edge_shape(DVec2::new(0.5, 1.0)), 0.0);
    }

    #[test]
    fn test_fresnel_range() {
        let dirs = [
            DVec3::X,
            DVec3::Y,
            DVec3::Z,
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(-0.3, 0.2, 0.9),
            DVec3::new(0.5, -2.0, 0.1),
            DVec3::ZERO,
        ];
        for &v in &dirs {
            for &n in &dirs {
                for power in [0.0, 0.5, 1.0, 2.0, 4.0] {
                    let f = fresnel(v, n, power);
                    assert!((0.0..=1.0).contains(&f), "fresnel({v}, {n}, {power}) = {f}");
                }
            }
        }
    }

    #[test]
    fn test_fresnel_head_on_and_grazing() {
        assert_eq!(fresnel(DVec3::NEG_Z, DVec3::Z, 2.0), 0.0);
        assert_eq!(fresnel(DVec3::X, DVec3::Z, 2.0), 1.0);
    }

    #[test]
    fn test_min_glow_only_curves() {
        for shape in [0.05, 0.3, 0.75, 1.0] {
            let (color, alpha) = intensity_curves(0.0, 0.0, shape);
            assert_eq!(color, (0.1 * shape).powf(0.75));
            assert_eq!(alpha, (0.1 * shape).powf(1.5));
        }
    }

    #[test]
    fn test_color_tail_longer_than_alpha() {
        // Below 1.0 the color curve always sits above the alpha curve
        for i in 1..100 {
            let (color, alpha) = intensity_curves(i as f64 / 150.0, 0.0, 1.0);
            assert!(color > alpha);
        }
    }

    #[test]
    fn test_color_is_premultiplied() {
        let layer = EffectiveLayer::default();
        let uv = DVec2::new(0.4, 0.55);
        let s = shade(uv, DVec3::new(0.2, 0.1, 0.97), DVec3::NEG_Z, 8.0, &layer);
        let unmultiplied = height_color(uv, s.color_intensity, &layer);
        assert!((s.color - unmultiplied * s.color_intensity).length() < 1e-12);
        assert_eq!(s.alpha, s.alpha_intensity);
    }

    #[test]
    fn test_top_color_near_upper_edge() {
        let layer = EffectiveLayer::default();
        let c = height_color(DVec2::new(0.5, 0.95), 0.6, &layer);
        assert!((c - layer.color_top).length() < 1e-12);
    }

    #[test]
    fn test_non_finite_input_is_transparent() {
        let layer = EffectiveLayer {
            noise_scale: f64::NAN,
            ..EffectiveLayer::default()
        };
        let s = shade(DVec2::new(0.5, 0.5), DVec3::Z, DVec3::NEG_Z, 1.0, &layer);
        assert_eq!(s, FragmentSample::TRANSPARENT);
    }

    #[test]
    fn test_shade_idempotent() {
        let layer = EffectiveLayer::default();
        let uv = DVec2::new(0.33, 0.41);
        let n = DVec3::new(0.1, -0.2, 0.97);
        let a = shade(uv, n, DVec3::new(0.1, 0.0, -1.0), 4.5, &layer);
        let b = shade(uv, n, DVec3::new(0.1, 0.0, -1.0), 4.5, &layer);
        assert_eq!(a, b);
    }
}
