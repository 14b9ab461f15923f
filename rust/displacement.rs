//! Per-vertex wave displacement with finite-difference normals.
//!
//! `wave_height` is the only place the displacement formula exists. Both the
//! visible position and the two neighbouring samples used for the normal go
//! through it, so lighting always matches the displaced surface.

use glam::{DVec2, DVec3};

use crate::layer::EffectiveLayer;
use crate::math::{safe_normalize, UP};
use crate::noise::noise3;

/// Finite-difference step for normal reconstruction, in plane-local units.
pub const NORMAL_STEP: f64 = 0.01;

/// Displaced vertex: position plus unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: DVec3,
    pub normal: DVec3,
}

/// Height offset of the surface at plane-local position `p`.
#[inline]
pub fn wave_height(p: DVec2, time: f64, layer: &EffectiveLayer) -> f64 {
    let t = time * layer.speed;
    let q = DVec3::new(
        p.x * layer.noise_scale * layer.wave_frequency.x + t * 0.2,
        p.y * layer.noise_scale * layer.wave_frequency.y,
        t * 0.1,
    );
    noise3(q) * layer.wave_amplitude
}

/// Displaced position for plane-local `p`.
#[inline]
pub fn displace(p: DVec2, time: f64, layer: &EffectiveLayer) -> DVec3 {
    DVec3::new(p.x, p.y, wave_height(p, time, layer))
}

/// Displace `p` and reconstruct its normal with the default step.
#[inline]
pub fn surface_sample(p: DVec2, time: f64, layer: &EffectiveLayer) -> SurfaceSample {
    surface_sample_with_step(p, time, layer, NORMAL_STEP)
}

/// Displace `p` and reconstruct its normal from samples `step` away along
/// each plane axis.
///
/// Degenerate tangents (zero or non-finite step) fall back to the
/// undisplaced plane normal.
pub fn surface_sample_with_step(
    p: DVec2,
    time: f64,
    layer: &EffectiveLayer,
    step: f64,
) -> SurfaceSample {
    let p0 = displace(p, time, layer);
    let px = displace(p + DVec2::new(step, 0.0), time, layer);
    let py = displace(p + DVec2::new(0.0, step), time, layer);

    let tangent = safe_normalize(px - p0, DVec3::X);
    let bitangent = safe_normalize(py - p0, DVec3::Y);
    let normal = safe_normalize(tangent.cross(bitangent), UP);

    SurfaceSample {
        position: p0,
        normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_layer() -> EffectiveLayer {
        EffectiveLayer {
            wave_amplitude: 0.0,
            ..EffectiveLayer::default()
        }
    }

    #[test]
    fn test_flat_plane_normal_is_exactly_up() {
        let layer = flat_layer();
        for i in 0..50 {
            let p = DVec2::new(i as f64 * 0.37 - 9.0, i as f64 * -0.21 + 4.0);
            let s = surface_sample(p, i as f64 * 1.3, &layer);
            assert_eq!(s.normal, DVec3::new(0.0, 0.0, 1.0));
            assert_eq!(s.position, DVec3::new(p.x, p.y, 0.0));
        }
    }

    #[test]
    fn test_normals_unit_length() {
        let layer = EffectiveLayer {
            wave_amplitude: 2.0,
            ..EffectiveLayer::default()
        };
        for i in 0..200 {
            let p = DVec2::new((i % 20) as f64 - 10.0, (i / 20) as f64 - 5.0);
            let s = surface_sample(p, 3.7, &layer);
            assert!((s.normal.length() - 1.0).abs() < 1e-12);
            assert!(s.normal.z > 0.0);
        }
    }

    #[test]
    fn test_position_uses_wave_height() {
        let layer = EffectiveLayer::default();
        let p = DVec2::new(1.25, -0.5);
        let s = surface_sample(p, 2.0, &layer);
        assert_eq!(s.position.z, wave_height(p, 2.0, &layer));
    }

    #[test]
    fn test_normal_matches_displaced_surface() {
        // Normal should be perpendicular to the surface's own tangents
        let layer = EffectiveLayer {
            wave_amplitude: 1.5,
            ..EffectiveLayer::default()
        };
        let p = DVec2::new(0.7, 1.9);
        let s = surface_sample(p, 5.0, &layer);
        let tx = displace(p + DVec2::new(1e-5, 0.0), 5.0, &layer) - s.position;
        let ty = displace(p + DVec2::new(0.0, 1e-5), 5.0, &layer) - s.position;
        assert!(s.normal.dot(tx.normalize()).abs() < 0.02);
        assert!(s.normal.dot(ty.normalize()).abs() < 0.02);
    }

    #[test]
    fn test_zero_step_falls_back_to_up() {
        let layer = EffectiveLayer::default();
        let s = surface_sample_with_step(DVec2::new(0.3, 0.3), 1.0, &layer, 0.0);
        assert_eq!(s.normal, UP);
    }

    #[test]
    fn test_displacement_idempotent() {
        let layer = EffectiveLayer::default();
        let p = DVec2::new(-3.3, 2.2);
        assert_eq!(surface_sample(p, 9.5, &layer), surface_sample(p, 9.5, &layer));
    }

    #[test]
    fn test_zero_speed_freezes_surface() {
        let layer = EffectiveLayer {
            speed: 0.0,
            ..EffectiveLayer::default()
        };
        let p = DVec2::new(0.4, 0.9);
        assert_eq!(wave_height(p, 0.0, &layer), wave_height(p, 1000.0, &layer));
    }
}
