//! Ray / streak intensity field.
//!
//! Fractal noise stretched along the curtain gives the vertical rays; an
//! independent single-octave field, animated about ten times slower, gates
//! them so streak gaps drift separately from the ray flicker.

use glam::{DVec2, DVec3};

use crate::layer::EffectiveLayer;
use crate::math::{safe_pow, smoothstep};
use crate::noise::{fbm3, noise3};

/// Raw fractal ray field before masking. May be negative.
#[inline]
pub fn raw_rays(uv: DVec2, time: f64, layer: &EffectiveLayer) -> f64 {
    let t = time * layer.speed;
    let q = DVec3::new(
        uv.x * layer.noise_scale * layer.ray_frequency.x + t * 0.5,
        uv.y * layer.noise_scale * layer.ray_frequency.y,
        t * 0.1,
    );
    fbm3(q, layer.octaves)
}

/// Slow-varying visibility gate in [0, 1] that varies streak length.
#[inline]
pub fn streak_mask(uv: DVec2, time: f64, layer: &EffectiveLayer) -> f64 {
    let t = time * layer.speed;
    let q = DVec3::new(
        uv.x * layer.noise_scale * 0.5,
        uv.y * layer.noise_scale,
        t * 0.05,
    );
    smoothstep(0.1, 0.4, noise3(q))
}

/// Sharpened, masked ray intensity. Always >= 0.
pub fn ray_pattern(uv: DVec2, time: f64, layer: &EffectiveLayer) -> f64 {
    let rays = raw_rays(uv, time, layer) * streak_mask(uv, time, layer);
    safe_pow(rays, layer.ray_sharpness)
}
