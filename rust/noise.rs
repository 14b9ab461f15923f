//! 3D simplex gradient noise and fractal sums.
//!
//! The kernel is the permutation-polynomial simplex noise from Ian McEwan
//! and Stefan Gustavson (MIT), evaluated in f64. It needs no lookup tables
//! or seeds, so every call is a pure function of its input position.
//!
//! Two changes from the shader original keep the field continuous, which
//! finite-difference normals depend on:
//! - corner kernels have squared radius 0.5 (the shader uses 0.6, which
//!   lets corners outside the current simplex leak in and leave seams)
//! - simplex ordering breaks ties strictly, so points on the cell diagonal
//!   still select three distinct corners
//!
//! - `noise3` - single octave, approximately [-1, 1]
//! - `fbm3` - unnormalized octave sum used by the ray pattern

use glam::DVec3;

/// Default octave count for `fbm3`.
pub const DEFAULT_OCTAVES: u32 = 3;

// Skew / unskew factors for the 3D simplex lattice
const F3: f64 = 1.0 / 3.0;
const G3: f64 = 1.0 / 6.0;

// Squared kernel radius and the scale that maps the sum to about [-1, 1]
const RADIUS_SQ: f64 = 0.5;
const SCALE: f64 = 106.0;

// Gradient ring constants: 7x7 points mapped onto an octahedron
const NS_X: f64 = 2.0 / 7.0;
const NS_Y: f64 = 0.5 / 7.0 - 1.0;
const NS_Z: f64 = 1.0 / 7.0;

#[inline]
fn mod289(x: f64) -> f64 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: f64) -> f64 {
    mod289((x * 34.0 + 1.0) * x)
}

#[inline]
fn taylor_inv_sqrt(r: f64) -> f64 {
    1.792_842_914_001_59 - 0.853_734_720_953_14 * r
}

/// GLSL `step`: 0.0 when `x < edge`, otherwise 1.0.
#[inline]
fn step(edge: f64, x: f64) -> f64 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Pseudo-random gradient for a permuted corner hash.
#[inline]
fn gradient(hash: f64) -> DVec3 {
    // hash mod 49, split into a 7x7 grid
    let j = hash - 49.0 * (hash * NS_Z * NS_Z).floor();
    let gx_cell = (j * NS_Z).floor();
    let gy_cell = (j - 7.0 * gx_cell).floor();

    let mut gx = gx_cell * NS_X + NS_Y;
    let mut gy = gy_cell * NS_X + NS_Y;
    let gz = 1.0 - gx.abs() - gy.abs();

    // Fold the lower half of the octahedron back up
    let sh = -step(gz, 0.0);
    gx += (gx.floor() * 2.0 + 1.0) * sh;
    gy += (gy.floor() * 2.0 + 1.0) * sh;

    let g = DVec3::new(gx, gy, gz);
    g * taylor_inv_sqrt(g.length_squared())
}

/// Evaluate 3D simplex noise at `v`.
///
/// Deterministic, continuous across lattice cells and free of axis-aligned
/// artifacts. Output stays within roughly [-0.98, 0.98].
#[allow(clippy::many_single_char_names)]
pub fn noise3(v: DVec3) -> f64 {
    // First corner
    let i = (v + v.element_sum() * F3).floor();
    let x0 = v - i + i.element_sum() * G3;

    // Other corners, ordered by which axis dominates (ties favour x, then y)
    let g = DVec3::new(
        step(x0.y, x0.x),
        step(x0.z, x0.y),
        1.0 - step(x0.z, x0.x),
    );
    let l = 1.0 - g;
    let l_rot = DVec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_rot);
    let i2 = g.max(l_rot);

    let x1 = x0 - i1 + G3;
    let x2 = x0 - i2 + F3;
    let x3 = x0 - 0.5;

    // Hash the four corners
    let i = DVec3::new(mod289(i.x), mod289(i.y), mod289(i.z));
    let corners = [DVec3::ZERO, i1, i2, DVec3::ONE];
    let offsets = [x0, x1, x2, x3];

    let mut total = 0.0;
    for (corner, offset) in corners.iter().zip(offsets.iter()) {
        let hash = permute(permute(permute(i.z + corner.z) + i.y + corner.y) + i.x + corner.x);

        let falloff = (RADIUS_SQ - offset.length_squared()).max(0.0);
        let falloff = falloff * falloff;
        total += falloff * falloff * gradient(hash).dot(*offset);
    }

    SCALE * total
}

/// Fractal Brownian Motion over `noise3`.
///
/// Starts at amplitude 0.5 and doubles the frequency / halves the amplitude
/// each octave. Not normalized: the first octave dominates, so for small
/// octave counts the result stays visually within [-1, 1].
#[inline]
pub fn fbm3(p: DVec3, octaves: u32) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut pos = p;

    for _ in 0..octaves {
        value += amplitude * noise3(pos);
        pos *= 2.0;
        amplitude *= 0.5;
    }

    value
}
