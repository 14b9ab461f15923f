//! Aurora layer parameters.
//!
//! A `Layer` holds the base values from the scene configuration and is never
//! mutated after load. Global slider values arrive once per frame as a
//! `Multipliers` snapshot; `Layer::effective` combines the two into the
//! `EffectiveLayer` that the displacement, pattern and shading stages read.

use glam::{DVec2, DVec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{AuroraError, Result};
use crate::noise::DEFAULT_OCTAVES;

/// Slider ranges enforced on the global multipliers.
pub const AMPLITUDE_RANGE: (f64, f64) = (0.0, 2.0);
pub const SPEED_RANGE: (f64, f64) = (0.0, 1.0);
pub const RIM_POWER_RANGE: (f64, f64) = (0.0, 4.0);
pub const SHARPNESS_RANGE: (f64, f64) = (0.0, 4.0);

/// Ranges the effective per-layer values are held to after multiplying.
pub const LAYER_AMPLITUDE_RANGE: (f64, f64) = (0.0, 2.0);
pub const LAYER_RIM_POWER_RANGE: (f64, f64) = (0.0, 4.0);
pub const LAYER_SHARPNESS_RANGE: (f64, f64) = (0.0, 4.0);

fn default_rim_power() -> f64 {
    2.0
}

/// Base parameters for one displaced aurora surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// World-space offset along the view axis (z).
    pub depth_offset: f64,
    pub noise_scale: f64,
    pub wave_frequency: DVec2,
    pub wave_amplitude: f64,
    pub animation_speed: f64,
    pub ray_frequency: DVec2,
    pub ray_sharpness: f64,
    /// Fresnel exponent before the rim power multiplier.
    #[serde(default = "default_rim_power")]
    pub rim_power: f64,
    pub color_low: DVec3,
    pub color_high: DVec3,
    pub color_top: DVec3,
}

impl Layer {
    /// Check that every base value is usable.
    ///
    /// Depth offset only has to be finite; all other scalars must also be
    /// non-negative, and colors must be finite.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |field: &'static str, value: f64| AuroraError::InvalidLayer {
            index,
            field,
            value,
        };

        if !self.depth_offset.is_finite() {
            return Err(invalid("depth_offset", self.depth_offset));
        }

        let scalars = [
            ("noise_scale", self.noise_scale),
            ("wave_frequency.x", self.wave_frequency.x),
            ("wave_frequency.y", self.wave_frequency.y),
            ("wave_amplitude", self.wave_amplitude),
            ("animation_speed", self.animation_speed),
            ("ray_frequency.x", self.ray_frequency.x),
            ("ray_frequency.y", self.ray_frequency.y),
            ("ray_sharpness", self.ray_sharpness),
            ("rim_power", self.rim_power),
        ];
        for (field, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, value));
            }
        }

        let colors = [
            ("color_low", self.color_low),
            ("color_high", self.color_high),
            ("color_top", self.color_top),
        ];
        for (field, color) in colors {
            if !color.is_finite() {
                return Err(invalid(field, color.max_element()));
            }
        }

        Ok(())
    }

    /// Combine base values with this frame's multipliers.
    ///
    /// `multipliers` is applied as given; callers clamp it once per frame
    /// with `Multipliers::clamped`. Amplitude, rim power and sharpness are
    /// then held to their layer ranges whatever the base values are. The
    /// result is computed fresh every frame and never written back.
    pub fn effective(&self, multipliers: &Multipliers, octaves: u32) -> EffectiveLayer {
        let m = multipliers;

        EffectiveLayer {
            depth_offset: self.depth_offset,
            noise_scale: self.noise_scale,
            wave_frequency: self.wave_frequency,
            wave_amplitude: clamp_range(self.wave_amplitude * m.amplitude, LAYER_AMPLITUDE_RANGE),
            speed: (self.animation_speed * m.speed).max(0.0),
            ray_frequency: self.ray_frequency,
            ray_sharpness: clamp_range(self.ray_sharpness * m.sharpness, LAYER_SHARPNESS_RANGE),
            rim_power: clamp_range(self.rim_power * m.rim_power, LAYER_RIM_POWER_RANGE),
            color_low: self.color_low,
            color_high: self.color_high,
            color_top: self.color_top,
            octaves,
        }
    }
}

/// `f64::max` / `f64::min` drop NaN, so a NaN product lands on the low end.
#[inline]
fn clamp_range(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.max(lo).min(hi)
}

/// Per-frame values seen by the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveLayer {
    pub depth_offset: f64,
    pub noise_scale: f64,
    pub wave_frequency: DVec2,
    pub wave_amplitude: f64,
    pub speed: f64,
    pub ray_frequency: DVec2,
    pub ray_sharpness: f64,
    pub rim_power: f64,
    pub color_low: DVec3,
    pub color_high: DVec3,
    pub color_top: DVec3,
    /// FBM octave count for the ray pattern.
    pub octaves: u32,
}

impl Default for EffectiveLayer {
    fn default() -> Self {
        default_layers()[1].effective(&Multipliers::default(), DEFAULT_OCTAVES)
    }
}

/// Global slider snapshot, applied multiplicatively to every layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    pub amplitude: f64,
    pub speed: f64,
    pub rim_power: f64,
    pub sharpness: f64,
}

impl Default for Multipliers {
    fn default() -> Self {
        Multipliers {
            amplitude: 1.0,
            speed: 1.0,
            rim_power: 1.0,
            sharpness: 1.0,
        }
    }
}

impl Multipliers {
    /// Clamp each multiplier into its slider range.
    ///
    /// Out-of-range values are normally rejected by the UI; non-finite values
    /// fall back to the neutral 1.0.
    pub fn clamped(&self) -> Multipliers {
        Multipliers {
            amplitude: clamp_slider("amplitude", self.amplitude, AMPLITUDE_RANGE),
            speed: clamp_slider("speed", self.speed, SPEED_RANGE),
            rim_power: clamp_slider("rim_power", self.rim_power, RIM_POWER_RANGE),
            sharpness: clamp_slider("sharpness", self.sharpness, SHARPNESS_RANGE),
        }
    }
}

fn clamp_slider(name: &str, value: f64, (lo, hi): (f64, f64)) -> f64 {
    if !value.is_finite() {
        warn!("multiplier {name} is {value}, using 1.0");
        return 1.0_f64.clamp(lo, hi);
    }
    if value < lo || value > hi {
        warn!("multiplier {name}={value} outside [{lo}, {hi}], clamping");
    }
    value.clamp(lo, hi)
}

/// The fixed three-curtain configuration used when no config is supplied.
///
/// Depth offsets ascend so depth sorting stays predictable.
pub fn default_layers() -> Vec<Layer> {
    vec![
        Layer {
            depth_offset: -2.0,
            noise_scale: 0.8,
            wave_frequency: DVec2::new(0.4, 0.7),
            wave_amplitude: 0.6,
            animation_speed: 0.25,
            ray_frequency: DVec2::new(3.0, 0.4),
            ray_sharpness: 3.0,
            rim_power: 2.0,
            color_low: DVec3::new(0.0, 0.35, 0.25),
            color_high: DVec3::new(0.2, 1.0, 0.55),
            color_top: DVec3::new(0.55, 0.2, 0.85),
        },
        Layer {
            depth_offset: 0.0,
            noise_scale: 1.0,
            wave_frequency: DVec2::new(0.5, 0.8),
            wave_amplitude: 0.5,
            animation_speed: 0.3,
            ray_frequency: DVec2::new(3.5, 0.5),
            ray_sharpness: 2.5,
            rim_power: 2.0,
            color_low: DVec3::new(0.0, 0.3, 0.35),
            color_high: DVec3::new(0.1, 0.9, 0.7),
            color_top: DVec3::new(0.4, 0.25, 0.9),
        },
        Layer {
            depth_offset: 2.0,
            noise_scale: 1.2,
            wave_frequency: DVec2::new(0.6, 0.9),
            wave_amplitude: 0.4,
            animation_speed: 0.35,
            ray_frequency: DVec2::new(4.0, 0.6),
            ray_sharpness: 3.5,
            rim_power: 2.5,
            color_low: DVec3::new(0.05, 0.25, 0.15),
            color_high: DVec3::new(0.3, 1.0, 0.4),
            color_top: DVec3::new(0.7, 0.15, 0.6),
        },
    ]
}
