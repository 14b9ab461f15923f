//! Additive blending of premultiplied aurora layers.
//!
//! All buffers are RGBA f64, row-major, shape (height, width, 4). Colors are
//! already premultiplied by their own intensity, so compositing is a plain
//! per-channel sum, independent of layer order. Non-finite results are
//! written as 0.

use crate::shading::FragmentSample;

/// Replace NaN and infinities with 0 so a bad sample can never poison the
/// frame buffer.
#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Add one shaded fragment into an RGBA pixel.
#[inline]
pub fn accumulate(pixel: &mut [f64], sample: &FragmentSample) {
    debug_assert!(pixel.len() >= 4, "Pixel must have 4 channels (RGBA)");

    pixel[0] += finite_or_zero(sample.color.x);
    pixel[1] += finite_or_zero(sample.color.y);
    pixel[2] += finite_or_zero(sample.color.z);
    pixel[3] += finite_or_zero(sample.alpha);
}

/// Macro for element-wise blends over whole RGBA buffers.
macro_rules! buffer_blend {
    ($(#[$meta:meta])* $name:ident, |$b:ident, $l:ident| $formula:expr) => {
        $(#[$meta])*
        pub fn $name(base: &[f64], layer: &[f64], output: &mut [f64]) {
            debug_assert_eq!(base.len(), layer.len(), "Input shapes must match");
            debug_assert_eq!(base.len(), output.len(), "Output shape must match");

            for ((out, &$b), &$l) in output.iter_mut().zip(base).zip(layer) {
                *out = finite_or_zero($formula);
            }
        }
    };
}

buffer_blend!(
    /// Addition: b + l on all four channels (unclamped for HDR accumulation).
    blend_addition_impl,
    |b, l| b + l
);

/// Add `layer` into `frame` in place.
pub fn accumulate_buffer(frame: &mut [f64], layer: &[f64]) {
    debug_assert_eq!(frame.len(), layer.len(), "Input shapes must match");

    for (out, &l) in frame.iter_mut().zip(layer) {
        *out = finite_or_zero(*out + l);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_accumulate_sums_premultiplied() {
        let mut pixel = [0.1, 0.2, 0.3, 0.4];
        let sample = FragmentSample {
            color_intensity: 0.5,
            alpha_intensity: 0.25,
            color: DVec3::new(0.5, 0.25, 0.0),
            alpha: 0.25,
        };
        accumulate(&mut pixel, &sample);
        assert_eq!(pixel, [0.6, 0.45, 0.3, 0.65]);
    }

    #[test]
    fn test_accumulate_drops_nan() {
        let mut pixel = [0.0; 4];
        let sample = FragmentSample {
            color: DVec3::new(f64::NAN, 1.0, 0.0),
            alpha: f64::NAN,
            ..FragmentSample::TRANSPARENT
        };
        accumulate(&mut pixel, &sample);
        assert_eq!(pixel, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_blend_addition_commutative() {
        let a: Vec<f64> = (0..32).map(|i| (i as f64 * 0.1).sin().abs()).collect();
        let b: Vec<f64> = (0..32).map(|i| (i as f64 * 0.3).cos().abs()).collect();
        let mut ab = vec![0.0; 32];
        let mut ba = vec![0.0; 32];
        blend_addition_impl(&a, &b, &mut ab);
        blend_addition_impl(&b, &a, &mut ba);
        assert_eq!(ab, ba);
        assert_eq!(ab[5], a[5] + b[5]);
    }

    #[test]
    fn test_blend_addition_unclamped() {
        let mut out = [0.0; 4];
        blend_addition_impl(&[0.8, 0.9, 1.0, 0.7], &[0.5, 0.5, 0.5, 0.5], &mut out);
        assert_eq!(out, [1.3, 1.4, 1.5, 1.2]);
    }

    #[test]
    fn test_accumulate_buffer_matches_addition() {
        let mut frame = vec![0.25; 8];
        let layer = vec![0.5; 8];
        let mut expected = vec![0.0; 8];
        blend_addition_impl(&frame, &layer, &mut expected);
        accumulate_buffer(&mut frame, &layer);
        assert_eq!(frame, expected);
    }

    #[test]
    fn test_infinities_dropped() {
        let mut out = [1.0; 4];
        blend_addition_impl(
            &[f64::INFINITY, 0.5, f64::NEG_INFINITY, 0.25],
            &[0.5, f64::NAN, 0.5, 0.25],
            &mut out,
        );
        assert_eq!(out, [0.0, 0.0, 0.0, 0.5]);

        let mut frame = [0.25, f64::INFINITY, 0.0, 0.0];
        accumulate_buffer(&mut frame, &[0.25, 0.0, f64::NEG_INFINITY, 0.5]);
        assert_eq!(frame, [0.5, 0.0, 0.0, 0.5]);

        let mut pixel = [0.0; 4];
        let sample = FragmentSample {
            color: DVec3::new(f64::INFINITY, 0.5, 0.0),
            alpha: f64::NEG_INFINITY,
            ..FragmentSample::TRANSPARENT
        };
        accumulate(&mut pixel, &sample);
        assert_eq!(pixel, [0.0, 0.5, 0.0, 0.0]);
    }
}
