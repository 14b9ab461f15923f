//! Compositor operations for final frame output.
//!
//! Converts the premultiplied RGBA accumulation buffer to RGB uint8 over a
//! background color. `compose_frame` fuses rendering and conversion.
//!
//! Uses thread-local buffer pooling to eliminate per-frame allocations.

use std::cell::RefCell;

use crate::error::{AuroraError, Result};
use crate::scene::{AuroraScene, FrameParams};

// Thread-local accumulation buffer reused across frames. Grows as needed
// but never shrinks.
thread_local! {
    static COMPOSE_BUFFER: RefCell<Vec<f64>> = const { RefCell::new(Vec::new()) };
}

/// Convert a premultiplied RGBA f64 buffer to RGB u8.
///
/// # Formula
/// ```text
/// coverage = clamp(alpha, 0, 1)
/// out_c    = clamp(c + (1 - coverage) * bg_c, 0, 1) * 255
/// ```
/// Color is already premultiplied, so it is added rather than scaled by
/// alpha. NaN channels count as 0.
pub fn to_rgb8_impl(input: &[f64], bg: [f64; 3], output: &mut [u8]) -> Result<()> {
    if input.len() % 4 != 0 {
        return Err(AuroraError::PartialPixel {
            len: input.len(),
            channels: 4,
        });
    }
    let pixels = input.len() / 4;
    if output.len() != pixels * 3 {
        return Err(AuroraError::BufferSize {
            expected: pixels * 3,
            actual: output.len(),
        });
    }

    for (src, dst) in input.chunks_exact(4).zip(output.chunks_exact_mut(3)) {
        let alpha = src[3];
        let coverage = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
        let inv_coverage = 1.0 - coverage;

        for c in 0..3 {
            let color = if src[c].is_nan() { 0.0 } else { src[c] };
            let composited = color + inv_coverage * bg[c];
            dst[c] = (composited.clamp(0.0, 1.0) * 255.0) as u8;
        }
    }

    Ok(())
}

/// Render `scene` and convert straight to RGB u8, reusing a thread-local
/// accumulation buffer.
pub fn compose_frame(
    scene: &AuroraScene,
    frame: &FrameParams,
    width: usize,
    height: usize,
    bg: [f64; 3],
    output: &mut [u8],
) -> Result<()> {
    let required_size = width * height * 4;
    if output.len() != width * height * 3 {
        return Err(AuroraError::BufferSize {
            expected: width * height * 3,
            actual: output.len(),
        });
    }

    COMPOSE_BUFFER.with(|cell| {
        let mut buffer = cell.borrow_mut();

        // Grow buffer if needed (never shrinks - amortized O(1))
        if buffer.len() < required_size {
            buffer.resize(required_size, 0.0);
        }

        let accum = &mut buffer[..required_size];
        scene.render(frame, width, height, accum)?;
        to_rgb8_impl(accum, bg, output)
    })
}
