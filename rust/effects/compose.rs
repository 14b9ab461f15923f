//! Buffer-level blending and output conversion for Python callers.

use numpy::{PyArray3, PyArrayMethods, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::blending::blend_addition_impl;
use crate::compositor::to_rgb8_impl;

/// Convert a premultiplied RGBA f64 frame to RGB u8 over a background color.
///
/// # Arguments
/// * `arr` - Input RGBA f64 array shape (height, width, 4)
/// * `output` - Output RGB u8 array shape (height, width, 3), written in-place
/// * `bg_r` - Background red component (0.0..1.0)
/// * `bg_g` - Background green component (0.0..1.0)
/// * `bg_b` - Background blue component (0.0..1.0)
#[pyfunction]
pub fn rgba2rgb<'py>(
    arr: PyReadonlyArray3<'py, f64>,
    output: &Bound<'py, PyArray3<u8>>,
    bg_r: f64,
    bg_g: f64,
    bg_b: f64,
) -> PyResult<()> {
    if arr.shape()[2] != 4 {
        return Err(PyValueError::new_err("Input must have 4 channels (RGBA)"));
    }
    let input = arr
        .as_slice()
        .map_err(|_| PyValueError::new_err("Input must be C-contiguous float64"))?;

    // SAFETY: We have exclusive write access to output through PyO3's borrow rules
    let out = unsafe { output.as_slice_mut() }
        .map_err(|_| PyValueError::new_err("Output must be C-contiguous uint8"))?;

    to_rgb8_impl(input, [bg_r, bg_g, bg_b], out)?;
    Ok(())
}

/// Additively blend two premultiplied RGBA layers: output = img_in + img_layer.
#[pyfunction]
pub fn blend_addition<'py>(
    img_in: PyReadonlyArray3<'py, f64>,
    img_layer: PyReadonlyArray3<'py, f64>,
    output: &Bound<'py, PyArray3<f64>>,
) -> PyResult<()> {
    if img_in.shape() != img_layer.shape() || img_in.shape() != output.shape() {
        return Err(PyValueError::new_err("Input and output shapes must match"));
    }
    let base = img_in
        .as_slice()
        .map_err(|_| PyValueError::new_err("img_in must be C-contiguous"))?;
    let layer = img_layer
        .as_slice()
        .map_err(|_| PyValueError::new_err("img_layer must be C-contiguous"))?;

    // SAFETY: We have exclusive write access to output through PyO3's borrow rules
    let out = unsafe { output.as_slice_mut() }
        .map_err(|_| PyValueError::new_err("output must be C-contiguous"))?;

    blend_addition_impl(base, layer, out);
    Ok(())
}
