//! Aurora - layered displaced-surface northern lights
//!
//! Python entry points for the aurora pipeline. The scene is built once from
//! a JSON config; each frame renders into a caller-owned numpy buffer.

use numpy::{PyArray1, PyArray2, PyArray3, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use glam::DVec3;

use crate::compositor::compose_frame;
use crate::config::SceneConfig;
use crate::layer::Multipliers;
use crate::noise;
use crate::scene::{AuroraScene, FrameParams};

type Vec3Arg = (f64, f64, f64);

/// Aurora scene holding the configured layers.
#[pyclass(name = "AuroraScene", module = "_native")]
pub struct PyAuroraScene {
    inner: AuroraScene,
}

#[allow(clippy::too_many_arguments)]
fn frame_params(
    time: f64,
    camera: Vec3Arg,
    view_dir: Vec3Arg,
    amplitude: f64,
    speed: f64,
    rim_power: f64,
    sharpness: f64,
) -> FrameParams {
    FrameParams {
        time,
        camera_position: DVec3::new(camera.0, camera.1, camera.2),
        view_direction: DVec3::new(view_dir.0, view_dir.1, view_dir.2),
        multipliers: Multipliers {
            amplitude,
            speed,
            rim_power,
            sharpness,
        },
    }
}

#[pymethods]
impl PyAuroraScene {
    /// Create a scene from a JSON config string, or the stock three-layer
    /// aurora when omitted.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => SceneConfig::from_json(json)?,
            None => SceneConfig::default(),
        };
        Ok(PyAuroraScene {
            inner: AuroraScene::new(config)?,
        })
    }

    /// Load a scene from a JSON config file.
    #[staticmethod]
    fn load(path: &str) -> PyResult<Self> {
        Ok(PyAuroraScene {
            inner: AuroraScene::new(SceneConfig::load(path)?)?,
        })
    }

    #[getter]
    fn layer_count(&self) -> usize {
        self.inner.layers().len()
    }

    /// Render all layers into an RGBA float64 matrix of shape (height, width, 4).
    ///
    /// # Arguments
    /// * `matrix` - Target C-contiguous numpy array, overwritten
    /// * `time` - Animation time in seconds
    /// * `camera` - Camera position (x, y, z)
    /// * `view_dir` - Fallback view direction
    /// * `amplitude` - Wave amplitude multiplier (0.0-2.0)
    /// * `speed` - Animation speed multiplier (0.0-1.0)
    /// * `rim_power` - Fresnel power multiplier (0.0-4.0)
    /// * `sharpness` - Ray sharpness multiplier (0.0-4.0)
    #[pyo3(signature = (
        matrix,
        time,
        camera=(0.0, 0.0, 15.0),
        view_dir=(0.0, 0.0, -1.0),
        amplitude=1.0,
        speed=1.0,
        rim_power=1.0,
        sharpness=1.0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn render<'py>(
        &self,
        matrix: &Bound<'py, PyArray3<f64>>,
        time: f64,
        camera: Vec3Arg,
        view_dir: Vec3Arg,
        amplitude: f64,
        speed: f64,
        rim_power: f64,
        sharpness: f64,
    ) -> PyResult<()> {
        let shape = matrix.shape();
        if shape[2] != 4 {
            return Err(PyValueError::new_err("matrix must have 4 channels (RGBA)"));
        }
        let (height, width) = (shape[0], shape[1]);
        let frame = frame_params(time, camera, view_dir, amplitude, speed, rim_power, sharpness);

        // SAFETY: We have exclusive write access to matrix through PyO3's borrow rules
        let buffer = unsafe { matrix.as_slice_mut() }
            .map_err(|_| PyValueError::new_err("matrix must be C-contiguous float64"))?;

        self.inner.render(&frame, width, height, buffer)?;
        Ok(())
    }

    /// Render and composite over `background` into an RGB uint8 array of
    /// shape (height, width, 3).
    #[pyo3(signature = (
        output,
        time,
        camera=(0.0, 0.0, 15.0),
        view_dir=(0.0, 0.0, -1.0),
        amplitude=1.0,
        speed=1.0,
        rim_power=1.0,
        sharpness=1.0,
        background=(0.0, 0.0, 0.0)
    ))]
    #[allow(clippy::too_many_arguments)]
    fn render_rgb<'py>(
        &self,
        output: &Bound<'py, PyArray3<u8>>,
        time: f64,
        camera: Vec3Arg,
        view_dir: Vec3Arg,
        amplitude: f64,
        speed: f64,
        rim_power: f64,
        sharpness: f64,
        background: Vec3Arg,
    ) -> PyResult<()> {
        let shape = output.shape();
        if shape[2] != 3 {
            return Err(PyValueError::new_err("output must have 3 channels (RGB)"));
        }
        let (height, width) = (shape[0], shape[1]);
        let frame = frame_params(time, camera, view_dir, amplitude, speed, rim_power, sharpness);
        let bg = [background.0, background.1, background.2];

        // SAFETY: We have exclusive write access to output through PyO3's borrow rules
        let buffer = unsafe { output.as_slice_mut() }
            .map_err(|_| PyValueError::new_err("output must be C-contiguous uint8"))?;

        compose_frame(&self.inner, &frame, width, height, bg, buffer)?;
        Ok(())
    }

    /// Run the vertex stage for one layer.
    ///
    /// # Returns
    /// Tuple of (positions, normals), each a float64 array of shape (N, 3)
    /// in row-major grid order starting from the bottom row.
    #[pyo3(signature = (layer, time, amplitude=1.0, speed=1.0))]
    fn displace<'py>(
        &self,
        py: Python<'py>,
        layer: usize,
        time: f64,
        amplitude: f64,
        speed: f64,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray2<f64>>)> {
        let frame = FrameParams {
            multipliers: Multipliers {
                amplitude,
                speed,
                ..Multipliers::default()
            },
            ..FrameParams::at(time)
        };
        let mesh = self.inner.displace_layer(layer, &frame)?;
        let count = mesh.samples().len();

        let mut positions = Vec::with_capacity(count * 3);
        let mut normals = Vec::with_capacity(count * 3);
        for s in mesh.samples() {
            positions.extend_from_slice(&s.position.to_array());
            normals.extend_from_slice(&s.normal.to_array());
        }

        Ok((
            PyArray1::from_vec(py, positions).reshape([count, 3])?,
            PyArray1::from_vec(py, normals).reshape([count, 3])?,
        ))
    }
}

/// Sample 3D simplex noise.
#[pyfunction]
#[pyo3(name = "noise3")]
pub fn py_noise3(x: f64, y: f64, z: f64) -> f64 {
    noise::noise3(DVec3::new(x, y, z))
}

/// Sample fractal noise (unnormalized octave sum).
#[pyfunction]
#[pyo3(name = "fbm3", signature = (x, y, z, octaves=noise::DEFAULT_OCTAVES))]
pub fn py_fbm3(x: f64, y: f64, z: f64, octaves: u32) -> f64 {
    noise::fbm3(DVec3::new(x, y, z), octaves)
}
