//! Native Rust core for the aurora renderer
//!
//! Layered procedural northern lights:
//! - 3D simplex noise and fractal sums
//! - Vertex-stage wave displacement with finite-difference normals
//! - Fragment-stage ray patterns, fresnel rim and shape masks
//! - Additive layer accumulation and RGB output
//!
//! The Python module is compiled in with the `python` feature.

pub mod blending;
pub mod compositor;
pub mod config;
pub mod displacement;
pub mod error;
pub mod layer;
pub mod math;
pub mod noise;
pub mod pattern;
pub mod scene;
pub mod shading;
pub mod surface;

#[cfg(feature = "python")]
mod effects;

pub use blending::{accumulate_buffer, blend_addition_impl};
pub use compositor::{compose_frame, to_rgb8_impl};
pub use config::{GridConfig, SceneConfig};
pub use error::{AuroraError, Result};
pub use layer::{default_layers, EffectiveLayer, Layer, Multipliers};
pub use noise::{fbm3, noise3};
pub use scene::{AuroraScene, FrameParams};
pub use surface::{displace_grid, SurfaceGrid, SurfaceMesh};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Native Rust extensions for the aurora renderer.
#[cfg(feature = "python")]
#[pymodule(name = "_native")]
fn _native(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Scene
    m.add_class::<effects::PyAuroraScene>()?;

    // Noise
    m.add_function(wrap_pyfunction!(effects::py_noise3, m)?)?;
    m.add_function(wrap_pyfunction!(effects::py_fbm3, m)?)?;

    // Compositor
    m.add_function(wrap_pyfunction!(effects::blend_addition, m)?)?;
    m.add_function(wrap_pyfunction!(effects::rgba2rgb, m)?)?;

    // Recommended settings
    m.add("RECOMMENDED_COLUMNS", config::RECOMMENDED_COLUMNS)?;
    m.add("RECOMMENDED_ROWS", config::RECOMMENDED_ROWS)?;
    m.add("DEFAULT_OCTAVES", noise::DEFAULT_OCTAVES)?;

    Ok(())
}
