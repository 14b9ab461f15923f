//! Python-facing effect kernels
//!
//! Thin wrappers that validate numpy buffers and call the pure Rust
//! pipeline. Python keeps slider state and passes a snapshot each frame.

pub mod aurora;
pub mod compose;

pub use aurora::{py_fbm3, py_noise3, PyAuroraScene};
pub use compose::{blend_addition, rgba2rgb};
