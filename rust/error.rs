//! Error types for scene configuration and frame buffers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuroraError {
    #[error("Invalid grid: {columns}x{rows} subdivisions (need at least 1x1)")]
    InvalidGrid { columns: usize, rows: usize },

    #[error("Invalid plane size: {width}x{height}")]
    InvalidPlane { width: f64, height: f64 },

    #[error("Scene has no layers")]
    NoLayers,

    #[error("Layer {index}: invalid {field} ({value})")]
    InvalidLayer {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Layer index {index} out of range (scene has {count} layers)")]
    LayerOutOfRange { index: usize, count: usize },

    #[error("Input length {len} is not a whole number of {channels}-channel pixels")]
    PartialPixel { len: usize, channels: usize },

    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config read error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "python")]
impl From<AuroraError> for pyo3::PyErr {
    fn from(err: AuroraError) -> pyo3::PyErr {
        match err {
            AuroraError::Io(_) => pyo3::exceptions::PyOSError::new_err(err.to_string()),
            _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuroraError>;
