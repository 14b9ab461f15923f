//! Scene configuration.
//!
//! Deserialized from JSON; every field has a default so partial configs
//! load. `SceneConfig::default()` is the stock three-curtain aurora.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::displacement::NORMAL_STEP;
use crate::error::{AuroraError, Result};
use crate::layer::{default_layers, Layer};
use crate::noise::DEFAULT_OCTAVES;

/// Recommended minimum grid subdivisions for smooth displacement.
pub const RECOMMENDED_COLUMNS: usize = 100;
pub const RECOMMENDED_ROWS: usize = 60;

/// Recommended layer count range.
pub const RECOMMENDED_LAYERS: (usize, usize) = (3, 7);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub layers: Vec<Layer>,
    pub grid: GridConfig,
    /// FBM octaves for the ray pattern.
    pub octaves: u32,
    /// Finite-difference step for normal reconstruction.
    pub normal_step: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            layers: default_layers(),
            grid: GridConfig::default(),
            octaves: DEFAULT_OCTAVES,
            normal_step: NORMAL_STEP,
        }
    }
}

/// Plane size (world units) and subdivisions shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: f64,
    pub height: f64,
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            width: 20.0,
            height: 10.0,
            columns: RECOMMENDED_COLUMNS,
            rows: RECOMMENDED_ROWS,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            "Loaded scene config from {}: {} layers",
            path.display(),
            config.layers.len()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configs the pipeline cannot render; warn about ones that
    /// render poorly.
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if grid.columns == 0 || grid.rows == 0 {
            return Err(AuroraError::InvalidGrid {
                columns: grid.columns,
                rows: grid.rows,
            });
        }
        if !(grid.width.is_finite() && grid.height.is_finite())
            || grid.width <= 0.0
            || grid.height <= 0.0
        {
            return Err(AuroraError::InvalidPlane {
                width: grid.width,
                height: grid.height,
            });
        }
        if !self.normal_step.is_finite() || self.normal_step <= 0.0 {
            return Err(AuroraError::InvalidSetting {
                name: "normal_step",
                reason: format!("must be positive, got {}", self.normal_step),
            });
        }
        if self.layers.is_empty() {
            return Err(AuroraError::NoLayers);
        }
        for (index, layer) in self.layers.iter().enumerate() {
            layer.validate(index)?;
        }

        if grid.columns < RECOMMENDED_COLUMNS || grid.rows < RECOMMENDED_ROWS {
            warn!(
                "Grid {}x{} is below the recommended {}x{}; displacement may look faceted",
                grid.columns, grid.rows, RECOMMENDED_COLUMNS, RECOMMENDED_ROWS
            );
        }
        let (min_layers, max_layers) = RECOMMENDED_LAYERS;
        if self.layers.len() < min_layers || self.layers.len() > max_layers {
            warn!(
                "{} layers configured; {}-{} is recommended",
                self.layers.len(),
                min_layers,
                max_layers
            );
        }
        if !self
            .layers
            .windows(2)
            .all(|w| w[0].depth_offset <= w[1].depth_offset)
        {
            warn!("Layer depth offsets are not monotonic; depth sorting will be unpredictable");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.layers.len(), 3);
        assert_eq!(config.octaves, 3);
        assert_eq!(config.normal_step, 0.01);
        assert_eq!(config.grid.columns, 100);
        assert_eq!(config.grid.rows, 60);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json(r#"{ "octaves": 5 }"#).unwrap();
        assert_eq!(config.octaves, 5);
        assert_eq!(config.layers, default_layers());
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = SceneConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SceneConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_empty_layers_rejected() {
        let err = SceneConfig::from_json(r#"{ "layers": [] }"#).unwrap_err();
        assert!(matches!(err, AuroraError::NoLayers));
    }

    #[test]
    fn test_bad_grid_rejected() {
        let err = SceneConfig::from_json(r#"{ "grid": { "columns": 0 } }"#).unwrap_err();
        assert!(matches!(err, AuroraError::InvalidGrid { columns: 0, .. }));

        let err = SceneConfig::from_json(r#"{ "grid": { "width": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, AuroraError::InvalidPlane { .. }));
    }

    #[test]
    fn test_bad_normal_step_rejected() {
        let err = SceneConfig::from_json(r#"{ "normal_step": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            AuroraError::InvalidSetting {
                name: "normal_step",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = SceneConfig::from_json("{ layers: ").unwrap_err();
        assert!(matches!(err, AuroraError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("aurora-config-{}.json", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(br#"{ "grid": { "columns": 120, "rows": 80 } }"#)
                .unwrap();
        }
        let config = SceneConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.grid.columns, 120);
        assert_eq!(config.grid.rows, 80);
        assert_eq!(config.grid.width, 20.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SceneConfig::load("/nonexistent/aurora/scene.json").unwrap_err();
        assert!(matches!(err, AuroraError::Io(_)));
    }
}
