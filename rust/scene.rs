//! Layer manager and frame renderer.
//!
//! An `AuroraScene` owns the base layers and the shared surface grid. Each
//! frame the caller passes a `FrameParams` snapshot (time, camera, slider
//! multipliers); the scene derives effective layer values from it, runs the
//! vertex stage per layer, then shades one fragment per output pixel and
//! accumulates the premultiplied results additively.
//!
//! The output projection is uv-space: each layer's plane fills the viewport,
//! row 0 at the top. Camera placement only affects the rim term.

use glam::{DVec2, DVec3};
use log::{debug, trace};
use rayon::prelude::*;

use crate::blending::accumulate;
use crate::config::SceneConfig;
use crate::error::{AuroraError, Result};
use crate::layer::{EffectiveLayer, Layer, Multipliers};
use crate::math::safe_normalize;
use crate::shading::{shade, FragmentSample};
use crate::surface::{displace_grid, SurfaceGrid, SurfaceMesh};

/// Immutable per-frame inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Seconds since start, monotonically non-decreasing.
    pub time: f64,
    pub camera_position: DVec3,
    /// Used when the camera sits exactly on a fragment.
    pub view_direction: DVec3,
    pub multipliers: Multipliers,
}

impl Default for FrameParams {
    fn default() -> Self {
        FrameParams {
            time: 0.0,
            camera_position: DVec3::new(0.0, 0.0, 15.0),
            view_direction: DVec3::NEG_Z,
            multipliers: Multipliers::default(),
        }
    }
}

impl FrameParams {
    pub fn at(time: f64) -> Self {
        FrameParams {
            time,
            ..FrameParams::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuroraScene {
    layers: Vec<Layer>,
    grid: SurfaceGrid,
    octaves: u32,
    normal_step: f64,
}

impl AuroraScene {
    pub fn new(config: SceneConfig) -> Result<Self> {
        config.validate()?;
        let grid = SurfaceGrid::new(&config.grid)?;

        debug!(
            "Aurora scene: {} layers, {}x{} grid, {} octaves",
            config.layers.len(),
            grid.columns(),
            grid.rows(),
            config.octaves
        );

        Ok(AuroraScene {
            layers: config.layers,
            grid,
            octaves: config.octaves,
            normal_step: config.normal_step,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn grid(&self) -> &SurfaceGrid {
        &self.grid
    }

    /// Effective values for every layer this frame. Multipliers are clamped
    /// once here; base layers are not touched.
    pub fn effective_layers(&self, frame: &FrameParams) -> Vec<EffectiveLayer> {
        let multipliers = frame.multipliers.clamped();
        self.layers
            .iter()
            .map(|layer| layer.effective(&multipliers, self.octaves))
            .collect()
    }

    fn effective_layer(&self, index: usize, frame: &FrameParams) -> Result<EffectiveLayer> {
        let layer = self.layers.get(index).ok_or(AuroraError::LayerOutOfRange {
            index,
            count: self.layers.len(),
        })?;
        Ok(layer.effective(&frame.multipliers.clamped(), self.octaves))
    }

    /// Vertex stage for one layer: displaced positions and normals for the
    /// whole grid.
    pub fn displace_layer(&self, index: usize, frame: &FrameParams) -> Result<SurfaceMesh> {
        let layer = self.effective_layer(index, frame)?;
        Ok(displace_grid(&self.grid, frame.time, &layer, self.normal_step))
    }

    /// Shade the fragment of `mesh` at `uv`.
    pub fn shade_fragment(
        &self,
        layer: &EffectiveLayer,
        mesh: &SurfaceMesh,
        uv: DVec2,
        frame: &FrameParams,
    ) -> FragmentSample {
        let surface = mesh.sample(uv);
        let world = surface.position + DVec3::new(0.0, 0.0, layer.depth_offset);
        let fallback = safe_normalize(frame.view_direction, DVec3::NEG_Z);
        let view_dir = safe_normalize(world - frame.camera_position, fallback);

        shade(uv, surface.normal, view_dir, frame.time, layer)
    }

    /// Render all layers into `output`, an RGBA f64 buffer of
    /// `width * height * 4` values. The buffer is cleared first.
    pub fn render(
        &self,
        frame: &FrameParams,
        width: usize,
        height: usize,
        output: &mut [f64],
    ) -> Result<()> {
        check_buffer(width, height, output.len())?;
        output.fill(0.0);

        trace!(
            "Rendering {} layers at t={:.3} into {}x{}",
            self.layers.len(),
            frame.time,
            width,
            height
        );

        for layer in self.effective_layers(frame) {
            self.render_effective(&layer, frame, width, height, output);
        }

        Ok(())
    }

    /// Render a single layer into a cleared `output` buffer.
    pub fn render_layer(
        &self,
        index: usize,
        frame: &FrameParams,
        width: usize,
        height: usize,
        output: &mut [f64],
    ) -> Result<()> {
        check_buffer(width, height, output.len())?;
        let layer = self.effective_layer(index, frame)?;
        output.fill(0.0);
        self.render_effective(&layer, frame, width, height, output);
        Ok(())
    }

    fn render_effective(
        &self,
        layer: &EffectiveLayer,
        frame: &FrameParams,
        width: usize,
        height: usize,
        output: &mut [f64],
    ) {
        if width == 0 || height == 0 {
            return;
        }

        // Every vertex is displaced before any fragment reads the mesh
        let mesh = displace_grid(&self.grid, frame.time, layer, self.normal_step);

        let w_f = width as f64;
        let h_f = height as f64;

        output
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row, line)| {
                let v = 1.0 - (row as f64 + 0.5) / h_f;
                for (col, pixel) in line.chunks_exact_mut(4).enumerate() {
                    let uv = DVec2::new((col as f64 + 0.5) / w_f, v);
                    let sample = self.shade_fragment(layer, &mesh, uv, frame);
                    accumulate(pixel, &sample);
                }
            });
    }
}

fn check_buffer(width: usize, height: usize, actual: usize) -> Result<()> {
    let expected = width * height * 4;
    if actual != expected {
        return Err(AuroraError::BufferSize { expected, actual });
    }
    Ok(())
}
