//! Parametric plane grid and the vertex stage that runs over it.
//!
//! `displace_grid` evaluates every vertex independently in parallel and
//! returns only once the whole mesh exists. Fragment shading reads the
//! finished `SurfaceMesh`, which is the one ordering constraint between the
//! two stages.

use glam::{DVec2, DVec3};
use rayon::prelude::*;

use crate::config::GridConfig;
use crate::displacement::{surface_sample_with_step, SurfaceSample};
use crate::error::{AuroraError, Result};
use crate::layer::EffectiveLayer;
use crate::math::{safe_normalize, UP};

/// Plane centred at the origin, subdivided into `columns` x `rows` cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGrid {
    width: f64,
    height: f64,
    columns: usize,
    rows: usize,
}

impl SurfaceGrid {
    pub fn new(config: &GridConfig) -> Result<Self> {
        if config.columns == 0 || config.rows == 0 {
            return Err(AuroraError::InvalidGrid {
                columns: config.columns,
                rows: config.rows,
            });
        }
        if !(config.width > 0.0 && config.height > 0.0)
            || !config.width.is_finite()
            || !config.height.is_finite()
        {
            return Err(AuroraError::InvalidPlane {
                width: config.width,
                height: config.height,
            });
        }
        Ok(SurfaceGrid {
            width: config.width,
            height: config.height,
            columns: config.columns,
            rows: config.rows,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vertices per row (one more than the cell count).
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.columns + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.row_stride() * (self.rows + 1)
    }

    /// Texture coordinate of a vertex; (0, 0) is the bottom-left corner.
    #[inline]
    pub fn uv(&self, col: usize, row: usize) -> DVec2 {
        DVec2::new(
            col as f64 / self.columns as f64,
            row as f64 / self.rows as f64,
        )
    }

    /// Plane-local position for a texture coordinate.
    #[inline]
    pub fn local_position(&self, uv: DVec2) -> DVec2 {
        DVec2::new((uv.x - 0.5) * self.width, (uv.y - 0.5) * self.height)
    }
}

/// Displaced vertices for one layer and one frame, row-major from the
/// bottom row.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    grid: SurfaceGrid,
    samples: Vec<SurfaceSample>,
}

/// Run the displacement stage over every vertex of `grid`.
pub fn displace_grid(
    grid: &SurfaceGrid,
    time: f64,
    layer: &EffectiveLayer,
    step: f64,
) -> SurfaceMesh {
    let stride = grid.row_stride();
    let samples = (0..grid.vertex_count())
        .into_par_iter()
        .map(|i| {
            let uv = grid.uv(i % stride, i / stride);
            surface_sample_with_step(grid.local_position(uv), time, layer, step)
        })
        .collect();

    SurfaceMesh {
        grid: *grid,
        samples,
    }
}

impl SurfaceMesh {
    pub fn grid(&self) -> &SurfaceGrid {
        &self.grid
    }

    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }

    #[inline]
    pub fn vertex(&self, col: usize, row: usize) -> &SurfaceSample {
        &self.samples[row * self.grid.row_stride() + col]
    }

    /// Interpolate position and normal at `uv`, the way a rasterizer
    /// interpolates vertex outputs across a quad. The normal is
    /// re-normalized after blending.
    pub fn sample(&self, uv: DVec2) -> SurfaceSample {
        let cols = self.grid.columns;
        let rows = self.grid.rows;

        let fx = uv.x.clamp(0.0, 1.0) * cols as f64;
        let fy = uv.y.clamp(0.0, 1.0) * rows as f64;
        let c0 = (fx.floor() as usize).min(cols - 1);
        let r0 = (fy.floor() as usize).min(rows - 1);
        let tx = fx - c0 as f64;
        let ty = fy - r0 as f64;

        let s00 = self.vertex(c0, r0);
        let s10 = self.vertex(c0 + 1, r0);
        let s01 = self.vertex(c0, r0 + 1);
        let s11 = self.vertex(c0 + 1, r0 + 1);

        let bilerp = |a: DVec3, b: DVec3, c: DVec3, d: DVec3| {
            a.lerp(b, tx).lerp(c.lerp(d, tx), ty)
        };

        SurfaceSample {
            position: bilerp(s00.position, s10.position, s01.position, s11.position),
            normal: safe_normalize(
                bilerp(s00.normal, s10.normal, s01.normal, s11.normal),
                UP,
            ),
        }
    }
}
