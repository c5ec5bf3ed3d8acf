//! Height field `z = f(x, y)` sampled on a regular grid
//!
//! The grid runs from the top-left corner `(-hx, hy)` to the bottom-right
//! corner `(hx, -hy)`. Every row of cells becomes its own triangle strip.
//! Vertices are colored by height with the heat map, so functions with
//! values in [-1, 1] use the whole palette.

use std::fmt;

use nalgebra::Vector3;

use super::color::{heat_color_at, opaque};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

const MIN_SEGMENTS: u32 = 1;
const MIN_EXTENT: f32 = 0.1;

/// Sampled graph of a function of two variables
pub struct Surface {
    function: Box<dyn Fn(f32, f32) -> f32>,
    half_extent_x: f32,
    half_extent_y: f32,
    segments_x: u32,
    segments_y: u32,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("half_extent_x", &self.half_extent_x)
            .field("half_extent_y", &self.half_extent_y)
            .field("segments_x", &self.segments_x)
            .field("segments_y", &self.segments_y)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Builder for `function` over [-1, 1] x [-1, 1] with 40 x 40 cells
    pub fn builder(function: impl Fn(f32, f32) -> f32 + 'static) -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self {
            function: Box::new(function),
            half_extent_x: 1.0,
            half_extent_y: 1.0,
            segments_x: 40,
            segments_y: 40,
        })
    }

    fn x_step(&self) -> f32 {
        self.half_extent_x * 2.0 / self.segments_x as f32
    }

    fn y_step(&self) -> f32 {
        self.half_extent_y * 2.0 / self.segments_y as f32
    }

    fn vertex(&self, column: u32, row: u32) -> u32 {
        column * (self.segments_y + 1) + row
    }

    /// Smoothed normal from central differences one cell apart
    fn normal_at(&self, x: f32, y: f32) -> [f32; 3] {
        let (dx, dy) = (self.x_step(), self.y_step());
        let f = &self.function;
        let slope_x = (f(x + dx, y) - f(x - dx, y)) / (2.0 * dx);
        let slope_y = (f(x, y + dy) - f(x, y - dy)) / (2.0 * dy);
        let normal = Vector3::new(-slope_x, -slope_y, 1.0).normalize();
        if normal.iter().all(|c| c.is_finite()) {
            normal.into()
        } else {
            [0.0, 0.0, 1.0]
        }
    }
}

impl DrawableBuilder<Surface> {
    /// Half width along X, at least 0.1
    #[must_use]
    pub fn half_extent_x(mut self, extent: f32) -> Self {
        self.shape.half_extent_x = extent.max(MIN_EXTENT);
        self
    }

    /// Half height along Y, at least 0.1
    #[must_use]
    pub fn half_extent_y(mut self, extent: f32) -> Self {
        self.shape.half_extent_y = extent.max(MIN_EXTENT);
        self
    }

    /// Same half extent along both axes
    #[must_use]
    pub fn half_extent(self, extent: f32) -> Self {
        self.half_extent_x(extent).half_extent_y(extent)
    }

    /// Cells along X, at least 1
    #[must_use]
    pub fn segments_x(mut self, segments: u32) -> Self {
        self.shape.segments_x = segments.max(MIN_SEGMENTS);
        self
    }

    /// Cells along Y, at least 1
    #[must_use]
    pub fn segments_y(mut self, segments: u32) -> Self {
        self.shape.segments_y = segments.max(MIN_SEGMENTS);
        self
    }

    /// Same cell count along both axes
    #[must_use]
    pub fn segments(self, segments: u32) -> Self {
        self.segments_x(segments).segments_y(segments)
    }
}

impl Shape for Surface {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let (x_step, y_step) = (self.x_step(), self.y_step());

        for column in 0..=self.segments_x {
            for row in 0..=self.segments_y {
                let x = column as f32 * x_step - self.half_extent_x;
                let y = self.half_extent_y - row as f32 * y_step;
                let z = (self.function)(x, y);
                mesh.positions.push([x, y, z]);
                mesh.normals.push(self.normal_at(x, y));
                mesh.colors.push(opaque(heat_color_at(z)));
            }
        }

        for row in 0..self.segments_y {
            let indices = (0..=self.segments_x)
                .flat_map(|column| [self.vertex(column, row), self.vertex(column, row + 1)])
                .collect();
            mesh.parts.push(MeshPart { topology: PrimitiveType::TriangleStrip, indices });
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts_for_uneven_grid() {
        let mesh = Surface::builder(|_, _| 0.0).segments_x(4).segments_y(2).shape.mesh();
        assert_eq!(mesh.vertex_count(), 5 * 3);
        assert_eq!(mesh.parts.len(), 2);
        assert!(mesh.parts.iter().all(|part| part.topology == PrimitiveType::TriangleStrip));
        assert!(mesh.parts.iter().all(|part| part.indices.len() == 10));
        let max = mesh.parts.iter().flat_map(|part| part.indices.iter()).max().copied();
        assert_eq!(max, Some(14));

        let mesh = Surface::builder(|_, _| 0.0).shape.mesh();
        assert_eq!(mesh.vertex_count(), 41 * 41);
        assert_eq!(mesh.parts.len(), 40);
    }

    #[test]
    fn test_grid_spans_extents_and_samples_function() {
        let mesh = Surface::builder(|x, y| x * y).half_extent_x(2.0).half_extent_y(0.0).segments(2).shape.mesh();
        let first = Vector3::from(mesh.positions[0]);
        let last = Vector3::from(mesh.positions[mesh.vertex_count() - 1]);
        assert_relative_eq!(first, Vector3::new(-2.0, 0.1, -0.2), epsilon = 1e-6);
        assert_relative_eq!(last, Vector3::new(2.0, -0.1, -0.2), epsilon = 1e-6);
    }

    #[test]
    fn test_plane_normals_and_strip_winding() {
        let mesh = Surface::builder(|x, _| 0.5 * x).segments(3).shape.mesh();
        let expected = Vector3::new(-0.5, 0.0, 1.0).normalize();
        for normal in &mesh.normals {
            assert_relative_eq!(Vector3::from(*normal), expected, epsilon = 1e-5);
        }

        let strip = &mesh.parts[0].indices;
        let [a, b, c] = [0, 1, 2].map(|i| Vector3::from(mesh.positions[strip[i] as usize]));
        assert!((b - a).cross(&(c - a)).z > 0.0);
    }

    #[test]
    fn test_non_finite_samples_get_an_upward_normal() {
        let mesh = Surface::builder(|x, _| if x > 0.0 { f32::NAN } else { 0.0 }).segments(2).shape.mesh();
        assert!(mesh.normals.iter().all(|normal| normal.iter().all(|c| c.is_finite())));
    }
}
