//! Closed parametric curve in the XY plane, drawn as a line strip

use std::f32::consts::PI;
use std::fmt;

use super::color::{opaque, WHITE};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

const MIN_SEGMENTS: u32 = 3;

type Coordinate = Box<dyn Fn(f32) -> f32>;

/// Curve `(x(t), y(t), 0)` for `t` in [0, 2π)
///
/// Lines carry no normals, so orbits are always drawn unlit.
pub struct Orbit {
    x: Coordinate,
    y: Coordinate,
    color: [f32; 3],
    segments: u32,
}

impl fmt::Debug for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orbit")
            .field("color", &self.color)
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}

impl Orbit {
    /// Builder for a white curve sampled at 1000 points
    pub fn builder(
        x: impl Fn(f32) -> f32 + 'static,
        y: impl Fn(f32) -> f32 + 'static,
    ) -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self {
            x: Box::new(x),
            y: Box::new(y),
            color: WHITE,
            segments: 1000,
        })
    }

    /// Builder for an ellipse with the given semi-axes
    pub fn ellipse(semi_major: f32, semi_minor: f32) -> DrawableBuilder<Self> {
        Self::builder(move |t| semi_major * t.cos(), move |t| semi_minor * t.sin())
    }
}

impl DrawableBuilder<Orbit> {
    /// Line color
    #[must_use]
    pub fn color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.shape.color = [r, g, b];
        self
    }

    /// Number of sampled points, at least 3
    #[must_use]
    pub fn segments(mut self, segments: u32) -> Self {
        self.shape.segments = segments.max(MIN_SEGMENTS);
        self
    }
}

impl Shape for Orbit {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        for i in 0..self.segments {
            let t = i as f32 * 2.0 * PI / self.segments as f32;
            mesh.positions.push([(self.x)(t), (self.y)(t), 0.0]);
            mesh.colors.push(opaque(self.color));
        }

        let mut indices: Vec<u32> = (0..self.segments).collect();
        indices.push(0);
        mesh.parts.push(MeshPart { topology: PrimitiveType::LineStrip, indices });
        mesh
    }

    fn unlit_only(&self) -> bool {
        true
    }
}
