//! Flat annulus in the XY plane, drawn as one triangle strip

use std::f32::consts::PI;

use super::color::{opaque, BROWN, YELLOW};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

const MIN_SEGMENTS: u32 = 3;

/// Ring facing +Z
///
/// Texture coordinates run across the band in `u` (1 on the inner edge) and
/// around it in `v`, so a striped texture wraps once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    radius: f32,
    thickness: f32,
    segments: u32,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            radius: 1.0,
            thickness: 1.0,
            segments: 100,
        }
    }
}

impl Ring {
    /// Builder for a ring from radius 1 to 2
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }
}

impl DrawableBuilder<Ring> {
    /// Inner radius
    #[must_use]
    pub fn radius(mut self, radius: f32) -> Self {
        if radius > 0.0 && radius.is_finite() {
            self.shape.radius = radius;
        } else {
            log::warn!("Ignoring ring radius {radius}");
        }
        self
    }

    /// Width of the band
    #[must_use]
    pub fn thickness(mut self, thickness: f32) -> Self {
        if thickness > 0.0 && thickness.is_finite() {
            self.shape.thickness = thickness;
        } else {
            log::warn!("Ignoring ring thickness {thickness}");
        }
        self
    }

    /// Number of segments around, at least 3
    #[must_use]
    pub fn segments(mut self, segments: u32) -> Self {
        self.shape.segments = segments.max(MIN_SEGMENTS);
        self
    }
}

impl Shape for Ring {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let outer = self.radius + self.thickness;

        for i in 0..=self.segments {
            let angle = i as f32 * 2.0 * PI / self.segments as f32;
            let v = i as f32 / self.segments as f32;
            let (sin, cos) = angle.sin_cos();
            for (radius, color, u) in [(self.radius, YELLOW, 1.0), (outer, BROWN, 0.0)] {
                mesh.positions.push([cos * radius, sin * radius, 0.0]);
                mesh.normals.push([0.0, 0.0, 1.0]);
                mesh.colors.push(opaque(color));
                mesh.uvs.push([u, v]);
            }
        }

        let count = mesh.positions.len() as u32;
        mesh.parts.push(MeshPart {
            topology: PrimitiveType::TriangleStrip,
            indices: (0..count).collect(),
        });
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_counts() {
        let mesh = Ring::default().mesh();
        assert_eq!(mesh.vertex_count(), 202);
        assert_eq!(mesh.parts.len(), 1);
        assert_eq!(mesh.parts[0].topology, PrimitiveType::TriangleStrip);
        assert_eq!(mesh.parts[0].indices.len(), 202);

        let mesh = Ring::builder().segments(0).shape.mesh();
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn test_band_edges_and_uvs() {
        let mesh = Ring::builder().radius(2.0).thickness(0.5).thickness(-1.0).segments(4).shape.mesh();
        for pair in mesh.positions.chunks(2) {
            assert_relative_eq!(Vector3::from(pair[0]).norm(), 2.0, epsilon = 1e-5);
            assert_relative_eq!(Vector3::from(pair[1]).norm(), 2.5, epsilon = 1e-5);
        }
        assert_eq!(mesh.uvs[0], [1.0, 0.0]);
        assert_eq!(mesh.uvs[1], [0.0, 0.0]);
        assert_eq!(mesh.uvs[9], [0.0, 1.0]);
        assert_relative_eq!(mesh.positions[8][0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(mesh.positions[8][1], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_strip_faces_up() {
        let mesh = Ring::default().mesh();
        let [a, b, c] = [0, 1, 2].map(|i| Vector3::from(mesh.positions[i]));
        assert!((b - a).cross(&(c - a)).z > 0.0);
    }
}
