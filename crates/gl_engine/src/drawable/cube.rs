//! Axis-aligned cube with one color per corner of each face

use super::color::{opaque, BLACK, BLUE, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

struct Face {
    normal: [f32; 3],
    corners: [[f32; 3]; 4],
    colors: [[f32; 3]; 4],
}

/// Corners of each face are ordered so that (0, 1, 2) and (2, 1, 3) wind
/// counter-clockwise seen from outside.
const FACES: [Face; 6] = [
    Face {
        normal: [1.0, 0.0, 0.0],
        corners: [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        colors: [BLUE, BLACK, CYAN, GREEN],
    },
    Face {
        normal: [0.0, 1.0, 0.0],
        corners: [[1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        colors: [CYAN, GREEN, WHITE, YELLOW],
    },
    Face {
        normal: [0.0, 0.0, 1.0],
        corners: [[-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        colors: [WHITE, MAGENTA, CYAN, BLUE],
    },
    Face {
        normal: [-1.0, 0.0, 0.0],
        corners: [[-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0]],
        colors: [WHITE, YELLOW, MAGENTA, RED],
    },
    Face {
        normal: [0.0, -1.0, 0.0],
        corners: [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0]],
        colors: [MAGENTA, RED, BLUE, BLACK],
    },
    Face {
        normal: [0.0, 0.0, -1.0],
        corners: [[1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0]],
        colors: [GREEN, BLACK, YELLOW, RED],
    },
];

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Cube centered on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    half_extent: f32,
}

impl Default for Cube {
    fn default() -> Self {
        Self { half_extent: 1.0 }
    }
}

impl Cube {
    /// Builder for a cube spanning [-1, 1] on every axis
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }
}

impl DrawableBuilder<Cube> {
    /// Half the edge length
    #[must_use]
    pub fn half_extent(mut self, half_extent: f32) -> Self {
        if half_extent > 0.0 && half_extent.is_finite() {
            self.shape.half_extent = half_extent;
        } else {
            log::warn!("Ignoring cube half extent {half_extent}");
        }
        self
    }
}

impl Shape for Cube {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let mut indices = Vec::with_capacity(36);
        for (face_index, face) in FACES.iter().enumerate() {
            let base = (face_index * 4) as u32;
            for corner in 0..4 {
                mesh.positions.push(face.corners[corner].map(|c| c * self.half_extent));
                mesh.normals.push(face.normal);
                mesh.colors.push(opaque(face.colors[corner]));
                mesh.uvs.push(FACE_UVS[corner]);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        }
        mesh.parts.push(MeshPart { topology: PrimitiveType::Triangles, indices });
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_mesh_layout() {
        let mesh = Cube::default().mesh();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.parts.len(), 1);
        assert_eq!(mesh.parts[0].indices.len(), 36);
        assert_eq!(&mesh.parts[0].indices[6..12], &[4, 5, 6, 6, 5, 7]);
    }

    #[test]
    fn test_triangles_face_outwards() {
        let mesh = Cube::default().mesh();
        for triangle in mesh.parts[0].indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vector3::from(mesh.positions[triangle[i] as usize]));
            let winding = (b - a).cross(&(c - a)).normalize();
            let normal = Vector3::from(mesh.normals[triangle[0] as usize]);
            assert_relative_eq!(winding, normal, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_half_extent_scales_positions() {
        let builder = Cube::builder().half_extent(0.5).half_extent(-3.0);
        let mesh = builder.shape.mesh();
        assert!(mesh.positions.iter().flatten().all(|c| (c.abs() - 0.5).abs() < f32::EPSILON));
    }
}
