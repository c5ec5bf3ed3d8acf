//! Flat-shaded solids with a handful of faces

use nalgebra::Vector3;

use super::color::{opaque, BLUE, GREEN, MAGENTA, RED, WHITE};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

fn face_normal(corners: [[f32; 3]; 3]) -> [f32; 3] {
    let [a, b, c] = corners.map(Vector3::from);
    (b - a).cross(&(c - a)).normalize().into()
}

/// Append one triangle with its own face normal
fn push_face(mesh: &mut MeshData, indices: &mut Vec<u32>, corners: [[f32; 3]; 3], colors: [[f32; 3]; 3]) {
    let normal = face_normal(corners);
    for (corner, color) in corners.into_iter().zip(colors) {
        indices.push(mesh.positions.len() as u32);
        mesh.positions.push(corner);
        mesh.normals.push(normal);
        mesh.colors.push(opaque(color));
    }
}

/// Square pyramid over [-1, 1] x [-1, 1] at z = -1 with its apex at z = 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pyramid;

impl Pyramid {
    /// Builder for the pyramid
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self)
    }
}

const BASE: [[f32; 3]; 4] = [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]];
const BASE_COLORS: [[f32; 3]; 4] = [RED, GREEN, BLUE, MAGENTA];
const APEX: [f32; 3] = [0.0, 0.0, 1.0];

impl Shape for Pyramid {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();

        let mut sides = Vec::with_capacity(12);
        for i in 0..4 {
            let next = (i + 1) % 4;
            push_face(
                &mut mesh,
                &mut sides,
                [BASE[i], BASE[next], APEX],
                [BASE_COLORS[i], BASE_COLORS[next], WHITE],
            );
        }

        let first = mesh.positions.len() as u32;
        for corner in [0, 3, 1, 2] {
            mesh.positions.push(BASE[corner]);
            mesh.normals.push([0.0, 0.0, -1.0]);
            mesh.colors.push(opaque(BASE_COLORS[corner]));
        }

        mesh.parts.push(MeshPart { topology: PrimitiveType::Triangles, indices: sides });
        mesh.parts.push(MeshPart {
            topology: PrimitiveType::TriangleStrip,
            indices: (first..first + 4).collect(),
        });
        mesh
    }
}

/// Tetrahedron cut from the corners of the [-1, 1] cube
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tetrahedron;

impl Tetrahedron {
    /// Builder for the tetrahedron
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self)
    }
}

const TOP: [f32; 3] = [-1.0, 1.0, 1.0];
const BACK: [f32; 3] = [-1.0, 1.0, -1.0];
const LEFT: [f32; 3] = [-1.0, -1.0, -1.0];
const RIGHT: [f32; 3] = [1.0, -1.0, -1.0];

/// Counter-clockwise seen from outside
const TETRAHEDRON_FACES: [([[f32; 3]; 3], [[f32; 3]; 3]); 4] = [
    ([TOP, RIGHT, BACK], [WHITE, GREEN, BLUE]),
    ([TOP, LEFT, RIGHT], [WHITE, RED, GREEN]),
    ([TOP, BACK, LEFT], [WHITE, BLUE, RED]),
    ([BACK, RIGHT, LEFT], [BLUE, GREEN, RED]),
];

impl Shape for Tetrahedron {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let mut indices = Vec::with_capacity(12);
        for (corners, colors) in TETRAHEDRON_FACES {
            push_face(&mut mesh, &mut indices, corners, colors);
        }
        mesh.parts.push(MeshPart { topology: PrimitiveType::Triangles, indices });
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_faces_point_away_from(mesh: &MeshData, indices: &[u32], center: Vector3<f32>) {
        for triangle in indices.chunks(3) {
            let corners = [0, 1, 2].map(|i| mesh.positions[triangle[i] as usize]);
            let normal = Vector3::from(face_normal(corners));
            let centroid = corners.map(Vector3::from).iter().sum::<Vector3<f32>>() / 3.0;
            assert!(normal.dot(&(centroid - center)) > 0.0);
            assert_relative_eq!(normal, Vector3::from(mesh.normals[triangle[0] as usize]), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_pyramid_counts() {
        let mesh = Pyramid.mesh();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.parts.len(), 2);
        assert_eq!(mesh.parts[0].topology, PrimitiveType::Triangles);
        assert_eq!(mesh.parts[0].indices.len(), 12);
        assert_eq!(mesh.parts[1].topology, PrimitiveType::TriangleStrip);
        assert_eq!(mesh.parts[1].indices, vec![12, 13, 14, 15]);
    }

    #[test]
    fn test_pyramid_faces_point_outwards() {
        let mesh = Pyramid.mesh();
        let center = Vector3::new(0.0, 0.0, -0.5);
        assert_faces_point_away_from(&mesh, &mesh.parts[0].indices, center);

        let strip = &mesh.parts[1].indices;
        assert_faces_point_away_from(&mesh, &strip[..3], center);
        assert_eq!(mesh.colors[12], opaque(RED));
        assert_eq!(mesh.colors[13], opaque(MAGENTA));
    }

    #[test]
    fn test_tetrahedron_counts_and_winding() {
        let mesh = Tetrahedron.mesh();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.parts.len(), 1);
        assert_eq!(mesh.parts[0].indices, (0..12).collect::<Vec<u32>>());

        let center = Vector3::new(-0.5, 0.0, -0.5);
        assert_faces_point_away_from(&mesh, &mesh.parts[0].indices, center);
    }
}
