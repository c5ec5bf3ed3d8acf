//! Round solids around the Z axis
//!
//! Both shapes span z in [-1, 1] with unit radius. Caps are triangle fans and
//! the cylinder wall is a single triangle strip.

use std::f32::consts::PI;

use nalgebra::Vector3;

use super::color::{opaque, BROWN, CYAN, PURPLE, RED, YELLOW};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

const MIN_SEGMENTS: u32 = 3;
const DEFAULT_SEGMENTS: u32 = 100;

/// Unit circle sampled counter-clockwise seen from +Z
fn circle(segments: u32) -> impl Iterator<Item = (f32, f32)> {
    (0..segments).map(move |i| {
        let angle = i as f32 * 2.0 * PI / segments as f32;
        (angle.cos(), angle.sin())
    })
}

/// Fan indices around `center`; `reversed` flips the winding to face -Z
fn fan(center: u32, first: u32, segments: u32, reversed: bool) -> Vec<u32> {
    let mut indices = Vec::with_capacity(segments as usize + 2);
    indices.push(center);
    if reversed {
        indices.extend((0..segments).rev().map(|i| first + i));
        indices.push(first + segments - 1);
    } else {
        indices.extend((0..segments).map(|i| first + i));
        indices.push(first);
    }
    indices
}

struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
}

fn push(mesh: &mut MeshData, vertex: &Vertex) -> u32 {
    let index = mesh.positions.len() as u32;
    mesh.positions.push(vertex.position);
    mesh.normals.push(vertex.normal);
    mesh.colors.push(opaque(vertex.color));
    index
}

/// Cone with its base at z = -1 and apex at z = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cone {
    segments: u32,
}

impl Default for Cone {
    fn default() -> Self {
        Self { segments: DEFAULT_SEGMENTS }
    }
}

impl Cone {
    /// Builder for a cone with 100 base segments
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }
}

impl DrawableBuilder<Cone> {
    /// Number of base segments, at least 3
    #[must_use]
    pub fn segments(mut self, segments: u32) -> Self {
        self.shape.segments = segments.max(MIN_SEGMENTS);
        self
    }
}

impl Shape for Cone {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let down = [0.0, 0.0, -1.0];

        let base_center = push(&mut mesh, &Vertex { position: down, normal: down, color: CYAN });
        let base_first = mesh.positions.len() as u32;
        for (x, y) in circle(self.segments) {
            push(&mut mesh, &Vertex { position: [x, y, -1.0], normal: down, color: PURPLE });
        }

        let apex = push(&mut mesh, &Vertex { position: [0.0, 0.0, 1.0], normal: [0.0, 0.0, 1.0], color: RED });
        let side_first = mesh.positions.len() as u32;
        for (x, y) in circle(self.segments) {
            // Slant normal: height 2 over radius 1
            let normal = Vector3::new(2.0 * x, 2.0 * y, 1.0).normalize();
            push(&mut mesh, &Vertex { position: [x, y, -1.0], normal: normal.into(), color: PURPLE });
        }

        mesh.parts.push(MeshPart {
            topology: PrimitiveType::TriangleFan,
            indices: fan(base_center, base_first, self.segments, true),
        });
        mesh.parts.push(MeshPart {
            topology: PrimitiveType::TriangleFan,
            indices: fan(apex, side_first, self.segments, false),
        });
        mesh
    }
}

/// Cylinder with caps at z = -1 and z = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cylinder {
    segments: u32,
}

impl Default for Cylinder {
    fn default() -> Self {
        Self { segments: DEFAULT_SEGMENTS }
    }
}

impl Cylinder {
    /// Builder for a cylinder with 100 segments around
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }
}

impl DrawableBuilder<Cylinder> {
    /// Number of segments around, at least 3
    #[must_use]
    pub fn segments(mut self, segments: u32) -> Self {
        self.shape.segments = segments.max(MIN_SEGMENTS);
        self
    }
}

impl Shape for Cylinder {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let n = self.segments;

        let cap = |mesh: &mut MeshData, z: f32| {
            let normal = [0.0, 0.0, z];
            let center = push(mesh, &Vertex { position: [0.0, 0.0, z], normal, color: YELLOW });
            let first = mesh.positions.len() as u32;
            for (x, y) in circle(n) {
                push(mesh, &Vertex { position: [x, y, z], normal, color: BROWN });
            }
            (center, first)
        };
        let (top_center, top_first) = cap(&mut mesh, 1.0);
        let (bottom_center, bottom_first) = cap(&mut mesh, -1.0);

        let wall_first = mesh.positions.len() as u32;
        for (x, y) in circle(n) {
            for z in [1.0, -1.0] {
                push(&mut mesh, &Vertex { position: [x, y, z], normal: [x, y, 0.0], color: BROWN });
            }
        }
        let mut wall = (0..2 * n).map(|i| wall_first + i).collect::<Vec<_>>();
        wall.extend([wall_first, wall_first + 1]);

        mesh.parts.push(MeshPart { topology: PrimitiveType::TriangleStrip, indices: wall });
        mesh.parts.push(MeshPart {
            topology: PrimitiveType::TriangleFan,
            indices: fan(top_center, top_first, n, false),
        });
        mesh.parts.push(MeshPart {
            topology: PrimitiveType::TriangleFan,
            indices: fan(bottom_center, bottom_first, n, true),
        });
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_normal(mesh: &MeshData, [a, b, c]: [u32; 3]) -> Vector3<f32> {
        let [a, b, c] = [a, b, c].map(|i| Vector3::from(mesh.positions[i as usize]));
        (b - a).cross(&(c - a))
    }

    #[test]
    fn test_cone_counts() {
        let mesh = Cone::builder().segments(8).shape.mesh();
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.parts.len(), 2);
        assert!(mesh.parts.iter().all(|part| part.topology == PrimitiveType::TriangleFan));
        assert!(mesh.parts.iter().all(|part| part.indices.len() == 10));

        let mesh = Cone::default().mesh();
        assert_eq!(mesh.vertex_count(), 202);
        assert_eq!(mesh.parts[1].indices.len(), 102);
    }

    #[test]
    fn test_cone_fans_face_outwards() {
        let mesh = Cone::builder().segments(3).shape.mesh();
        let base = &mesh.parts[0].indices;
        assert!(triangle_normal(&mesh, [base[0], base[1], base[2]]).z < 0.0);
        let side = &mesh.parts[1].indices;
        let normal = triangle_normal(&mesh, [side[0], side[1], side[2]]);
        let outward = Vector3::from(mesh.positions[side[1] as usize]) + Vector3::from(mesh.positions[side[2] as usize]);
        assert!(normal.x * outward.x + normal.y * outward.y > 0.0);
    }

    #[test]
    fn test_cone_slant_normals_are_perpendicular_to_the_side() {
        let mesh = Cone::default().mesh();
        let apex = Vector3::new(0.0, 0.0, 1.0);
        for index in 102..202 {
            let position = Vector3::from(mesh.positions[index]);
            let normal = Vector3::from(mesh.normals[index]);
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(normal.dot(&(apex - position)), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cylinder_counts() {
        let mesh = Cylinder::builder().segments(1).shape.mesh();
        assert_eq!(mesh.vertex_count(), 4 * 3 + 2);

        let mesh = Cylinder::default().mesh();
        assert_eq!(mesh.vertex_count(), 402);
        let topologies: Vec<_> = mesh.parts.iter().map(|part| part.topology).collect();
        assert_eq!(
            topologies,
            vec![PrimitiveType::TriangleStrip, PrimitiveType::TriangleFan, PrimitiveType::TriangleFan]
        );
        assert_eq!(mesh.parts[0].indices.len(), 202);
        assert_eq!(mesh.parts[1].indices.len(), 102);
        assert_eq!(mesh.parts[2].indices.len(), 102);
    }

    #[test]
    fn test_cylinder_caps_and_wall_face_outwards() {
        let mesh = Cylinder::builder().segments(6).shape.mesh();
        let wall = &mesh.parts[0].indices;
        assert!(triangle_normal(&mesh, [wall[0], wall[1], wall[2]]).x > 0.0);
        let top = &mesh.parts[1].indices;
        assert!(triangle_normal(&mesh, [top[0], top[1], top[2]]).z > 0.0);
        let bottom = &mesh.parts[2].indices;
        assert!(triangle_normal(&mesh, [bottom[0], bottom[1], bottom[2]]).z < 0.0);
    }
}
