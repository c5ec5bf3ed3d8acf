//! Unit spheres
//!
//! [`Sphere`] is a latitude/longitude grid drawn as one triangle strip for
//! the body and two triangle fans for the caps, colored by height.
//! [`Geodesic`] recursively subdivides a polyhedron and colors each original
//! face with its own hue.

use std::f32::consts::PI;

use nalgebra::Vector3;

use super::color::{heat_color_at, hue_at, opaque, BLUE, RED};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

const MIN_LONGITUDES: u32 = 3;
const MIN_LATITUDES: u32 = 3;
const MAX_DEPTH: u32 = 8;

/// Geographic sphere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sphere {
    longitudes: u32,
    latitudes: u32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self { longitudes: 50, latitudes: 20 }
    }
}

impl Sphere {
    /// Builder for a 50 x 20 sphere
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }

    fn ring_vertex(&self, ring: u32, slice: u32) -> u32 {
        ring * self.longitudes + slice + 2
    }
}

impl DrawableBuilder<Sphere> {
    /// Number of meridians, at least 3
    #[must_use]
    pub fn longitudes(mut self, amount: u32) -> Self {
        self.shape.longitudes = amount.max(MIN_LONGITUDES);
        self
    }

    /// Number of latitude bands, at least 3
    #[must_use]
    pub fn latitudes(mut self, amount: u32) -> Self {
        self.shape.latitudes = amount.max(MIN_LATITUDES);
        self
    }
}

impl Shape for Sphere {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        let mut push = |direction: [f32; 3], color: [f32; 3]| {
            mesh.positions.push(direction);
            mesh.normals.push(direction);
            mesh.colors.push(opaque(color));
        };

        push([0.0, 0.0, 1.0], RED);
        push([0.0, 0.0, -1.0], BLUE);
        for i in 1..self.latitudes {
            let theta = i as f32 * PI / self.latitudes as f32;
            for j in 0..self.longitudes {
                let phi = j as f32 * 2.0 * PI / self.longitudes as f32;
                let direction = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()).normalize();
                push(direction.into(), heat_color_at(direction.z));
            }
        }
        mesh.uvs = mesh
            .positions
            .iter()
            .map(|&[x, y, z]| [0.5 + y.atan2(x) / (2.0 * PI), z.clamp(-1.0, 1.0).acos() / PI])
            .collect();

        let bands = self.latitudes - 2;
        let mut strip = Vec::new();
        for i in 0..bands {
            if i > 0 {
                strip.push(self.ring_vertex(i, 0));
            }
            for j in 0..self.longitudes {
                strip.push(self.ring_vertex(i, j));
                strip.push(self.ring_vertex(i + 1, j));
            }
            strip.push(self.ring_vertex(i, 0));
            strip.push(self.ring_vertex(i + 1, 0));
            if i + 1 < bands {
                strip.push(self.ring_vertex(i + 1, 0));
            }
        }

        let mut top = vec![0];
        top.extend((0..self.longitudes).map(|j| self.ring_vertex(0, j)));
        top.push(self.ring_vertex(0, 0));

        let mut bottom = vec![1];
        bottom.extend((0..self.longitudes).map(|j| self.ring_vertex(bands, j)));
        bottom.push(self.ring_vertex(bands, 0));

        mesh.parts = vec![
            MeshPart { topology: PrimitiveType::TriangleStrip, indices: strip },
            MeshPart { topology: PrimitiveType::TriangleFan, indices: top },
            MeshPart { topology: PrimitiveType::TriangleFan, indices: bottom },
        ];
        mesh
    }
}

/// Starting solid of a [`Geodesic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polyhedron {
    /// Four faces
    Tetrahedron,
    /// Twenty faces
    Icosahedron,
}

impl Polyhedron {
    fn faces(self) -> Vec<[Vector3<f32>; 3]> {
        match self {
            Self::Tetrahedron => {
                let v1 = Vector3::new((8.0_f32 / 9.0).sqrt(), 0.0, -1.0 / 3.0);
                let v2 = Vector3::new(-(2.0_f32 / 9.0).sqrt(), (2.0_f32 / 3.0).sqrt(), -1.0 / 3.0);
                let v3 = Vector3::new(-(2.0_f32 / 9.0).sqrt(), -(2.0_f32 / 3.0).sqrt(), -1.0 / 3.0);
                let v4 = Vector3::new(0.0, 0.0, 1.0);
                vec![[v4, v3, v1], [v4, v2, v3], [v4, v1, v2], [v1, v3, v2]]
            }
            Self::Icosahedron => {
                let root5 = 5.0_f32.sqrt();
                let pos = (1.0 + 1.0 / root5) / 2.0;
                let neg = (1.0 - 1.0 / root5) / 2.0;
                let v = [
                    Vector3::new(1.0, 0.0, 0.0),
                    Vector3::new(-1.0, 0.0, 0.0),
                    Vector3::new(1.0 / root5, 2.0 / root5, 0.0),
                    Vector3::new(-1.0 / root5, -2.0 / root5, 0.0),
                    Vector3::new(1.0 / root5, neg, pos.sqrt()),
                    Vector3::new(1.0 / root5, neg, -pos.sqrt()),
                    Vector3::new(-1.0 / root5, -neg, -pos.sqrt()),
                    Vector3::new(-1.0 / root5, -neg, pos.sqrt()),
                    Vector3::new(1.0 / root5, -pos, neg.sqrt()),
                    Vector3::new(1.0 / root5, -pos, -neg.sqrt()),
                    Vector3::new(-1.0 / root5, pos, -neg.sqrt()),
                    Vector3::new(-1.0 / root5, pos, neg.sqrt()),
                ];
                const FACES: [[usize; 3]; 20] = [
                    [0, 8, 9], [0, 9, 5], [0, 5, 2], [0, 2, 4], [0, 4, 8],
                    [8, 3, 9], [9, 3, 6], [9, 6, 5], [5, 6, 10], [5, 10, 2],
                    [2, 10, 11], [2, 11, 4], [4, 11, 7], [4, 7, 8], [8, 7, 3],
                    [3, 7, 1], [6, 3, 1], [10, 6, 1], [11, 10, 1], [7, 11, 1],
                ];
                FACES.iter().map(|face| face.map(|index| v[index])).collect()
            }
        }
    }
}

/// Sphere made by subdividing a polyhedron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodesic {
    polyhedron: Polyhedron,
    depth: u32,
    uniform_color: Option<[f32; 3]>,
}

impl Default for Geodesic {
    fn default() -> Self {
        Self { polyhedron: Polyhedron::Tetrahedron, depth: 4, uniform_color: None }
    }
}

impl Geodesic {
    /// Builder for a tetrahedron subdivided four times
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }
}

impl DrawableBuilder<Geodesic> {
    /// Starting solid
    #[must_use]
    pub fn polyhedron(mut self, polyhedron: Polyhedron) -> Self {
        self.shape.polyhedron = polyhedron;
        self
    }

    /// Subdivision passes; every pass splits each triangle into four
    #[must_use]
    pub fn recursive_depth(mut self, depth: u32) -> Self {
        self.shape.depth = depth.min(MAX_DEPTH);
        self
    }

    /// Paint every vertex one color instead of a hue per starting face
    #[must_use]
    pub fn uniform_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.shape.uniform_color = Some([r, g, b]);
        self
    }
}

fn subdivide(triangle: [Vector3<f32>; 3], depth: u32, out: &mut Vec<[f32; 3]>) {
    let [p0, p1, p2] = triangle;
    if depth == 0 {
        out.extend::<[[f32; 3]; 3]>([p0.into(), p1.into(), p2.into()]);
        return;
    }
    let m0 = ((p1 + p2) / 2.0).normalize();
    let m1 = ((p0 + p2) / 2.0).normalize();
    let m2 = ((p0 + p1) / 2.0).normalize();
    subdivide([p0, m2, m1], depth - 1, out);
    subdivide([m2, p1, m0], depth - 1, out);
    subdivide([m0, m1, m2], depth - 1, out);
    subdivide([m1, m0, p2], depth - 1, out);
}

impl Shape for Geodesic {
    fn mesh(&self) -> MeshData {
        let mut mesh = MeshData::default();
        for (ordinal, face) in self.polyhedron.faces().into_iter().enumerate() {
            let start = mesh.positions.len();
            subdivide(face, self.depth, &mut mesh.positions);
            let color = opaque(self.uniform_color.unwrap_or_else(|| hue_at(ordinal)));
            mesh.colors.resize(mesh.positions.len(), color);
            mesh.normals.extend(mesh.positions[start..].iter().map(|p| -> [f32; 3] { Vector3::from(*p).normalize().into() }));
        }
        let indices = (0..mesh.positions.len() as u32).collect();
        mesh.parts.push(MeshPart { topology: PrimitiveType::Triangles, indices });
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small() -> Sphere {
        Sphere { longitudes: 4, latitudes: 4 }
    }

    #[test]
    fn test_geographic_vertex_layout() {
        let mesh = small().mesh();
        assert_eq!(mesh.vertex_count(), 2 + 3 * 4);
        assert_eq!(mesh.positions[0], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.positions[1], [0.0, 0.0, -1.0]);
        assert_eq!(mesh.colors[0], opaque(RED));
        assert_eq!(mesh.colors[1], opaque(BLUE));
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            assert_eq!(position, normal);
            assert_relative_eq!(Vector3::from(*position).norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_geographic_elements() {
        let mesh = small().mesh();
        let topologies: Vec<_> = mesh.parts.iter().map(|part| part.topology).collect();
        assert_eq!(
            topologies,
            vec![PrimitiveType::TriangleStrip, PrimitiveType::TriangleFan, PrimitiveType::TriangleFan]
        );
        assert_eq!(mesh.parts[0].indices.len(), 22);
        assert_eq!(mesh.parts[1].indices, vec![0, 2, 3, 4, 5, 2]);
        assert_eq!(mesh.parts[2].indices, vec![1, 10, 11, 12, 13, 10]);
    }

    #[test]
    fn test_default_resolution_indices_stay_in_range() {
        let mesh = Sphere::default().mesh();
        assert_eq!(mesh.vertex_count(), 2 + 19 * 50);
        let max = mesh.parts.iter().flat_map(|part| part.indices.iter()).max().copied();
        assert_eq!(max, Some(mesh.vertex_count() as u32 - 1));
    }

    #[test]
    fn test_builder_enforces_minimum_grid() {
        let builder = Sphere::builder().longitudes(1).latitudes(0);
        assert_eq!(builder.shape, Sphere { longitudes: 3, latitudes: 3 });
    }

    #[test]
    fn test_geodesic_face_count_and_colors() {
        let mesh = Geodesic { depth: 2, ..Geodesic::default() }.mesh();
        assert_eq!(mesh.vertex_count(), 4 * 16 * 3);
        assert_eq!(mesh.colors[0], opaque(hue_at(0)));
        assert_eq!(mesh.colors[mesh.vertex_count() - 1], opaque(hue_at(3)));
        assert_eq!(mesh.normals.len(), mesh.vertex_count());

        let uniform = Geodesic { polyhedron: Polyhedron::Icosahedron, depth: 0, uniform_color: Some([0.2, 0.4, 0.6]) }.mesh();
        assert_eq!(uniform.vertex_count(), 60);
        assert!(uniform.colors.iter().all(|color| *color == [0.2, 0.4, 0.6, 1.0]));
    }
}
