use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Shape;

/// Floats per interleaved vertex: position then normal.
pub const FLOATS_PER_VERTEX: usize = 6;

/// GPU ready mesh data.
///
/// Vertices are interleaved as `position.xyz` followed by `normal.xyz`. Every
/// primitive fits the unit box centred on the origin, so node scale doubles as
/// the object size.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        index
    }

    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertex_count() as u32;
        for corner in corners {
            self.push_vertex(corner, normal);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Unit mesh for a drawable shape, `None` for groups.
pub fn unit_mesh(shape: Shape) -> Option<MeshData> {
    match shape {
        Shape::Group => None,
        Shape::Cube => Some(cube()),
        Shape::Sphere => Some(sphere(16, 12)),
        Shape::Cylinder => Some(cylinder(20)),
        Shape::Plane => Some(plane()),
    }
}

pub fn cube() -> MeshData {
    let mut mesh = MeshData::default();
    let h = 0.5;
    // front, back, left, right, bottom, top
    mesh.push_quad(
        [
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ],
        Vec3::Z,
    );
    mesh.push_quad(
        [
            Vec3::new(h, -h, -h),
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(h, h, -h),
        ],
        Vec3::NEG_Z,
    );
    mesh.push_quad(
        [
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, h, -h),
        ],
        Vec3::NEG_X,
    );
    mesh.push_quad(
        [
            Vec3::new(h, -h, h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(h, h, h),
        ],
        Vec3::X,
    );
    mesh.push_quad(
        [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, -h, h),
            Vec3::new(-h, -h, h),
        ],
        Vec3::NEG_Y,
    );
    mesh.push_quad(
        [
            Vec3::new(-h, h, h),
            Vec3::new(h, h, h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
        ],
        Vec3::Y,
    );
    mesh
}

/// Flat square on the XZ plane facing +Y.
pub fn plane() -> MeshData {
    let mut mesh = MeshData::default();
    let h = 0.5;
    mesh.push_quad(
        [
            Vec3::new(-h, 0.0, h),
            Vec3::new(h, 0.0, h),
            Vec3::new(h, 0.0, -h),
            Vec3::new(-h, 0.0, -h),
        ],
        Vec3::Y,
    );
    mesh
}

/// UV sphere of radius 0.5.
pub fn sphere(segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = MeshData::default();

    for ring in 0..=rings {
        let theta = ring as f32 / rings as f32 * PI;
        for segment in 0..=segments {
            let phi = segment as f32 / segments as f32 * TAU;
            let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.push_vertex(normal * 0.5, normal);
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

/// Capped cylinder of radius 0.5 and height 1 around the Y axis.
pub fn cylinder(segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut mesh = MeshData::default();
    let h = 0.5;

    for segment in 0..segments {
        let a0 = segment as f32 / segments as f32 * TAU;
        let a1 = (segment + 1) as f32 / segments as f32 * TAU;
        let d0 = Vec3::new(a0.cos(), 0.0, a0.sin());
        let d1 = Vec3::new(a1.cos(), 0.0, a1.sin());

        let base = mesh.vertex_count() as u32;
        mesh.push_vertex(d0 * 0.5 + Vec3::Y * -h, d0);
        mesh.push_vertex(d0 * 0.5 + Vec3::Y * h, d0);
        mesh.push_vertex(d1 * 0.5 + Vec3::Y * h, d1);
        mesh.push_vertex(d1 * 0.5 + Vec3::Y * -h, d1);
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        for (y, normal) in [(h, Vec3::Y), (-h, Vec3::NEG_Y)] {
            let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal);
            let p0 = mesh.push_vertex(d0 * 0.5 + Vec3::Y * y, normal);
            let p1 = mesh.push_vertex(d1 * 0.5 + Vec3::Y * y, normal);
            if y > 0.0 {
                mesh.indices.extend_from_slice(&[center, p1, p0]);
            } else {
                mesh.indices.extend_from_slice(&[center, p0, p1]);
            }
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &MeshData) -> impl Iterator<Item = Vec3> + '_ {
        mesh.vertices
            .chunks_exact(6)
            .map(|chunk| Vec3::new(chunk[0], chunk[1], chunk[2]))
    }

    #[test]
    fn primitives_fit_the_unit_box() {
        for shape in [Shape::Cube, Shape::Sphere, Shape::Cylinder, Shape::Plane] {
            let mesh = unit_mesh(shape).unwrap();
            assert!(!mesh.indices.is_empty());
            for position in positions(&mesh) {
                assert!(position.abs().max_element() <= 0.5 + 1e-5, "{shape:?}");
            }
            let count = mesh.vertex_count() as u32;
            assert!(mesh.indices.iter().all(|index| *index < count));
        }
    }

    #[test]
    fn groups_have_no_mesh() {
        assert!(unit_mesh(Shape::Group).is_none());
    }

    #[test]
    fn cube_has_six_faces() {
        let mesh = cube();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }
}
