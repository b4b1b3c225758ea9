//! Triangle meshes for molecule geometries

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::molecule::Geometry;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn for_geometry(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Sphere { radius, segments } => sphere(radius, segments),
            Geometry::Cylinder { radius, height, segments } => cylinder(radius, height, segments),
            Geometry::Ring { inner, outer, segments } => ring(inner, outer, segments),
            Geometry::Cuboid { size } => cuboid(size),
            Geometry::Plane { width, height } => plane(width, height),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        self.vertices.push(MeshVertex::new(position, normal));
        (self.vertices.len() - 1) as u32
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    /// Copy of every triangle with flipped winding and normals so flat shapes
    /// show from both sides
    fn double_sided(mut self) -> Self {
        let offset = self.vertices.len() as u32;
        let back: Vec<MeshVertex> = self
            .vertices
            .iter()
            .map(|v| MeshVertex {
                position: v.position,
                normal: (-Vec3::from_array(v.normal)).to_array(),
            })
            .collect();
        self.vertices.extend(back);
        let flipped: Vec<u32> = self
            .indices
            .chunks_exact(3)
            .flat_map(|t| [t[0] + offset, t[2] + offset, t[1] + offset])
            .collect();
        self.indices.extend(flipped);
        self
    }
}

/// UV sphere; `segments` longitude slices and half as many latitude rings
fn sphere(radius: f32, segments: u32) -> MeshData {
    let slices = segments.max(3);
    let stacks = (segments / 2).max(2);
    let mut mesh = MeshData::default();

    for stack in 0..=stacks {
        let phi = stack as f32 / stacks as f32 * PI;
        for slice in 0..=slices {
            let theta = slice as f32 / slices as f32 * TAU;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.push(normal * radius, normal);
        }
    }

    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

/// Capped cylinder centered on the origin along +Y
fn cylinder(radius: f32, height: f32, segments: u32) -> MeshData {
    let slices = segments.max(3);
    let half = height / 2.0;
    let mut mesh = MeshData::default();

    for slice in 0..=slices {
        let theta = slice as f32 / slices as f32 * TAU;
        let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
        mesh.push(normal * radius + Vec3::Y * half, normal);
        mesh.push(normal * radius - Vec3::Y * half, normal);
    }
    for slice in 0..slices {
        let top = slice * 2;
        mesh.quad(top, top + 2, top + 3, top + 1);
    }

    for (y, normal) in [(half, Vec3::Y), (-half, -Vec3::Y)] {
        let center = mesh.push(Vec3::Y * y, normal);
        let first = mesh.vertices.len() as u32;
        for slice in 0..=slices {
            let theta = slice as f32 / slices as f32 * TAU;
            mesh.push(Vec3::new(theta.cos() * radius, y, theta.sin() * radius), normal);
        }
        for slice in 0..slices {
            let (a, b) = (first + slice, first + slice + 1);
            if y > 0.0 {
                mesh.indices.extend_from_slice(&[center, b, a]);
            } else {
                mesh.indices.extend_from_slice(&[center, a, b]);
            }
        }
    }
    mesh
}

/// Flat annulus in the XY plane facing +Z
fn ring(inner: f32, outer: f32, segments: u32) -> MeshData {
    let slices = segments.max(3);
    let mut mesh = MeshData::default();
    for slice in 0..=slices {
        let theta = slice as f32 / slices as f32 * TAU;
        let direction = Vec3::new(theta.cos(), theta.sin(), 0.0);
        mesh.push(direction * inner, Vec3::Z);
        mesh.push(direction * outer, Vec3::Z);
    }
    for slice in 0..slices {
        let i = slice * 2;
        mesh.quad(i, i + 1, i + 3, i + 2);
    }
    mesh.double_sided()
}

fn cuboid(size: Vec3) -> MeshData {
    let h = size * 0.5;
    let mut mesh = MeshData::default();
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, Vec3::Y, Vec3::X),
    ];
    for (normal, u, v) in faces {
        let center = normal * h;
        let du = u * h;
        let dv = v * h;
        let a = mesh.push(center - du - dv, normal);
        let b = mesh.push(center + du - dv, normal);
        let c = mesh.push(center + du + dv, normal);
        let d = mesh.push(center - du + dv, normal);
        mesh.quad(a, b, c, d);
    }
    mesh
}

/// Rectangle in the XY plane facing +Z
fn plane(width: f32, height: f32) -> MeshData {
    let (w, h) = (width / 2.0, height / 2.0);
    let mut mesh = MeshData::default();
    let a = mesh.push(Vec3::new(-w, -h, 0.0), Vec3::Z);
    let b = mesh.push(Vec3::new(w, -h, 0.0), Vec3::Z);
    let c = mesh.push(Vec3::new(w, h, 0.0), Vec3::Z);
    let d = mesh.push(Vec3::new(-w, h, 0.0), Vec3::Z);
    mesh.quad(a, b, c, d);
    mesh.double_sided()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_geometries() -> Vec<Geometry> {
        vec![
            Geometry::Sphere { radius: 0.5, segments: 16 },
            Geometry::Cylinder { radius: 0.1, height: 1.0, segments: 12 },
            Geometry::Ring { inner: 0.9, outer: 1.0, segments: 32 },
            Geometry::Cuboid { size: Vec3::new(1.0, 2.0, 3.0) },
            Geometry::Plane { width: 2.0, height: 1.0 },
        ]
    }

    #[test]
    fn test_indices_are_in_range() {
        for geometry in all_geometries() {
            let mesh = MeshData::for_geometry(&geometry);
            assert!(!mesh.indices.is_empty());
            assert_eq!(mesh.indices.len() % 3, 0);
            let count = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count), "{:?}", geometry);
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        for geometry in all_geometries() {
            for v in MeshData::for_geometry(&geometry).vertices {
                assert!((Vec3::from_array(v.normal).length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = sphere(0.75, 12);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.position).length() - 0.75).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cuboid_extent() {
        let mesh = cuboid(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangle_count(), 12);
        let max = mesh
            .vertices
            .iter()
            .fold(Vec3::ZERO, |m, v| m.max(Vec3::from_array(v.position)));
        assert_eq!(max, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_flat_shapes_are_double_sided() {
        assert_eq!(plane(1.0, 1.0).triangle_count(), 4);
        assert_eq!(ring(0.5, 1.0, 8).triangle_count(), 32);
    }
}
