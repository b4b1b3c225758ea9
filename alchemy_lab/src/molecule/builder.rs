//! Shared construction helpers for the molecule builders

use std::collections::HashMap;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::effects::Effect;
use super::graph::{Geometry, GeometryId, Material, MaterialId, MoleculeGraph, NodeId, PointLight, Transform};
use super::script::Script;
use super::Molecule;
use crate::category::AnimationCategory;
use crate::elements::ElementTable;

const ATOM_SEGMENTS: u32 = 24;
const SMALL_SEGMENTS: u32 = 8;
const BOND_SEGMENTS: u32 = 12;

/// A mesh node together with its own material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub node: NodeId,
    pub material: MaterialId,
}

pub struct MoleculeBuilder {
    graph: MoleculeGraph,
    elements: ElementTable,
    spheres: HashMap<(u32, u32), GeometryId>,
    cylinders: HashMap<u32, GeometryId>,
    effects: Vec<Effect>,
    rng: StdRng,
}

impl MoleculeBuilder {
    pub fn new(generation: u64, seed: u64) -> Self {
        Self {
            graph: MoleculeGraph::new(generation),
            elements: ElementTable::standard(),
            spheres: HashMap::new(),
            cylinders: HashMap::new(),
            effects: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut MoleculeGraph {
        &mut self.graph
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Uniform point in a cube of the given edge length around the origin
    pub fn scatter(&mut self, extent: f32) -> Vec3 {
        Vec3::new(
            (self.rng.gen::<f32>() - 0.5) * extent,
            (self.rng.gen::<f32>() - 0.5) * extent,
            (self.rng.gen::<f32>() - 0.5) * extent,
        )
    }

    /// Random unit vector
    pub fn direction(&mut self) -> Vec3 {
        loop {
            let v = self.scatter(2.0);
            let length = v.length();
            if length > 0.05 && length <= 1.0 {
                return v / length;
            }
        }
    }

    pub fn between(&mut self, low: f32, high: f32) -> f32 {
        self.rng.gen_range(low..high)
    }

    pub fn group(&mut self, parent: NodeId, position: Vec3) -> NodeId {
        self.graph.add_node(parent, Transform::at(position))
    }

    pub fn mesh(&mut self, parent: NodeId, geometry: Geometry, material: Material, transform: Transform) -> Part {
        let geometry = self.graph.add_geometry(geometry);
        self.mesh_with(parent, geometry, material, transform)
    }

    fn mesh_with(&mut self, parent: NodeId, geometry: GeometryId, material: Material, transform: Transform) -> Part {
        let material = self.graph.add_material(material);
        let node = self.graph.add_mesh(parent, geometry, material, transform);
        Part { node, material }
    }

    /// Sphere meshes of equal radius share one geometry
    pub fn sphere(&mut self, parent: NodeId, radius: f32, material: Material, position: Vec3) -> Part {
        let segments = if radius < 0.1 { SMALL_SEGMENTS } else { ATOM_SEGMENTS };
        let geometry = *self
            .spheres
            .entry((radius.to_bits(), segments))
            .or_insert_with(|| self.graph.add_geometry(Geometry::Sphere { radius, segments }));
        self.mesh_with(parent, geometry, material, Transform::at(position))
    }

    /// Atom colored and sized from the element table. Unknown symbols fall back
    /// to a grey sphere.
    pub fn atom(&mut self, parent: NodeId, symbol: &str, position: Vec3) -> Part {
        self.atom_scaled(parent, symbol, position, 1.0)
    }

    pub fn atom_scaled(&mut self, parent: NodeId, symbol: &str, position: Vec3, scale: f32) -> Part {
        let (color, radius) = self
            .elements
            .get(symbol)
            .map_or((0x888888, 0.5), |e| (e.color, e.radius));
        let material = Material::standard(color).metal(0.1, 0.3);
        self.sphere(parent, radius * scale, material, position)
    }

    /// Small glowing unlit sphere used for particles
    pub fn spark(&mut self, parent: NodeId, radius: f32, color: u32, opacity: f32, position: Vec3) -> Part {
        self.sphere(parent, radius, Material::unlit(color, opacity), position)
    }

    /// Cylinder from `a` to `b`. Bonds of equal radius share a unit-height
    /// geometry stretched along Y.
    pub fn bond(&mut self, parent: NodeId, a: Vec3, b: Vec3, radius: f32, color: u32) -> Part {
        let geometry = *self.cylinders.entry(radius.to_bits()).or_insert_with(|| {
            self.graph.add_geometry(Geometry::Cylinder {
                radius,
                height: 1.0,
                segments: BOND_SEGMENTS,
            })
        });
        let material = Material::standard(color).metal(0.1, 0.5);
        self.mesh_with(parent, geometry, material, bond_transform(a, b))
    }

    /// Two parallel bonds offset perpendicular to the bond axis
    pub fn double_bond(&mut self, parent: NodeId, a: Vec3, b: Vec3, radius: f32, color: u32) -> [Part; 2] {
        let offset = perpendicular(b - a) * radius * 2.0;
        [
            self.bond(parent, a + offset, b + offset, radius, color),
            self.bond(parent, a - offset, b - offset, radius, color),
        ]
    }

    pub fn light(&mut self, parent: NodeId, color: u32, intensity: f32, range: f32, position: Vec3) -> NodeId {
        let light = PointLight {
            color: common::hex_rgb(color),
            intensity,
            range,
        };
        self.graph.add_light(parent, light, position)
    }

    pub fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn finish(self, category: AnimationCategory, script: Option<Script>) -> Molecule {
        Molecule::new(category, self.graph, self.effects, script)
    }
}

/// Midpoint placement with +Y turned onto the bond direction
pub fn bond_transform(a: Vec3, b: Vec3) -> Transform {
    let delta = b - a;
    let length = delta.length();
    let rotation = if length > f32::EPSILON {
        Quat::from_rotation_arc(Vec3::Y, delta / length)
    } else {
        Quat::IDENTITY
    };
    Transform {
        translation: (a + b) * 0.5,
        rotation,
        scale: Vec3::new(1.0, length, 1.0),
    }
}

fn perpendicular(direction: Vec3) -> Vec3 {
    let d = direction.normalize_or_zero();
    let candidate = if d.x.abs() < 0.9 { Vec3::X } else { Vec3::Z };
    d.cross(candidate).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bond_spans_both_atoms() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 2.0, 2.0);
        let transform = bond_transform(a, b);
        let matrix = transform.matrix();
        let bottom = matrix.transform_point3(Vec3::new(0.0, -0.5, 0.0));
        let top = matrix.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((bottom - a).length() < 1e-5);
        assert!((top - b).length() < 1e-5);
    }

    #[test]
    fn test_spheres_share_geometry() {
        let mut builder = MoleculeBuilder::new(1, 0);
        let root = builder.root();
        builder.atom(root, "H", Vec3::X);
        builder.atom(root, "H", -Vec3::X);
        builder.atom(root, "O", Vec3::ZERO);
        assert_eq!(builder.graph().geometry_count(), 2);
        assert_eq!(builder.graph().material_count(), 3);
    }

    #[test]
    fn test_double_bond_is_parallel() {
        let mut builder = MoleculeBuilder::new(1, 0);
        let root = builder.root();
        let [first, second] = builder.double_bond(root, Vec3::ZERO, Vec3::X * 2.0, 0.05, 0xffffff);
        let graph = builder.graph();
        let p1 = graph.node(first.node).transform.translation;
        let p2 = graph.node(second.node).transform.translation;
        assert!((p1 + p2 - Vec3::X * 2.0).length() < 1e-5);
        assert!((p1 - p2).length() > 0.1);
    }

    #[test]
    fn test_scatter_is_seeded() {
        let mut a = MoleculeBuilder::new(1, 42);
        let mut b = MoleculeBuilder::new(2, 42);
        assert_eq!(a.scatter(2.0), b.scatter(2.0));
        let p = a.scatter(2.0);
        assert!(p.abs().max_element() <= 1.0);
    }
}
