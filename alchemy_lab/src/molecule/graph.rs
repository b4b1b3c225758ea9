//! Molecule scene graph
//!
//! A molecule owns every node, geometry and material it creates. Handles carry
//! the molecule's generation so handles of two molecules never compare equal,
//! which lets a renderer key its GPU caches on them directly.

use glam::{Mat3, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId {
    pub generation: u64,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId {
    pub generation: u64,
    pub index: u32,
}

/// Index of a node inside its own graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32, segments: u32 },
    /// Centered on the origin along +Y
    Cylinder { radius: f32, height: f32, segments: u32 },
    /// Flat annulus in the XY plane
    Ring { inner: f32, outer: f32, segments: u32 },
    Cuboid { size: Vec3 },
    /// Flat rectangle in the XY plane
    Plane { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Lit with metalness/roughness
    Standard,
    /// Flat color, ignores lights
    Unlit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub shading: Shading,
}

impl Material {
    pub fn standard(color: u32) -> Self {
        Self {
            color: common::hex_rgb(color),
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            metalness: 0.1,
            roughness: 0.4,
            opacity: 1.0,
            shading: Shading::Standard,
        }
    }

    pub fn unlit(color: u32, opacity: f32) -> Self {
        Self {
            opacity,
            shading: Shading::Unlit,
            ..Self::standard(color)
        }
    }

    pub fn metal(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness;
        self.roughness = roughness;
        self
    }

    pub fn glowing(mut self, emissive: u32, intensity: f32) -> Self {
        self.emissive = common::hex_rgb(emissive);
        self.emissive_intensity = intensity;
        self
    }

    pub fn translucent(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub transform: Transform,
    pub visible: bool,
    pub mesh: Option<(GeometryId, MaterialId)>,
    pub light: Option<PointLight>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(parent: Option<NodeId>, transform: Transform) -> Self {
        Self {
            transform,
            visible: true,
            mesh: None,
            light: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    released: bool,
}

/// Receives every resource exactly once when a graph is disposed
pub trait ResourceReleaser {
    fn release_geometry(&mut self, id: GeometryId);
    fn release_material(&mut self, id: MaterialId);
}

/// Counts of what one `dispose` call released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposeReport {
    pub geometries: usize,
    pub materials: usize,
    pub nodes: usize,
}

/// One visible mesh with its world transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub world: Mat4,
    pub normal: Mat3,
}

/// A visible point light in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedLight {
    pub position: Vec3,
    pub light: PointLight,
}

#[derive(Debug, Clone)]
pub struct MoleculeGraph {
    generation: u64,
    nodes: Vec<Node>,
    geometries: Vec<Slot<Geometry>>,
    materials: Vec<Slot<Material>>,
    disposed: bool,
}

impl MoleculeGraph {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            nodes: vec![Node::new(None, Transform::default())],
            geometries: Vec::new(),
            materials: Vec::new(),
            disposed: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The node the scene positions, scales and spins
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(Slot {
            value: geometry,
            released: false,
        });
        GeometryId {
            generation: self.generation,
            index: (self.geometries.len() - 1) as u32,
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(Slot {
            value: material,
            released: false,
        });
        MaterialId {
            generation: self.generation,
            index: (self.materials.len() - 1) as u32,
        }
    }

    pub fn add_node(&mut self, parent: NodeId, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(Some(parent), transform));
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        geometry: GeometryId,
        material: MaterialId,
        transform: Transform,
    ) -> NodeId {
        let id = self.add_node(parent, transform);
        self.nodes[id.0 as usize].mesh = Some((geometry, material));
        id
    }

    pub fn add_light(&mut self, parent: NodeId, light: PointLight, position: Vec3) -> NodeId {
        let id = self.add_node(parent, Transform::at(position));
        self.nodes[id.0 as usize].light = Some(light);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0 as usize].transform
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id.0 as usize].visible = visible;
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.slot_index(id.generation, id.index)
            .and_then(|i| self.geometries.get(i))
            .map(|slot| &slot.value)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.slot_index(id.generation, id.index)
            .and_then(|i| self.materials.get(i))
            .map(|slot| &slot.value)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.slot_index(id.generation, id.index)
            .and_then(|i| self.materials.get_mut(i))
            .map(|slot| &mut slot.value)
    }

    fn slot_index(&self, generation: u64, index: u32) -> Option<usize> {
        (generation == self.generation).then_some(index as usize)
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes.get(id.0 as usize).map_or(0, |n| n.children.len())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Product of the transforms from the root down to `id`
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|n| self.nodes.get(n.0 as usize)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Every visible mesh and light, in depth-first order. Hidden nodes hide
    /// their whole subtree.
    pub fn collect(&self, draws: &mut Vec<DrawItem>, lights: &mut Vec<PlacedLight>) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![(NodeId(0), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0 as usize];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();

            if let Some((geometry, material)) = node.mesh {
                let opaque_or_visible = self.material(material).map_or(false, |m| m.opacity > 0.0);
                if opaque_or_visible {
                    draws.push(DrawItem {
                        geometry,
                        material,
                        world,
                        normal: Mat3::from_mat4(world).inverse().transpose(),
                    });
                }
            }
            if let Some(light) = node.light {
                lights.push(PlacedLight {
                    position: world.transform_point3(Vec3::ZERO),
                    light,
                });
            }
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    /// Release every geometry and material once and detach all nodes. Calling it
    /// again releases nothing.
    pub fn dispose<R: ResourceReleaser + ?Sized>(&mut self, releaser: &mut R) -> DisposeReport {
        let mut report = DisposeReport::default();

        for (index, slot) in self.geometries.iter_mut().enumerate() {
            if !slot.released {
                slot.released = true;
                releaser.release_geometry(GeometryId {
                    generation: self.generation,
                    index: index as u32,
                });
                report.geometries += 1;
            }
        }
        for (index, slot) in self.materials.iter_mut().enumerate() {
            if !slot.released {
                slot.released = true;
                releaser.release_material(MaterialId {
                    generation: self.generation,
                    index: index as u32,
                });
                report.materials += 1;
            }
        }

        report.nodes = self.nodes.len();
        for node in &mut self.nodes {
            node.children.clear();
            node.parent = None;
        }
        self.nodes.clear();
        self.disposed = true;

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Released {
        geometries: Vec<GeometryId>,
        materials: Vec<MaterialId>,
    }

    impl ResourceReleaser for Released {
        fn release_geometry(&mut self, id: GeometryId) {
            self.geometries.push(id);
        }

        fn release_material(&mut self, id: MaterialId) {
            self.materials.push(id);
        }
    }

    fn sample() -> MoleculeGraph {
        let mut graph = MoleculeGraph::new(7);
        let sphere = graph.add_geometry(Geometry::Sphere { radius: 1.0, segments: 8 });
        let red = graph.add_material(Material::standard(0xff0000));
        let blue = graph.add_material(Material::standard(0x0000ff));
        let group = graph.add_node(graph.root(), Transform::at(Vec3::X));
        graph.add_mesh(group, sphere, red, Transform::at(Vec3::Y));
        graph.add_mesh(graph.root(), sphere, blue, Transform::default());
        graph
    }

    #[test]
    fn test_handles_carry_generation() {
        let graph = sample();
        let other = sample();
        let id = GeometryId { generation: 7, index: 0 };
        assert!(graph.geometry(id).is_some());
        assert!(graph.geometry(GeometryId { generation: 8, index: 0 }).is_none());
        assert_eq!(graph.generation(), other.generation());
    }

    #[test]
    fn test_world_transforms_compose() {
        let graph = sample();
        let mut draws = Vec::new();
        let mut lights = Vec::new();
        graph.collect(&mut draws, &mut lights);
        assert_eq!(draws.len(), 2);
        let nested = draws[0].world.transform_point3(Vec3::ZERO);
        assert!((nested - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
        assert!(lights.is_empty());
    }

    #[test]
    fn test_hidden_nodes_hide_subtree() {
        let mut graph = sample();
        let group = graph.node(graph.root()).children()[0];
        graph.set_visible(group, false);
        let mut draws = Vec::new();
        graph.collect(&mut draws, &mut Vec::new());
        assert_eq!(draws.len(), 1);
    }

    #[test]
    fn test_dispose_releases_each_handle_once() {
        let mut graph = sample();
        let mut released = Released::default();

        let report = graph.dispose(&mut released);
        assert_eq!(report, DisposeReport { geometries: 1, materials: 2, nodes: 4 });
        assert_eq!(released.geometries.len(), 1);
        assert_eq!(released.materials.len(), 2);
        assert!(graph.is_disposed());
        assert_eq!(graph.node_count(), 0);

        let again = graph.dispose(&mut released);
        assert_eq!(again, DisposeReport::default());
        assert_eq!(released.materials.len(), 2);
    }

    #[test]
    fn test_lights_are_placed_in_world_space() {
        let mut graph = MoleculeGraph::new(1);
        let group = graph.add_node(graph.root(), Transform::at(Vec3::new(0.0, 2.0, 0.0)));
        graph.add_light(
            group,
            PointLight { color: [1.0; 3], intensity: 2.0, range: 10.0 },
            Vec3::new(1.0, 0.0, 0.0),
        );
        let mut lights = Vec::new();
        graph.collect(&mut Vec::new(), &mut lights);
        assert_eq!(lights.len(), 1);
        assert!((lights[0].position - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }
}
