//! Ionic pairs, crystal lattices and alloys

use common::constants::frames_in;
use glam::Vec3;

use super::builder::{bond_transform, MoleculeBuilder, Part};
use super::effects::{Easing, Effect, PulseTarget};
use super::graph::{Geometry, Material, MoleculeGraph, NodeId, Transform};
use super::script::Script;
use crate::category::AnimationCategory;

/// Na⁺ Cl⁻ pair with a faint ionic glow and salt grains settling out
pub fn salt(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let na = Vec3::new(-0.9, 0.0, 0.0);
    let cl = Vec3::new(0.9, 0.0, 0.0);
    for (symbol, position, phase) in [("Na", na, 0.0), ("Cl", cl, std::f32::consts::PI)] {
        let ion = b.atom(root, symbol, position);
        if let Some(m) = b.graph_mut().material_mut(ion.material) {
            *m = m.glowing(0xffffff, 0.1);
        }
        b.effect(Effect::Pulse {
            target: PulseTarget::Emissive(ion.material),
            base: 0.15,
            amplitude: 0.1,
            frequency: 0.003,
            phase,
        });
    }
    b.bond(root, na, cl, 0.04, 0x999999);

    for i in 0..10 {
        let origin = Vec3::new(b.between(-1.5, 1.5), 1.8, b.between(-1.0, 1.0));
        let grain = b.mesh(
            root,
            Geometry::Cuboid { size: Vec3::splat(0.08) },
            Material::standard(0xf5f5f5).metal(0.0, 0.2),
            Transform::at(origin),
        );
        b.effect(Effect::Drift {
            node: grain.node,
            material: None,
            origin,
            velocity: Vec3::new(0.0, -0.02, 0.0),
            gravity: 0.0,
            opacity: 1.0,
            life_frames: 180.0,
            delay_frames: i as f32 * 18.0,
            looping: true,
            growth: 0.0,
        });
        b.effect(Effect::Spin {
            node: grain.node,
            rate: Vec3::new(0.001, 0.002, 0.0),
        });
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
struct LatticeSite {
    part: Part,
    home: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    sites: Vec<LatticeSite>,
    bonds: Vec<(Part, usize, usize)>,
}

impl Lattice {
    pub const SPACING: f32 = 0.8;
    const EXTENT: i32 = 2;
    const OCCUPANCY: f32 = 0.7;

    /// Seconds between consecutive atoms starting to grow
    const ATOM_DELAY: f32 = 0.1;
    const BOND_DELAY: f32 = 0.05;

    pub fn apply(&self, graph: &mut MoleculeGraph, t: f32) {
        let seconds = t / 1000.0;
        for (i, site) in self.sites.iter().enumerate() {
            let growth = ((seconds - i as f32 * Self::ATOM_DELAY) * 2.0).clamp(0.0, 1.0);
            let scale = 0.1 + Easing::CubicOut.apply(growth) * 0.9;

            let transform = graph.transform_mut(site.part.node);
            transform.scale = Vec3::splat(scale);
            transform.translation = site.home + Vec3::Y * (seconds * 2.0 + i as f32).sin() * 0.02;

            let hue = ((seconds * 0.5 + i as f32 * 0.5).sin() + 1.0) * 0.5;
            let [r, g, b, _] = common::hsl(252.0 + hue * 108.0, 0.8, 0.6);
            if let Some(m) = graph.material_mut(site.part.material) {
                m.color = [r, g, b];
            }
        }

        for (i, (bond, a, b)) in self.bonds.iter().enumerate() {
            let delay = i as f32 * Self::BOND_DELAY + 1.0;
            let growth = 1.0 - (1.0 - ((seconds - delay) * 3.0).clamp(0.0, 1.0)).powi(2);
            let from = graph.node(self.sites[*a].part.node).transform.translation;
            let to = graph.node(self.sites[*b].part.node).transform.translation;
            let mut transform = bond_transform(from, to);
            transform.scale *= growth;
            graph.set_visible(bond.node, growth > 0.0);
            *graph.transform_mut(bond.node) = transform;
        }
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }
}

/// Cubic lattice growing outward site by site, with sparkles
pub fn crystal(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let lattice = b.group(root, Vec3::ZERO);
    b.effect(Effect::Spin {
        node: lattice,
        rate: Vec3::new(0.0, 0.0003, 0.0),
    });
    b.effect(Effect::Pulse {
        target: PulseTarget::Scale(lattice),
        base: 1.0,
        amplitude: 0.05,
        frequency: 0.0015,
        phase: 0.0,
    });

    let mut sites = Vec::new();
    let n = Lattice::EXTENT;
    for x in -n..=n {
        for y in -n..=n {
            for z in -n..=n {
                if b.between(0.0, 1.0) > Lattice::OCCUPANCY {
                    continue;
                }
                let home = Vec3::new(x as f32, y as f32, z as f32) * Lattice::SPACING;
                let material = Material::standard(0x87ceeb).metal(0.3, 0.4).translucent(0.8);
                let part = b.sphere(lattice, 0.15, material, home);
                sites.push(LatticeSite { part, home });
            }
        }
    }

    let mut bonds = Vec::new();
    for i in 0..sites.len() {
        for j in i + 1..sites.len() {
            if sites[i].home.distance(sites[j].home) < Lattice::SPACING * 1.5 {
                let part = b.bond(lattice, sites[i].home, sites[j].home, 0.03, 0xcccccc);
                if let Some(m) = b.graph_mut().material_mut(part.material) {
                    m.opacity = 0.6;
                }
                bonds.push((part, i, j));
            }
        }
    }

    for i in 0..20 {
        let position = b.scatter(6.0);
        let sparkle = b.sphere(
            lattice,
            0.05,
            Material::standard(0xffffff).glowing(0xffffff, 0.5).translucent(0.0),
            position,
        );
        b.effect(Effect::Blink {
            material: sparkle.material,
            period_ms: 3000.0,
            on_ms: 500.0,
            offset_ms: i as f32 * 500.0,
            peak: 0.8,
        });
    }

    Some(Script::Lattice(Lattice { sites, bonds }))
}

#[derive(Debug, Clone, PartialEq)]
struct MixingAtom {
    node: NodeId,
    start: Vec3,
    target: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
struct MixingBond {
    part: Part,
    a: usize,
    b: usize,
    /// Bonds inside the original clusters fade out, bonds of the mixed sphere fade in
    original: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mixing {
    atoms: Vec<MixingAtom>,
    bonds: Vec<MixingBond>,
}

impl Mixing {
    const START_FRAMES: f32 = 60.0;
    const RATE: f32 = 0.003;
    const BOND_OPACITY: f32 = 0.6;

    /// Mixing progress after `t` milliseconds, 0 before the first second
    pub fn progress(t: f32) -> f32 {
        ((frames_in(t) - Self::START_FRAMES) * Self::RATE).clamp(0.0, 1.0)
    }

    pub fn apply(&self, graph: &mut MoleculeGraph, t: f32) {
        let mixed = Easing::CubicInOut.apply(Self::progress(t));
        for atom in &self.atoms {
            graph.transform_mut(atom.node).translation = atom.start.lerp(atom.target, mixed);
        }
        for bond in &self.bonds {
            let weight = if bond.original { 1.0 - mixed } else { mixed };
            let from = atom_position(graph, &self.atoms, bond.a);
            let to = atom_position(graph, &self.atoms, bond.b);
            *graph.transform_mut(bond.part.node) = bond_transform(from, to);
            graph.set_visible(bond.part.node, weight > 0.0);
            if let Some(m) = graph.material_mut(bond.part.material) {
                m.opacity = weight * Self::BOND_OPACITY;
            }
        }
    }
}

fn atom_position(graph: &MoleculeGraph, atoms: &[MixingAtom], index: usize) -> Vec3 {
    graph.node(atoms[index].node).transform.translation
}

/// Evenly spread points on a sphere
fn fibonacci_sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let golden = std::f32::consts::PI * (3.0 - 5f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 + 0.5) / count as f32 * 2.0;
            let ring = (1.0 - y * y).sqrt();
            let theta = golden * i as f32;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring) * radius
        })
        .collect()
}

/// Gold and silver clusters melting together into one alloy sphere
pub fn alloy(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    const PER_METAL: usize = 8;
    let root = b.root();
    let targets = fibonacci_sphere(PER_METAL * 2, 1.2);

    let mut atoms = Vec::new();
    for (metal_index, (symbol, center)) in [("Au", -1.8f32), ("Ag", 1.8f32)].into_iter().enumerate() {
        for i in 0..PER_METAL {
            let start = Vec3::new(center, 0.0, 0.0) + b.scatter(1.0);
            let part = b.atom_scaled(root, symbol, start, 0.4);
            if let Some(m) = b.graph_mut().material_mut(part.material) {
                *m = m.metal(0.9, 0.15);
            }
            atoms.push(MixingAtom {
                node: part.node,
                start,
                target: targets[i * 2 + metal_index],
            });
        }
    }

    let mut bonds = Vec::new();
    for a in 0..atoms.len() {
        for c in a + 1..atoms.len() {
            let same_cluster = a / PER_METAL == c / PER_METAL;
            let original = same_cluster && atoms[a].start.distance(atoms[c].start) < 0.9;
            let mixed = atoms[a].target.distance(atoms[c].target) < 0.9;
            if !(original || mixed) {
                continue;
            }
            let part = b.bond(root, atoms[a].start, atoms[c].start, 0.025, 0xcccccc);
            bonds.push(MixingBond { part, a, b: c, original });
        }
    }

    let forge = b.sphere(root, 4.0, Material::unlit(0xff4400, 0.05), Vec3::ZERO);
    b.effect(Effect::Pulse {
        target: PulseTarget::Opacity(forge.material),
        base: 0.08,
        amplitude: 0.04,
        frequency: 0.004,
        phase: 0.0,
    });
    let light = b.light(root, 0xff6600, 1.5, 12.0, Vec3::new(0.0, -2.0, 0.0));
    b.effect(Effect::Pulse {
        target: PulseTarget::Light(light),
        base: 1.5,
        amplitude: 0.5,
        frequency: 0.005,
        phase: 0.0,
    });

    for i in 0..20 {
        let velocity = Vec3::new(b.between(-0.1, 0.1), b.between(0.05, 0.3), b.between(-0.1, 0.1));
        let spark = b.spark(root, 0.02, 0xffff00, 1.0, Vec3::ZERO);
        b.effect(Effect::Drift {
            node: spark.node,
            material: Some(spark.material),
            origin: Vec3::new(0.0, -1.2, 0.0),
            velocity,
            gravity: -0.01,
            opacity: 1.0,
            life_frames: 50.0,
            delay_frames: i as f32 * 4.0,
            looping: true,
            growth: 0.0,
        });
    }

    Some(Script::Mixing(Mixing { atoms, bonds }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_grows_in_order() {
        let mut b = MoleculeBuilder::new(1, 5);
        let Some(Script::Lattice(lattice)) = crystal(&mut b, AnimationCategory::Crystal) else {
            panic!("expected a lattice script");
        };
        assert!(lattice.site_count() > 10);
        assert!(lattice.bond_count() > 0);
        let mut graph = b.graph().clone();

        lattice.apply(&mut graph, 0.0);
        let first = lattice.sites[0].part.node;
        assert!((graph.node(first).transform.scale.x - 0.1).abs() < 1e-5);
        assert!(!graph.node(lattice.bonds[0].0.node).visible);

        lattice.apply(&mut graph, 600.0);
        assert!((graph.node(first).transform.scale.x - 1.0).abs() < 1e-5);
        let last = lattice.sites[lattice.site_count() - 1].part.node;
        assert!(graph.node(last).transform.scale.x < 0.2);
    }

    #[test]
    fn test_fibonacci_points_sit_on_sphere() {
        let points = fibonacci_sphere(16, 1.2);
        assert_eq!(points.len(), 16);
        for p in points {
            assert!((p.length() - 1.2).abs() < 1e-4);
        }
    }

    #[test]
    fn test_mixing_progress() {
        assert_eq!(Mixing::progress(0.0), 0.0);
        assert_eq!(Mixing::progress(1000.0), 0.0);
        assert!(Mixing::progress(5000.0) > 0.5);
        assert_eq!(Mixing::progress(60_000.0), 1.0);
    }

    #[test]
    fn test_alloy_ends_mixed() {
        let mut b = MoleculeBuilder::new(1, 5);
        let Some(Script::Mixing(mixing)) = alloy(&mut b, AnimationCategory::Alloy) else {
            panic!("expected a mixing script");
        };
        let mut graph = b.graph().clone();
        mixing.apply(&mut graph, 60_000.0);
        for atom in &mixing.atoms {
            let p = graph.node(atom.node).transform.translation;
            assert!((p - atom.target).length() < 1e-5);
        }
        for bond in &mixing.bonds {
            assert_eq!(graph.node(bond.part.node).visible, !bond.original);
        }
    }
}
