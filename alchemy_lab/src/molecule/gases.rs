//! Small covalent molecules: water, carbon oxides, ammonia, methane, hydrogen sulfide

use glam::{Quat, Vec3};

use super::builder::MoleculeBuilder;
use super::effects::{Effect, PulseTarget};
use super::graph::{Geometry, Material, Transform};
use super::script::Script;
use crate::category::AnimationCategory;

const BOND_COLOR: u32 = 0xcccccc;
const BOND_RADIUS: f32 = 0.08;

/// Two atoms either side of a central one at the given bond angle, opening
/// downward
fn bent(angle_degrees: f32, distance: f32) -> [Vec3; 2] {
    let half = angle_degrees.to_radians() / 2.0;
    [
        Vec3::new(distance * half.sin(), -distance * half.cos(), 0.0),
        Vec3::new(-distance * half.sin(), -distance * half.cos(), 0.0),
    ]
}

/// Bent H₂O with rising vapor droplets
pub fn water(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    b.atom(root, "O", Vec3::ZERO);
    for h in bent(104.5, 1.5) {
        b.atom(root, "H", h);
        b.bond(root, Vec3::ZERO, h, BOND_RADIUS, BOND_COLOR);
    }

    for i in 0..10 {
        let origin = Vec3::new(b.between(-1.5, 1.5), -1.5, b.between(-1.5, 1.5));
        let rise = b.between(0.015, 0.035);
        let droplet = b.spark(root, 0.06, 0x4fc3f7, 0.7, origin);
        b.effect(Effect::Drift {
            node: droplet.node,
            material: Some(droplet.material),
            origin,
            velocity: Vec3::new(0.0, rise, 0.0),
            gravity: 0.0,
            opacity: 0.7,
            life_frames: 150.0,
            delay_frames: i as f32 * 15.0,
            looping: true,
            growth: 0.0,
        });
    }
    None
}

/// C≡O with a toxic haze
pub fn carbon_monoxide(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let c = Vec3::new(-0.65, 0.0, 0.0);
    let o = Vec3::new(0.65, 0.0, 0.0);
    b.atom(root, "C", c);
    b.atom(root, "O", o);
    b.bond(root, c, o, 0.05, BOND_COLOR);
    b.double_bond(root, c, o, 0.05, BOND_COLOR);

    let haze = b.sphere(root, 1.9, Material::unlit(0x555555, 0.15), Vec3::ZERO);
    b.effect(Effect::Pulse {
        target: PulseTarget::Opacity(haze.material),
        base: 0.15,
        amplitude: 0.05,
        frequency: 0.002,
        phase: 0.0,
    });
    None
}

/// Linear O=C=O with exhaust streaming out of both ends
pub fn carbon_dioxide(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    b.atom(root, "C", Vec3::ZERO);
    for side in [-1.0, 1.0] {
        let o = Vec3::new(1.4 * side, 0.0, 0.0);
        b.atom(root, "O", o);
        b.double_bond(root, Vec3::ZERO, o, 0.05, BOND_COLOR);
    }

    for i in 0..16 {
        let side = if i % 2 == 0 { 1.0 } else { -1.0 };
        let spread = Vec3::new(0.0, b.between(-0.3, 0.3), b.between(-0.3, 0.3));
        let origin = Vec3::new(1.8 * side, 0.0, 0.0) + spread;
        let puff = b.spark(root, 0.07, 0x9e9e9e, 0.6, origin);
        b.effect(Effect::Radiate {
            node: puff.node,
            material: puff.material,
            origin,
            growth: 1.01,
            opacity: 0.6,
            fade: 0.98,
            period_ms: 2500.0,
            offset_ms: i as f32 * 160.0,
        });
    }
    None
}

/// Pyramidal NH₃ with its lone pair and particles spiralling in
pub fn ammonia(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let n = Vec3::new(0.0, 0.3, 0.0);
    b.atom(root, "N", n);
    for i in 0..3 {
        let angle = i as f32 * std::f32::consts::TAU / 3.0;
        let h = Vec3::new(angle.cos() * 1.2, -0.45, angle.sin() * 1.2);
        b.atom(root, "H", h);
        b.bond(root, n, h, BOND_RADIUS, BOND_COLOR);
    }

    let lone_pair = b.sphere(root, 0.35, Material::unlit(0xaaddff, 0.4), Vec3::new(0.0, 1.1, 0.0));
    b.effect(Effect::Pulse {
        target: PulseTarget::Opacity(lone_pair.material),
        base: 0.4,
        amplitude: 0.2,
        frequency: 0.003,
        phase: 0.0,
    });

    for i in 0..16 {
        let particle = b.spark(root, 0.04, 0xadff2f, 0.8, Vec3::ZERO);
        b.effect(Effect::Spiral {
            node: particle.node,
            radius: 2.5,
            phase: i as f32 * std::f32::consts::TAU / 16.0,
            height: if i % 2 == 0 { 1.2 } else { -1.2 },
            speed: 0.05,
            shrink: 0.99,
            period_frames: 180.0,
        });
    }
    None
}

/// Tetrahedral CH₄ in a pulsing glow, flames licking off the top
pub fn methane(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    b.atom(root, "C", Vec3::ZERO);
    let corners = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ];
    for corner in corners {
        let h = corner.normalize() * 1.3;
        b.atom(root, "H", h);
        b.bond(root, Vec3::ZERO, h, BOND_RADIUS, BOND_COLOR);
    }

    let glow = b.sphere(
        root,
        1.0,
        Material::standard(0x4488ff).glowing(0x4488ff, 0.5).translucent(0.2),
        Vec3::ZERO,
    );
    b.effect(Effect::Pulse {
        target: PulseTarget::Emissive(glow.material),
        base: 0.5,
        amplitude: 0.3,
        frequency: 0.004,
        phase: 0.0,
    });
    b.effect(Effect::Pulse {
        target: PulseTarget::Opacity(glow.material),
        base: 0.2,
        amplitude: 0.1,
        frequency: 0.004,
        phase: 0.0,
    });

    for i in 0..12 {
        let origin = Vec3::new(b.between(-0.4, 0.4), 1.4, b.between(-0.4, 0.4));
        let flame = b.spark(root, 0.08, 0x3399ff, 0.9, origin);
        b.effect(Effect::Drift {
            node: flame.node,
            material: Some(flame.material),
            origin,
            velocity: Vec3::new(0.0, 0.025, 0.0),
            gravity: 0.0,
            opacity: 0.9,
            life_frames: 80.0,
            delay_frames: i as f32 * 7.0,
            looping: true,
            growth: -0.008,
        });
    }
    None
}

/// Bent H₂S with wavy odor lines rising off it
pub fn hydrogen_sulfide(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    b.atom(root, "S", Vec3::ZERO);
    for h in bent(92.0, 1.4) {
        b.atom(root, "H", h);
        b.bond(root, Vec3::ZERO, h, BOND_RADIUS, BOND_COLOR);
    }

    for i in 0..8 {
        let x = -1.4 + i as f32 * 0.4;
        let origin = Vec3::new(x, 1.0, b.between(-0.3, 0.3));
        let tilt = Quat::from_rotation_z(if i % 2 == 0 { 0.3 } else { -0.3 });
        let line = b.mesh(
            root,
            Geometry::Cuboid { size: Vec3::new(0.04, 0.35, 0.04) },
            Material::unlit(0xdddd33, 0.7),
            Transform { rotation: tilt, ..Transform::at(origin) },
        );
        b.effect(Effect::Drift {
            node: line.node,
            material: Some(line.material),
            origin,
            velocity: Vec3::new(0.0, 0.02, 0.0),
            gravity: 0.0,
            opacity: 0.7,
            life_frames: 100.0,
            delay_frames: i as f32 * 12.0,
            looping: true,
            growth: 0.0,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_shape() {
        let mut b = MoleculeBuilder::new(1, 1);
        assert!(water(&mut b, AnimationCategory::Water).is_none());
        let molecule = b.finish(AnimationCategory::Water, None);
        let graph = molecule.graph();
        // O, 2 H, 2 bonds, 10 droplets
        assert_eq!(graph.child_count(graph.root()), 15);
    }

    #[test]
    fn test_bent_pair_is_symmetric() {
        let [a, b] = bent(104.5, 1.5);
        assert!((a.length() - 1.5).abs() < 1e-5);
        assert!((a.x + b.x).abs() < 1e-6);
        assert_eq!(a.y, b.y);
        let angle = a.angle_between(b).to_degrees();
        assert!((angle - 104.5).abs() < 1e-3);
    }

    #[test]
    fn test_methane_is_tetrahedral() {
        let mut b = MoleculeBuilder::new(1, 1);
        methane(&mut b, AnimationCategory::Methane);
        let graph = b.graph();
        let root = graph.node(graph.root());
        let hydrogens: Vec<Vec3> = root.children()[1..]
            .iter()
            .step_by(2)
            .take(4)
            .map(|&id| graph.node(id).transform.translation)
            .collect();
        for (i, a) in hydrogens.iter().enumerate() {
            assert!((a.length() - 1.3).abs() < 1e-5);
            for other in &hydrogens[i + 1..] {
                assert!((a.angle_between(*other).to_degrees() - 109.47).abs() < 0.1);
            }
        }
    }
}
