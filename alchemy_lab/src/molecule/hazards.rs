//! Warning scenes: toxic cyanide, radioactive uranium dioxide and the
//! impossible pairing

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::{Quat, Vec2, Vec3};

use super::builder::MoleculeBuilder;
use super::effects::{Effect, PulseTarget};
use super::graph::{Geometry, Material, NodeId, Transform};
use super::script::Script;
use crate::category::AnimationCategory;

/// Dots along a straight stroke, endpoints included
fn stroke(from: Vec2, to: Vec2, dots: usize) -> impl Iterator<Item = Vec2> {
    (0..dots).map(move |i| from.lerp(to, i as f32 / (dots - 1).max(1) as f32))
}

/// Dots around a circle
fn circle(center: Vec2, radius: f32, dots: usize) -> impl Iterator<Item = Vec2> {
    (0..dots).map(move |i| {
        let angle = i as f32 / dots as f32 * TAU;
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    })
}

/// Flat glyph made of glowing dots in its own group
fn glyph(b: &mut MoleculeBuilder, position: Vec3, color: u32, dots: impl IntoIterator<Item = Vec2>) -> NodeId {
    let group = b.group(b.root(), position);
    for dot in dots {
        b.spark(group, 0.05, color, 0.9, dot.extend(0.0));
    }
    group
}

/// C≡N with orbiting warning lights, a skull and a creeping gas cloud
pub fn dangerous(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let c = Vec3::new(-0.6, 0.0, 0.0);
    let n = Vec3::new(0.6, 0.0, 0.0);
    for (symbol, position) in [("C", c), ("N", n)] {
        let atom = b.atom(root, symbol, position);
        if let Some(m) = b.graph_mut().material_mut(atom.material) {
            *m = m.glowing(0xff0000, 0.2);
        }
        b.effect(Effect::Pulse {
            target: PulseTarget::Emissive(atom.material),
            base: 0.3,
            amplitude: 0.2,
            frequency: 0.005,
            phase: 0.0,
        });
    }
    b.bond(root, c, n, 0.05, 0x9333ea);
    b.double_bond(root, c, n, 0.05, 0x9333ea);

    for i in 0..8 {
        let warning = b.spark(root, 0.08, 0xff2222, 0.8, Vec3::ZERO);
        b.effect(Effect::Orbit {
            node: warning.node,
            center: Vec3::ZERO,
            radius: 2.2,
            frequency: 0.0015,
            phase: i as f32 / 8.0 * TAU,
            tilt: (i % 3) as f32 * 0.4 - 0.4,
        });
        b.effect(Effect::Pulse {
            target: PulseTarget::Opacity(warning.material),
            base: 0.6,
            amplitude: 0.3,
            frequency: 0.006,
            phase: i as f32,
        });
    }

    let skull_dots = circle(Vec2::new(0.0, 0.1), 0.45, 16)
        .chain(circle(Vec2::new(-0.17, 0.12), 0.08, 5))
        .chain(circle(Vec2::new(0.17, 0.12), 0.08, 5))
        .chain(stroke(Vec2::new(-0.6, -0.5), Vec2::new(0.6, -0.9), 7))
        .chain(stroke(Vec2::new(-0.6, -0.9), Vec2::new(0.6, -0.5), 7));
    let skull = glyph(b, Vec3::new(0.0, 2.3, 0.0), 0xf5f5f5, skull_dots);
    b.effect(Effect::Pulse {
        target: PulseTarget::Scale(skull),
        base: 1.0,
        amplitude: 0.06,
        frequency: 0.004,
        phase: 0.0,
    });

    for i in 0..14 {
        let origin = Vec3::new(b.between(-1.5, 1.5), -1.2, b.between(-1.0, 1.0));
        let puff = b.sphere(root, 0.25, Material::unlit(0x7e22ce, 0.35), origin);
        b.effect(Effect::Drift {
            node: puff.node,
            material: Some(puff.material),
            origin,
            velocity: Vec3::new(0.0, 0.012, 0.0),
            gravity: 0.0005,
            opacity: 0.35,
            life_frames: 160.0,
            delay_frames: i as f32 * 11.0,
            looping: true,
            growth: 0.01,
        });
    }

    let light = b.light(root, 0xff0000, 1.0, 8.0, Vec3::new(0.0, 1.0, 1.5));
    b.effect(Effect::Pulse {
        target: PulseTarget::Light(light),
        base: 1.0,
        amplitude: 0.8,
        frequency: 0.006,
        phase: 0.0,
    });
    None
}

#[derive(Debug, Clone, Copy)]
struct Emission {
    radius: f32,
    color: u32,
    speed: f32,
    range: f32,
    count: usize,
}

const ALPHA: Emission = Emission { radius: 0.12, color: 0xff4444, speed: 0.03, range: 3.0, count: 4 };
const BETA: Emission = Emission { radius: 0.05, color: 0x44aaff, speed: 0.06, range: 4.0, count: 6 };
const GAMMA: Emission = Emission { radius: 0.015, color: 0x7fff00, speed: 0.12, range: 5.0, count: 6 };

/// UO₂ shedding alpha, beta and gamma radiation under a hazard sign
pub fn radioactive(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let uranium = b.atom(root, "U", Vec3::ZERO);
    if let Some(m) = b.graph_mut().material_mut(uranium.material) {
        *m = m.glowing(0x00ff00, 0.3);
    }
    b.effect(Effect::Pulse {
        target: PulseTarget::Emissive(uranium.material),
        base: 0.4,
        amplitude: 0.3,
        frequency: 0.003,
        phase: 0.0,
    });
    for i in 0..2 {
        let oxygen = b.atom(root, "O", Vec3::ZERO);
        b.effect(Effect::Orbit {
            node: oxygen.node,
            center: Vec3::ZERO,
            radius: 1.8,
            frequency: 0.001,
            phase: i as f32 * PI,
            tilt: 0.3,
        });
    }

    for kind in [ALPHA, BETA, GAMMA] {
        let life_frames = kind.range / kind.speed;
        for i in 0..kind.count {
            let direction = b.direction();
            let part = if kind.radius < 0.02 {
                let transform = Transform {
                    rotation: Quat::from_rotation_arc(Vec3::Y, direction),
                    ..Transform::default()
                };
                b.mesh(
                    root,
                    Geometry::Cylinder { radius: kind.radius, height: 0.4, segments: 6 },
                    Material::unlit(kind.color, 1.0),
                    transform,
                )
            } else {
                b.spark(root, kind.radius, kind.color, 1.0, Vec3::ZERO)
            };
            b.effect(Effect::Drift {
                node: part.node,
                material: Some(part.material),
                origin: Vec3::ZERO,
                velocity: direction * kind.speed,
                gravity: 0.0,
                opacity: 1.0,
                life_frames,
                delay_frames: i as f32 * life_frames / kind.count as f32,
                looping: true,
                growth: 0.0,
            });
        }
    }

    let sign = b.group(root, Vec3::new(0.0, 2.5, -0.5));
    b.sphere(sign, 0.09, Material::unlit(0xffd700, 1.0), Vec3::ZERO);
    for k in 0..3 {
        let angle = FRAC_PI_2 + k as f32 * TAU / 3.0;
        b.mesh(
            sign,
            Geometry::Cuboid { size: Vec3::new(0.26, 0.32, 0.02) },
            Material::unlit(0xffd700, 1.0),
            Transform {
                rotation: Quat::from_rotation_z(angle - FRAC_PI_2),
                ..Transform::at(Vec3::new(angle.cos(), angle.sin(), 0.0) * 0.3)
            },
        );
    }
    b.effect(Effect::Spin {
        node: sign,
        rate: Vec3::new(0.0, 0.0, 0.0005),
    });

    for i in 0..6 {
        let position = b.direction() * 2.6;
        let offset = b.between(0.0, 900.0);
        let click = b.spark(root, 0.06, 0x7fff00, 0.0, position);
        b.effect(Effect::Blink {
            material: click.material,
            period_ms: 700.0 + i as f32 * 90.0,
            on_ms: 80.0,
            offset_ms: offset,
            peak: 1.0,
        });
    }

    let light = b.light(root, 0x00ff00, 1.0, 10.0, Vec3::ZERO);
    b.effect(Effect::Pulse {
        target: PulseTarget::Light(light),
        base: 1.0,
        amplitude: 0.5,
        frequency: 0.004,
        phase: 0.0,
    });
    None
}

/// Two inert atoms that refuse to bond: full shells, a barrier, red crosses
pub fn impossible(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    for (symbol, x) in [("He", -1.6f32), ("Ne", 1.6f32)] {
        let center = Vec3::new(x, 0.0, 0.0);
        let atom = b.atom_scaled(root, symbol, center, 1.2);
        if let Some(m) = b.graph_mut().material_mut(atom.material) {
            *m = m.glowing(0x6666ff, 0.2);
        }
        for (shell, tilt) in [(0.9, 0.0f32), (1.15, FRAC_PI_4)] {
            let ring = b.mesh(
                root,
                Geometry::Ring { inner: shell, outer: shell + 0.04, segments: 48 },
                Material::unlit(0x88aaff, 0.6),
                Transform {
                    rotation: Quat::from_rotation_x(tilt),
                    ..Transform::at(center)
                },
            );
            b.effect(Effect::Spin {
                node: ring.node,
                rate: Vec3::new(0.001 + tilt * 0.001, 0.0015, 0.0),
            });
        }

        let outward = x.signum();
        for i in 0..6 {
            let spread = Vec3::new(0.0, b.between(-0.6, 0.6), b.between(-0.6, 0.6));
            let origin = center + Vec3::new(outward * 0.9, 0.0, 0.0) + spread;
            let particle = b.spark(root, 0.05, 0xff8800, 0.8, origin);
            b.effect(Effect::Radiate {
                node: particle.node,
                material: particle.material,
                origin,
                growth: 1.008,
                opacity: 0.8,
                fade: 0.975,
                period_ms: 2000.0,
                offset_ms: i as f32 * 330.0,
            });
        }
    }

    for angle in [FRAC_PI_4, -FRAC_PI_4] {
        let bar = b.mesh(
            root,
            Geometry::Cuboid { size: Vec3::new(1.0, 0.12, 0.12) },
            Material::unlit(0xff2222, 0.9),
            Transform {
                rotation: Quat::from_rotation_z(angle),
                ..Transform::default()
            },
        );
        b.effect(Effect::Pulse {
            target: PulseTarget::Opacity(bar.material),
            base: 0.7,
            amplitude: 0.3,
            frequency: 0.005,
            phase: 0.0,
        });
    }

    let barrier = b.mesh(
        root,
        Geometry::Plane { width: 2.5, height: 2.5 },
        Material::unlit(0xff3333, 0.1),
        Transform {
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            ..Transform::default()
        },
    );
    b.effect(Effect::Flicker {
        material: barrier.material,
        min: 0.05,
        max: 0.2,
        seed: 7,
    });

    let no = stroke(Vec2::new(-0.8, -0.3), Vec2::new(-0.8, 0.3), 5)
        .chain(stroke(Vec2::new(-0.8, 0.3), Vec2::new(-0.3, -0.3), 5))
        .chain(stroke(Vec2::new(-0.3, -0.3), Vec2::new(-0.3, 0.3), 5))
        .chain(circle(Vec2::new(0.4, 0.0), 0.3, 12));
    let sign = glyph(b, Vec3::new(0.0, 2.2, 0.0), 0xff4444, no);
    b.effect(Effect::Pulse {
        target: PulseTarget::Scale(sign),
        base: 1.0,
        amplitude: 0.08,
        frequency: 0.003,
        phase: 0.0,
    });
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::graph::GeometryId;

    #[test]
    fn test_stroke_hits_both_ends() {
        let dots: Vec<Vec2> = stroke(Vec2::ZERO, Vec2::new(1.0, 0.0), 5).collect();
        assert_eq!(dots.len(), 5);
        assert_eq!(dots[0], Vec2::ZERO);
        assert_eq!(dots[4], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_circle_dots_sit_on_radius() {
        for dot in circle(Vec2::new(1.0, 1.0), 0.5, 12) {
            assert!(((dot - Vec2::new(1.0, 1.0)).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_radiation_kinds_fade_over_their_range() {
        for kind in [ALPHA, BETA, GAMMA] {
            let life = kind.range / kind.speed;
            assert!(life > 30.0 && life < 120.0);
        }
    }

    #[test]
    fn test_impossible_has_barrier_and_no_bonds() {
        let mut b = MoleculeBuilder::new(1, 2);
        impossible(&mut b, AnimationCategory::Impossible);
        let graph = b.graph();
        let mut planes = 0;
        let mut cylinders = 0;
        for index in 0..graph.geometry_count() {
            let id = GeometryId { generation: 1, index: index as u32 };
            match graph.geometry(id) {
                Some(Geometry::Plane { .. }) => planes += 1,
                Some(Geometry::Cylinder { .. }) => cylinders += 1,
                _ => {}
            }
        }
        assert_eq!(planes, 1);
        assert_eq!(cylinders, 0);
    }
}
