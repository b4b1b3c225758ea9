//! Metal oxides: the generic metal + oxygen pair, burning magnesium, tarnishing
//! copper and rusting iron

use common::constants::frames_in;
use glam::{EulerRot, Quat, Vec3};

use super::builder::{MoleculeBuilder, Part};
use super::effects::{Easing, Effect, PulseTarget};
use super::graph::{Geometry, Material, MoleculeGraph, NodeId, Transform};
use super::script::{frames_until, set_scale, Approach, Ember, Script, Timeline};
use crate::category::AnimationCategory;
use crate::elements::ElementTable;

/// Metal and oxygen with oxidation particles radiating away
pub fn basic_oxide(b: &mut MoleculeBuilder, category: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let metal = category.oxide_metal().unwrap_or("Al");
    let m = Vec3::new(-0.8, 0.0, 0.0);
    let o = Vec3::new(0.8, 0.0, 0.0);
    b.atom(root, metal, m);
    b.atom(root, "O", o);
    b.bond(root, m, o, 0.1, 0xcccccc);

    let tint = ElementTable::standard().get(metal).map_or(0xffaa33, |e| e.color);
    for i in 0..16 {
        let origin = b.direction() * 1.0;
        let particle = b.spark(root, 0.05, tint, 0.8, origin);
        b.effect(Effect::Radiate {
            node: particle.node,
            material: particle.material,
            origin,
            growth: 1.01,
            opacity: 0.8,
            fade: 0.985,
            period_ms: 2500.0,
            offset_ms: i as f32 * 150.0,
        });
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct Combustion {
    metals: Vec<Approach>,
    oxygen: Vec<Approach>,
    flames: Vec<Ember>,
    light: NodeId,
    products: Vec<NodeId>,
}

impl Combustion {
    /// Converge until 2 s, burn until 6 s, then form the product
    pub const TIMELINE: Timeline = Timeline::new(2.0, 6.0, 2.0);
    const PRODUCT_RADIUS: f32 = 1.5;

    pub fn apply(&self, graph: &mut MoleculeGraph, t: f32) {
        let seconds = t / 1000.0;
        let stage = Self::TIMELINE.stage(seconds);
        let frames = frames_until(t, Self::TIMELINE.first_end());
        let spin_time = seconds.min(Self::TIMELINE.first_end());

        let reactant_scale = match stage.index {
            0 => 1.0,
            1 => 1.0 - stage.progress,
            _ => 0.0,
        };
        for approach in self.metals.iter().chain(&self.oxygen) {
            approach.place(graph, frames, spin_time);
            set_scale(graph, approach.node, reactant_scale);
        }

        let glow = match stage.index {
            0 => 0.0,
            1 => stage.progress,
            _ => 1.0 - stage.progress,
        };
        if let Some(light) = graph.node_mut(self.light).light.as_mut() {
            light.intensity = glow * 5.0;
        }
        let burn_frames = frames_in(t - Self::TIMELINE.first_end() * 1000.0);
        for flame in &self.flames {
            flame.place(graph, burn_frames, glow);
        }

        let count = self.products.len().max(1) as f32;
        for (i, &product) in self.products.iter().enumerate() {
            if stage.index < 2 {
                set_scale(graph, product, 0.0);
                continue;
            }
            let growth = ((stage.progress - i as f32 * 0.2) * 2.0).clamp(0.0, 1.0);
            set_scale(graph, product, Easing::CubicOut.apply(growth));
            let angle = i as f32 / count * std::f32::consts::TAU;
            let transform = graph.transform_mut(product);
            transform.translation = Vec3::new(
                angle.cos() * Self::PRODUCT_RADIUS,
                (seconds * 0.5 + i as f32).sin() * 0.1,
                angle.sin() * Self::PRODUCT_RADIUS,
            );
            transform.rotation = Quat::from_rotation_y(seconds * 0.5 + i as f32);
        }
    }
}

/// O₂ pair centered on its group
fn oxygen_molecule(b: &mut MoleculeBuilder, parent: NodeId, position: Vec3) -> NodeId {
    let group = b.group(parent, position);
    for x in [-0.3, 0.3] {
        b.atom(group, "O", Vec3::new(x, 0.0, 0.0));
    }
    group
}

/// Metal + O product pair in a single flat color
fn product_pair(b: &mut MoleculeBuilder, parent: NodeId, metal: &str, colors: [u32; 2], offset: f32) -> NodeId {
    let group = b.group(parent, Vec3::ZERO);
    let table = ElementTable::standard();
    let metal_radius = table.get(metal).map_or(0.8, |e| e.radius);
    let oxygen_radius = table.get("O").map_or(0.6, |e| e.radius);
    b.sphere(group, metal_radius * 0.9, Material::standard(colors[0]).metal(0.1, 0.9), Vec3::ZERO);
    b.sphere(
        group,
        oxygen_radius * 0.9,
        Material::standard(colors[1]).metal(0.1, 0.9),
        Vec3::new(offset, 0.0, 0.0),
    );
    set_scale(b.graph_mut(), group, 0.0);
    group
}

/// Magnesium ribbon burning with a blinding white flame
pub fn magnesium_oxide(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();

    let mut metals = Vec::new();
    for i in 0..4 {
        let start = b.scatter(2.0);
        let atom = b.atom(root, "Mg", start);
        if let Some(m) = b.graph_mut().material_mut(atom.material) {
            *m = m.metal(0.8, 0.2);
        }
        metals.push(Approach {
            node: atom.node,
            start,
            target: Vec3::ZERO,
            rate: 0.02,
            spin: Vec3::new(0.0, 2.0, 0.0) + Vec3::Y * i as f32 * 0.1,
        });
    }

    let mut oxygen = Vec::new();
    for _ in 0..2 {
        let start = b.scatter(3.0);
        let node = oxygen_molecule(b, root, start);
        oxygen.push(Approach {
            node,
            start,
            target: Vec3::ZERO,
            rate: 0.015,
            spin: Vec3::new(0.0, 0.0, 3.0),
        });
    }

    let mut flames = Vec::new();
    for _ in 0..50 {
        let material = Material::standard(0xf0f4ff).glowing(0xf0f4ff, 0.0).translucent(0.0);
        let part = b.sphere(root, 0.05, material, Vec3::ZERO);
        let velocity = Vec3::new(b.between(-0.1, 0.1), b.between(0.0, 0.3), b.between(-0.1, 0.1));
        let offset = b.between(0.0, 1.0);
        flames.push(Ember {
            part,
            origin: Vec3::ZERO,
            velocity,
            gravity: 0.005,
            rate: 0.02,
            offset,
        });
    }

    let products = (0..4)
        .map(|_| product_pair(b, root, "Mg", [0xf0f0f0, 0xf0f0f0], 1.2))
        .collect();
    let light = b.light(root, 0xffffff, 0.0, 10.0, Vec3::ZERO);

    Some(Script::Combustion(Combustion {
        metals,
        oxygen,
        flames,
        light,
        products,
    }))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tarnish {
    copper: Vec<(Approach, Part)>,
    oxygen: Vec<Approach>,
    heat: Vec<Ember>,
    shells: Vec<Part>,
    products: Vec<NodeId>,
    bright: [f32; 3],
}

impl Tarnish {
    /// Heat until 3 s, oxidize until 7 s, then form the product
    pub const TIMELINE: Timeline = Timeline::new(3.0, 7.0, 2.0);
    const OXIDIZED: u32 = 0x1a1a1a;

    pub fn apply(&self, graph: &mut MoleculeGraph, t: f32) {
        let seconds = t / 1000.0;
        let stage = Self::TIMELINE.stage(seconds);
        let frames = frames_until(t, Self::TIMELINE.first_end());
        let spin_time = seconds.min(Self::TIMELINE.first_end());
        let oxidation = match stage.index {
            0 => 0.0,
            1 => stage.progress,
            _ => 1.0,
        };

        let dark = common::hex_rgb(Self::OXIDIZED);
        for (approach, part) in &self.copper {
            approach.place(graph, frames, spin_time);
            if stage.index == 2 {
                graph.set_visible(approach.node, false);
                continue;
            }
            set_scale(graph, approach.node, 1.0 - oxidation * 0.3);
            if let Some(m) = graph.material_mut(part.material) {
                m.color = common::lerp_rgb(self.bright, dark, oxidation);
                m.metalness = 0.9 + (0.2 - 0.9) * oxidation;
                m.roughness = 0.1 + (0.8 - 0.1) * oxidation;
            }
        }
        for approach in &self.oxygen {
            approach.place(graph, frames, spin_time);
            set_scale(graph, approach.node, 1.0 - oxidation);
        }

        for (i, (shell, (approach, _))) in self.shells.iter().zip(&self.copper).enumerate() {
            let coverage = ((oxidation - i as f32 * 0.2) * 2.0).clamp(0.0, 1.0);
            let opacity = match stage.index {
                2 => 0.5 * (1.0 - stage.progress),
                _ => coverage * 0.5,
            };
            graph.transform_mut(shell.node).translation = approach.position(frames);
            set_scale(graph, shell.node, if opacity > 0.0 { 1.0 + coverage * 0.2 } else { 0.0 });
            if let Some(m) = graph.material_mut(shell.material) {
                m.opacity = opacity;
            }
        }

        let heat = match stage.index {
            0 => stage.progress * 0.7,
            1 => (1.0 - stage.progress) * 0.7,
            _ => 0.0,
        };
        for ember in &self.heat {
            ember.place(graph, frames_in(t), heat);
        }

        let count = self.products.len().max(1) as f32;
        for (i, &product) in self.products.iter().enumerate() {
            if stage.index < 2 {
                set_scale(graph, product, 0.0);
                continue;
            }
            let growth = ((stage.progress - i as f32 * 0.3) * 1.5).clamp(0.0, 1.0);
            set_scale(graph, product, Easing::CubicInOut.apply(growth));
            let angle = i as f32 / count * std::f32::consts::TAU;
            let radius = 1.2 + (seconds * 0.5).sin() * 0.2;
            let transform = graph.transform_mut(product);
            transform.translation = Vec3::new(
                angle.cos() * radius,
                (seconds * 0.3 + i as f32).sin() * 0.15,
                angle.sin() * radius,
            );
            transform.rotation = Quat::from_euler(
                EulerRot::YXZ,
                seconds * 0.4 + i as f32,
                (seconds * 0.2 + i as f32).sin() * 0.1,
                0.0,
            );
        }
    }
}

/// Copper heated in air, darkening into black copper oxide
pub fn copper_oxide(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let copper_color = ElementTable::standard().get("Cu").map_or(0xc88033, |e| e.color);
    let copper_radius = ElementTable::standard().get("Cu").map_or(0.75, |e| e.radius);

    let mut copper = Vec::new();
    for i in 0..4 {
        let start = b.scatter(3.0);
        let quarter = i as f32 * std::f32::consts::FRAC_PI_2;
        let part = b.sphere(root, copper_radius, Material::standard(copper_color).metal(0.9, 0.1), start);
        copper.push((
            Approach {
                node: part.node,
                start,
                target: Vec3::new(quarter.cos() * 0.5, quarter.sin() * 0.5, 0.0),
                rate: 0.02,
                spin: Vec3::new(0.0, 1.5, 0.0),
            },
            part,
        ));
    }

    let mut oxygen = Vec::new();
    for _ in 0..2 {
        let start = b.scatter(4.0);
        let node = oxygen_molecule(b, root, start);
        oxygen.push(Approach {
            node,
            start,
            target: Vec3::ZERO,
            rate: 0.015,
            spin: Vec3::new(1.5, 0.0, 0.0),
        });
    }

    let mut heat = Vec::new();
    for _ in 0..30 {
        let origin = Vec3::new(b.between(-1.0, 1.0), -2.0, b.between(-1.0, 1.0));
        let part = b.sphere(
            root,
            0.03,
            Material::standard(0xff6600).glowing(0xff3300, 0.5).translucent(0.0),
            origin,
        );
        let velocity = Vec3::new(b.between(-0.025, 0.025), b.between(0.02, 0.08), b.between(-0.025, 0.025));
        let offset = b.between(0.0, 1.0);
        heat.push(Ember {
            part,
            origin,
            velocity,
            gravity: 0.0,
            rate: 0.015,
            offset,
        });
    }

    let shells = copper
        .iter()
        .map(|(approach, _)| {
            let material = Material::standard(Tarnish::OXIDIZED).metal(0.1, 0.9).translucent(0.0);
            b.sphere(root, copper_radius * 1.1, material, approach.start)
        })
        .collect();
    let products = (0..4)
        .map(|_| product_pair(b, root, "Cu", [0x1a1a1a, 0x333333], 1.0))
        .collect();

    Some(Script::Tarnish(Tarnish {
        copper,
        oxygen,
        heat,
        shells,
        products,
        bright: common::hex_rgb(copper_color),
    }))
}

/// Fe₂O₃: iron rusting over, with corrosion halos and flakes dropping away
pub fn iron_oxide(b: &mut MoleculeBuilder, _: AnimationCategory) -> Option<Script> {
    let root = b.root();
    let irons = [Vec3::new(-0.9, 0.0, 0.0), Vec3::new(0.9, 0.0, 0.0)];
    let oxygens = [
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, -0.6, 0.9),
        Vec3::new(0.0, -0.6, -0.9),
    ];
    let iron_color = ElementTable::standard().get("Fe").map_or(0xe06633, |e| e.color);

    for (i, &fe) in irons.iter().enumerate() {
        let atom = b.atom(root, "Fe", fe);
        b.effect(Effect::ColorShift {
            material: atom.material,
            from: common::hex_rgb(iron_color),
            to: common::hex_rgb(0x8b4513),
            delay_ms: 500.0 + i as f32 * 300.0,
            duration_ms: 4000.0,
        });

        let halo = b.mesh(
            root,
            Geometry::Ring { inner: 0.9, outer: 1.0, segments: 32 },
            Material::unlit(0xb7410e, 0.3),
            Transform::at(fe),
        );
        b.effect(Effect::Pulse {
            target: PulseTarget::Opacity(halo.material),
            base: 0.3,
            amplitude: 0.15,
            frequency: 0.003,
            phase: i as f32 * std::f32::consts::PI,
        });
        b.effect(Effect::Spin {
            node: halo.node,
            rate: Vec3::new(0.0008, 0.0012, 0.0),
        });
    }
    for &o in &oxygens {
        b.atom(root, "O", o);
        for &fe in &irons {
            b.bond(root, fe, o, 0.07, 0xaa7755);
        }
    }

    for i in 0..12 {
        let origin = Vec3::new(b.between(-1.2, 1.2), b.between(-0.3, 0.3), b.between(-0.6, 0.6));
        let drift = Vec3::new(b.between(-0.005, 0.005), 0.0, b.between(-0.005, 0.005));
        let flake = b.mesh(
            root,
            Geometry::Cuboid { size: Vec3::splat(0.06) },
            Material::standard(0x8b4513).metal(0.0, 1.0),
            Transform::at(origin),
        );
        b.effect(Effect::Drift {
            node: flake.node,
            material: Some(flake.material),
            origin,
            velocity: drift,
            gravity: -0.0008,
            opacity: 1.0,
            life_frames: 120.0,
            delay_frames: 60.0 + i as f32 * 10.0,
            looping: true,
            growth: 0.0,
        });
    }

    let cloud = b.sphere(root, 2.2, Material::unlit(0xa0522d, 0.1), Vec3::ZERO);
    b.effect(Effect::Pulse {
        target: PulseTarget::Opacity(cloud.material),
        base: 0.1,
        amplitude: 0.05,
        frequency: 0.0015,
        phase: 0.0,
    });
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(f: fn(&mut MoleculeBuilder, AnimationCategory) -> Option<Script>) -> (MoleculeGraph, Script) {
        let mut b = MoleculeBuilder::new(3, 9);
        let script = f(&mut b, AnimationCategory::MagnesiumOxide).unwrap();
        (b.graph().clone(), script)
    }

    fn visible_products(graph: &MoleculeGraph, products: &[NodeId]) -> usize {
        products.iter().filter(|&&p| graph.node(p).visible).count()
    }

    #[test]
    fn test_magnesium_phases() {
        let (mut graph, script) = built(magnesium_oxide);
        let Script::Combustion(burn) = &script else {
            panic!("expected a combustion script");
        };

        burn.apply(&mut graph, 1000.0);
        assert_eq!(script.stage(1000.0).unwrap().index, 0);
        assert_eq!(graph.node(burn.light).light.unwrap().intensity, 0.0);
        assert_eq!(visible_products(&graph, &burn.products), 0);

        burn.apply(&mut graph, 4000.0);
        assert_eq!(script.stage(4000.0).unwrap().index, 1);
        assert!((graph.node(burn.light).light.unwrap().intensity - 2.5).abs() < 1e-4);
        let metal = &burn.metals[0];
        assert!((graph.node(metal.node).transform.scale.x - 0.5).abs() < 1e-4);

        burn.apply(&mut graph, 9000.0);
        assert_eq!(script.stage(9000.0).unwrap().index, 2);
        assert_eq!(visible_products(&graph, &burn.products), 4);
        assert!(!graph.node(metal.node).visible);
        let p = graph.node(burn.products[0]).transform;
        assert!((p.scale.x - 1.0).abs() < 1e-5);
        assert!((p.translation.x - Combustion::PRODUCT_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn test_copper_darkens_while_oxidizing() {
        let (mut graph, script) = built(copper_oxide);
        let Script::Tarnish(tarnish) = &script else {
            panic!("expected a tarnish script");
        };
        let copper = tarnish.copper[0].1;

        tarnish.apply(&mut graph, 2000.0);
        let bright = graph.material(copper.material).unwrap().color;
        assert_eq!(bright, tarnish.bright);

        tarnish.apply(&mut graph, 5000.0);
        let half = graph.material(copper.material).unwrap();
        assert!(half.color[0] < bright[0]);
        assert!((half.metalness - 0.55).abs() < 1e-4);

        tarnish.apply(&mut graph, 7500.0);
        assert!(!graph.node(copper.node).visible);
        assert_eq!(script.stage(7500.0).unwrap().index, 2);

        tarnish.apply(&mut graph, 12_000.0);
        assert_eq!(visible_products(&graph, &tarnish.products), 4);
    }

    #[test]
    fn test_basic_oxide_uses_category_metal() {
        let mut b = MoleculeBuilder::new(1, 1);
        basic_oxide(&mut b, AnimationCategory::ZincOxide);
        let graph = b.graph();
        let first = graph.node(graph.root()).children()[0];
        let (_, material) = graph.node(first).mesh.unwrap();
        let zinc = ElementTable::standard().get("Zn").unwrap();
        assert_eq!(graph.material(material).unwrap().color, zinc.rgb());
    }
}
