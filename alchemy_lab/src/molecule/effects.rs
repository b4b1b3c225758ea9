//! Decorative per-node animation
//!
//! Every effect is a pure function of the molecule's elapsed time, so an update
//! can be replayed at any instant. Per-frame rates are authored against the
//! 60 fps reference frame and converted with `frames_in`.

use std::f32::consts::PI;

use common::constants::frames_in;
use glam::{EulerRot, Quat, Vec3};

use super::graph::{MaterialId, MoleculeGraph, NodeId};

/// Growth curves used by effects and scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicOut,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::CubicOut => 1.0 - (1.0 - p).powi(3),
            Easing::CubicInOut => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// What a `Pulse` modulates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseTarget {
    Opacity(MaterialId),
    Emissive(MaterialId),
    Light(NodeId),
    Scale(NodeId),
}

/// Deterministic noise in 0..1 for a frame index
pub fn noise(frame: u32, seed: u32) -> f32 {
    let mut x = frame.wrapping_mul(0x9e37_79b9) ^ seed.wrapping_mul(0x85eb_ca6b);
    x ^= x >> 15;
    x = x.wrapping_mul(0x2c1b_3c6d);
    x ^= x >> 12;
    x = x.wrapping_mul(0x297a_2d39);
    x ^= x >> 15;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Moves away from the center by a per-frame growth factor while fading,
    /// restarting every `period_ms`
    Radiate {
        node: NodeId,
        material: MaterialId,
        origin: Vec3,
        growth: f32,
        opacity: f32,
        fade: f32,
        period_ms: f32,
        offset_ms: f32,
    },
    /// Straight-line travel with optional gravity, fading out over its life
    Drift {
        node: NodeId,
        material: Option<MaterialId>,
        origin: Vec3,
        velocity: Vec3,
        gravity: f32,
        opacity: f32,
        life_frames: f32,
        delay_frames: f32,
        looping: bool,
        growth: f32,
    },
    /// Inward spiral around the Y axis, restarting once the radius collapses
    Spiral {
        node: NodeId,
        radius: f32,
        phase: f32,
        height: f32,
        speed: f32,
        shrink: f32,
        period_frames: f32,
    },
    Pulse {
        target: PulseTarget,
        base: f32,
        amplitude: f32,
        /// Radians per millisecond
        frequency: f32,
        phase: f32,
    },
    /// Continuous rotation, radians per millisecond around each axis
    Spin { node: NodeId, rate: Vec3 },
    /// Circular path in a plane tilted around X
    Orbit {
        node: NodeId,
        center: Vec3,
        radius: f32,
        frequency: f32,
        phase: f32,
        tilt: f32,
    },
    Grow {
        node: NodeId,
        delay_ms: f32,
        duration_ms: f32,
        from: f32,
        to: f32,
        easing: Easing,
    },
    ColorShift {
        material: MaterialId,
        from: [f32; 3],
        to: [f32; 3],
        delay_ms: f32,
        duration_ms: f32,
    },
    /// Opacity jumps to a fresh noise value every frame
    Flicker {
        material: MaterialId,
        min: f32,
        max: f32,
        seed: u32,
    },
    /// Short flash at the start of every period
    Blink {
        material: MaterialId,
        period_ms: f32,
        on_ms: f32,
        offset_ms: f32,
        peak: f32,
    },
}

impl Effect {
    pub fn apply(&self, graph: &mut MoleculeGraph, t: f32) {
        match *self {
            Effect::Radiate { node, material, origin, growth, opacity, fade, period_ms, offset_ms } => {
                let local = (t + offset_ms).rem_euclid(period_ms);
                let frames = frames_in(local);
                graph.transform_mut(node).translation = origin * growth.powf(frames);
                set_opacity(graph, material, opacity * fade.powf(frames));
            }
            Effect::Drift {
                node,
                material,
                origin,
                velocity,
                gravity,
                opacity,
                life_frames,
                delay_frames,
                looping,
                growth,
            } => {
                let mut local = frames_in(t) - delay_frames;
                if looping && local >= 0.0 {
                    local = local.rem_euclid(life_frames);
                }
                let alive = local >= 0.0 && local < life_frames;
                graph.set_visible(node, alive);
                if !alive {
                    return;
                }
                let mut position = origin + velocity * local;
                position.y += 0.5 * gravity * local * local;
                let transform = graph.transform_mut(node);
                transform.translation = position;
                transform.scale = Vec3::splat(1.0 + growth * local);
                if let Some(material) = material {
                    set_opacity(graph, material, opacity * (1.0 - local / life_frames));
                }
            }
            Effect::Spiral { node, radius, phase, height, speed, shrink, period_frames } => {
                let local = frames_in(t).rem_euclid(period_frames);
                let r = radius * shrink.powf(local);
                let angle = phase + speed * local;
                graph.transform_mut(node).translation =
                    Vec3::new(angle.cos() * r, height * (r / radius), angle.sin() * r);
            }
            Effect::Pulse { target, base, amplitude, frequency, phase } => {
                let value = base + (t * frequency + phase).sin() * amplitude;
                match target {
                    PulseTarget::Opacity(material) => set_opacity(graph, material, value),
                    PulseTarget::Emissive(material) => {
                        if let Some(m) = graph.material_mut(material) {
                            m.emissive_intensity = value.max(0.0);
                        }
                    }
                    PulseTarget::Light(node) => {
                        if let Some(light) = graph.node_mut(node).light.as_mut() {
                            light.intensity = value.max(0.0);
                        }
                    }
                    PulseTarget::Scale(node) => {
                        graph.transform_mut(node).scale = Vec3::splat(value.max(0.0));
                    }
                }
            }
            Effect::Spin { node, rate } => {
                let angles = rate * t;
                graph.transform_mut(node).rotation = Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
            }
            Effect::Orbit { node, center, radius, frequency, phase, tilt } => {
                let angle = t * frequency + phase;
                let flat = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
                graph.transform_mut(node).translation = center + Quat::from_rotation_x(tilt) * flat;
            }
            Effect::Grow { node, delay_ms, duration_ms, from, to, easing } => {
                let p = ((t - delay_ms) / duration_ms).clamp(0.0, 1.0);
                let s = from + (to - from) * easing.apply(p);
                graph.transform_mut(node).scale = Vec3::splat(s);
            }
            Effect::ColorShift { material, from, to, delay_ms, duration_ms } => {
                let p = ((t - delay_ms) / duration_ms).clamp(0.0, 1.0);
                if let Some(m) = graph.material_mut(material) {
                    m.color = common::lerp_rgb(from, to, p);
                }
            }
            Effect::Flicker { material, min, max, seed } => {
                let frame = frames_in(t) as u32;
                set_opacity(graph, material, min + (max - min) * noise(frame, seed));
            }
            Effect::Blink { material, period_ms, on_ms, offset_ms, peak } => {
                let local = (t + offset_ms).rem_euclid(period_ms);
                let value = if local < on_ms { (local / on_ms * PI).sin() * peak } else { 0.0 };
                set_opacity(graph, material, value);
            }
        }
    }
}

pub(crate) fn set_opacity(graph: &mut MoleculeGraph, material: MaterialId, opacity: f32) {
    if let Some(m) = graph.material_mut(material) {
        m.opacity = opacity.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::graph::{Geometry, Material, Transform};

    fn single() -> (MoleculeGraph, NodeId, MaterialId) {
        let mut graph = MoleculeGraph::new(1);
        let geometry = graph.add_geometry(Geometry::Sphere { radius: 0.1, segments: 8 });
        let material = graph.add_material(Material::unlit(0xffffff, 1.0));
        let node = graph.add_mesh(graph.root(), geometry, material, Transform::default());
        (graph, node, material)
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::CubicOut, Easing::CubicInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
            assert!((easing.apply(2.0) - 1.0).abs() < 1e-6);
        }
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::CubicOut.apply(0.5) > 0.5);
    }

    #[test]
    fn test_drift_hides_outside_its_life() {
        let (mut graph, node, material) = single();
        let drift = Effect::Drift {
            node,
            material: Some(material),
            origin: Vec3::ZERO,
            velocity: Vec3::Y * 0.1,
            gravity: 0.0,
            opacity: 1.0,
            life_frames: 60.0,
            delay_frames: 30.0,
            looping: false,
            growth: 0.0,
        };

        drift.apply(&mut graph, 0.0);
        assert!(!graph.node(node).visible);

        drift.apply(&mut graph, 1000.0);
        assert!(graph.node(node).visible);
        let y = graph.node(node).transform.translation.y;
        assert!((y - 3.0).abs() < 1e-3);
        assert!((graph.material(material).unwrap().opacity - 0.5).abs() < 1e-3);

        drift.apply(&mut graph, 2000.0);
        assert!(!graph.node(node).visible);
    }

    #[test]
    fn test_looping_drift_restarts() {
        let (mut graph, node, _) = single();
        let drift = Effect::Drift {
            node,
            material: None,
            origin: Vec3::ZERO,
            velocity: Vec3::X,
            gravity: 0.0,
            opacity: 1.0,
            life_frames: 60.0,
            delay_frames: 0.0,
            looping: true,
            growth: 0.0,
        };
        drift.apply(&mut graph, 1500.0);
        assert!(graph.node(node).visible);
        assert!((graph.node(node).transform.translation.x - 30.0).abs() < 1e-2);
    }

    #[test]
    fn test_radiate_moves_outward_and_fades() {
        let (mut graph, node, material) = single();
        let radiate = Effect::Radiate {
            node,
            material,
            origin: Vec3::X,
            growth: 1.01,
            opacity: 0.8,
            fade: 0.98,
            period_ms: 2000.0,
            offset_ms: 0.0,
        };
        radiate.apply(&mut graph, 500.0);
        let early = graph.node(node).transform.translation.x;
        let early_opacity = graph.material(material).unwrap().opacity;
        radiate.apply(&mut graph, 1500.0);
        assert!(graph.node(node).transform.translation.x > early);
        assert!(graph.material(material).unwrap().opacity < early_opacity);
    }

    #[test]
    fn test_flicker_stays_in_range_and_is_deterministic() {
        let (mut graph, _, material) = single();
        let flicker = Effect::Flicker { material, min: 0.2, max: 0.6, seed: 3 };
        for i in 0..120 {
            let t = i as f32 * 16.0;
            flicker.apply(&mut graph, t);
            let first = graph.material(material).unwrap().opacity;
            assert!((0.2..=0.6).contains(&first));
            flicker.apply(&mut graph, t);
            assert_eq!(graph.material(material).unwrap().opacity, first);
        }
    }

    #[test]
    fn test_blink_is_dark_between_flashes() {
        let (mut graph, _, material) = single();
        let blink = Effect::Blink { material, period_ms: 3000.0, on_ms: 500.0, offset_ms: 0.0, peak: 0.8 };
        blink.apply(&mut graph, 250.0);
        assert!((graph.material(material).unwrap().opacity - 0.8).abs() < 1e-4);
        blink.apply(&mut graph, 1000.0);
        assert_eq!(graph.material(material).unwrap().opacity, 0.0);
    }
}
