//! Scripted phase timelines for the staged builders

use std::f32::consts::PI;

use common::constants::frames_in;
use glam::{EulerRot, Quat, Vec3};

use super::builder::Part;
use super::graph::{MoleculeGraph, NodeId};
use super::oxidation::{Combustion, Tarnish};
use super::solids::{Lattice, Mixing};

/// Three stages split at two fixed points in seconds. The last stage runs its
/// progress over `tail` seconds and then holds at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    bounds: [f32; 2],
    tail: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub index: usize,
    pub progress: f32,
}

impl Timeline {
    pub const fn new(first: f32, second: f32, tail: f32) -> Self {
        Self {
            bounds: [first, second],
            tail,
        }
    }

    pub fn stage(&self, seconds: f32) -> Stage {
        let [first, second] = self.bounds;
        if seconds < first {
            Stage {
                index: 0,
                progress: (seconds / first).clamp(0.0, 1.0),
            }
        } else if seconds < second {
            Stage {
                index: 1,
                progress: (seconds - first) / (second - first),
            }
        } else {
            Stage {
                index: 2,
                progress: ((seconds - second) / self.tail).min(1.0),
            }
        }
    }

    pub fn first_end(&self) -> f32 {
        self.bounds[0]
    }

    pub fn second_end(&self) -> f32 {
        self.bounds[1]
    }
}

/// A node easing from `start` toward `target` by a fixed fraction per frame,
/// spinning as it goes
#[derive(Debug, Clone, PartialEq)]
pub struct Approach {
    pub node: NodeId,
    pub start: Vec3,
    pub target: Vec3,
    pub rate: f32,
    /// Radians per second around each axis
    pub spin: Vec3,
}

impl Approach {
    pub fn position(&self, frames: f32) -> Vec3 {
        self.target + (self.start - self.target) * (1.0 - self.rate).powf(frames)
    }

    pub fn place(&self, graph: &mut MoleculeGraph, frames: f32, seconds: f32) {
        let angles = self.spin * seconds;
        let transform = graph.transform_mut(self.node);
        transform.translation = self.position(frames);
        transform.rotation = Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
    }
}

/// A recycled glowing particle. `life` runs 0..1 at `rate` per frame, starting
/// from `offset`, and the opacity follows a half sine over it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ember {
    pub part: Part,
    pub origin: Vec3,
    pub velocity: Vec3,
    pub gravity: f32,
    pub rate: f32,
    pub offset: f32,
}

impl Ember {
    pub fn place(&self, graph: &mut MoleculeGraph, frames: f32, intensity: f32) {
        let life = (self.offset + frames * self.rate).fract();
        let age = life / self.rate;
        let mut position = self.origin + self.velocity * age;
        position.y -= 0.5 * self.gravity * age * age;

        let opacity = (life * PI).sin() * intensity;
        graph.set_visible(self.part.node, opacity > 0.0);
        graph.transform_mut(self.part.node).translation = position;
        if let Some(material) = graph.material_mut(self.part.material) {
            material.opacity = opacity.clamp(0.0, 1.0);
            material.emissive_intensity = opacity * 3.0;
        }
    }
}

/// Scale and visibility together so a zero scale never reaches the renderer
pub fn set_scale(graph: &mut MoleculeGraph, node: NodeId, scale: f32) {
    graph.set_visible(node, scale > 0.0);
    graph.transform_mut(node).scale = Vec3::splat(scale.max(0.0));
}

#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    /// Magnesium burning into magnesium oxide
    Combustion(Combustion),
    /// Copper heating and tarnishing into copper oxide
    Tarnish(Tarnish),
    /// Crystal lattice growing atom by atom
    Lattice(Lattice),
    /// Two metal clusters mixing into an alloy
    Mixing(Mixing),
}

impl Script {
    pub fn apply(&self, graph: &mut MoleculeGraph, elapsed_ms: f32) {
        match self {
            Script::Combustion(script) => script.apply(graph, elapsed_ms),
            Script::Tarnish(script) => script.apply(graph, elapsed_ms),
            Script::Lattice(script) => script.apply(graph, elapsed_ms),
            Script::Mixing(script) => script.apply(graph, elapsed_ms),
        }
    }

    /// Current stage of a staged timeline, if the script has one
    pub fn stage(&self, elapsed_ms: f32) -> Option<Stage> {
        let seconds = elapsed_ms / 1000.0;
        match self {
            Script::Combustion(_) => Some(Combustion::TIMELINE.stage(seconds)),
            Script::Tarnish(_) => Some(Tarnish::TIMELINE.stage(seconds)),
            Script::Lattice(_) | Script::Mixing(_) => None,
        }
    }
}

/// Frames elapsed, clamped to the end of a stage
pub fn frames_until(elapsed_ms: f32, end_seconds: f32) -> f32 {
    frames_in(elapsed_ms.min(end_seconds * 1000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_boundaries() {
        let timeline = Timeline::new(2.0, 6.0, 2.0);
        assert_eq!(timeline.stage(0.0).index, 0);
        assert_eq!(timeline.stage(1.99).index, 0);
        assert_eq!(timeline.stage(2.0).index, 1);
        assert_eq!(timeline.stage(5.99).index, 1);
        assert_eq!(timeline.stage(6.0).index, 2);
        assert!((timeline.stage(4.0).progress - 0.5).abs() < 1e-6);
        assert!((timeline.stage(7.0).progress - 0.5).abs() < 1e-6);
        assert_eq!(timeline.stage(60.0).progress, 1.0);
    }

    #[test]
    fn test_approach_converges() {
        let approach = Approach {
            node: MoleculeGraph::new(0).root(),
            start: Vec3::new(2.0, 0.0, 0.0),
            target: Vec3::ZERO,
            rate: 0.02,
            spin: Vec3::ZERO,
        };
        assert_eq!(approach.position(0.0), approach.start);
        let later = approach.position(120.0);
        assert!(later.x > 0.0 && later.x < 0.2);
    }

    #[test]
    fn test_frames_until_clamps() {
        assert_eq!(frames_until(10_000.0, 2.0), frames_in(2000.0));
        assert_eq!(frames_until(500.0, 2.0), frames_in(500.0));
    }
}
