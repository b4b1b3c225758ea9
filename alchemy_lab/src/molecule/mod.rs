//! 3D molecule animations
//!
//! One builder per animation category fills a `MoleculeGraph` and returns the
//! molecule's decorative effects plus an optional scripted timeline. The scene
//! drives every molecule through `Molecule::update` with the time since it was
//! inserted; nothing here schedules its own frames.

mod builder;
mod effects;
mod gases;
mod graph;
mod hazards;
mod library;
mod oxidation;
mod script;
mod solids;

pub use builder::{bond_transform, MoleculeBuilder, Part};
pub use effects::{Easing, Effect, PulseTarget};
pub use graph::{
    DisposeReport, DrawItem, Geometry, GeometryId, Material, MaterialId, MoleculeGraph, Node, NodeId, PlacedLight,
    PointLight, ResourceReleaser, Shading, Transform,
};
pub use library::{BuildFn, MoleculeLibrary};
pub use script::{Script, Stage, Timeline};

use crate::category::AnimationCategory;

/// A built molecule and the plan that animates it
#[derive(Debug, Clone)]
pub struct Molecule {
    category: AnimationCategory,
    graph: MoleculeGraph,
    effects: Vec<Effect>,
    script: Option<Script>,
}

impl Molecule {
    pub fn new(
        category: AnimationCategory,
        graph: MoleculeGraph,
        effects: Vec<Effect>,
        script: Option<Script>,
    ) -> Self {
        Self {
            category,
            graph,
            effects,
            script,
        }
    }

    pub fn category(&self) -> AnimationCategory {
        self.category
    }

    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut MoleculeGraph {
        &mut self.graph
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    pub fn has_script(&self) -> bool {
        self.script.is_some()
    }

    pub fn stage(&self, elapsed_ms: f32) -> Option<Stage> {
        self.script.as_ref().and_then(|s| s.stage(elapsed_ms))
    }

    /// Pose every animated node for `elapsed_ms` since insertion
    pub fn update(&mut self, elapsed_ms: f32) {
        if self.graph.is_disposed() {
            return;
        }
        for effect in &self.effects {
            effect.apply(&mut self.graph, elapsed_ms);
        }
        if let Some(script) = &self.script {
            script.apply(&mut self.graph, elapsed_ms);
        }
    }

    /// Release the graph's resources and drop the update plan
    pub fn dispose<R: ResourceReleaser + ?Sized>(&mut self, releaser: &mut R) -> DisposeReport {
        self.effects.clear();
        self.script = None;
        self.graph.dispose(releaser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Count(usize);

    impl ResourceReleaser for Count {
        fn release_geometry(&mut self, _: GeometryId) {
            self.0 += 1;
        }

        fn release_material(&mut self, _: MaterialId) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_dispose_drops_plan() {
        let mut molecule = MoleculeLibrary::standard()
            .build(AnimationCategory::MagnesiumOxide, 4)
            .unwrap();
        assert!(molecule.has_script());

        let mut released = Count::default();
        let report = molecule.dispose(&mut released);
        assert_eq!(released.0, report.geometries + report.materials);
        assert!(!molecule.has_script());
        assert_eq!(molecule.effect_count(), 0);

        // Updating a disposed molecule is inert
        molecule.update(3000.0);
        assert_eq!(molecule.dispose(&mut released), DisposeReport::default());
    }
}
