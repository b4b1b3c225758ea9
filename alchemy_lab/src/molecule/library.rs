//! Category to builder registry

use std::collections::HashMap;

use super::builder::MoleculeBuilder;
use super::script::Script;
use super::{gases, hazards, oxidation, solids, Molecule};
use crate::category::AnimationCategory;

/// Fills a fresh builder for one category, returning the scripted timeline
/// if the molecule has one
pub type BuildFn = fn(&mut MoleculeBuilder, AnimationCategory) -> Option<Script>;

pub struct MoleculeLibrary {
    builders: HashMap<AnimationCategory, BuildFn>,
}

impl Default for MoleculeLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl MoleculeLibrary {
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// A builder for every category
    pub fn standard() -> Self {
        use AnimationCategory::*;

        let mut library = Self::empty();
        library.register(Water, gases::water);
        library.register(CarbonMonoxide, gases::carbon_monoxide);
        library.register(CarbonDioxide, gases::carbon_dioxide);
        library.register(Ammonia, gases::ammonia);
        library.register(Methane, gases::methane);
        library.register(HydrogenSulfide, gases::hydrogen_sulfide);

        library.register(MagnesiumOxide, oxidation::magnesium_oxide);
        library.register(CopperOxide, oxidation::copper_oxide);
        library.register(IronOxide, oxidation::iron_oxide);
        for oxide in [
            AluminumOxide,
            CalciumOxide,
            SiliconDioxide,
            SulfurDioxide,
            PhosphorusPentoxide,
            TitaniumOxide,
            ZincOxide,
            RareEarthOxide,
        ] {
            library.register(oxide, oxidation::basic_oxide);
        }

        library.register(Salt, solids::salt);
        library.register(Crystal, solids::crystal);
        library.register(Alloy, solids::alloy);

        library.register(Dangerous, hazards::dangerous);
        library.register(Radioactive, hazards::radioactive);
        library.register(Impossible, hazards::impossible);
        library
    }

    /// Replaces any builder already registered for the category
    pub fn register(&mut self, category: AnimationCategory, build: BuildFn) {
        self.builders.insert(category, build);
    }

    /// The same library without one category
    pub fn without(mut self, category: AnimationCategory) -> Self {
        self.builders.remove(&category);
        self
    }

    pub fn contains(&self, category: AnimationCategory) -> bool {
        self.builders.contains_key(&category)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Categories with no builder
    pub fn missing(&self) -> Vec<AnimationCategory> {
        AnimationCategory::ALL
            .into_iter()
            .filter(|c| !self.contains(*c))
            .collect()
    }

    /// Build a fresh molecule whose handles carry `generation`
    pub fn build(&self, category: AnimationCategory, generation: u64) -> Option<Molecule> {
        let build = self.builders.get(&category)?;
        let mut builder = MoleculeBuilder::new(generation, generation);
        let script = build(&mut builder, category);
        Some(builder.finish(category, script))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_covers_every_category() {
        let library = MoleculeLibrary::standard();
        assert_eq!(library.len(), AnimationCategory::ALL.len());
        assert!(library.missing().is_empty());
    }

    #[test]
    fn test_every_builder_produces_content() {
        let library = MoleculeLibrary::standard();
        for (generation, category) in AnimationCategory::ALL.into_iter().enumerate() {
            let molecule = library.build(category, generation as u64).unwrap();
            let graph = molecule.graph();
            assert_eq!(molecule.category(), category);
            assert_eq!(graph.generation(), generation as u64);
            assert!(graph.geometry_count() > 0, "{category} has no geometry");
            assert!(graph.material_count() > 0, "{category} has no material");
            assert!(graph.child_count(graph.root()) > 0, "{category} is empty");
        }
    }

    #[test]
    fn test_every_molecule_updates_through_its_timeline() {
        let library = MoleculeLibrary::standard();
        for category in AnimationCategory::ALL {
            let mut molecule = library.build(category, 1).unwrap();
            for t in [0.0, 16.0, 1500.0, 2500.0, 4000.0, 6500.0, 8000.0, 20_000.0] {
                molecule.update(t);
            }
            let transform = molecule.graph().node(molecule.graph().root()).transform;
            assert!(transform.translation.is_finite());
        }
    }

    #[test]
    fn test_without_leaves_a_gap() {
        let library = MoleculeLibrary::standard().without(AnimationCategory::Alloy);
        assert!(!library.contains(AnimationCategory::Alloy));
        assert!(library.build(AnimationCategory::Alloy, 1).is_none());
        assert_eq!(library.missing(), vec![AnimationCategory::Alloy]);
    }

    #[test]
    fn test_staged_categories_have_timelines() {
        let library = MoleculeLibrary::standard();
        let magnesium = library.build(AnimationCategory::MagnesiumOxide, 1).unwrap();
        assert_eq!(magnesium.stage(6000.0).unwrap().index, 2);
        let copper = library.build(AnimationCategory::CopperOxide, 1).unwrap();
        assert_eq!(copper.stage(6000.0).unwrap().index, 1);
        let water = library.build(AnimationCategory::Water, 1).unwrap();
        assert!(water.stage(6000.0).is_none());
    }
}
