//! Reaction catalog
//!
//! Reactions are keyed by the two reactant symbols sorted and concatenated, so
//! the order the user picked them in never matters. The catalog is authored as
//! reactant pairs and the key is always computed, never typed by hand.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::category::AnimationCategory;

/// Canonical lookup key for an unordered pair of symbols
pub fn canonical_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}{}", a, b)
    } else {
        format!("{}{}", b, a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionType {
    Synthesis,
    Decomposition,
    SingleReplacement,
    DoubleReplacement,
    Combustion,
    AcidBase,
    Redox,
}

impl ReactionType {
    pub fn label(&self) -> &'static str {
        match self {
            ReactionType::Synthesis => "Synthesis",
            ReactionType::Decomposition => "Decomposition",
            ReactionType::SingleReplacement => "Single replacement",
            ReactionType::DoubleReplacement => "Double replacement",
            ReactionType::Combustion => "Combustion",
            ReactionType::AcidBase => "Acid-base",
            ReactionType::Redox => "Redox",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnergyChange {
    Exothermic,
    Endothermic,
}

impl EnergyChange {
    pub fn label(&self) -> &'static str {
        match self {
            EnergyChange::Exothermic => "Exothermic",
            EnergyChange::Endothermic => "Endothermic",
        }
    }

    /// Badge color, `0xRRGGBB`
    pub fn color(&self) -> u32 {
        match self {
            EnergyChange::Exothermic => 0xdc2626,
            EnergyChange::Endothermic => 0x2563eb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    /// Badge color, `0xRRGGBB`
    pub fn color(&self) -> u32 {
        match self {
            Difficulty::Easy => 0x10b981,
            Difficulty::Moderate => 0xf59e0b,
            Difficulty::Hard => 0xef4444,
            Difficulty::Expert => 0x7c3aed,
        }
    }
}

/// Everything the lab knows about one reaction
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub product_name: Cow<'static, str>,
    pub product_formula: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub animation: AnimationCategory,
    pub kind: ReactionType,
    pub balanced_equation: Cow<'static, str>,
    pub energy_change: EnergyChange,
    pub difficulty: Difficulty,
    pub real_world: bool,
    /// Kelvin
    pub temperature: Option<f32>,
    /// Atmospheres
    pub pressure: Option<f32>,
    pub catalyst: Option<Cow<'static, str>>,
    pub explanation: Option<Cow<'static, str>>,
}

impl Reaction {
    #[allow(clippy::too_many_arguments)]
    fn new(
        product_name: &'static str,
        product_formula: &'static str,
        description: &'static str,
        animation: AnimationCategory,
        kind: ReactionType,
        balanced_equation: &'static str,
        energy_change: EnergyChange,
        difficulty: Difficulty,
        real_world: bool,
    ) -> Self {
        Self {
            product_name: Cow::Borrowed(product_name),
            product_formula: Cow::Borrowed(product_formula),
            description: Cow::Borrowed(description),
            animation,
            kind,
            balanced_equation: Cow::Borrowed(balanced_equation),
            energy_change,
            difficulty,
            real_world,
            temperature: None,
            pressure: None,
            catalyst: None,
            explanation: None,
        }
    }

    fn at(mut self, kelvin: f32, atmospheres: f32) -> Self {
        self.temperature = Some(kelvin);
        self.pressure = Some(atmospheres);
        self
    }

    fn with_catalyst(mut self, catalyst: &'static str) -> Self {
        self.catalyst = Some(Cow::Borrowed(catalyst));
        self
    }

    /// Needs more than room temperature or one atmosphere
    pub fn needs_special_conditions(&self) -> bool {
        self.temperature.is_some_and(|t| t > 298.0)
            || self.pressure.is_some_and(|p| p > 1.0)
            || self.catalyst.is_some()
    }
}

/// Authoring errors detected while building a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Reaction catalog has two entries for key '{0}'")]
    DuplicateKey(String),
}

/// One catalog row
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub key: String,
    pub reactants: [&'static str; 2],
    pub reaction: Reaction,
}

/// Immutable lookup from canonical key to reaction
#[derive(Debug, Clone, Default)]
pub struct ReactionCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl ReactionCatalog {
    pub fn from_entries<I>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ([&'static str; 2], Reaction)>,
    {
        let mut catalog = Self::default();
        for (reactants, reaction) in entries {
            catalog.register(reactants, reaction)?;
        }
        Ok(catalog)
    }

    fn register(&mut self, reactants: [&'static str; 2], reaction: Reaction) -> Result<(), CatalogError> {
        let key = canonical_key(reactants[0], reactants[1]);
        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(CatalogEntry {
            key,
            reactants,
            reaction,
        });
        Ok(())
    }

    /// The lab's built-in reaction table, built on first use
    pub fn standard() -> &'static ReactionCatalog {
        static STANDARD: OnceLock<ReactionCatalog> = OnceLock::new();
        STANDARD.get_or_init(|| {
            ReactionCatalog::from_entries(standard_reactions())
                .expect("built-in reaction table has a duplicate key")
        })
    }

    pub fn get(&self, a: &str, b: &str) -> Option<&Reaction> {
        self.get_by_key(&canonical_key(a, b))
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Reaction> {
        self.index.get(key).map(|&i| &self.entries[i].reaction)
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.index.contains_key(&canonical_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn by_type(&self, kind: ReactionType) -> impl Iterator<Item = &Reaction> {
        self.reactions().filter(move |r| r.kind == kind)
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> impl Iterator<Item = &Reaction> {
        self.reactions().filter(move |r| r.difficulty == difficulty)
    }

    pub fn real_world(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions().filter(|r| r.real_world)
    }

    pub fn exothermic(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions().filter(|r| r.energy_change == EnergyChange::Exothermic)
    }

    pub fn endothermic(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions().filter(|r| r.energy_change == EnergyChange::Endothermic)
    }

    fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.entries.iter().map(|e| &e.reaction)
    }
}

fn standard_reactions() -> Vec<([&'static str; 2], Reaction)> {
    use AnimationCategory as A;
    use Difficulty::*;
    use EnergyChange::*;
    use ReactionType::*;

    vec![
        (["H", "O"], Reaction::new(
            "Water", "H₂O",
            "The universal solvent that all known life depends on. Two hydrogen atoms bond to one oxygen atom.",
            A::Water, Synthesis, "2H₂ + O₂ → 2H₂O", Exothermic, Easy, true,
        ).at(298.0, 1.0)),
        (["Na", "Cl"], Reaction::new(
            "Sodium Chloride (Table Salt)", "NaCl",
            "A crystalline ionic compound. Sodium gives up an electron to chlorine.",
            A::Salt, Synthesis, "2Na + Cl₂ → 2NaCl", Exothermic, Easy, true,
        ).at(298.0, 1.0)),
        (["C", "O"], Reaction::new(
            "Carbon Monoxide", "CO",
            "A colorless, odorless and toxic gas produced when carbon burns without enough oxygen.",
            A::CarbonMonoxide, Combustion, "2C + O₂ → 2CO", Exothermic, Moderate, true,
        ).at(973.0, 1.0)),
        (["H", "N"], Reaction::new(
            "Ammonia", "NH₃",
            "A pungent gas at the heart of fertilizer production, made industrially by the Haber process.",
            A::Ammonia, Synthesis, "N₂ + 3H₂ → 2NH₃", Exothermic, Hard, true,
        ).at(673.0, 200.0).with_catalyst("Iron")),
        (["C", "H"], Reaction::new(
            "Methane", "CH₄",
            "The simplest hydrocarbon, the main part of natural gas and a potent greenhouse gas.",
            A::Methane, Synthesis, "C + 2H₂ → CH₄", Exothermic, Moderate, true,
        ).at(573.0, 20.0).with_catalyst("Nickel")),
        (["K", "Br"], Reaction::new(
            "Potassium Bromide", "KBr",
            "A white crystalline salt once common in photography and medicine.",
            A::Salt, Synthesis, "2K + Br₂ → 2KBr", Exothermic, Easy, true,
        )),
        (["Ca", "F"], Reaction::new(
            "Calcium Fluoride", "CaF₂",
            "The mineral fluorite, used for optics and in steelmaking.",
            A::Crystal, Synthesis, "Ca + F₂ → CaF₂", Exothermic, Easy, true,
        )),
        (["Mg", "O"], Reaction::new(
            "Magnesium Oxide", "MgO",
            "Forms as magnesium burns with a brilliant white light. Used in refractory linings.",
            A::MagnesiumOxide, Combustion, "2Mg + O₂ → 2MgO", Exothermic, Easy, true,
        ).at(923.0, 1.0)),
        (["Al", "O"], Reaction::new(
            "Aluminum Oxide", "Al₂O₃",
            "In pure crystal form it is sapphire and ruby. Used in abrasives and ceramics.",
            A::AluminumOxide, Synthesis, "4Al + 3O₂ → 2Al₂O₃", Exothermic, Moderate, true,
        ).at(1073.0, 1.0)),
        (["Ca", "O"], Reaction::new(
            "Calcium Oxide (Quicklime)", "CaO",
            "A cement and steelmaking staple that reacts violently with water to form slaked lime.",
            A::CalciumOxide, Combustion, "2Ca + O₂ → 2CaO", Exothermic, Easy, true,
        ).at(1115.0, 1.0)),
        (["Fe", "O"], Reaction::new(
            "Iron Oxide (Rust)", "Fe₂O₃",
            "The reddish-brown compound left behind when iron corrodes in oxygen and moisture.",
            A::IronOxide, Redox, "4Fe + 3O₂ → 2Fe₂O₃", Exothermic, Easy, true,
        ).at(298.0, 1.0)),
        (["Cu", "O"], Reaction::new(
            "Copper Oxide", "CuO",
            "Forms when copper is heated in air, the first step toward a green patina.",
            A::CopperOxide, Redox, "2Cu + O₂ → 2CuO", Exothermic, Easy, true,
        ).at(573.0, 1.0)),
        (["Si", "O"], Reaction::new(
            "Silicon Dioxide (Silica)", "SiO₂",
            "The stuff of sand, quartz and glass, with beautiful crystal structures.",
            A::SiliconDioxide, Synthesis, "Si + O₂ → SiO₂", Exothermic, Moderate, true,
        ).at(1687.0, 1.0)),
        (["H", "S"], Reaction::new(
            "Hydrogen Sulfide", "H₂S",
            "A toxic gas that smells of rotten eggs, found in volcanic vents and swamps.",
            A::HydrogenSulfide, Synthesis, "H₂ + S → H₂S", Exothermic, Moderate, true,
        ).at(298.0, 1.0)),
        (["S", "O"], Reaction::new(
            "Sulfur Dioxide", "SO₂",
            "A choking gas released by burning sulfur-bearing fuels and a cause of acid rain.",
            A::SulfurDioxide, Combustion, "S + O₂ → SO₂", Exothermic, Easy, true,
        ).at(388.0, 1.0)),
        (["P", "O"], Reaction::new(
            "Phosphorus Pentoxide", "P₂O₅",
            "A fierce drying agent that pulls water straight out of the air.",
            A::PhosphorusPentoxide, Combustion, "4P + 5O₂ → 2P₂O₅", Exothermic, Moderate, true,
        ).at(317.0, 1.0)),
        (["He", "O"], Reaction::new(
            "No Reaction", "He + O",
            "Helium is a noble gas with a complete electron shell, so nothing happens.",
            A::Impossible, Synthesis, "He + O → No Reaction", Endothermic, Easy, false,
        )),
        (["Ne", "O"], Reaction::new(
            "No Reaction", "Ne + O",
            "Neon is a noble gas and forms no compounds under normal conditions.",
            A::Impossible, Synthesis, "Ne + O → No Reaction", Endothermic, Easy, false,
        )),
        (["Ar", "O"], Reaction::new(
            "No Reaction", "Ar + O",
            "Argon is chemically inert and ignores oxygen under normal conditions.",
            A::Impossible, Synthesis, "Ar + O → No Reaction", Endothermic, Easy, false,
        )),
        (["Ca", "Cl"], Reaction::new(
            "Calcium Chloride", "CaCl₂",
            "Spread on icy roads and used as a desiccant. Dissolves readily in water.",
            A::Salt, Synthesis, "Ca + Cl₂ → CaCl₂", Exothermic, Easy, true,
        )),
        (["Mg", "Cl"], Reaction::new(
            "Magnesium Chloride", "MgCl₂",
            "Used in steelmaking and as a dietary supplement.",
            A::Salt, Synthesis, "Mg + Cl₂ → MgCl₂", Exothermic, Easy, true,
        )),
        (["Au", "Ag"], Reaction::new(
            "Gold-Silver Alloy", "Au-Ag",
            "These metals blend into an alloy but never react to form a compound.",
            A::Alloy, Synthesis, "Au + Ag → Au-Ag (alloy)", Endothermic, Easy, true,
        )),
        (["Cu", "Zn"], Reaction::new(
            "Brass", "Cu-Zn",
            "A golden alloy of copper and zinc used for instruments and fittings.",
            A::Alloy, Synthesis, "Cu + Zn → CuZn (brass)", Endothermic, Easy, true,
        )),
        (["C", "N"], Reaction::new(
            "Cyanide Ion", "CN⁻",
            "A highly toxic ion that shuts down cellular respiration.",
            A::Dangerous, Synthesis, "C + N → CN⁻", Endothermic, Expert, true,
        ).at(2000.0, 1.0)),
        (["La", "O"], Reaction::new(
            "Lanthanum Oxide", "La₂O₃",
            "A white powder used in optical glass and catalysts.",
            A::RareEarthOxide, Synthesis, "4La + 3O₂ → 2La₂O₃", Exothermic, Moderate, true,
        )),
        (["U", "O"], Reaction::new(
            "Uranium Oxide", "UO₂",
            "Reactor fuel. Highly radioactive and tightly regulated.",
            A::Radioactive, Synthesis, "U + O₂ → UO₂", Exothermic, Expert, true,
        ).at(1405.0, 1.0)),
        (["Li", "F"], Reaction::new(
            "Lithium Fluoride", "LiF",
            "Used in molten salt reactors and specialty ceramics.",
            A::Salt, Synthesis, "2Li + F₂ → 2LiF", Exothermic, Easy, true,
        )),
        (["K", "Cl"], Reaction::new(
            "Potassium Chloride", "KCl",
            "A salt substitute and a fertilizer that plants depend on.",
            A::Salt, Synthesis, "2K + Cl₂ → 2KCl", Exothermic, Easy, true,
        )),
        (["B", "N"], Reaction::new(
            "Boron Nitride", "BN",
            "An ultra-hard material nicknamed 'white graphite'.",
            A::Crystal, Synthesis, "B + N → BN", Exothermic, Hard, true,
        ).at(2300.0, 1.0)),
        (["Si", "C"], Reaction::new(
            "Silicon Carbide", "SiC",
            "Carborundum, an extremely hard abrasive.",
            A::Crystal, Synthesis, "Si + C → SiC", Exothermic, Hard, true,
        ).at(2200.0, 1.0)),
        (["Cu", "Sn"], Reaction::new(
            "Bronze", "Cu-Sn",
            "The historic alloy, harder than copper, that tools and statues were cast from.",
            A::Alloy, Synthesis, "Cu + Sn → CuSn (bronze)", Endothermic, Easy, true,
        )),
        (["Fe", "Fe"], Reaction::new(
            "Steel", "Fe-C",
            "The iron-carbon alloy that built modern civilization.",
            A::Alloy, Synthesis, "Fe + C → Fe-C (steel)", Endothermic, Moderate, true,
        ).at(1811.0, 1.0)),
        (["Ti", "O"], Reaction::new(
            "Titanium Dioxide", "TiO₂",
            "The white pigment in paint and sunscreen.",
            A::TitaniumOxide, Synthesis, "Ti + O₂ → TiO₂", Exothermic, Moderate, true,
        ).at(1941.0, 1.0)),
        (["Zn", "O"], Reaction::new(
            "Zinc Oxide", "ZnO",
            "A white pigment and UV blocker.",
            A::ZincOxide, Synthesis, "2Zn + O₂ → 2ZnO", Exothermic, Easy, true,
        ).at(693.0, 1.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementTable;

    #[test]
    fn test_canonical_key_is_order_independent() {
        assert_eq!(canonical_key("O", "H"), "HO");
        assert_eq!(canonical_key("H", "O"), "HO");
        assert_eq!(canonical_key("Na", "Cl"), "ClNa");
        assert_eq!(canonical_key("Fe", "Fe"), "FeFe");
    }

    #[test]
    fn test_standard_catalog_builds() {
        let catalog = ReactionCatalog::standard();
        assert_eq!(catalog.len(), 34);
        assert!(catalog.contains("Cl", "Na"));
        assert!(catalog.contains("Ag", "Au"));
        assert!(catalog.get_by_key("AgAu").is_some());
        assert!(catalog.get_by_key("AuAg").is_none());
    }

    #[test]
    fn test_reactants_exist_in_element_table() {
        let elements = ElementTable::standard();
        for entry in ReactionCatalog::standard().iter() {
            for symbol in entry.reactants {
                assert!(elements.get(symbol).is_some(), "{} in {}", symbol, entry.key);
            }
        }
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let water = ReactionCatalog::standard().get("H", "O").unwrap().clone();
        let result = ReactionCatalog::from_entries(vec![
            (["H", "O"], water.clone()),
            (["O", "H"], water),
        ]);
        let err = result.unwrap_err();
        assert_eq!(err, CatalogError::DuplicateKey("HO".to_string()));
        assert_eq!(err.to_string(), "Reaction catalog has two entries for key 'HO'");
    }

    #[test]
    fn test_queries() {
        let catalog = ReactionCatalog::standard();
        let impossible: Vec<_> = catalog.iter().filter(|e| !e.reaction.real_world).collect();
        assert_eq!(impossible.len(), 3);
        assert_eq!(catalog.real_world().count(), catalog.len() - 3);
        assert_eq!(
            catalog.exothermic().count() + catalog.endothermic().count(),
            catalog.len()
        );
        assert!(catalog.by_difficulty(Difficulty::Expert).all(|r| {
            r.animation == AnimationCategory::Dangerous || r.animation == AnimationCategory::Radioactive
        }));
        assert_eq!(catalog.by_type(ReactionType::Redox).count(), 2);
    }

    #[test]
    fn test_special_conditions() {
        let catalog = ReactionCatalog::standard();
        assert!(!catalog.get("H", "O").unwrap().needs_special_conditions());
        let ammonia = catalog.get("N", "H").unwrap();
        assert!(ammonia.needs_special_conditions());
        assert_eq!(ammonia.catalyst.as_deref(), Some("Iron"));
    }

    #[test]
    fn test_badge_colors() {
        assert_eq!(Difficulty::Easy.color(), 0x10b981);
        assert_eq!(Difficulty::Expert.color(), 0x7c3aed);
        assert_eq!(EnergyChange::Endothermic.color(), 0x2563eb);
    }
}
