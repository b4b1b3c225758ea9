//! Reaction resolution
//!
//! Turns a pair of element symbols into an outcome. Pairs missing from the
//! catalog get a synthesized "no reaction" record whose explanation depends only
//! on the families of the two elements.

use std::borrow::Cow;

use crate::category::AnimationCategory;
use crate::elements::{ElementCategory, ElementTable};
use crate::reactions::{canonical_key, Difficulty, EnergyChange, Reaction, ReactionCatalog, ReactionType};

/// Where an outcome came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Found in the catalog.
    Known,
    /// Synthesized because the catalog has no entry.
    Unknown,
}

/// Result of combining two elements
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutcome {
    key: String,
    reactants: [String; 2],
    provenance: Provenance,
    reaction: Cow<'static, Reaction>,
}

impl ResolvedOutcome {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reactants(&self) -> [&str; 2] {
        [&self.reactants[0], &self.reactants[1]]
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_known(&self) -> bool {
        self.provenance == Provenance::Known
    }

    pub fn reaction(&self) -> &Reaction {
        &self.reaction
    }

    pub fn category(&self) -> AnimationCategory {
        self.reaction.animation
    }
}

/// Resolves pairs against a catalog and an element table
#[derive(Debug, Clone, Copy)]
pub struct ReactionResolver {
    catalog: &'static ReactionCatalog,
    elements: ElementTable,
}

impl Default for ReactionResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReactionResolver {
    pub fn new(catalog: &'static ReactionCatalog, elements: ElementTable) -> Self {
        Self { catalog, elements }
    }

    pub fn standard() -> Self {
        Self::new(ReactionCatalog::standard(), ElementTable::standard())
    }

    pub fn catalog(&self) -> &'static ReactionCatalog {
        self.catalog
    }

    pub fn elements(&self) -> ElementTable {
        self.elements
    }

    /// Never fails: unknown pairs, unknown symbols and identical symbols all
    /// produce an outcome
    pub fn resolve(&self, a: &str, b: &str) -> ResolvedOutcome {
        let key = canonical_key(a, b);
        let (provenance, reaction) = match self.catalog.get_by_key(&key) {
            Some(reaction) => (Provenance::Known, Cow::Borrowed(reaction)),
            None => (Provenance::Unknown, Cow::Owned(self.no_reaction(a, b))),
        };

        ResolvedOutcome {
            key,
            reactants: [a.to_string(), b.to_string()],
            provenance,
            reaction,
        }
    }

    pub fn has_reaction(&self, a: &str, b: &str) -> bool {
        self.catalog.contains(a, b)
    }

    fn no_reaction(&self, a: &str, b: &str) -> Reaction {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let first = self.elements.get(a);
        let second = self.elements.get(b);
        let explanation = explain_no_reaction(first.map(|e| e.category), second.map(|e| e.category));
        let name_of = |symbol: &str| {
            self.elements
                .get(symbol)
                .map(|e| e.name.to_string())
                .unwrap_or_else(|| symbol.to_string())
        };

        Reaction {
            product_name: Cow::Borrowed("No Reaction"),
            product_formula: Cow::Owned(format!("{} + {}", a, b)),
            description: Cow::Owned(format!(
                "{} and {} do not form a known compound in this lab.",
                name_of(a),
                name_of(b)
            )),
            animation: AnimationCategory::Impossible,
            kind: ReactionType::Synthesis,
            balanced_equation: Cow::Owned(format!("{} + {} → No Reaction", a, b)),
            energy_change: EnergyChange::Endothermic,
            difficulty: Difficulty::Easy,
            real_world: false,
            temperature: None,
            pressure: None,
            catalyst: None,
            explanation: Some(Cow::Borrowed(explanation)),
        }
    }
}

/// Explanation for a pair the catalog does not know
///
/// Symmetric in its arguments; `None` stands for a symbol the element table
/// does not recognize.
pub fn explain_no_reaction(a: Option<ElementCategory>, b: Option<ElementCategory>) -> &'static str {
    let noble = |c: Option<ElementCategory>| c.is_some_and(|c| c.is_noble_gas());
    let metallic = |c: Option<ElementCategory>| c.is_some_and(|c| c.is_metallic());
    let nonmetallic = |c: Option<ElementCategory>| c.is_some_and(|c| c.is_nonmetallic());

    if noble(a) && noble(b) {
        "Both elements are noble gases with complete, stable electron shells. \
         Neither has any tendency to gain, lose or share electrons, so no bond can form."
    } else if noble(a) || noble(b) {
        "Noble gases already have complete, stable electron shells and stay inert \
         under normal conditions, so this pair does not react."
    } else if metallic(a) && metallic(b) {
        "Metals do not bond with each other by trading electrons. At most they can be \
         melted together into an alloy, which is a mixture rather than a new compound."
    } else if nonmetallic(a) && nonmetallic(b) {
        "These nonmetals could share electrons in principle, but the combination needs \
         special conditions such as high temperature, high pressure or a catalyst."
    } else {
        "These elements do not readily react. Their electronegativities and electron \
         configurations do not favor a stable bond under normal conditions."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ElementCategory::*;

    #[test]
    fn test_resolve_is_symmetric() {
        let resolver = ReactionResolver::standard();
        for (a, b) in [("H", "O"), ("He", "Ne"), ("Au", "Ag"), ("Na", "Xe"), ("Zz", "H")] {
            let forward = resolver.resolve(a, b);
            let backward = resolver.resolve(b, a);
            assert_eq!(forward.key(), backward.key());
            assert_eq!(forward.provenance(), backward.provenance());
            assert_eq!(forward.category(), backward.category());
            assert_eq!(forward.reaction().product_name, backward.reaction().product_name);
            assert_eq!(forward.reaction().explanation, backward.reaction().explanation);
        }
    }

    #[test]
    fn test_water() {
        let outcome = ReactionResolver::standard().resolve("H", "O");
        assert!(outcome.is_known());
        assert_eq!(outcome.key(), "HO");
        let water = outcome.reaction();
        assert_eq!(water.product_name, "Water");
        assert_eq!(water.animation, AnimationCategory::Water);
        assert_eq!(water.energy_change, EnergyChange::Exothermic);
        assert_eq!(water.difficulty, Difficulty::Easy);
        assert!(water.real_world);
    }

    #[test]
    fn test_two_noble_gases() {
        let outcome = ReactionResolver::standard().resolve("He", "Ne");
        assert!(!outcome.is_known());
        let reaction = outcome.reaction();
        assert_eq!(reaction.animation, AnimationCategory::Impossible);
        assert!(!reaction.real_world);
        assert_eq!(reaction.energy_change, EnergyChange::Endothermic);
        assert_eq!(reaction.difficulty, Difficulty::Easy);
        assert_eq!(reaction.product_formula, "He + Ne");
        assert_eq!(reaction.balanced_equation, "He + Ne → No Reaction");
        let explanation = reaction.explanation.as_deref().unwrap();
        assert!(explanation.contains("complete, stable electron shells"));
    }

    #[test]
    fn test_identical_symbols_are_a_normal_lookup() {
        let resolver = ReactionResolver::standard();
        let steel = resolver.resolve("Fe", "Fe");
        assert!(steel.is_known());
        assert_eq!(steel.reaction().product_name, "Steel");

        let oxygen = resolver.resolve("O", "O");
        assert!(!oxygen.is_known());
        assert_eq!(oxygen.key(), "OO");
    }

    #[test]
    fn test_catalog_no_reaction_rows_stay_known() {
        let outcome = ReactionResolver::standard().resolve("O", "Ar");
        assert!(outcome.is_known());
        assert_eq!(outcome.category(), AnimationCategory::Impossible);
    }

    #[test]
    fn test_decision_table_order() {
        let both_noble = explain_no_reaction(Some(NobleGas), Some(NobleGas));
        let one_noble = explain_no_reaction(Some(TransitionMetal), Some(NobleGas));
        let metals = explain_no_reaction(Some(Alkali), Some(TransitionMetal));
        let nonmetals = explain_no_reaction(Some(Nonmetal), Some(Halogen));
        let other = explain_no_reaction(Some(Metalloid), Some(Alkali));

        let all = [both_noble, one_noble, metals, nonmetals, other];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(metals.contains("alloy"));
        assert!(nonmetals.contains("special conditions"));
        assert!(other.contains("electronegativities"));
        assert_eq!(explain_no_reaction(None, Some(NobleGas)), one_noble);
        assert_eq!(explain_no_reaction(None, None), other);
    }

    #[test]
    fn test_decision_table_is_symmetric() {
        for a in ElementCategory::ALL {
            for b in ElementCategory::ALL {
                assert_eq!(explain_no_reaction(Some(a), Some(b)), explain_no_reaction(Some(b), Some(a)));
            }
        }
    }

    #[test]
    fn test_unknown_symbol_falls_back_to_symbol_text() {
        let outcome = ReactionResolver::standard().resolve("Qq", "H");
        assert!(!outcome.is_known());
        assert!(outcome.reaction().description.contains("Qq"));
        assert!(outcome.reaction().description.contains("Hydrogen"));
    }
}
