//! Element table
//!
//! The immutable set of elements the lab offers. Colors follow the usual
//! CPK/Jmol palette, radii are relative visual sizes for the molecule scene.

use rand::Rng;

/// Chemical family of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    Alkali,
    AlkalineEarth,
    TransitionMetal,
    PostTransitionMetal,
    Metalloid,
    Nonmetal,
    Halogen,
    NobleGas,
    Lanthanide,
    Actinide,
}

impl ElementCategory {
    pub const ALL: [ElementCategory; 10] = [
        ElementCategory::Alkali,
        ElementCategory::AlkalineEarth,
        ElementCategory::TransitionMetal,
        ElementCategory::PostTransitionMetal,
        ElementCategory::Metalloid,
        ElementCategory::Nonmetal,
        ElementCategory::Halogen,
        ElementCategory::NobleGas,
        ElementCategory::Lanthanide,
        ElementCategory::Actinide,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ElementCategory::Alkali => "Alkali metal",
            ElementCategory::AlkalineEarth => "Alkaline earth metal",
            ElementCategory::TransitionMetal => "Transition metal",
            ElementCategory::PostTransitionMetal => "Post-transition metal",
            ElementCategory::Metalloid => "Metalloid",
            ElementCategory::Nonmetal => "Nonmetal",
            ElementCategory::Halogen => "Halogen",
            ElementCategory::NobleGas => "Noble gas",
            ElementCategory::Lanthanide => "Lanthanide",
            ElementCategory::Actinide => "Actinide",
        }
    }

    pub fn is_metallic(&self) -> bool {
        matches!(
            self,
            ElementCategory::Alkali
                | ElementCategory::AlkalineEarth
                | ElementCategory::TransitionMetal
                | ElementCategory::PostTransitionMetal
                | ElementCategory::Lanthanide
                | ElementCategory::Actinide
        )
    }

    pub fn is_nonmetallic(&self) -> bool {
        matches!(self, ElementCategory::Nonmetal | ElementCategory::Halogen)
    }

    pub fn is_noble_gas(&self) -> bool {
        *self == ElementCategory::NobleGas
    }
}

/// A chemical element as presented in the lab
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub name: &'static str,
    pub atomic_number: u8,
    pub category: ElementCategory,
    /// Display color, `0xRRGGBB`
    pub color: u32,
    /// Relative visual radius in scene units
    pub radius: f32,
    pub period: u8,
    /// `None` for the f-block
    pub group: Option<u8>,
    pub description: &'static str,
    /// Year of discovery, negative for BCE, `None` when known since antiquity
    pub discovered: Option<i32>,
    /// Alchemical glyph, where the element had one
    pub legacy_symbol: Option<&'static str>,
}

impl Element {
    pub fn rgba(&self) -> common::Rgba {
        common::hex(self.color)
    }

    pub fn rgb(&self) -> [f32; 3] {
        common::hex_rgb(self.color)
    }

    pub fn discovery_label(&self) -> String {
        match self.discovered {
            None => "Known since antiquity".to_string(),
            Some(year) if year < 0 => format!("{} BCE", -year),
            Some(year) => year.to_string(),
        }
    }
}

use ElementCategory::*;

#[allow(clippy::too_many_arguments)]
const fn element(
    symbol: &'static str,
    name: &'static str,
    atomic_number: u8,
    category: ElementCategory,
    color: u32,
    radius: f32,
    period: u8,
    group: Option<u8>,
    description: &'static str,
    discovered: Option<i32>,
    legacy_symbol: Option<&'static str>,
) -> Element {
    Element {
        symbol,
        name,
        atomic_number,
        category,
        color,
        radius,
        period,
        group,
        description,
        discovered,
        legacy_symbol,
    }
}

static ELEMENTS: &[Element] = &[
    element("H", "Hydrogen", 1, Nonmetal, 0xffffff, 0.5, 1, Some(1),
        "The lightest element and the most abundant in the universe.", Some(1766), None),
    element("He", "Helium", 2, NobleGas, 0xd9ffff, 0.55, 1, Some(18),
        "An inert gas first spotted in the spectrum of the Sun.", Some(1868), None),
    element("Li", "Lithium", 3, Alkali, 0xcc80ff, 0.85, 2, Some(1),
        "The lightest metal, soft enough to cut with a knife.", Some(1817), None),
    element("Be", "Beryllium", 4, AlkalineEarth, 0xc2ff00, 0.7, 2, Some(2),
        "A light, stiff metal found in emeralds and aquamarine.", Some(1798), None),
    element("B", "Boron", 5, Metalloid, 0xffb5b5, 0.65, 2, Some(13),
        "A hard metalloid used in borosilicate glass.", Some(1808), None),
    element("C", "Carbon", 6, Nonmetal, 0x909090, 0.7, 2, Some(14),
        "The backbone of organic chemistry, from graphite to diamond.", None, None),
    element("N", "Nitrogen", 7, Nonmetal, 0x3050f8, 0.65, 2, Some(15),
        "Makes up most of the air we breathe.", Some(1772), None),
    element("O", "Oxygen", 8, Nonmetal, 0xff0d0d, 0.6, 2, Some(16),
        "A reactive gas that feeds both life and fire.", Some(1774), None),
    element("F", "Fluorine", 9, Halogen, 0x90e050, 0.55, 2, Some(17),
        "The most electronegative element, reacts with almost everything.", Some(1886), None),
    element("Ne", "Neon", 10, NobleGas, 0xb3e3f5, 0.6, 2, Some(18),
        "Glows red-orange in discharge tubes.", Some(1898), None),
    element("Na", "Sodium", 11, Alkali, 0xab5cf2, 0.9, 3, Some(1),
        "A soft metal that reacts violently with water.", Some(1807), None),
    element("Mg", "Magnesium", 12, AlkalineEarth, 0x8aff00, 0.8, 3, Some(2),
        "Burns with a blinding white flame.", Some(1755), None),
    element("Al", "Aluminum", 13, PostTransitionMetal, 0xbfa6a6, 0.75, 3, Some(13),
        "The most abundant metal in the Earth's crust.", Some(1825), None),
    element("Si", "Silicon", 14, Metalloid, 0xf0c8a0, 0.75, 3, Some(14),
        "The heart of sand, glass and microchips.", Some(1824), None),
    element("P", "Phosphorus", 15, Nonmetal, 0xff8000, 0.7, 3, Some(15),
        "Its white form glows in the dark as it slowly oxidizes.", Some(1669), None),
    element("S", "Sulfur", 16, Nonmetal, 0xffff30, 0.7, 3, Some(16),
        "The brimstone of old, a yellow solid with a famous smell.", None, Some("🜍")),
    element("Cl", "Chlorine", 17, Halogen, 0x1ff01f, 0.7, 3, Some(17),
        "A pale green, toxic gas used to purify water.", Some(1774), None),
    element("Ar", "Argon", 18, NobleGas, 0x80d1e3, 0.7, 3, Some(18),
        "The most common noble gas in air.", Some(1894), None),
    element("K", "Potassium", 19, Alkali, 0x8f40d4, 1.0, 4, Some(1),
        "Even more reactive with water than sodium.", Some(1807), None),
    element("Ca", "Calcium", 20, AlkalineEarth, 0x3dff00, 0.9, 4, Some(2),
        "The mineral of bones, shells and limestone.", Some(1808), None),
    element("Ti", "Titanium", 22, TransitionMetal, 0xbfc2c7, 0.8, 4, Some(4),
        "Strong, light and highly resistant to corrosion.", Some(1791), None),
    element("Cr", "Chromium", 24, TransitionMetal, 0x8a99c7, 0.75, 4, Some(6),
        "Gives rubies their red and chrome its shine.", Some(1797), None),
    element("Mn", "Manganese", 25, TransitionMetal, 0x9c7ac7, 0.75, 4, Some(7),
        "Essential for making tough steels.", Some(1774), None),
    element("Fe", "Iron", 26, TransitionMetal, 0xe06633, 0.75, 4, Some(8),
        "The metal of tools and weapons, and of Mars in alchemy.", None, Some("♂")),
    element("Co", "Cobalt", 27, TransitionMetal, 0xf090a0, 0.75, 4, Some(9),
        "Lends its deep blue to glass and ceramics.", Some(1735), None),
    element("Ni", "Nickel", 28, TransitionMetal, 0x50d050, 0.75, 4, Some(10),
        "A silvery metal used in coins and as a catalyst.", Some(1751), None),
    element("Cu", "Copper", 29, TransitionMetal, 0xc88033, 0.75, 4, Some(11),
        "A reddish conductor, sacred to Venus in alchemy.", None, Some("♀")),
    element("Zn", "Zinc", 30, TransitionMetal, 0x7d80b0, 0.75, 4, Some(12),
        "Protects steel from rust by galvanizing.", Some(1746), None),
    element("Ga", "Gallium", 31, PostTransitionMetal, 0xc28f8f, 0.75, 4, Some(13),
        "Melts in the palm of your hand.", Some(1875), None),
    element("Ge", "Germanium", 32, Metalloid, 0x668f8f, 0.75, 4, Some(14),
        "A semiconductor predicted by Mendeleev before its discovery.", Some(1886), None),
    element("As", "Arsenic", 33, Metalloid, 0xbd80e3, 0.75, 4, Some(15),
        "A notorious poison with a long alchemical history.", Some(1250), Some("🜺")),
    element("Se", "Selenium", 34, Nonmetal, 0xffa100, 0.75, 4, Some(16),
        "Conducts electricity better in the light than in the dark.", Some(1817), None),
    element("Br", "Bromine", 35, Halogen, 0xa62929, 0.75, 4, Some(17),
        "One of only two elements that are liquid at room temperature.", Some(1826), None),
    element("Kr", "Krypton", 36, NobleGas, 0x5cb8d1, 0.75, 4, Some(18),
        "A noble gas used in high-performance lighting.", Some(1898), None),
    element("Ag", "Silver", 47, TransitionMetal, 0xc0c0c0, 0.8, 5, Some(11),
        "The best electrical conductor, the metal of the Moon.", None, Some("☽")),
    element("Sn", "Tin", 50, PostTransitionMetal, 0x668080, 0.8, 5, Some(14),
        "Alloyed with copper it made the Bronze Age.", None, Some("♃")),
    element("I", "Iodine", 53, Halogen, 0x940094, 0.8, 5, Some(17),
        "Sublimes into a violet vapor.", Some(1811), None),
    element("Xe", "Xenon", 54, NobleGas, 0x429eb0, 0.8, 5, Some(18),
        "A heavy noble gas that can, with effort, be made to react.", Some(1898), None),
    element("La", "Lanthanum", 57, Lanthanide, 0x70d4ff, 0.9, 6, None,
        "The first of the rare earth elements.", Some(1839), None),
    element("Ce", "Cerium", 58, Lanthanide, 0xffffc7, 0.9, 6, None,
        "The most abundant rare earth, used in lighter flints.", Some(1803), None),
    element("Pt", "Platinum", 78, TransitionMetal, 0xd0d0e0, 0.8, 6, Some(10),
        "A precious metal and a superb catalyst.", Some(1735), None),
    element("Au", "Gold", 79, TransitionMetal, 0xffd123, 0.8, 6, Some(11),
        "The noble metal alchemists sought, symbol of the Sun.", None, Some("☉")),
    element("Hg", "Mercury", 80, TransitionMetal, 0xb8b8d0, 0.8, 6, Some(12),
        "Quicksilver, the liquid metal of Mercury.", None, Some("☿")),
    element("Pb", "Lead", 82, PostTransitionMetal, 0x575961, 0.85, 6, Some(14),
        "The base metal of Saturn that alchemists hoped to transmute.", None, Some("♄")),
    element("Rn", "Radon", 86, NobleGas, 0x428296, 0.85, 6, Some(18),
        "A radioactive noble gas that seeps from rocks.", Some(1899), None),
    element("Ra", "Radium", 88, AlkalineEarth, 0x007d00, 0.95, 7, Some(2),
        "Glows faintly from its own radioactivity.", Some(1898), None),
    element("U", "Uranium", 92, Actinide, 0x008fff, 0.95, 7, None,
        "The heavy fuel of nuclear reactors.", Some(1789), None),
    element("Pu", "Plutonium", 94, Actinide, 0x006bff, 0.95, 7, None,
        "A synthetic element first made in 1940.", Some(1940), None),
];

/// Read-only view over the lab's elements
#[derive(Debug, Clone, Copy)]
pub struct ElementTable {
    elements: &'static [Element],
}

impl Default for ElementTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ElementTable {
    pub fn standard() -> Self {
        Self { elements: ELEMENTS }
    }

    pub fn get(&self, symbol: &str) -> Option<&'static Element> {
        self.elements.iter().find(|e| e.symbol == symbol)
    }

    pub fn all(&self) -> &'static [Element] {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn by_category(&self, category: ElementCategory) -> impl Iterator<Item = &'static Element> {
        self.elements.iter().filter(move |e| e.category == category)
    }

    pub fn period(&self, period: u8) -> impl Iterator<Item = &'static Element> {
        self.elements.iter().filter(move |e| e.period == period)
    }

    pub fn group(&self, group: u8) -> impl Iterator<Item = &'static Element> {
        self.elements.iter().filter(move |e| e.group == Some(group))
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static Element> {
        if self.elements.is_empty() {
            return None;
        }
        Some(&self.elements[rng.gen_range(0..self.elements.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_symbols_are_unique() {
        let table = ElementTable::standard();
        let symbols: HashSet<_> = table.all().iter().map(|e| e.symbol).collect();
        assert_eq!(symbols.len(), table.len());
    }

    #[test]
    fn test_sorted_by_atomic_number() {
        let numbers: Vec<u8> = ElementTable::standard().all().iter().map(|e| e.atomic_number).collect();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lookup_by_symbol() {
        let table = ElementTable::standard();
        let oxygen = table.get("O").unwrap();
        assert_eq!(oxygen.name, "Oxygen");
        assert_eq!(oxygen.category, ElementCategory::Nonmetal);
        assert!(table.get("Xx").is_none());
        assert!(table.get("o").is_none());
    }

    #[test]
    fn test_noble_gases_sit_in_group_18() {
        let table = ElementTable::standard();
        let noble: Vec<_> = table.by_category(ElementCategory::NobleGas).collect();
        assert_eq!(noble.len(), 6);
        assert!(noble.iter().all(|e| e.group == Some(18)));
        assert_eq!(table.group(18).count(), noble.len());
    }

    #[test]
    fn test_f_block_has_no_group() {
        let table = ElementTable::standard();
        for e in table.all() {
            let f_block = matches!(e.category, ElementCategory::Lanthanide | ElementCategory::Actinide);
            assert_eq!(e.group.is_none(), f_block, "{}", e.symbol);
        }
    }

    #[test]
    fn test_category_predicates_partition() {
        for category in ElementCategory::ALL {
            let flags = [category.is_metallic(), category.is_nonmetallic(), category.is_noble_gas()];
            let set = flags.iter().filter(|f| **f).count();
            if category == ElementCategory::Metalloid {
                assert_eq!(set, 0);
            } else {
                assert_eq!(set, 1, "{:?}", category);
            }
        }
    }

    #[test]
    fn test_random_returns_table_member() {
        let table = ElementTable::standard();
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let picked = table.random(&mut rng).unwrap();
            assert!(table.get(picked.symbol).is_some());
        }
    }

    #[test]
    fn test_discovery_label() {
        let table = ElementTable::standard();
        assert_eq!(table.get("Au").unwrap().discovery_label(), "Known since antiquity");
        assert_eq!(table.get("O").unwrap().discovery_label(), "1774");
    }
}
