//! Animation categories
//!
//! Every reaction carries one category. The 2D preview and the 3D molecule
//! library both dispatch on it, so it is a closed set rather than a free-form
//! string.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCategory {
    Water,
    Salt,
    CarbonMonoxide,
    CarbonDioxide,
    Ammonia,
    Methane,
    HydrogenSulfide,
    MagnesiumOxide,
    AluminumOxide,
    CalciumOxide,
    CopperOxide,
    IronOxide,
    SiliconDioxide,
    SulfurDioxide,
    PhosphorusPentoxide,
    TitaniumOxide,
    ZincOxide,
    RareEarthOxide,
    Crystal,
    Alloy,
    Dangerous,
    Radioactive,
    Impossible,
}

impl AnimationCategory {
    pub const ALL: [AnimationCategory; 23] = [
        AnimationCategory::Water,
        AnimationCategory::Salt,
        AnimationCategory::CarbonMonoxide,
        AnimationCategory::CarbonDioxide,
        AnimationCategory::Ammonia,
        AnimationCategory::Methane,
        AnimationCategory::HydrogenSulfide,
        AnimationCategory::MagnesiumOxide,
        AnimationCategory::AluminumOxide,
        AnimationCategory::CalciumOxide,
        AnimationCategory::CopperOxide,
        AnimationCategory::IronOxide,
        AnimationCategory::SiliconDioxide,
        AnimationCategory::SulfurDioxide,
        AnimationCategory::PhosphorusPentoxide,
        AnimationCategory::TitaniumOxide,
        AnimationCategory::ZincOxide,
        AnimationCategory::RareEarthOxide,
        AnimationCategory::Crystal,
        AnimationCategory::Alloy,
        AnimationCategory::Dangerous,
        AnimationCategory::Radioactive,
        AnimationCategory::Impossible,
    ];

    /// Stable camelCase tag
    pub fn tag(&self) -> &'static str {
        match self {
            AnimationCategory::Water => "water",
            AnimationCategory::Salt => "salt",
            AnimationCategory::CarbonMonoxide => "carbonMonoxide",
            AnimationCategory::CarbonDioxide => "carbonDioxide",
            AnimationCategory::Ammonia => "ammonia",
            AnimationCategory::Methane => "methane",
            AnimationCategory::HydrogenSulfide => "hydrogenSulfide",
            AnimationCategory::MagnesiumOxide => "magnesiumOxide",
            AnimationCategory::AluminumOxide => "aluminumOxide",
            AnimationCategory::CalciumOxide => "calciumOxide",
            AnimationCategory::CopperOxide => "copperOxide",
            AnimationCategory::IronOxide => "ironOxide",
            AnimationCategory::SiliconDioxide => "siliconDioxide",
            AnimationCategory::SulfurDioxide => "sulfurDioxide",
            AnimationCategory::PhosphorusPentoxide => "phosphorusPentoxide",
            AnimationCategory::TitaniumOxide => "titaniumOxide",
            AnimationCategory::ZincOxide => "zincOxide",
            AnimationCategory::RareEarthOxide => "rareEarthOxide",
            AnimationCategory::Crystal => "crystal",
            AnimationCategory::Alloy => "alloy",
            AnimationCategory::Dangerous => "dangerous",
            AnimationCategory::Radioactive => "radioactive",
            AnimationCategory::Impossible => "impossible",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }

    /// Metal symbol whose oxide the category depicts, for the generic oxide builders
    pub fn oxide_metal(&self) -> Option<&'static str> {
        match self {
            AnimationCategory::MagnesiumOxide => Some("Mg"),
            AnimationCategory::AluminumOxide => Some("Al"),
            AnimationCategory::CalciumOxide => Some("Ca"),
            AnimationCategory::CopperOxide => Some("Cu"),
            AnimationCategory::IronOxide => Some("Fe"),
            AnimationCategory::SiliconDioxide => Some("Si"),
            AnimationCategory::SulfurDioxide => Some("S"),
            AnimationCategory::PhosphorusPentoxide => Some("P"),
            AnimationCategory::TitaniumOxide => Some("Ti"),
            AnimationCategory::ZincOxide => Some("Zn"),
            AnimationCategory::RareEarthOxide => Some("La"),
            _ => None,
        }
    }
}

impl fmt::Display for AnimationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
