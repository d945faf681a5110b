//! Content catalog - immutable tables of activities, gear, families,
//! classes, item names and town seeds
//!
//! The engine treats the catalog as read-only, swappable configuration:
//! different catalogs must be drop-in compatible. `Catalog::builtin()`
//! carries the default content; `loader` reads the same shape from TOML.

pub mod activity;
pub mod content;
pub mod gear;
pub mod loader;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{LocationId, TownKind};

pub use activity::{
    ActivityDef, AdventureDef, EffectKind, LocationDef, LootEntry, RequirementKind, Rewards,
    StartCheck, StatGains,
};
pub use gear::{GearDef, GearSlot, GearSlots};

/// Family origin modifiers applied once at life start
///
/// `energy_max` / `health_max` override the baseline caps outright;
/// everything else is additive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyMods {
    pub gold: u64,
    pub intelligence: u32,
    pub strength: u32,
    pub magic: u32,
    pub charm: u32,
    pub luck: u32,
    pub energy_max: Option<u32>,
    pub health_max: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub mods: FamilyMods,
}

/// Class modifiers; multipliers default to 1.0, mitigation to 0.0
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassMods {
    pub risk_mitigate: f64,
    pub guild_xp_mult: f64,
    pub magic_gain_mult: f64,
    pub luck_gain_mult: f64,
    pub loot_mult: f64,
}

impl Default for ClassMods {
    fn default() -> Self {
        Self {
            risk_mitigate: 0.0,
            guild_xp_mult: 1.0,
            magic_gain_mult: 1.0,
            luck_gain_mult: 1.0,
            loot_mult: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub mods: ClassMods,
}

/// Seed record for a world town; hidden towns start unnamed and locked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownSeed {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub kind: TownKind,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub hidden: bool,
}

/// The assembled, indexed content catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    locations: Vec<LocationDef>,
    activities: AHashMap<LocationId, Vec<ActivityDef>>,
    gear: Vec<GearDef>,
    gear_index: AHashMap<String, usize>,
    families: Vec<FamilyDef>,
    classes: Vec<ClassDef>,
    item_names: AHashMap<String, String>,
    towns: Vec<TownSeed>,
}

impl Catalog {
    pub fn from_parts(
        locations: Vec<LocationDef>,
        activities: AHashMap<LocationId, Vec<ActivityDef>>,
        gear: Vec<GearDef>,
        families: Vec<FamilyDef>,
        classes: Vec<ClassDef>,
        item_names: AHashMap<String, String>,
        towns: Vec<TownSeed>,
    ) -> Self {
        let gear_index = gear
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.id.clone(), idx))
            .collect();
        Self {
            locations,
            activities,
            gear,
            gear_index,
            families,
            classes,
            item_names,
            towns,
        }
    }

    /// The default content shipped with the engine
    pub fn builtin() -> Self {
        content::builtin()
    }

    pub fn locations(&self) -> &[LocationDef] {
        &self.locations
    }

    pub fn location(&self, id: LocationId) -> Option<&LocationDef> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Ordered activity list for a location; empty for unknown locations
    pub fn activities_for(&self, location: LocationId) -> &[ActivityDef] {
        self.activities
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn activity(&self, location: LocationId, id: &str) -> Option<&ActivityDef> {
        self.activities_for(location).iter().find(|a| a.id == id)
    }

    pub fn gear(&self, id: &str) -> Option<&GearDef> {
        self.gear_index.get(id).map(|&idx| &self.gear[idx])
    }

    pub fn gear_defs(&self) -> &[GearDef] {
        &self.gear
    }

    pub fn families(&self) -> &[FamilyDef] {
        &self.families
    }

    pub fn family(&self, id: &str) -> Option<&FamilyDef> {
        self.families.iter().find(|f| f.id == id)
    }

    pub fn classes(&self) -> &[ClassDef] {
        &self.classes
    }

    pub fn class(&self, id: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.id == id)
    }

    /// Mods for an optional class id; unknown or unchosen means defaults
    pub fn class_mods(&self, class_id: Option<&str>) -> ClassMods {
        class_id
            .and_then(|id| self.class(id))
            .map(|c| c.mods.clone())
            .unwrap_or_default()
    }

    /// Display name for an item id, falling back to the raw id
    pub fn item_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.item_names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn town_seeds(&self) -> &[TownSeed] {
        &self.towns
    }
}
