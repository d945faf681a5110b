//! Load a content catalog from a TOML file
//!
//! Alternative catalogs (different content versions, mods, test fixtures)
//! must be drop-in compatible with the builtin shape.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;

use crate::core::error::{EngineError, Result};
use crate::core::types::LocationId;

use super::activity::{ActivityDef, EffectKind, LocationDef};
use super::gear::GearDef;
use super::{Catalog, ClassDef, FamilyDef, TownSeed};

/// On-disk catalog schema; every section optional so partial catalogs can
/// lean on empty defaults
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    locations: Vec<LocationDef>,
    #[serde(default)]
    activities: AHashMap<LocationId, Vec<ActivityDef>>,
    #[serde(default)]
    gear: Vec<GearDef>,
    #[serde(default)]
    families: Vec<FamilyDef>,
    #[serde(default)]
    classes: Vec<ClassDef>,
    #[serde(default)]
    item_names: AHashMap<String, String>,
    #[serde(default)]
    towns: Vec<TownSeed>,
}

/// Parse a catalog from TOML text
pub fn from_toml_str(raw: &str) -> Result<Catalog> {
    let file: CatalogFile = toml::from_str(raw)?;

    if !file.towns.iter().any(|t| !t.hidden && t.name.is_some()) {
        return Err(EngineError::Catalog(
            "catalog defines no visible, named town to start a life in".into(),
        ));
    }

    for (location, activities) in &file.activities {
        if !file.locations.iter().any(|l| l.id == *location) {
            return Err(EngineError::Catalog(format!(
                "activities defined for undeclared location {:?}",
                location
            )));
        }
        for activity in activities {
            if let Some(EffectKind::EquipGear { gear_id, .. }) = &activity.effect {
                if !file.gear.iter().any(|g| &g.id == gear_id) {
                    return Err(EngineError::Catalog(format!(
                        "activity '{}' equips unknown gear '{}'",
                        activity.id, gear_id
                    )));
                }
            }
        }
    }

    Ok(Catalog::from_parts(
        file.locations,
        file.activities,
        file.gear,
        file.families,
        file.classes,
        file.item_names,
        file.towns,
    ))
}

/// Load a catalog from a TOML file on disk
pub fn load_from_path(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)?;
    from_toml_str(&raw)
}
