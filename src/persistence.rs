//! Snapshot persistence - the full `{character, world, meta}` save shape
//!
//! The engine does not own storage; it produces and consumes JSON strings
//! and the host decides where they live. Imports are parsed fully before
//! anything is applied: a corrupt snapshot is rejected whole, never
//! half-applied. Missing substructures repair to safe defaults via serde,
//! and an in-flight task is never resumed - it is forced back to idle.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::character::Character;
use crate::core::config::{GOLD_CAP, QUEUE_CAPACITY};
use crate::core::error::{EngineError, Result};
use crate::core::types::{LocationId, LogCategory};
use crate::meta::MetaLedger;
use crate::world::World;

pub const SNAPSHOT_VERSION: u32 = 1;

/// A full save: one run, the shared world, the meta balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub character: Character,
    pub world: World,
    pub meta: u64,
}

impl Snapshot {
    pub fn capture(character: &Character, world: &World, ledger: &MetaLedger) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            character: character.clone(),
            world: world.clone(),
            meta: ledger.points(),
        }
    }

    pub fn ledger(&self) -> MetaLedger {
        MetaLedger::new(self.meta)
    }
}

/// Serialize a snapshot to pretty JSON
pub fn export_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse, validate and repair a snapshot
///
/// Rejects version mismatches and parse failures outright. On success the
/// returned snapshot is normalized: task idle, vitals clamped, queue
/// bounded, town references valid.
pub fn import_json(catalog: &Catalog, raw: &str, now_ms: u64) -> Result<Snapshot> {
    let mut snapshot: Snapshot = serde_json::from_str(raw)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(EngineError::Snapshot(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    normalize(catalog, &mut snapshot, now_ms)?;
    Ok(snapshot)
}

fn normalize(catalog: &Catalog, snapshot: &mut Snapshot, now_ms: u64) -> Result<()> {
    let world = &mut snapshot.world;
    if world.towns.is_empty() {
        *world = World::from_seeds(catalog.town_seeds());
    }
    let Some(fallback_town) = world.visible_towns().next().map(|t| t.id.clone()) else {
        return Err(EngineError::Snapshot(
            "world has no visible town to place the character in".into(),
        ));
    };

    let character = &mut snapshot.character;

    // an interrupted task is treated as cancelled, never resumed
    if character.task.take().is_some() {
        character.note(
            now_ms,
            LogCategory::System,
            "A previous task was interrupted. Task cancelled.",
        );
        tracing::debug!("snapshot import cancelled an in-flight task");
    }

    character.energy_max = character.energy_max.max(1);
    character.health_max = character.health_max.max(1);
    character.energy = character.energy.min(character.energy_max);
    character.health = character.health.min(character.health_max);
    character.gold = character.gold.min(GOLD_CAP);
    character.inventory.prune();
    character.queue.truncate(QUEUE_CAPACITY);

    if world.town(&character.current_town).is_none() {
        character.current_town = fallback_town;
        character.current_location = LocationId::Home;
    }
    if let Some(owned) = &character.owned_town {
        if world.town(owned).is_none() {
            character.owned_town = None;
        }
    }

    // re-derive stage bookkeeping; debt on the clock is forgiven at load
    character.stage_total_mins = character.stage.allotment_mins();
    character.stage_remaining_mins = character
        .stage_remaining_mins
        .clamp(0, character.stage_total_mins);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{LifeRequest, MetaSpend};
    use crate::core::types::Gender;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session() -> (Catalog, World, MetaLedger, Character) {
        let catalog = Catalog::builtin();
        let world = World::from_seeds(catalog.town_seeds());
        let mut ledger = MetaLedger::new(40);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let character = Character::begin(
            &catalog,
            &world,
            &mut ledger,
            LifeRequest {
                name: "Alex".into(),
                gender: Gender::Male,
                family_id: "merchant".into(),
                family_name: Some("Valen".into()),
                spend: MetaSpend::default(),
            },
            &mut rng,
            0,
        )
        .unwrap();
        (catalog, world, ledger, character)
    }

    #[test]
    fn test_corrupt_json_is_rejected_whole() {
        let catalog = Catalog::builtin();
        assert!(import_json(&catalog, "{ not json", 0).is_err());
        assert!(import_json(&catalog, "{}", 0).is_err());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let (catalog, world, ledger, character) = session();
        let mut snapshot = Snapshot::capture(&character, &world, &ledger);
        snapshot.version = 99;
        let raw = export_json(&snapshot).unwrap();
        assert!(import_json(&catalog, &raw, 0).is_err());
    }

    #[test]
    fn test_import_forces_task_idle() {
        let (catalog, world, ledger, mut character) = session();
        let request = crate::engine::StartRequest::new(LocationId::Home, "read");
        assert!(crate::engine::start(&catalog, &world, &mut character, &request, 0).ok);
        assert!(character.task_running());

        let raw = export_json(&Snapshot::capture(&character, &world, &ledger)).unwrap();
        let restored = import_json(&catalog, &raw, 100).unwrap();
        assert!(restored.character.task.is_none());
        assert!(restored.character.alive);
    }

    #[test]
    fn test_import_repairs_unknown_town() {
        let (catalog, world, ledger, mut character) = session();
        character.current_town = "town_that_never_was".into();
        let raw = export_json(&Snapshot::capture(&character, &world, &ledger)).unwrap();
        let restored = import_json(&catalog, &raw, 0).unwrap();
        assert!(restored.world.town(&restored.character.current_town).is_some());
        assert_eq!(restored.character.current_location, LocationId::Home);
    }
}
