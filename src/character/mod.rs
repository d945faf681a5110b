//! Character - the mutable record of one life
//!
//! Owned by the host, mutated only through engine entry points. Everything
//! here is plain serializable state; behavior lives under `engine`.

pub mod guild;
pub mod inventory;
pub mod log;
pub mod task;

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ClassMods, GearSlots, StatGains};
use crate::core::config::{
    ADULT_AGE, GOLD_CAP, META_GOLD_RATE, STARTING_AGE, STAT_CAP,
};
use crate::core::error::{EngineError, Result};
use crate::core::types::{Gender, LocationId, LogCategory, RunId, Stage, StoryFlag};
use crate::engine::encounter::Encounter;
use crate::meta::MetaLedger;
use crate::world::World;

pub use guild::GuildStanding;
pub use inventory::Inventory;
pub use log::{EventLog, LogEntry};
pub use task::{ActiveTask, QueuedActivity, TaskTimer};

/// Decaying risk-mitigation buffs; consumed per adventure
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buffs {
    pub supplies: f64,
}

/// Meta points converted into starting advantages at life start
///
/// Each stat point costs one meta point; gold costs one point per
/// `META_GOLD_RATE` gold.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaSpend {
    pub intelligence: u32,
    pub strength: u32,
    pub magic: u32,
    pub charm: u32,
    pub luck: u32,
    pub gold: u64,
}

impl MetaSpend {
    pub fn cost(&self) -> u64 {
        u64::from(self.intelligence)
            + u64::from(self.strength)
            + u64::from(self.magic)
            + u64::from(self.charm)
            + u64::from(self.luck)
            + self.gold / META_GOLD_RATE
    }
}

/// Everything needed to begin a life
#[derive(Debug, Clone)]
pub struct LifeRequest {
    pub name: String,
    pub gender: Gender,
    pub family_id: String,
    /// Generated from syllables when absent
    pub family_name: Option<String>,
    pub spend: MetaSpend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: RunId,
    pub name: String,
    pub gender: Gender,
    pub family_id: String,
    pub family_name: String,
    #[serde(default)]
    pub class_id: Option<String>,

    pub intelligence: u32,
    pub strength: u32,
    pub magic: u32,
    pub charm: u32,
    pub luck: u32,

    pub energy: u32,
    pub energy_max: u32,
    pub health: u32,
    pub health_max: u32,
    pub gold: u64,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub gear: GearSlots,

    pub age: u32,
    pub stage: Stage,
    pub stage_total_mins: i64,
    /// May go negative transiently; the aging controller reconciles it
    pub stage_remaining_mins: i64,

    pub current_town: String,
    pub current_location: LocationId,
    #[serde(default)]
    pub owned_town: Option<String>,
    #[serde(default)]
    pub home_locked: bool,
    #[serde(default)]
    pub rent_free: bool,

    #[serde(default)]
    pub guild: GuildStanding,
    #[serde(default)]
    pub buffs: Buffs,
    #[serde(default)]
    pub flags: BTreeSet<StoryFlag>,
    /// Consumed by the aging controller to reveal the land grant
    #[serde(default)]
    pub pending_land_invite: bool,

    #[serde(default)]
    pub task: Option<ActiveTask>,
    #[serde(default)]
    pub queue: Vec<QueuedActivity>,
    #[serde(default)]
    pub encounter: Option<Encounter>,

    #[serde(default)]
    pub log: EventLog,
    #[serde(default)]
    pub lifetime_actions: u64,
    #[serde(default)]
    pub lifetime_adventures: u64,

    pub alive: bool,
    #[serde(default)]
    pub cause_of_death: Option<String>,
}

impl Character {
    /// Begin a new life: debit the ledger, apply family mods and the meta
    /// spend, and place the character in a random visible town.
    pub fn begin(
        catalog: &Catalog,
        world: &World,
        ledger: &mut MetaLedger,
        request: LifeRequest,
        rng: &mut impl Rng,
        now_ms: u64,
    ) -> Result<Self> {
        ledger.spend(request.spend.cost())?;

        let start_town = world
            .random_start_town(rng)
            .ok_or_else(|| EngineError::Catalog("world has no visible town to start in".into()))?;
        let start_town_label = start_town.label();
        let start_town_id = start_town.id.clone();

        let name: String = request.name.trim().chars().take(20).collect();
        let family_name = match request.family_name {
            Some(fname) if !fname.trim().is_empty() => {
                fname.trim().chars().take(18).collect()
            }
            _ => generate_family_name(rng),
        };

        let stage = Stage::Childhood;
        let mut character = Self {
            id: RunId::new(),
            name: if name.is_empty() { "Alex".into() } else { name },
            gender: request.gender,
            family_id: request.family_id.clone(),
            family_name,
            class_id: None,

            intelligence: 5,
            strength: 5,
            magic: 3,
            charm: 3,
            luck: 3,

            energy: 80,
            energy_max: 100,
            health: 100,
            health_max: 100,
            gold: 20,
            inventory: Inventory::new(),
            gear: GearSlots::default(),

            age: STARTING_AGE,
            stage,
            stage_total_mins: stage.allotment_mins(),
            stage_remaining_mins: stage.allotment_mins(),

            current_town: start_town_id,
            current_location: LocationId::Home,
            owned_town: None,
            home_locked: false,
            rent_free: false,

            guild: GuildStanding::default(),
            buffs: Buffs::default(),
            flags: BTreeSet::new(),
            pending_land_invite: false,

            task: None,
            queue: Vec::new(),
            encounter: None,

            log: EventLog::new(),
            lifetime_actions: 0,
            lifetime_adventures: 0,

            alive: true,
            cause_of_death: None,
        };

        let family_label = if let Some(family) = catalog.family(&request.family_id) {
            character.gold = (character.gold + family.mods.gold).min(GOLD_CAP);
            character.intelligence =
                (character.intelligence + family.mods.intelligence).min(STAT_CAP);
            character.strength = (character.strength + family.mods.strength).min(STAT_CAP);
            character.magic = (character.magic + family.mods.magic).min(STAT_CAP);
            character.charm = (character.charm + family.mods.charm).min(STAT_CAP);
            character.luck = (character.luck + family.mods.luck).min(STAT_CAP);
            if let Some(energy_max) = family.mods.energy_max {
                character.energy_max = energy_max;
            }
            if let Some(health_max) = family.mods.health_max {
                character.health_max = health_max;
            }
            family.name.clone()
        } else {
            request.family_id.clone()
        };

        let spend = request.spend;
        character.intelligence = (character.intelligence + spend.intelligence).min(STAT_CAP);
        character.strength = (character.strength + spend.strength).min(STAT_CAP);
        character.magic = (character.magic + spend.magic).min(STAT_CAP);
        character.charm = (character.charm + spend.charm).min(STAT_CAP);
        character.luck = (character.luck + spend.luck).min(STAT_CAP);
        character.gold = (character.gold + spend.gold).min(GOLD_CAP);

        character.energy = character.energy.min(character.energy_max);
        character.health = character.health.min(character.health_max);

        character.note(
            now_ms,
            LogCategory::System,
            format!("You begin a new life at age {}.", character.age),
        );
        character.note(
            now_ms,
            LogCategory::System,
            format!(
                "Family name: {}. Origin: {}.",
                character.family_name, family_label
            ),
        );
        character.note(
            now_ms,
            LogCategory::Story,
            format!("You are born in {}.", start_town_label),
        );
        character.story_once(
            StoryFlag::LifeStart,
            "A familiar feeling you cannot name, like waking from a dream you already lived.",
            now_ms,
        );

        Ok(character)
    }

    /// Append to the in-game log
    pub fn note(&mut self, now_ms: u64, category: LogCategory, message: impl Into<String>) {
        self.log.push(now_ms, category, message);
    }

    /// Fire a one-shot story beat; returns false if it already fired
    pub fn story_once(&mut self, flag: StoryFlag, message: &str, now_ms: u64) -> bool {
        if self.flags.contains(&flag) {
            return false;
        }
        self.flags.insert(flag);
        self.note(now_ms, LogCategory::Story, format!("Story: {}", message));
        true
    }

    pub fn is_adult(&self) -> bool {
        self.age >= ADULT_AGE
    }

    pub fn task_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn encounter_active(&self) -> bool {
        self.encounter.is_some()
    }

    pub fn credit_gold(&mut self, amount: u64) {
        self.gold = (self.gold + amount).min(GOLD_CAP);
    }

    /// Debit gold; false (and no change) when short
    pub fn debit_gold(&mut self, amount: u64) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }

    pub fn add_energy(&mut self, amount: u32) {
        self.energy = (self.energy + amount).min(self.energy_max);
    }

    pub fn drain_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    pub fn add_health(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.health_max);
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Apply completion stat gains, scaled by class multipliers
    pub fn apply_stat_gains(&mut self, gains: &StatGains, mods: &ClassMods) {
        let scaled = |value: u32, mult: f64| (f64::from(value) * mult).round() as u32;
        self.intelligence = (self.intelligence + gains.intelligence).min(STAT_CAP);
        self.strength = (self.strength + gains.strength).min(STAT_CAP);
        self.magic = (self.magic + scaled(gains.magic, mods.magic_gain_mult)).min(STAT_CAP);
        self.charm = (self.charm + gains.charm).min(STAT_CAP);
        self.luck = (self.luck + scaled(gains.luck, mods.luck_gain_mult)).min(STAT_CAP);
    }
}

/// Two-syllable family names, the naming style of the setting
pub fn generate_family_name(rng: &mut impl Rng) -> String {
    const FIRST: &[&str] = &[
        "Val", "Ar", "Kor", "Fen", "Ryn", "Sol", "Mar", "Eld", "Vyr", "Kai", "Nor", "Sel",
        "Drav", "Lun", "Aster",
    ];
    const SECOND: &[&str] = &[
        "en", "is", "or", "wyn", "a", "eth", "ric", "dor", "lan", "mir", "vane", "holt",
        "crest", "field", "mere",
    ];
    let a = FIRST[rng.gen_range(0..FIRST.len())];
    let b = SECOND[rng.gen_range(0..SECOND.len())];
    format!("{}{}", a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> (Catalog, World, MetaLedger) {
        let catalog = Catalog::builtin();
        let world = World::from_seeds(catalog.town_seeds());
        (catalog, world, MetaLedger::new(100))
    }

    fn request() -> LifeRequest {
        LifeRequest {
            name: "Alex".into(),
            gender: Gender::Male,
            family_id: "humble".into(),
            family_name: Some("Valen".into()),
            spend: MetaSpend::default(),
        }
    }

    #[test]
    fn test_begin_life_applies_family_mods() {
        let (catalog, world, mut ledger) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let c = Character::begin(&catalog, &world, &mut ledger, request(), &mut rng, 0).unwrap();
        assert_eq!(c.age, STARTING_AGE);
        assert_eq!(c.gold, 40); // 20 base + 20 humble
        assert!(c.alive);
        assert!(c.flags.contains(&StoryFlag::LifeStart));
        assert_eq!(ledger.points(), 100);
    }

    #[test]
    fn test_begin_life_debits_spend() {
        let (catalog, world, mut ledger) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut req = request();
        req.spend = MetaSpend {
            strength: 10,
            gold: 50,
            ..MetaSpend::default()
        };
        let c = Character::begin(&catalog, &world, &mut ledger, req, &mut rng, 0).unwrap();
        assert_eq!(c.strength, 15);
        assert_eq!(c.gold, 90);
        assert_eq!(ledger.points(), 100 - 15); // 10 stat + 50/10 gold
    }

    #[test]
    fn test_begin_life_rejects_overspend() {
        let (catalog, world, mut ledger) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut req = request();
        req.spend = MetaSpend {
            intelligence: 500,
            ..MetaSpend::default()
        };
        assert!(Character::begin(&catalog, &world, &mut ledger, req, &mut rng, 0).is_err());
        assert_eq!(ledger.points(), 100);
    }

    #[test]
    fn test_story_once_fires_once() {
        let (catalog, world, mut ledger) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut c =
            Character::begin(&catalog, &world, &mut ledger, request(), &mut rng, 0).unwrap();
        assert!(c.story_once(StoryFlag::Age8, "first", 1));
        assert!(!c.story_once(StoryFlag::Age8, "again", 2));
    }

    #[test]
    fn test_generated_family_name_is_two_syllables() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let name = generate_family_name(&mut rng);
        assert!(!name.is_empty());
        assert!(name.chars().next().unwrap().is_uppercase());
    }
}
