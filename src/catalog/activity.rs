//! Activity definitions - the unit of work a character can perform
//!
//! Activities are pure data. Where the content layer needs conditional or
//! stateful behavior it names a [`RequirementKind`] or [`EffectKind`] and the
//! engine dispatches on the tag, so catalogs can be expressed in TOML and
//! swapped without touching engine code.

use serde::{Deserialize, Serialize};

use crate::core::types::{Facility, GuildRank, LocationId};

/// Outcome of an availability check: either fine, or a user-visible reason
#[derive(Debug, Clone)]
pub struct StartCheck {
    pub ok: bool,
    pub reason: Option<String>,
}

impl StartCheck {
    pub fn yes() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn no(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }

    /// The denial reason, or an empty string when the check passed
    pub fn why(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }
}

/// Primary-stat gains applied at activity completion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatGains {
    pub intelligence: u32,
    pub strength: u32,
    pub magic: u32,
    pub charm: u32,
    pub luck: u32,
}

impl StatGains {
    pub fn is_empty(&self) -> bool {
        self.intelligence == 0
            && self.strength == 0
            && self.magic == 0
            && self.charm == 0
            && self.luck == 0
    }
}

/// Resource rewards; gold is paid at start, the rest at completion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub gold: u64,
    pub health: u32,
    pub guild_xp: u64,
}

/// One entry in an adventure loot table; quantity sampled in [min, max]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: String,
    pub min: u32,
    pub max: u32,
}

/// Risk payload on an adventure (risk-bearing) activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdventureDef {
    /// Base death probability before character factors
    pub base_risk: f64,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    /// Travel-like activities can trigger road encounters
    #[serde(default)]
    pub travel_like: bool,
    /// Independent probability of an encounter on safe completion
    #[serde(default)]
    pub encounter_chance: f64,
}

/// Declarative preconditions checked by `scheduler::can_start`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RequirementKind {
    GuildRegistered,
    GuildNotRegistered,
    GuildRankAtLeast { rank: GuildRank },
    ClassUnchosen,
    HasGold { amount: u64 },
    HasItems { item: String, qty: u32 },
    HomeLocked,
    FacilityBuilt { facility: Facility },
    FacilityMissing { facility: Facility },
    OwnsCurrentTown,
}

/// Declarative completion behavior dispatched by the scheduler
///
/// `BuySupplies` is the one start-time effect: the purchase happens when the
/// errand begins, so the buff is live for whatever comes next.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EffectKind {
    RegisterGuild,
    ChooseClass { class_id: String },
    BuySupplies { cost: u64, potency: f64 },
    RentRoom { cost: u64 },
    EquipGear {
        gear_id: String,
        cost_gold: u64,
        #[serde(default)]
        consumes: Vec<(String, u32)>,
    },
    BuildFacility { facility: Facility, cost: u64 },
}

/// A catalog-defined unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDef {
    pub id: String,
    pub name: String,
    /// One-line flavor text shown by hosts
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub min_age: Option<u32>,
    /// In-game time debited from the stage clock at start
    pub time_cost_mins: i64,
    /// Real elapsed seconds before the task completes
    pub real_duration_secs: u32,
    #[serde(default)]
    pub energy_cost: u32,
    #[serde(default)]
    pub energy_gain: u32,
    #[serde(default)]
    pub stat_gains: StatGains,
    #[serde(default)]
    pub rewards: Rewards,
    #[serde(default)]
    pub requirements: Vec<RequirementKind>,
    #[serde(default)]
    pub adventure: Option<AdventureDef>,
    /// Only queueable activities may enter the pending queue
    #[serde(default)]
    pub queueable: bool,
    /// Travel activities move the character; time cost comes from the world
    #[serde(default)]
    pub travel: bool,
    #[serde(default)]
    pub effect: Option<EffectKind>,
}

impl ActivityDef {
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.real_duration_secs.max(1)) * 1000
    }

    pub fn is_adventure(&self) -> bool {
        self.adventure.is_some()
    }
}

/// A location definition within every town
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDef {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub min_age: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_check() {
        assert!(StartCheck::yes().ok);
        let denied = StartCheck::no("too young");
        assert!(!denied.ok);
        assert_eq!(denied.why(), "too young");
    }

    #[test]
    fn test_duration_floor() {
        let act = ActivityDef {
            id: "nap".into(),
            name: "Nap".into(),
            blurb: String::new(),
            min_age: None,
            time_cost_mins: 120,
            real_duration_secs: 0,
            energy_cost: 0,
            energy_gain: 18,
            stat_gains: StatGains::default(),
            rewards: Rewards::default(),
            requirements: Vec::new(),
            adventure: None,
            queueable: true,
            travel: false,
            effect: None,
        };
        // zero-second content still yields a schedulable task
        assert_eq!(act.duration_ms(), 1000);
    }
}
