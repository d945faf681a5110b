//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single run (one life)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// In-town locations where activities take place
///
/// The set is fixed; which locations are reachable depends on run state
/// (Development exists only in a town the character owns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationId {
    Home,
    Town,
    Guild,
    Forest,
    Mine,
    Travel,
    Development,
}

impl LocationId {
    pub fn label(&self) -> &'static str {
        match self {
            LocationId::Home => "Home",
            LocationId::Town => "Town",
            LocationId::Guild => "Adventurers' Guild",
            LocationId::Forest => "Forest",
            LocationId::Mine => "Mine",
            LocationId::Travel => "Travel",
            LocationId::Development => "Development",
        }
    }
}

/// Life stage with explicit ordering values
///
/// Higher numeric value = later stage. Stages never regress; the aging
/// controller only moves the index forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stage {
    Childhood = 0,
    Teen = 1,
    Adult = 2,
    Elder = 3,
}

impl Stage {
    /// The stage a given age falls into (thresholds 12 / 16 / 60)
    pub fn for_age(age: u32) -> Self {
        match age {
            0..=11 => Stage::Childhood,
            12..=15 => Stage::Teen,
            16..=59 => Stage::Adult,
            _ => Stage::Elder,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Childhood => "Childhood",
            Stage::Teen => "Teen",
            Stage::Adult => "Adult",
            Stage::Elder => "Elder",
        }
    }

    /// In-game days granted per age step
    pub fn days_per_step(&self) -> i64 {
        match self {
            Stage::Childhood => 7,
            Stage::Teen => 10,
            Stage::Adult => 14,
            Stage::Elder => 14,
        }
    }

    /// Stage time allotment in minutes (one age step)
    pub fn allotment_mins(&self) -> i64 {
        self.days_per_step() * 24 * 60
    }

    /// Years gained per age step
    pub fn years_per_step(&self) -> u32 {
        match self {
            Stage::Childhood | Stage::Teen => 1,
            Stage::Adult | Stage::Elder => 2,
        }
    }

    /// Additive death-risk term for risk-bearing activities
    ///
    /// Monotonically increasing by stage: age catches up with everyone.
    pub fn death_age_factor(&self) -> f64 {
        match self {
            Stage::Childhood => 0.00,
            Stage::Teen => 0.01,
            Stage::Adult => 0.02,
            Stage::Elder => 0.05,
        }
    }

    /// Rent charged on each age step spent in this stage, if any
    pub fn rent(&self) -> Option<u64> {
        match self {
            Stage::Childhood | Stage::Teen => None,
            Stage::Adult => Some(50),
            Stage::Elder => Some(80),
        }
    }
}

/// Guild rank ladder, F (lowest) through S
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GuildRank {
    F = 0,
    E = 1,
    D = 2,
    C = 3,
    B = 4,
    A = 5,
    S = 6,
}

impl GuildRank {
    pub const ALL: [GuildRank; 7] = [
        GuildRank::F,
        GuildRank::E,
        GuildRank::D,
        GuildRank::C,
        GuildRank::B,
        GuildRank::A,
        GuildRank::S,
    ];

    /// Guild XP required to hold this rank
    pub fn xp_threshold(&self) -> u64 {
        match self {
            GuildRank::F => 0,
            GuildRank::E => 20,
            GuildRank::D => 60,
            GuildRank::C => 120,
            GuildRank::B => 200,
            GuildRank::A => 320,
            GuildRank::S => 480,
        }
    }

    /// Highest rank whose threshold the given XP meets
    pub fn from_xp(xp: u64) -> Self {
        let mut best = GuildRank::F;
        for rank in GuildRank::ALL {
            if xp >= rank.xp_threshold() {
                best = rank;
            }
        }
        best
    }

    pub fn letter(&self) -> &'static str {
        match self {
            GuildRank::F => "F",
            GuildRank::E => "E",
            GuildRank::D => "D",
            GuildRank::C => "C",
            GuildRank::B => "B",
            GuildRank::A => "A",
            GuildRank::S => "S",
        }
    }
}

/// Category tag on in-game log entries, used by hosts for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    System,
    Queue,
    Combat,
    Story,
    Travel,
}

/// One-shot narrative markers; each fires at most once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryFlag {
    LifeStart,
    Age8,
    Age10,
    Age12,
    Age14,
    Age16,
    Age60,
    BoughtSupplies,
    GuildRegistered,
    RankD,
    RankB,
    KickedOut,
    HomeRestored,
    BlacksmithFirst,
    TownShaped,
    RoyalConvoySeen,
    RoyalConvoyResolved,
    SavedNobleChild,
}

/// Settlement size class; affects travel tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TownKind {
    Town,
    City,
}

impl TownKind {
    pub fn label(&self) -> &'static str {
        match self {
            TownKind::Town => "Town",
            TownKind::City => "City",
        }
    }

    /// Travel tier used for inter-town time costs
    pub fn travel_tier(&self) -> u8 {
        match self {
            TownKind::Town => 2,
            TownKind::City => 3,
        }
    }
}

/// Persistent town facility upgrades, independently buildable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Blacksmith,
    Store,
    Infrastructure,
}

impl Facility {
    pub fn label(&self) -> &'static str {
        match self {
            Facility::Blacksmith => "Blacksmith",
            Facility::Store => "Store",
            Facility::Infrastructure => "Infrastructure",
        }
    }
}

/// Format a minute count as `1d 4h 30m`
pub fn format_mins(minutes: i64) -> String {
    let mins = minutes.max(0);
    let d = mins / (60 * 24);
    let h = (mins - d * 60 * 24) / 60;
    let m = mins % 60;
    let mut parts = Vec::new();
    if d > 0 {
        parts.push(format!("{}d", d));
    }
    if h > 0 || d > 0 {
        parts.push(format!("{}h", h));
    }
    parts.push(format!("{}m", m));
    parts.join(" ")
}
