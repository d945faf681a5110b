//! Guild standing - registration, rank, experience, quest count

use serde::{Deserialize, Serialize};

use crate::core::types::GuildRank;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildStanding {
    pub registered: bool,
    pub rank: GuildRank,
    pub xp: u64,
    pub quests_completed: u32,
}

impl Default for GuildStanding {
    fn default() -> Self {
        Self {
            registered: false,
            rank: GuildRank::F,
            xp: 0,
            quests_completed: 0,
        }
    }
}

impl GuildStanding {
    /// Recompute rank from XP; returns the new rank if it increased
    ///
    /// Rank never decreases: XP only accumulates, and the placement rank
    /// from registration may sit above the XP thresholds.
    pub fn recalc_rank(&mut self) -> Option<GuildRank> {
        let best = GuildRank::from_xp(self.xp);
        if best > self.rank {
            self.rank = best;
            Some(best)
        } else {
            None
        }
    }
}

/// Placement rank assigned at registration, from a weighted stat score
pub fn starting_rank(
    strength: u32,
    magic: u32,
    intelligence: u32,
    luck: u32,
    charm: u32,
) -> GuildRank {
    let score = f64::from(strength)
        + f64::from(magic)
        + f64::from(intelligence) * 0.8
        + f64::from(luck) * 0.6
        + f64::from(charm) * 0.4;
    if score >= 90.0 {
        GuildRank::B
    } else if score >= 72.0 {
        GuildRank::C
    } else if score >= 55.0 {
        GuildRank::D
    } else if score >= 40.0 {
        GuildRank::E
    } else {
        GuildRank::F
    }
}
