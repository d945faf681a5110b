//! World state - towns and the milestones that outlive any single run
//!
//! The world is shared across lives: facility construction and the land
//! grant mutate it, and the host must persist it immediately after those
//! milestones (the engine surfaces them as `world_changed`).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::TownSeed;
use crate::core::config::{TRAVEL_BASE_MINS, TRAVEL_MAX_MINS};
use crate::core::types::{Facility, TownKind};

/// Independently-buildable town upgrades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facilities {
    pub blacksmith: bool,
    pub store: bool,
    pub infrastructure: bool,
}

impl Facilities {
    /// Starting state of seeded visible towns: services exist, but no one
    /// has invested in infrastructure
    pub fn seeded() -> Self {
        Self {
            blacksmith: true,
            store: true,
            infrastructure: false,
        }
    }

    pub fn has(&self, facility: Facility) -> bool {
        match facility {
            Facility::Blacksmith => self.blacksmith,
            Facility::Store => self.store,
            Facility::Infrastructure => self.infrastructure,
        }
    }

    pub fn build(&mut self, facility: Facility) {
        match facility {
            Facility::Blacksmith => self.blacksmith = true,
            Facility::Store => self.store = true,
            Facility::Infrastructure => self.infrastructure = true,
        }
    }

    pub fn count_built(&self) -> u32 {
        u32::from(self.blacksmith) + u32::from(self.store) + u32::from(self.infrastructure)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Town {
    pub id: String,
    /// Hidden towns are unnamed until revealed
    pub name: Option<String>,
    pub kind: TownKind,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default = "default_tier")]
    pub travel_tier: u8,
}

fn default_tier() -> u8 {
    2
}

impl Town {
    /// Display label, e.g. `Rivergate (Town)`
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.kind.label()),
            None => "Unknown".to_string(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.unlocked && self.name.is_some()
    }
}

/// One-shot world milestones, global across lives
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldStory {
    /// The land grant can only ever be awarded once, across all lives
    pub land_grant_ever_unlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub towns: Vec<Town>,
    #[serde(default)]
    pub story: WorldStory,
}

impl World {
    /// Build a fresh world from catalog town seeds
    pub fn from_seeds(seeds: &[TownSeed]) -> Self {
        let towns = seeds
            .iter()
            .map(|seed| Town {
                id: seed.id.clone(),
                name: seed.name.clone(),
                kind: seed.kind,
                blurb: seed.blurb.clone(),
                hidden: seed.hidden,
                unlocked: !seed.hidden,
                facilities: if seed.hidden {
                    Facilities::default()
                } else {
                    Facilities::seeded()
                },
                travel_tier: seed.kind.travel_tier(),
            })
            .collect();
        Self {
            towns,
            story: WorldStory::default(),
        }
    }

    pub fn town(&self, id: &str) -> Option<&Town> {
        self.towns.iter().find(|t| t.id == id)
    }

    pub fn town_mut(&mut self, id: &str) -> Option<&mut Town> {
        self.towns.iter_mut().find(|t| t.id == id)
    }

    /// Towns a character can see and travel to
    pub fn visible_towns(&self) -> impl Iterator<Item = &Town> {
        self.towns.iter().filter(|t| t.is_visible())
    }

    pub fn random_start_town(&self, rng: &mut impl Rng) -> Option<&Town> {
        let visible: Vec<&Town> = self.visible_towns().collect();
        if visible.is_empty() {
            return None;
        }
        Some(visible[rng.gen_range(0..visible.len())])
    }

    /// In-game minutes to travel between two towns
    ///
    /// Tier difference drives the cost; same-tier trips still take a full
    /// base step. Unknown towns price at the base cost.
    pub fn travel_cost_mins(&self, from: &str, to: &str) -> i64 {
        let (Some(a), Some(b)) = (self.town(from), self.town(to)) else {
            return TRAVEL_BASE_MINS;
        };
        let tier_gap = i64::from(a.travel_tier.abs_diff(b.travel_tier)).max(1);
        (TRAVEL_BASE_MINS * tier_gap).clamp(TRAVEL_BASE_MINS, TRAVEL_MAX_MINS)
    }

    /// Reveal the first hidden town as the character's land grant
    ///
    /// Names it after the family, resets facilities to nothing built, and
    /// sets the global one-shot flag. Returns the revealed town.
    pub fn reveal_grant_town(&mut self, family_name: &str) -> Option<&Town> {
        if self.story.land_grant_ever_unlocked {
            return None;
        }
        let slot = self.towns.iter_mut().find(|t| t.hidden)?;
        slot.hidden = false;
        slot.unlocked = true;
        slot.name = Some(family_name.to_string());
        slot.kind = TownKind::Town;
        slot.blurb = "A newly granted domain, yours to oversee.".to_string();
        slot.facilities = Facilities::default();
        slot.travel_tier = TownKind::Town.travel_tier();
        self.story.land_grant_ever_unlocked = true;
        let id = slot.id.clone();
        self.town(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn world() -> World {
        World::from_seeds(Catalog::builtin().town_seeds())
    }

    #[test]
    fn test_seeded_world_visibility() {
        let w = world();
        assert_eq!(w.towns.len(), 5);
        assert_eq!(w.visible_towns().count(), 3);
        assert!(w.town("hidden_1").unwrap().name.is_none());
        assert!(w.town("town_rivergate").unwrap().facilities.blacksmith);
        assert!(!w.town("hidden_1").unwrap().facilities.blacksmith);
    }

    #[test]
    fn test_travel_cost_by_tier() {
        let w = world();
        // town <-> town: same tier, one base step
        assert_eq!(w.travel_cost_mins("town_rivergate", "town_stonevale"), 480);
        // town <-> city: one tier apart, still one step
        assert_eq!(w.travel_cost_mins("town_rivergate", "city_aurum"), 480);
        // unknown towns price at base
        assert_eq!(w.travel_cost_mins("nowhere", "city_aurum"), 480);
    }

    #[test]
    fn test_land_grant_is_global_one_shot() {
        let mut w = world();
        let granted = w.reveal_grant_town("Valen").unwrap();
        assert_eq!(granted.name.as_deref(), Some("Valen"));
        assert!(granted.unlocked && !granted.hidden);
        assert_eq!(granted.facilities.count_built(), 0);
        assert!(w.story.land_grant_ever_unlocked);

        // a second life can never be granted land
        assert!(w.reveal_grant_town("Other").is_none());
        assert!(w.town("hidden_2").unwrap().hidden);
    }
}
