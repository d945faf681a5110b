//! Road encounters - a choice-gated interruption to scheduling
//!
//! Triggered only by completing travel-like activities. While one is
//! active the scheduler refuses starts and queue pulls; resolving it is
//! the only way forward. At most one can be active at a time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::character::Character;
use crate::core::config::{ENCOUNTER_RISK_CEILING, ENCOUNTER_RISK_FLOOR};
use crate::core::types::{LogCategory, StoryFlag};
use crate::engine::queue;
use crate::meta::{settle_death, DeathSummary, MetaLedger};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Antagonist {
    Bandits,
    Beasts,
}

impl Antagonist {
    pub fn label(&self) -> &'static str {
        match self {
            Antagonist::Bandits => "bandits",
            Antagonist::Beasts => "beasts",
        }
    }

    /// Base death chance of intervening against this antagonist
    fn base_risk(&self) -> f64 {
        match self {
            Antagonist::Bandits => 0.42,
            Antagonist::Beasts => 0.50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convoy {
    Merchant,
    Transport,
    Royal,
}

impl Convoy {
    pub fn label(&self) -> &'static str {
        match self {
            Convoy::Merchant => "merchant",
            Convoy::Transport => "transport",
            Convoy::Royal => "royal",
        }
    }

    /// Risk adjustment: royal guards fight beside you, merchants panic
    fn risk_mod(&self) -> f64 {
        match self {
            Convoy::Royal => -0.08,
            Convoy::Merchant => 0.05,
            Convoy::Transport => 0.0,
        }
    }

    fn base_reward(&self) -> u64 {
        match self {
            Convoy::Royal => 140,
            Convoy::Merchant => 80,
            Convoy::Transport => 45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterChoice {
    HeadOn,
    Sneak,
    Ignore,
}

/// A presentable choice; disabled options stay visible but unpickable
#[derive(Debug, Clone)]
pub struct EncounterOption {
    pub choice: EncounterChoice,
    pub label: &'static str,
    pub enabled: bool,
}

/// The active encounter variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub antagonist: Antagonist,
    pub convoy: Convoy,
}

impl Encounter {
    pub fn title(&self) -> &'static str {
        "Convoy in Trouble"
    }

    pub fn description(&self) -> String {
        format!(
            "You spot a {} convoy under attack by {}.",
            self.convoy.label(),
            self.antagonist.label()
        )
    }

    /// The 2-3 mutually exclusive choices; sneaking is impossible against
    /// beasts (they smell you coming)
    pub fn options(&self) -> Vec<EncounterOption> {
        let sneak_enabled = self.antagonist != Antagonist::Beasts;
        vec![
            EncounterOption {
                choice: EncounterChoice::HeadOn,
                label: "Attack head-on",
                enabled: true,
            },
            EncounterOption {
                choice: EncounterChoice::Sneak,
                label: "Sneak attack",
                enabled: sneak_enabled,
            },
            EncounterOption {
                choice: EncounterChoice::Ignore,
                label: "Ignore and leave",
                enabled: true,
            },
        ]
    }

    pub fn choice_enabled(&self, choice: EncounterChoice) -> bool {
        self.options()
            .iter()
            .any(|o| o.choice == choice && o.enabled)
    }
}

/// Death probability for intervening, by choice
///
/// Structurally the activity formula's sibling, with its own weights and
/// a higher floor: joining a skirmish is never routine.
pub fn death_chance(encounter: &Encounter, choice: EncounterChoice, character: &Character) -> f64 {
    let choice_mod = match choice {
        EncounterChoice::HeadOn => 0.12,
        EncounterChoice::Sneak => -0.08,
        EncounterChoice::Ignore => return 0.0,
    };
    let mitigation =
        f64::from(character.strength) / 220.0 + f64::from(character.luck) / 260.0;
    (encounter.antagonist.base_risk() + encounter.convoy.risk_mod() + choice_mod - mitigation)
        .clamp(ENCOUNTER_RISK_FLOOR, ENCOUNTER_RISK_CEILING)
}

/// Gold paid by the grateful survivors
pub fn reward_gold(encounter: &Encounter, choice: EncounterChoice) -> u64 {
    let base = encounter.convoy.base_reward() as f64;
    let mult = if choice == EncounterChoice::HeadOn {
        1.15
    } else {
        1.0
    };
    (base * mult).floor() as u64
}

/// Roll an encounter after a travel-like completion
///
/// Returns true if an encounter is active afterwards. A trigger attempt
/// while one is already active is a no-op that reports active.
pub(crate) fn maybe_trigger(
    character: &mut Character,
    world: &World,
    chance: f64,
    rng: &mut impl Rng,
    now_ms: u64,
) -> bool {
    if character.encounter_active() {
        return true;
    }
    if chance <= 0.0 || rng.gen::<f64>() >= chance {
        return false;
    }

    let antagonist = if rng.gen::<f64>() < 0.55 {
        Antagonist::Bandits
    } else {
        Antagonist::Beasts
    };

    let royal_eligible = !world.story.land_grant_ever_unlocked
        && !character.flags.contains(&StoryFlag::RoyalConvoySeen);
    let convoy = if royal_eligible && rng.gen::<f64>() < 0.15 {
        character.flags.insert(StoryFlag::RoyalConvoySeen);
        Convoy::Royal
    } else if rng.gen::<f64>() < 0.55 {
        Convoy::Merchant
    } else {
        Convoy::Transport
    };

    let encounter = Encounter { antagonist, convoy };
    character.note(
        now_ms,
        LogCategory::Travel,
        "Something interrupts your journey...",
    );
    character.note(now_ms, LogCategory::Story, encounter.description());
    character.encounter = Some(encounter);
    true
}

/// What resolving an encounter produced
#[derive(Debug)]
pub enum ResolveOutcome {
    /// No active encounter, or the choice was disabled; nothing changed
    Rejected,
    Ignored,
    Survived { gold: u64, invited: bool },
    Died(DeathSummary),
}

/// Resolve the active encounter with a player choice
///
/// Scheduling resumes afterwards: the queue is pulled on any outcome that
/// leaves the character alive.
pub fn resolve(
    catalog: &Catalog,
    world: &World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    choice: EncounterChoice,
    rng: &mut impl Rng,
    now_ms: u64,
) -> ResolveOutcome {
    let Some(encounter) = character.encounter.clone() else {
        character.note(now_ms, LogCategory::System, "There is nothing to resolve.");
        return ResolveOutcome::Rejected;
    };
    if !encounter.choice_enabled(choice) {
        character.note(
            now_ms,
            LogCategory::System,
            "You cannot sneak up on beasts.",
        );
        return ResolveOutcome::Rejected;
    }

    character.encounter = None;
    if encounter.convoy == Convoy::Royal {
        character.flags.insert(StoryFlag::RoyalConvoyResolved);
    }

    if choice == EncounterChoice::Ignore {
        character.note(now_ms, LogCategory::Story, "You leave the convoy behind.");
        queue::try_start_next(catalog, world, character, now_ms);
        return ResolveOutcome::Ignored;
    }

    let chance = death_chance(&encounter, choice, character);
    if rng.gen::<f64>() < chance {
        character.note(now_ms, LogCategory::Combat, "You fall in the skirmish.");
        return ResolveOutcome::Died(settle_death(
            character,
            world,
            ledger,
            "Fell defending a convoy.",
            now_ms,
        ));
    }

    let gold = reward_gold(&encounter, choice);
    character.credit_gold(gold);
    character.note(
        now_ms,
        LogCategory::Combat,
        format!("You help drive off the attackers and earn {} gold.", gold),
    );

    let mut invited = false;
    if encounter.convoy == Convoy::Royal {
        invited = check_royal_invite(character, world, rng, now_ms);
    }

    queue::try_start_next(catalog, world, character, now_ms);
    ResolveOutcome::Survived { gold, invited }
}

/// A rescued royal convoy may carry word of you to the palace
fn check_royal_invite(
    character: &mut Character,
    world: &World,
    rng: &mut impl Rng,
    now_ms: u64,
) -> bool {
    if character.pending_land_invite || world.story.land_grant_ever_unlocked {
        return false;
    }
    if character.is_adult() || character.strength <= 80 {
        return false;
    }
    let chance = 0.25 + f64::from(character.luck) / 100.0;
    if rng.gen::<f64>() >= chance {
        return false;
    }
    character.pending_land_invite = true;
    character.story_once(
        StoryFlag::SavedNobleChild,
        "A terrified noble child survives because you were there.",
        now_ms,
    );
    character.note(
        now_ms,
        LogCategory::Story,
        "Word of your bravery spreads beyond the roads.",
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sneak_disabled_against_beasts() {
        let vs_beasts = Encounter {
            antagonist: Antagonist::Beasts,
            convoy: Convoy::Merchant,
        };
        assert!(!vs_beasts.choice_enabled(EncounterChoice::Sneak));
        assert!(vs_beasts.choice_enabled(EncounterChoice::HeadOn));
        assert!(vs_beasts.choice_enabled(EncounterChoice::Ignore));

        let vs_bandits = Encounter {
            antagonist: Antagonist::Bandits,
            convoy: Convoy::Merchant,
        };
        assert!(vs_bandits.choice_enabled(EncounterChoice::Sneak));
        assert_eq!(vs_bandits.options().len(), 3);
    }

    #[test]
    fn test_reward_by_convoy_and_choice() {
        let royal = Encounter {
            antagonist: Antagonist::Bandits,
            convoy: Convoy::Royal,
        };
        assert_eq!(reward_gold(&royal, EncounterChoice::Sneak), 140);
        assert_eq!(reward_gold(&royal, EncounterChoice::HeadOn), 161);

        let transport = Encounter {
            antagonist: Antagonist::Bandits,
            convoy: Convoy::Transport,
        };
        assert_eq!(reward_gold(&transport, EncounterChoice::Sneak), 45);
    }
}
