//! Stage and aging controller
//!
//! Advances age while the stage clock is spent. Each loop iteration adds a
//! full positive allotment to the remaining minutes, so the loop terminates
//! even under deep time debt from one long activity - and the debt carries
//! forward rather than being forgiven.

use rand::Rng;

use crate::catalog::Catalog;
use crate::character::Character;
use crate::core::config::{
    AGE_STEP_ENERGY_RESTOCK, AGE_STEP_HEALTH_RESTOCK, ENERGY_MAX_CEILING, ENERGY_MAX_FLOOR,
    HEALTH_MAX_CEILING, HEALTH_MAX_FLOOR,
};
use crate::core::error::{EngineError, Result};
use crate::core::types::{LogCategory, Stage, StoryFlag};
use crate::engine::{queue, risk};
use crate::meta::{settle_death, DeathSummary, MetaLedger};
use crate::world::World;

/// What a pass of the aging controller did
#[derive(Debug, Default)]
pub struct AgeReport {
    /// Age steps taken (0 when the stage clock was still positive)
    pub steps: u32,
    /// The land grant fired; persist the world now
    pub world_changed: bool,
    pub died: Option<DeathSummary>,
}

/// Advance age while stage time is exhausted and the character lives
///
/// Called from every task completion; hosts may also call it directly
/// after importing a snapshot with a drained clock.
pub fn age_up_if_needed(
    world: &mut World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    rng: &mut impl Rng,
    now_ms: u64,
) -> AgeReport {
    let mut report = AgeReport::default();

    while character.stage_remaining_mins <= 0 && character.alive {
        character.age += character.stage.years_per_step();

        // stages never regress
        let target = Stage::for_age(character.age);
        if target > character.stage {
            character.stage = target;
        }

        character.stage_total_mins = character.stage.allotment_mins();
        // negative carry is preserved: debt is paid, not forgiven
        character.stage_remaining_mins += character.stage.allotment_mins();

        if character.pending_land_invite && !world.story.land_grant_ever_unlocked {
            grant_land(world, character, &mut report, now_ms);
        }

        pay_rent(character, now_ms);

        character.note(
            now_ms,
            LogCategory::System,
            format!(
                "You age up. Now age {} ({}).",
                character.age,
                character.stage.name()
            ),
        );
        story_beat_on_age(character, now_ms);

        character.energy_max =
            (character.energy_max + 1).clamp(ENERGY_MAX_FLOOR, ENERGY_MAX_CEILING);
        character.health_max =
            (character.health_max + 1).clamp(HEALTH_MAX_FLOOR, HEALTH_MAX_CEILING);
        character.add_energy(AGE_STEP_ENERGY_RESTOCK);
        character.add_health(AGE_STEP_HEALTH_RESTOCK);

        report.steps += 1;

        if character.stage == Stage::Elder {
            let chance = risk::natural_old_age_risk(character);
            if rng.gen::<f64>() < chance {
                report.died = Some(settle_death(
                    character,
                    world,
                    ledger,
                    "Old age (natural causes).",
                    now_ms,
                ));
                break;
            }
        }
    }

    report
}

/// Voluntarily burn the rest of the stage clock and age up
///
/// Guarded on idle; the remaining time is forfeited by choice, so no debt
/// carries into the next step.
pub fn skip_ahead(
    catalog: &Catalog,
    world: &mut World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    rng: &mut impl Rng,
    now_ms: u64,
) -> Result<AgeReport> {
    if character.task_running() {
        return Err(EngineError::TaskRunning);
    }
    character.stage_remaining_mins = 0;
    character.note(
        now_ms,
        LogCategory::System,
        "You skip ahead. (Less time means fewer gains.)",
    );
    let report = age_up_if_needed(world, ledger, character, rng, now_ms);
    if report.died.is_none() && !character.encounter_active() {
        queue::try_start_next(catalog, world, character, now_ms);
    }
    Ok(report)
}

fn grant_land(
    world: &mut World,
    character: &mut Character,
    report: &mut AgeReport,
    now_ms: u64,
) {
    let Some(town) = world.reveal_grant_town(&character.family_name) else {
        return;
    };
    let town_id = town.id.clone();
    let town_name = town.name.clone().unwrap_or_default();

    character.pending_land_invite = false;
    character.owned_town = Some(town_id);
    character.rent_free = true;
    report.world_changed = true;

    character.note(
        now_ms,
        LogCategory::Story,
        "Story: After your next birthday, a royal messenger arrives. You are summoned.",
    );
    character.note(
        now_ms,
        LogCategory::Story,
        format!(
            "Story: The king grants you land to oversee. A town will bear your family name: {}.",
            town_name
        ),
    );
    character.note(
        now_ms,
        LogCategory::Story,
        "Story: Your rent is waived for the rest of this life.",
    );
    tracing::info!(town = %town_name, "land grant revealed");
}

fn pay_rent(character: &mut Character, now_ms: u64) {
    let Some(rent) = character.stage.rent() else {
        return;
    };
    if character.rent_free {
        character.note(
            now_ms,
            LogCategory::System,
            "Your land grant waives rent this life.",
        );
        return;
    }
    if character.home_locked {
        return;
    }
    if character.debit_gold(rent) {
        character.note(
            now_ms,
            LogCategory::System,
            format!("You pay {} gold to keep living at home.", rent),
        );
    } else {
        character.home_locked = true;
        character.story_once(
            StoryFlag::KickedOut,
            "You learn the quiet brutality of bills: nothing personal, just final.",
            now_ms,
        );
        character.note(
            now_ms,
            LogCategory::System,
            "You cannot afford rent. You are kicked out and lose access to Home.",
        );
        character.note(
            now_ms,
            LogCategory::System,
            "Tip: Earn gold and use \"Rent a Room\" in Town to restore access.",
        );
    }
}

fn story_beat_on_age(character: &mut Character, now_ms: u64) {
    match character.age {
        8 => {
            character.story_once(
                StoryFlag::Age8,
                "You notice how adults talk around problems instead of through them.",
                now_ms,
            );
        }
        10 => {
            character.story_once(
                StoryFlag::Age10,
                "You start noticing what people avoid. Certain roads. Certain woods.",
                now_ms,
            );
        }
        12 => {
            if character.story_once(
                StoryFlag::Age12,
                "You step into your teen years. People start expecting more of you.",
                now_ms,
            ) {
                character.note(
                    now_ms,
                    LogCategory::System,
                    "Tip: You can register with the guild now (age 12+).",
                );
            }
        }
        14 => {
            character.story_once(
                StoryFlag::Age14,
                "You learn that \"capable\" is both praise and invitation to danger.",
                now_ms,
            );
        }
        16 => {
            character.story_once(
                StoryFlag::Age16,
                "Adulthood arrives early in a world like this. Travel opens.",
                now_ms,
            );
        }
        60 => {
            character.story_once(
                StoryFlag::Age60,
                "Your body slows. Wisdom grows. The end becomes visible.",
                now_ms,
            );
        }
        _ => {}
    }
}
