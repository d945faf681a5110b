//! Task scheduler - one activity in flight at a time
//!
//! States per activity: idle -> running -> idle; a death is terminal for
//! the whole run. Side effects are strictly ordered: time/energy debit at
//! start, then at completion the survival roll, rewards and loot (only if
//! alive), stat gains, effects, stage advancement, queue pull.

use rand::Rng;

use crate::catalog::{ActivityDef, Catalog, EffectKind, RequirementKind, StartCheck};
use crate::character::guild::starting_rank;
use crate::character::{ActiveTask, Character, TaskTimer};
use crate::core::types::{format_mins, LocationId, LogCategory, StoryFlag};
use crate::engine::{encounter, queue, risk};
use crate::engine::aging;
use crate::meta::{settle_death, DeathSummary, MetaLedger};
use crate::world::World;

/// A request to start (or enqueue) an activity
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub location: LocationId,
    pub activity_id: String,
    /// Destination town id; required by travel activities
    pub travel_to: Option<String>,
}

impl StartRequest {
    pub fn new(location: LocationId, activity_id: impl Into<String>) -> Self {
        Self {
            location,
            activity_id: activity_id.into(),
            travel_to: None,
        }
    }

    pub fn travel(destination: impl Into<String>) -> Self {
        Self {
            location: LocationId::Travel,
            activity_id: "travel_to_town".into(),
            travel_to: Some(destination.into()),
        }
    }
}

/// What a completed activity did, for the host
#[derive(Debug, Default)]
pub struct CompletionReport {
    pub activity_id: String,
    pub loot: Vec<(String, u32)>,
    /// World milestones were mutated; persist the world now
    pub world_changed: bool,
    pub encounter_triggered: bool,
    /// Activity auto-started off the queue afterwards
    pub auto_started: Option<String>,
}

/// Result of one scheduler tick
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing running and nothing eligible to run
    Idle,
    Running {
        remaining_ms: u64,
    },
    /// Scheduling is parked until the encounter is resolved
    AwaitingEncounter,
    Completed(CompletionReport),
    /// Terminal: the run is over, the ledger is credited
    Died(DeathSummary),
}

/// Evaluate every precondition without mutating anything
///
/// Must be called (and is re-called) before every start, including queue
/// pops - state may have changed since the request was formed.
pub fn can_start(
    catalog: &Catalog,
    world: &World,
    character: &Character,
    request: &StartRequest,
) -> StartCheck {
    if !character.alive {
        return StartCheck::no("This life is over.");
    }
    if character.encounter_active() {
        return StartCheck::no("Something on the road demands an answer first.");
    }
    if character.task_running() {
        return StartCheck::no("Finish the current task first.");
    }

    if let Some(location) = catalog.location(request.location) {
        if let Some(min_age) = location.min_age {
            if character.age < min_age {
                return StartCheck::no(format!("Available at age {}+.", min_age));
            }
        }
    }
    if request.location == LocationId::Development
        && character.owned_town.as_deref() != Some(character.current_town.as_str())
    {
        return StartCheck::no("You do not hold this town.");
    }

    let Some(activity) = catalog.activity(request.location, &request.activity_id) else {
        return StartCheck::no("Nothing like that is offered here.");
    };

    if request.location == LocationId::Home && character.home_locked {
        return StartCheck::no("Home is locked. Earn gold and rent a room in Town.");
    }

    if let Some(min_age) = activity.min_age {
        if character.age < min_age {
            return StartCheck::no(format!("Minimum age {}.", min_age));
        }
    }

    for requirement in &activity.requirements {
        let check = check_requirement(requirement, catalog, world, character);
        if !check.ok {
            return check;
        }
    }

    if activity.travel {
        let Some(dest) = request.travel_to.as_deref() else {
            return StartCheck::no("Select a destination town.");
        };
        if dest == character.current_town {
            return StartCheck::no("Select a destination town.");
        }
        match world.town(dest) {
            Some(town) if town.is_visible() => {}
            _ => return StartCheck::no("That destination is unknown."),
        }
    }

    let time_cost = time_cost_mins(world, character, activity, request);
    if character.stage_remaining_mins < time_cost {
        return StartCheck::no(format!(
            "Not enough stage time (need {}).",
            format_mins(time_cost)
        ));
    }

    StartCheck::yes()
}

fn check_requirement(
    requirement: &RequirementKind,
    catalog: &Catalog,
    world: &World,
    character: &Character,
) -> StartCheck {
    match requirement {
        RequirementKind::GuildRegistered => {
            if character.guild.registered {
                StartCheck::yes()
            } else {
                StartCheck::no("Register with the guild first.")
            }
        }
        RequirementKind::GuildNotRegistered => {
            if character.guild.registered {
                StartCheck::no("You are already registered.")
            } else {
                StartCheck::yes()
            }
        }
        RequirementKind::GuildRankAtLeast { rank } => {
            if character.guild.rank >= *rank {
                StartCheck::yes()
            } else {
                StartCheck::no(format!(
                    "Requires guild rank {} or better.",
                    rank.letter()
                ))
            }
        }
        RequirementKind::ClassUnchosen => {
            if character.class_id.is_none() {
                StartCheck::yes()
            } else {
                StartCheck::no("You have already chosen a class.")
            }
        }
        RequirementKind::HasGold { amount } => {
            if character.gold >= *amount {
                StartCheck::yes()
            } else {
                StartCheck::no(format!("Requires {} gold.", amount))
            }
        }
        RequirementKind::HasItems { item, qty } => {
            if character.inventory.quantity(item) >= *qty {
                StartCheck::yes()
            } else {
                StartCheck::no(format!("Requires {} x{}.", catalog.item_name(item), qty))
            }
        }
        RequirementKind::HomeLocked => {
            if character.home_locked {
                StartCheck::yes()
            } else {
                StartCheck::no("You already have a home.")
            }
        }
        RequirementKind::FacilityBuilt { facility } => {
            let built = world
                .town(&character.current_town)
                .map(|t| t.facilities.has(*facility))
                .unwrap_or(false);
            if built {
                StartCheck::yes()
            } else {
                StartCheck::no(format!("This town has no {}.", facility.label()))
            }
        }
        RequirementKind::FacilityMissing { facility } => {
            let built = world
                .town(&character.current_town)
                .map(|t| t.facilities.has(*facility))
                .unwrap_or(false);
            if built {
                StartCheck::no(format!("{} already built.", facility.label()))
            } else {
                StartCheck::yes()
            }
        }
        RequirementKind::OwnsCurrentTown => {
            if character.owned_town.as_deref() == Some(character.current_town.as_str()) {
                StartCheck::yes()
            } else {
                StartCheck::no("You do not hold this town.")
            }
        }
    }
}

fn time_cost_mins(
    world: &World,
    character: &Character,
    activity: &ActivityDef,
    request: &StartRequest,
) -> i64 {
    if activity.travel {
        match request.travel_to.as_deref() {
            Some(dest) => world.travel_cost_mins(&character.current_town, dest),
            None => activity.time_cost_mins,
        }
    } else {
        activity.time_cost_mins
    }
}

/// Start an activity from idle
///
/// A failed precondition never mutates state: the denial is logged and
/// returned. On success: stage time and energy are debited, start-time
/// gold is paid and recorded on the task, and the real-time timer starts.
pub fn start(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    request: &StartRequest,
    now_ms: u64,
) -> StartCheck {
    start_internal(catalog, world, character, request, now_ms, false)
}

/// Queue-pop variant; identical semantics, different log prefix
pub(crate) fn start_from_queue(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    request: &StartRequest,
    now_ms: u64,
) -> StartCheck {
    start_internal(catalog, world, character, request, now_ms, true)
}

fn start_internal(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    request: &StartRequest,
    now_ms: u64,
    from_queue: bool,
) -> StartCheck {
    let check = can_start(catalog, world, character, request);
    if !check.ok {
        let name = catalog
            .activity(request.location, &request.activity_id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| request.activity_id.clone());
        character.note(
            now_ms,
            LogCategory::System,
            format!("Cannot do \"{}\": {}", name, check.why()),
        );
        return check;
    }
    // lookup is safe post-check, but stay defensive about catalog swaps
    let Some(activity) = catalog.activity(request.location, &request.activity_id) else {
        return StartCheck::no("Nothing like that is offered here.");
    };

    let time_cost = time_cost_mins(world, character, activity, request);
    character.stage_remaining_mins -= time_cost;
    character.drain_energy(activity.energy_cost);

    let gold_paid_on_start = activity.rewards.gold > 0;
    if gold_paid_on_start {
        character.credit_gold(activity.rewards.gold);
    }

    // supplies are bought when the errand begins, so the buff covers
    // whatever comes next
    if let Some(EffectKind::BuySupplies { cost, potency }) = &activity.effect {
        if character.debit_gold(*cost) {
            character.buffs.supplies = *potency;
            character.story_once(
                StoryFlag::BoughtSupplies,
                "You realize preparation is its own kind of strength.",
                now_ms,
            );
            character.note(
                now_ms,
                LogCategory::System,
                "You buy supplies. The next venture is slightly safer.",
            );
        }
    }

    character.task = Some(ActiveTask {
        activity_id: activity.id.clone(),
        name: activity.name.clone(),
        location: request.location,
        town_id: character.current_town.clone(),
        timer: TaskTimer::schedule(now_ms, activity.duration_ms()),
        time_cost_mins: time_cost,
        travel_to: if activity.travel {
            request.travel_to.clone()
        } else {
            None
        },
        gold_paid_on_start,
    });

    character.lifetime_actions += 1;
    if activity.is_adventure() {
        character.lifetime_adventures += 1;
    }

    let prefix = if from_queue { "Auto-started" } else { "Started" };
    character.note(
        now_ms,
        LogCategory::System,
        format!("{}: {} ({}).", prefix, activity.name, format_mins(time_cost)),
    );
    StartCheck::yes()
}

/// Poll the in-flight task against real time
///
/// Invoked on a fixed cadence by the host; `now_ms` is whatever clock the
/// host runs on (tests pass literals). Completion effects, aging and the
/// queue pull all happen synchronously inside the tick that elapses.
pub fn tick(
    catalog: &Catalog,
    world: &mut World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    rng: &mut impl Rng,
    now_ms: u64,
) -> TickOutcome {
    if !character.alive {
        return TickOutcome::Idle;
    }
    if character.encounter_active() {
        return TickOutcome::AwaitingEncounter;
    }

    if character.task.is_none() {
        return if let Some(started) = queue::try_start_next(catalog, world, character, now_ms) {
            tracing::debug!(activity = %started, "idle tick pulled from queue");
            let remaining = character
                .task
                .as_ref()
                .map(|t| t.timer.remaining_ms(now_ms))
                .unwrap_or(0);
            TickOutcome::Running {
                remaining_ms: remaining,
            }
        } else {
            TickOutcome::Idle
        };
    }

    let still_running = character
        .task
        .as_ref()
        .map(|t| t.timer.remaining_ms(now_ms))
        .filter(|&remaining| remaining > 0);
    if let Some(remaining_ms) = still_running {
        return TickOutcome::Running { remaining_ms };
    }

    let task = character.task.take().expect("task presence checked above");
    complete(catalog, world, ledger, character, task, rng, now_ms)
}

fn complete(
    catalog: &Catalog,
    world: &mut World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    task: ActiveTask,
    rng: &mut impl Rng,
    now_ms: u64,
) -> TickOutcome {
    let Some(activity) = catalog.activity(task.location, &task.activity_id) else {
        // catalog changed under a live save; drop the work on the floor
        character.note(
            now_ms,
            LogCategory::System,
            format!("\"{}\" ended, but that work no longer exists here.", task.name),
        );
        let auto_started = queue::try_start_next(catalog, world, character, now_ms);
        return TickOutcome::Completed(CompletionReport {
            activity_id: task.activity_id,
            auto_started,
            ..CompletionReport::default()
        });
    };

    let mut report = CompletionReport {
        activity_id: activity.id.clone(),
        ..CompletionReport::default()
    };
    let mods = catalog.class_mods(character.class_id.as_deref());

    // survival roll comes first: a dead character collects nothing
    if let Some(adventure) = &activity.adventure {
        let chance = risk::death_chance(adventure.base_risk, character, catalog);
        character.buffs.supplies = 0.0;
        let pct = chance * 100.0;
        if rng.gen::<f64>() < chance {
            let cause = format!(
                "Fell during \"{}\" (death chance was {:.1}%).",
                activity.name, pct
            );
            return TickOutcome::Died(settle_death(character, world, ledger, cause, now_ms));
        }

        let gained = risk::loot_roll(&adventure.loot, mods.loot_mult, rng);
        if !gained.is_empty() {
            let line = gained
                .iter()
                .map(|(item, qty)| format!("{} x{}", catalog.item_name(item), qty))
                .collect::<Vec<_>>()
                .join(", ");
            for (item, qty) in &gained {
                character.inventory.add(item, *qty);
            }
            character.note(now_ms, LogCategory::System, format!("Loot: {}.", line));
        }
        report.loot = gained;

        character.note(
            now_ms,
            LogCategory::Combat,
            format!("Completed adventure safely. (Death chance was {:.1}%).", pct),
        );
        // scrapes and bruises
        character.take_damage(rng.gen_range(0..3));
    } else {
        character.note(
            now_ms,
            LogCategory::System,
            format!("Completed: {}.", activity.name),
        );
    }

    character.add_energy(activity.energy_gain);
    character.add_health(activity.rewards.health);
    if activity.rewards.gold > 0 && !task.gold_paid_on_start {
        character.credit_gold(activity.rewards.gold);
    }
    if activity.rewards.guild_xp > 0 {
        let mult = mods.guild_xp_mult.clamp(1.0, crate::core::config::GUILD_XP_MULT_CAP);
        let gained = (activity.rewards.guild_xp as f64 * mult).round() as u64;
        character.guild.xp += gained;
        character.guild.quests_completed += 1;
        if let Some(new_rank) = character.guild.recalc_rank() {
            character.note(
                now_ms,
                LogCategory::System,
                format!("Guild rank increased to {}.", new_rank.letter()),
            );
            if new_rank == crate::core::types::GuildRank::D {
                character.story_once(
                    StoryFlag::RankD,
                    "Your name starts showing up in conversations you were never part of.",
                    now_ms,
                );
            }
            if new_rank == crate::core::types::GuildRank::B {
                character.story_once(
                    StoryFlag::RankB,
                    "The guild master looks at you differently now. Measuring. Careful.",
                    now_ms,
                );
            }
        }
    }

    character.apply_stat_gains(&activity.stat_gains, &mods);

    if let Some(effect) = &activity.effect {
        apply_effect(effect, catalog, world, character, &mut report, now_ms);
    }

    if activity.travel {
        if let Some(dest) = &task.travel_to {
            let from_label = world
                .town(&task.town_id)
                .map(|t| t.label())
                .unwrap_or_else(|| "Unknown".into());
            let to_label = world
                .town(dest)
                .map(|t| t.label())
                .unwrap_or_else(|| "Unknown".into());
            character.current_town = dest.clone();
            character.current_location = LocationId::Town;
            queue::prune_for_town(catalog, world, character, now_ms);
            character.note(
                now_ms,
                LogCategory::Travel,
                format!("You travel from {} to {}.", from_label, to_label),
            );
        }
    }

    if let Some(adventure) = &activity.adventure {
        if adventure.travel_like {
            report.encounter_triggered = encounter::maybe_trigger(
                character,
                world,
                adventure.encounter_chance,
                rng,
                now_ms,
            );
        }
    }

    let age_report = aging::age_up_if_needed(world, ledger, character, rng, now_ms);
    report.world_changed |= age_report.world_changed;
    if let Some(summary) = age_report.died {
        return TickOutcome::Died(summary);
    }

    if !character.encounter_active() {
        report.auto_started = queue::try_start_next(catalog, world, character, now_ms);
    }

    TickOutcome::Completed(report)
}

fn apply_effect(
    effect: &EffectKind,
    catalog: &Catalog,
    world: &mut World,
    character: &mut Character,
    report: &mut CompletionReport,
    now_ms: u64,
) {
    match effect {
        // applied at start; nothing to do here
        EffectKind::BuySupplies { .. } => {}
        EffectKind::RegisterGuild => {
            character.guild.registered = true;
            character.guild.rank = starting_rank(
                character.strength,
                character.magic,
                character.intelligence,
                character.luck,
                character.charm,
            );
            character.note(
                now_ms,
                LogCategory::System,
                format!(
                    "Guild registration complete. Starting rank: {}.",
                    character.guild.rank.letter()
                ),
            );
            character.story_once(
                StoryFlag::GuildRegistered,
                "A stamped card and a quiet warning: the world is not kind to the unprepared.",
                now_ms,
            );
        }
        EffectKind::ChooseClass { class_id } => {
            let name = catalog
                .class(class_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| class_id.clone());
            character.class_id = Some(class_id.clone());
            character.note(
                now_ms,
                LogCategory::System,
                format!("Class chosen: {}.", name),
            );
        }
        EffectKind::RentRoom { cost } => {
            if character.debit_gold(*cost) {
                character.home_locked = false;
                character.note(
                    now_ms,
                    LogCategory::System,
                    "You rent a room. Home is yours again.",
                );
                character.story_once(
                    StoryFlag::HomeRestored,
                    "A small room, a locked door, and the rare luxury of safety.",
                    now_ms,
                );
            } else {
                character.note(
                    now_ms,
                    LogCategory::System,
                    "You can no longer afford the room.",
                );
            }
        }
        EffectKind::EquipGear {
            gear_id,
            cost_gold,
            consumes,
        } => {
            let affordable = character.gold >= *cost_gold
                && consumes
                    .iter()
                    .all(|(item, qty)| character.inventory.quantity(item) >= *qty);
            let Some(gear) = catalog.gear(gear_id) else {
                character.note(now_ms, LogCategory::System, "The smith shrugs. No such work.");
                return;
            };
            if !affordable {
                // materials were spent mid-task; tolerated, the smith
                // simply turns you away
                character.note(
                    now_ms,
                    LogCategory::System,
                    "The smith turns you away; you no longer have the materials.",
                );
                return;
            }
            character.debit_gold(*cost_gold);
            for (item, qty) in consumes {
                character.inventory.remove(item, *qty);
            }
            character.gear.equip(gear.slot, gear.id.clone());
            character.note(
                now_ms,
                LogCategory::System,
                format!("Equipped: {}.", gear.name),
            );
            character.story_once(
                StoryFlag::BlacksmithFirst,
                "The blacksmith weighs your materials like fate, then nods once: \"It will hold.\"",
                now_ms,
            );
        }
        EffectKind::BuildFacility { facility, cost } => {
            if !character.debit_gold(*cost) {
                character.note(
                    now_ms,
                    LogCategory::System,
                    "The coffers came up short; construction is cancelled.",
                );
                return;
            }
            let Some(owned) = character.owned_town.clone() else {
                return;
            };
            if let Some(town) = world.town_mut(&owned) {
                town.facilities.build(*facility);
                report.world_changed = true;
                character.note(
                    now_ms,
                    LogCategory::System,
                    format!("Construction complete: {}.", facility.label()),
                );
                character.story_once(
                    StoryFlag::TownShaped,
                    "The town changes. People notice. You are no longer just surviving; you are shaping.",
                    now_ms,
                );
            }
        }
    }
}

/// Abandon the run; only valid while no task is running
///
/// Routes through the same ledger crediting path as any death.
pub fn abandon(
    world: &World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    now_ms: u64,
) -> crate::core::error::Result<DeathSummary> {
    if character.task_running() {
        character.note(
            now_ms,
            LogCategory::System,
            "Finish the current task before giving up on this life.",
        );
        return Err(crate::core::error::EngineError::TaskRunning);
    }
    Ok(settle_death(
        character,
        world,
        ledger,
        "Gave up on the life.",
        now_ms,
    ))
}
