//! Life Loop - autopilot demo driver
//!
//! Plays one seeded life against the engine's public entry points: picks
//! activities by a simple priority policy, advances virtual time past each
//! task, resolves road encounters, and prints the death summary. Useful as
//! a smoke run and as a reference for wiring a real host.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use life_loop::catalog::{loader, Catalog};
use life_loop::character::{Character, LifeRequest, MetaSpend};
use life_loop::core::error::Result;
use life_loop::core::types::{Gender, GuildRank, LocationId};
use life_loop::engine::{
    self, EncounterChoice, ResolveOutcome, StartRequest, TickOutcome,
};
use life_loop::meta::{DeathSummary, MetaLedger};
use life_loop::persistence::{export_json, Snapshot};
use life_loop::world::World;

/// Run one autopilot life and print the death summary
#[derive(Parser, Debug)]
#[command(name = "life-loop")]
#[command(about = "Persistent-progression life simulation, played on autopilot")]
struct Args {
    /// Random seed for reproducible lives
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Abandon the run after this many started activities
    #[arg(long, default_value_t = 400)]
    max_actions: u32,

    /// Load a TOML catalog instead of the builtin content
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write the final snapshot here on exit
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the full in-game log after the summary
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "life_loop=info".to_string()),
        )
        .init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => loader::load_from_path(path)?,
        None => Catalog::builtin(),
    };
    let mut world = World::from_seeds(catalog.town_seeds());
    let mut ledger = MetaLedger::new(0);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut character = Character::begin(
        &catalog,
        &world,
        &mut ledger,
        LifeRequest {
            name: "Alex".into(),
            gender: Gender::Male,
            family_id: "woodsman".into(),
            family_name: None,
            spend: MetaSpend::default(),
        },
        &mut rng,
        0,
    )?;

    println!("=== LIFE LOOP ===");
    println!(
        "A new life begins: {} {} of {}, age {}.",
        character.name,
        character.family_name,
        world
            .town(&character.current_town)
            .map(|t| t.label())
            .unwrap_or_else(|| "Unknown".into()),
        character.age
    );

    // pre-queue a morning of study to show the queue auto-chaining
    engine::queue::enqueue(&catalog, &world, &mut character, LocationId::Home, "read", 3, 0);

    let mut now_ms: u64 = 0;
    let mut actions: u32 = 0;

    let summary = loop {
        if character.encounter_active() {
            let choice = if character.strength >= 40 {
                EncounterChoice::HeadOn
            } else {
                EncounterChoice::Ignore
            };
            match engine::encounter::resolve(
                &catalog,
                &world,
                &mut ledger,
                &mut character,
                choice,
                &mut rng,
                now_ms,
            ) {
                ResolveOutcome::Died(summary) => break summary,
                _ => continue,
            }
        }

        if !character.task_running() {
            if actions >= args.max_actions {
                break engine::abandon(&world, &mut ledger, &mut character, now_ms)?;
            }
            match next_request(&catalog, &world, &character) {
                Some(request) => {
                    if engine::start(&catalog, &world, &mut character, &request, now_ms).ok {
                        actions += 1;
                        continue;
                    }
                    // policy raced its own precondition; burn the stage
                    let report = engine::skip_ahead(
                        &catalog,
                        &mut world,
                        &mut ledger,
                        &mut character,
                        &mut rng,
                        now_ms,
                    )?;
                    if let Some(summary) = report.died {
                        break summary;
                    }
                }
                None => {
                    let report = engine::skip_ahead(
                        &catalog,
                        &mut world,
                        &mut ledger,
                        &mut character,
                        &mut rng,
                        now_ms,
                    )?;
                    if let Some(summary) = report.died {
                        break summary;
                    }
                }
            }
            continue;
        }

        // jump virtual time to the end of the running task, then poll
        let remaining = character
            .task
            .as_ref()
            .map(|t| t.timer.remaining_ms(now_ms))
            .unwrap_or(0);
        now_ms += remaining.max(1);
        match engine::tick(
            &catalog,
            &mut world,
            &mut ledger,
            &mut character,
            &mut rng,
            now_ms,
        ) {
            TickOutcome::Died(summary) => break summary,
            TickOutcome::Completed(report) => {
                if report.auto_started.is_some() {
                    actions += 1;
                }
                if report.world_changed {
                    tracing::info!("world milestone reached; a real host would persist here");
                }
            }
            _ => {}
        }
    };

    print_summary(&summary, &ledger);

    if args.verbose {
        println!("\n--- Life log ---");
        for entry in character.log.iter() {
            println!("[{:>8}ms] {}", entry.at_ms, entry.message);
        }
    }

    if let Some(path) = &args.save {
        let snapshot = Snapshot::capture(&character, &world, &ledger);
        std::fs::write(path, export_json(&snapshot)?)?;
        println!("\nSnapshot written to {}.", path.display());
    }

    Ok(())
}

/// Priority policy: rest when drained, register and class up when allowed,
/// keep a roof overhead, then work the best contract available
fn next_request(catalog: &Catalog, world: &World, character: &Character) -> Option<StartRequest> {
    let mut candidates: Vec<StartRequest> = Vec::new();

    if character.energy < 25 {
        candidates.push(StartRequest::new(LocationId::Home, "sleep"));
    }
    if character.age >= 12 && !character.guild.registered {
        candidates.push(StartRequest::new(LocationId::Guild, "register"));
    }
    if character.guild.registered && character.class_id.is_none() {
        candidates.push(StartRequest::new(LocationId::Guild, "enroll_adventurer"));
    }
    if character.home_locked {
        candidates.push(StartRequest::new(LocationId::Town, "rent_room"));
    }
    if character.guild.registered {
        if character.guild.rank >= GuildRank::D {
            candidates.push(StartRequest::new(LocationId::Guild, "contract_wolves"));
        }
        if character.guild.rank >= GuildRank::E {
            candidates.push(StartRequest::new(LocationId::Guild, "contract_boars"));
        }
        candidates.push(StartRequest::new(LocationId::Guild, "contract_rats"));
    }
    if character.strength < 60 {
        candidates.push(StartRequest::new(LocationId::Home, "train"));
    }
    candidates.push(StartRequest::new(LocationId::Town, "oddjob"));
    candidates.push(StartRequest::new(LocationId::Home, "read"));
    candidates.push(StartRequest::new(LocationId::Home, "nap"));

    candidates
        .into_iter()
        .find(|request| engine::can_start(catalog, world, character, request).ok)
}

fn print_summary(summary: &DeathSummary, ledger: &MetaLedger) {
    println!("\n=== YOU DIED ===");
    println!("Cause: {}", summary.cause);
    println!(
        "{}, age {} ({}).",
        summary.name,
        summary.age,
        summary.stage.name()
    );
    println!("\nMeta points earned: +{}", summary.earned.total);
    for part in &summary.earned.parts {
        println!("  {:<16} +{:<4} {}", part.label, part.value, part.detail);
    }
    println!("Total meta points: {}", ledger.points());
}
