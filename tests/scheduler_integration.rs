//! Integration tests for the task scheduler and queue

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use life_loop::catalog::{loader, Catalog};
use life_loop::character::{Character, LifeRequest, MetaSpend};
use life_loop::core::types::{Gender, LocationId};
use life_loop::engine::{self, queue, StartRequest, TickOutcome};
use life_loop::meta::MetaLedger;
use life_loop::world::World;

fn session(seed: u64) -> (Catalog, World, MetaLedger, Character, ChaCha8Rng) {
    let catalog = Catalog::builtin();
    let world = World::from_seeds(catalog.town_seeds());
    let mut ledger = MetaLedger::new(0);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let character = Character::begin(
        &catalog,
        &world,
        &mut ledger,
        LifeRequest {
            name: "Alex".into(),
            gender: Gender::Male,
            family_id: "humble".into(),
            family_name: Some("Valen".into()),
            spend: MetaSpend::default(),
        },
        &mut rng,
        0,
    )
    .unwrap();
    (catalog, world, ledger, character, rng)
}

/// Drive the running task to completion by jumping virtual time
fn finish_task(
    catalog: &Catalog,
    world: &mut World,
    ledger: &mut MetaLedger,
    character: &mut Character,
    rng: &mut ChaCha8Rng,
    now_ms: &mut u64,
) -> TickOutcome {
    let remaining = character
        .task
        .as_ref()
        .expect("a task should be running")
        .timer
        .remaining_ms(*now_ms);
    *now_ms += remaining + 1;
    engine::tick(catalog, world, ledger, character, rng, *now_ms)
}

/// Test 1: a denied start mutates nothing - not energy, gold, stage time
/// or the task slot
#[test]
fn test_denied_start_leaves_state_untouched() {
    let (catalog, world, _ledger, mut character, _rng) = session(1);
    character.stage_remaining_mins = 5;
    let energy = character.energy;
    let gold = character.gold;

    let request = StartRequest::new(LocationId::Home, "sleep");
    let check = engine::can_start(&catalog, &world, &character, &request);
    assert!(!check.ok);
    assert!(check.why().contains("Not enough stage time"));

    let started = engine::start(&catalog, &world, &mut character, &request, 0);
    assert!(!started.ok);
    assert_eq!(character.energy, energy);
    assert_eq!(character.gold, gold);
    assert_eq!(character.stage_remaining_mins, 5);
    assert!(character.task.is_none());
}

/// Test 2: starting debits time and energy up front and runs on the
/// injected clock, not a wall clock
#[test]
fn test_start_debits_and_runs_on_virtual_time() {
    let (catalog, mut world, mut ledger, mut character, mut rng) = session(2);
    let stage_before = character.stage_remaining_mins;
    let energy_before = character.energy;

    let request = StartRequest::new(LocationId::Home, "read");
    assert!(engine::start(&catalog, &world, &mut character, &request, 1_000).ok);
    assert_eq!(character.stage_remaining_mins, stage_before - 120);
    assert_eq!(character.energy, energy_before - 8);

    // partway through: still running
    match engine::tick(&catalog, &mut world, &mut ledger, &mut character, &mut rng, 3_000) {
        TickOutcome::Running { remaining_ms } => assert_eq!(remaining_ms, 3_000),
        other => panic!("expected Running, got {:?}", other),
    }

    // past the 5s duration: completes and pays out
    let int_before = character.intelligence;
    match engine::tick(&catalog, &mut world, &mut ledger, &mut character, &mut rng, 6_001) {
        TickOutcome::Completed(report) => assert_eq!(report.activity_id, "read"),
        other => panic!("expected Completed, got {:?}", other),
    }
    assert_eq!(character.intelligence, int_before + 4);
    assert!(character.task.is_none());
}

/// Test 3: start-time gold is paid once; completion must not re-pay it
#[test]
fn test_start_gold_never_paid_twice() {
    let (catalog, mut world, mut ledger, mut character, mut rng) = session(3);
    let gold_before = character.gold;

    let request = StartRequest::new(LocationId::Town, "oddjob");
    assert!(engine::start(&catalog, &world, &mut character, &request, 0).ok);
    assert_eq!(character.gold, gold_before + 18);

    let mut now = 0u64;
    match finish_task(&catalog, &mut world, &mut ledger, &mut character, &mut rng, &mut now) {
        TickOutcome::Completed(_) => {}
        other => panic!("expected Completed, got {:?}", other),
    }
    assert_eq!(character.gold, gold_before + 18);
}

/// Test 4: queue three home activities while idle - the first starts
/// immediately, the rest auto-chain on completion without intervention
#[test]
fn test_queue_auto_chains() {
    let (catalog, mut world, mut ledger, mut character, mut rng) = session(4);

    let added = queue::enqueue(
        &catalog,
        &world,
        &mut character,
        LocationId::Home,
        "read",
        3,
        0,
    );
    assert_eq!(added, 3);
    assert!(character.task_running());
    assert_eq!(character.queue.len(), 2);

    let mut now = 0u64;
    match finish_task(&catalog, &mut world, &mut ledger, &mut character, &mut rng, &mut now) {
        TickOutcome::Completed(report) => {
            assert_eq!(report.auto_started.as_deref(), Some("read"));
        }
        other => panic!("expected Completed, got {:?}", other),
    }
    assert!(character.task_running());
    assert_eq!(character.queue.len(), 1);
}

/// Test 5: the queue never exceeds its capacity, and enqueue reports the
/// clamped count
#[test]
fn test_queue_capacity_clamped() {
    let (catalog, world, _ledger, mut character, _rng) = session(5);

    let first = queue::enqueue(
        &catalog,
        &world,
        &mut character,
        LocationId::Home,
        "read",
        10,
        0,
    );
    // one of the ten starts immediately, nine wait
    assert_eq!(first, 10);
    assert_eq!(character.queue.len(), 9);

    let second = queue::enqueue(
        &catalog,
        &world,
        &mut character,
        LocationId::Home,
        "nap",
        5,
        0,
    );
    assert_eq!(second, 1);
    assert_eq!(character.queue.len(), 10);

    let third = queue::enqueue(
        &catalog,
        &world,
        &mut character,
        LocationId::Home,
        "nap",
        5,
        0,
    );
    assert_eq!(third, 0);
    assert_eq!(character.queue.len(), 10);
}

/// Test 6: non-queueable and non-home activities are refused at enqueue
#[test]
fn test_only_home_routines_queue() {
    let (catalog, world, _ledger, mut character, _rng) = session(6);
    let added = queue::enqueue(
        &catalog,
        &world,
        &mut character,
        LocationId::Town,
        "oddjob",
        2,
        0,
    );
    assert_eq!(added, 0);
    assert!(character.queue.is_empty());
}

/// Test 7: queue edits are refused while a task runs
#[test]
fn test_queue_edits_guarded_while_running() {
    let (catalog, world, _ledger, mut character, _rng) = session(7);
    queue::enqueue(&catalog, &world, &mut character, LocationId::Home, "read", 3, 0);
    assert!(character.task_running());
    assert_eq!(character.queue.len(), 2);

    assert!(!queue::remove_at(&mut character, 0, 10));
    assert!(!queue::clear(&mut character, 10));
    assert_eq!(character.queue.len(), 2);
}

/// Test 8: a queued entry whose precondition lapses is skipped with a log
/// line and the next valid entry starts instead
#[test]
fn test_stale_queue_entry_skipped() {
    let (catalog, mut world, mut ledger, mut character, mut rng) = session(8);
    queue::enqueue(&catalog, &world, &mut character, LocationId::Home, "read", 1, 0);
    queue::enqueue(&catalog, &world, &mut character, LocationId::Home, "sleep", 1, 0);
    queue::enqueue(&catalog, &world, &mut character, LocationId::Home, "nap", 1, 0);
    assert!(character.task_running());
    assert_eq!(character.queue.len(), 2);

    // drain the stage clock so sleep (480m) can no longer fit, nap (120m) can
    character.stage_remaining_mins = 200;

    let mut now = 0u64;
    match finish_task(&catalog, &mut world, &mut ledger, &mut character, &mut rng, &mut now) {
        TickOutcome::Completed(report) => {
            assert_eq!(report.auto_started.as_deref(), Some("nap"));
        }
        other => panic!("expected Completed, got {:?}", other),
    }
    assert!(character.queue.is_empty());
    let skipped = character
        .log
        .iter()
        .any(|e| e.message.contains("Skipped queued action"));
    assert!(skipped, "expected a skip log line");
}

/// Test 9: a lethal activity ends the run through the ledger - the credit
/// equals the summary total and the character is dead
#[test]
fn test_death_credits_ledger_and_ends_run() {
    const DOOMED: &str = r#"
        [[locations]]
        id = "home"
        name = "Home"

        [[activities.home]]
        id = "defy_death"
        name = "Defy Death"
        time_cost_mins = 10
        real_duration_secs = 1
        adventure = { base_risk = 5.0 }

        [[towns]]
        id = "town_a"
        name = "Aldermoor"
        kind = "town"
    "#;
    let catalog = loader::from_toml_str(DOOMED).unwrap();
    let mut world = World::from_seeds(catalog.town_seeds());
    let mut ledger = MetaLedger::new(0);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut character = Character::begin(
        &catalog,
        &world,
        &mut ledger,
        LifeRequest {
            name: "Moth".into(),
            gender: Gender::Female,
            family_id: "humble".into(),
            family_name: None,
            spend: MetaSpend::default(),
        },
        &mut rng,
        0,
    )
    .unwrap();

    let request = StartRequest::new(LocationId::Home, "defy_death");
    let mut now = 0u64;
    let mut died = None;
    for _ in 0..200 {
        assert!(engine::start(&catalog, &world, &mut character, &request, now).ok);
        match finish_task(&catalog, &mut world, &mut ledger, &mut character, &mut rng, &mut now) {
            TickOutcome::Died(summary) => {
                died = Some(summary);
                break;
            }
            TickOutcome::Completed(_) => continue,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    let summary = died.expect("an 85% death chance should land within 200 runs");
    assert!(summary.cause.contains("Defy Death"));
    assert!(summary.cause.contains("85.0%"));
    assert!(!character.alive);
    assert!(character.task.is_none());
    assert_eq!(ledger.points(), summary.earned.total);

    // a dead run refuses further work
    let check = engine::can_start(&catalog, &world, &character, &request);
    assert!(!check.ok);
}

/// Test 10: abandoning is guarded while a task runs and routes through the
/// same crediting path when idle
#[test]
fn test_abandon_guard_and_credit() {
    let (catalog, world, mut ledger, mut character, _rng) = session(10);
    let request = StartRequest::new(LocationId::Home, "read");
    assert!(engine::start(&catalog, &world, &mut character, &request, 0).ok);
    assert!(engine::abandon(&world, &mut ledger, &mut character, 0).is_err());
    assert!(character.alive);

    character.task = None;
    let summary = engine::abandon(&world, &mut ledger, &mut character, 0).unwrap();
    assert_eq!(summary.cause, "Gave up on the life.");
    assert!(!character.alive);
    assert_eq!(ledger.points(), summary.earned.total);
}
