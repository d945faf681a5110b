//! Engine tuning constants with documented purpose
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Stage- and rank-dependent values
//! live as match methods on their enums in `core::types`.

/// Maximum pending entries in the activity queue
///
/// Enqueue requests beyond this are clamped, never errored, so bulk
/// "queue x10" requests partially succeed.
pub const QUEUE_CAPACITY: usize = 10;

/// Maximum retained in-game log entries; oldest are evicted first
pub const LOG_CAPACITY: usize = 250;

/// Hard floor on activity death probability
///
/// No risk-bearing activity is ever perfectly safe. Together with
/// [`RISK_CEILING`] this bounds every `death_chance` result.
pub const RISK_FLOOR: f64 = 0.005;

/// Hard ceiling on activity death probability
///
/// No risk-bearing activity is ever certain death; a doomed character
/// still has a 15% way out.
pub const RISK_CEILING: f64 = 0.85;

/// Divisor turning combined power into risk mitigation
///
/// power / 220, capped at [`POWER_MITIGATE_CAP`]. At 220 the divisor means
/// a fresh character (power ~15) mitigates almost nothing while a maxed
/// late-game character saturates the cap.
pub const POWER_DIVISOR: f64 = 220.0;

/// Cap on power-based risk mitigation
pub const POWER_MITIGATE_CAP: f64 = 0.40;

/// Weight of missing health in the death formula
pub const HEALTH_RISK_WEIGHT: f64 = 0.10;

/// Weight of missing energy in the death formula
pub const ENERGY_RISK_WEIGHT: f64 = 0.08;

/// Cap on the supplies buff's risk mitigation
pub const SUPPLIES_MITIGATE_CAP: f64 = 0.04;

/// Cap on class-granted risk mitigation
pub const CLASS_MITIGATE_CAP: f64 = 0.06;

/// Cap on combined gear risk mitigation
pub const GEAR_MITIGATE_CAP: f64 = 0.12;

/// Cap on combined gear power contribution
pub const GEAR_POWER_CAP: f64 = 80.0;

/// Cap on the class loot multiplier
pub const LOOT_MULT_CAP: f64 = 2.0;

/// Cap on the class guild-XP multiplier
pub const GUILD_XP_MULT_CAP: f64 = 2.0;

/// Floor and cap on elder natural-death probability per age step
pub const NATURAL_RISK_FLOOR: f64 = 0.001;
pub const NATURAL_RISK_CAP: f64 = 0.12;

/// Encounter-resolution probability bounds
///
/// Wider floor than activity risk: a skirmish joined by choice is never
/// as safe as a routine errand.
pub const ENCOUNTER_RISK_FLOOR: f64 = 0.05;
pub const ENCOUNTER_RISK_CEILING: f64 = 0.85;

/// Primary stat display cap
pub const STAT_CAP: u32 = 999;

/// Gold cap; credits clamp here rather than overflowing the display
pub const GOLD_CAP: u64 = 999_999;

/// Energy-max growth band: +1 per age step, within these bounds
pub const ENERGY_MAX_FLOOR: u32 = 80;
pub const ENERGY_MAX_CEILING: u32 = 140;

/// Health-max growth band: +1 per age step, within these bounds
pub const HEALTH_MAX_FLOOR: u32 = 80;
pub const HEALTH_MAX_CEILING: u32 = 160;

/// Partial restock applied on every age step
pub const AGE_STEP_ENERGY_RESTOCK: u32 = 5;
pub const AGE_STEP_HEALTH_RESTOCK: u32 = 3;

/// Age at which adulthood (and travel) opens
pub const ADULT_AGE: u32 = 16;

/// Starting age of every run
pub const STARTING_AGE: u32 = 7;

/// Travel time cost per tier step, and its clamp band (minutes)
///
/// cost = TRAVEL_BASE_MINS * |tier difference|, at least one step,
/// clamped to [TRAVEL_BASE_MINS, TRAVEL_MAX_MINS].
pub const TRAVEL_BASE_MINS: i64 = 480;
pub const TRAVEL_MAX_MINS: i64 = 1440;

/// Real-time duration of a travel task in seconds
pub const TRAVEL_REAL_SECS: u32 = 10;

/// Meta points buy 10 gold apiece at life start
pub const META_GOLD_RATE: u64 = 10;
