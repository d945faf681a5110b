//! Risk and outcome formulas - pure functions over run state
//!
//! Nothing here draws randomness except `loot_roll`; probability functions
//! return the number and the caller rolls against it, so tests can pin
//! seeds or skip the draw entirely.

use rand::Rng;

use crate::catalog::{Catalog, LootEntry};
use crate::character::Character;
use crate::core::config::{
    CLASS_MITIGATE_CAP, ENERGY_RISK_WEIGHT, GEAR_MITIGATE_CAP, GEAR_POWER_CAP,
    HEALTH_RISK_WEIGHT, LOOT_MULT_CAP, NATURAL_RISK_CAP, NATURAL_RISK_FLOOR, POWER_DIVISOR,
    POWER_MITIGATE_CAP, RISK_CEILING, RISK_FLOOR, SUPPLIES_MITIGATE_CAP,
};

/// Combined flat power from equipped gear, capped
pub fn gear_power_bonus(character: &Character, catalog: &Catalog) -> f64 {
    let total: f64 = character
        .gear
        .equipped()
        .filter_map(|id| catalog.gear(id))
        .map(|g| f64::from(g.power))
        .sum();
    total.clamp(0.0, GEAR_POWER_CAP)
}

/// Combined risk mitigation from equipped gear, capped
pub fn gear_risk_mitigation(character: &Character, catalog: &Catalog) -> f64 {
    let total: f64 = character
        .gear
        .equipped()
        .filter_map(|id| catalog.gear(id))
        .map(|g| g.risk_mitigate)
        .sum();
    total.clamp(0.0, GEAR_MITIGATE_CAP)
}

/// Death probability for a risk-bearing activity
///
/// power       = str*0.8 + mag*0.8 + int*0.4 + luck*0.6 + gear power
/// mitigation  = clamp(power / 220, 0, 0.40)
/// health term = 0.10 * (1 - health/health_max)
/// energy term = 0.08 * (1 - energy/energy_max)
/// age term    = stage death factor
///
/// The result is always within [0.005, 0.85]: never perfectly safe, never
/// certain death, no matter how extreme the inputs.
pub fn death_chance(base_risk: f64, character: &Character, catalog: &Catalog) -> f64 {
    let mods = catalog.class_mods(character.class_id.as_deref());

    let power = f64::from(character.strength) * 0.8
        + f64::from(character.magic) * 0.8
        + f64::from(character.intelligence) * 0.4
        + f64::from(character.luck) * 0.6
        + gear_power_bonus(character, catalog);
    let power_mitigate = (power / POWER_DIVISOR).clamp(0.0, POWER_MITIGATE_CAP);

    let health_max = f64::from(character.health_max.max(1));
    let energy_max = f64::from(character.energy_max.max(1));
    let health_factor = HEALTH_RISK_WEIGHT * (1.0 - f64::from(character.health) / health_max);
    let energy_factor = ENERGY_RISK_WEIGHT * (1.0 - f64::from(character.energy) / energy_max);

    let age_factor = character.stage.death_age_factor();

    let supplies = character.buffs.supplies.clamp(0.0, SUPPLIES_MITIGATE_CAP);
    let class_mitigate = mods.risk_mitigate.clamp(0.0, CLASS_MITIGATE_CAP);
    let gear_mitigate = gear_risk_mitigation(character, catalog);

    let p = base_risk + health_factor + energy_factor + age_factor
        - power_mitigate
        - supplies
        - class_mitigate
        - gear_mitigate;
    p.clamp(RISK_FLOOR, RISK_CEILING)
}

/// Sample loot quantities, scale by the class multiplier, drop zeros
pub fn loot_roll(
    loot: &[LootEntry],
    loot_mult: f64,
    rng: &mut impl Rng,
) -> Vec<(String, u32)> {
    let mult = loot_mult.clamp(1.0, LOOT_MULT_CAP);
    let mut gained = Vec::new();
    for entry in loot {
        if entry.min > entry.max {
            continue;
        }
        let rolled = rng.gen_range(entry.min..=entry.max);
        let qty = (f64::from(rolled) * mult).floor() as u32;
        if qty > 0 {
            gained.push((entry.item.clone(), qty));
        }
    }
    gained
}

/// Natural-death probability per elder age step
///
/// ramp       = clamp((age - 60) / 30, 0, 1)
/// base       = 0.005 + 0.06 * ramp
/// mitigation = health fraction * 0.02 + strength/100 * 0.01
///
/// Clamped to [0.001, 0.12]: lower magnitude than activity risk, and only
/// the aging controller consults it.
pub fn natural_old_age_risk(character: &Character) -> f64 {
    let ramp = ((f64::from(character.age) - 60.0) / 30.0).clamp(0.0, 1.0);
    let base = 0.005 + 0.06 * ramp;
    let health_frac =
        f64::from(character.health) / f64::from(character.health_max.max(1));
    let mitigate = health_frac * 0.02 + f64::from(character.strength) / 100.0 * 0.01;
    (base - mitigate).clamp(NATURAL_RISK_FLOOR, NATURAL_RISK_CAP)
}
