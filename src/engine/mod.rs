//! The run engine - scheduler, queue, risk, aging and encounters
//!
//! Every entry point takes the state it mutates by reference; the host owns
//! exactly one Character, World and MetaLedger per session. Time arrives as
//! `now_ms` arguments, randomness as `&mut impl Rng`.

pub mod aging;
pub mod encounter;
pub mod queue;
pub mod risk;
pub mod scheduler;

use crate::catalog::{Catalog, LocationDef};
use crate::character::Character;
use crate::core::types::LocationId;
use crate::world::World;

pub use aging::{age_up_if_needed, skip_ahead, AgeReport};
pub use encounter::{Encounter, EncounterChoice, ResolveOutcome};
pub use scheduler::{abandon, can_start, start, tick, CompletionReport, StartRequest, TickOutcome};

/// Locations reachable from the character's current situation
///
/// Development only exists in a town the character owns; age-gated
/// locations stay hidden until the gate opens.
pub fn available_locations<'a>(
    catalog: &'a Catalog,
    _world: &World,
    character: &Character,
) -> Vec<&'a LocationDef> {
    catalog
        .locations()
        .iter()
        .filter(|location| {
            if let Some(min_age) = location.min_age {
                if character.age < min_age {
                    return false;
                }
            }
            if location.id == LocationId::Development {
                return character.owned_town.as_deref()
                    == Some(character.current_town.as_str());
            }
            true
        })
        .collect()
}

/// Switch the character's in-town location; free, instant, always allowed
/// for reachable locations
pub fn switch_location(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    location: LocationId,
) -> bool {
    let reachable = available_locations(catalog, world, character)
        .iter()
        .any(|l| l.id == location);
    if reachable {
        character.current_location = location;
    }
    reachable
}
