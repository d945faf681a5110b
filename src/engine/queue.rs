//! Pending activity queue - a bounded FIFO of pre-ordered work
//!
//! Only queueable activities, and only from Home: pre-planning a day of
//! study is fine, pre-planning a mine shaft is not. Every pull re-validates
//! against current state; stale entries are discarded with a log line, never
//! surfaced as errors.

use crate::catalog::Catalog;
use crate::character::{Character, QueuedActivity};
use crate::core::config::QUEUE_CAPACITY;
use crate::core::types::{LocationId, LogCategory};
use crate::engine::scheduler::{self, StartRequest};
use crate::world::World;

/// Enqueue up to `count` copies of an activity; returns how many fit
///
/// Clamps to remaining capacity and logs the actual count. Zero capacity
/// and non-queueable requests are no-ops with a user-visible log line.
pub fn enqueue(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    location: LocationId,
    activity_id: &str,
    count: usize,
    now_ms: u64,
) -> usize {
    if !character.alive {
        return 0;
    }
    let Some(activity) = catalog.activity(location, activity_id) else {
        character.note(now_ms, LogCategory::Queue, "No such action to queue.");
        return 0;
    };
    if !activity.queueable || location != LocationId::Home {
        character.note(
            now_ms,
            LogCategory::Queue,
            "This action cannot be queued. Only Home routines queue up.",
        );
        return 0;
    }

    let free = QUEUE_CAPACITY.saturating_sub(character.queue.len());
    if free == 0 {
        character.note(
            now_ms,
            LogCategory::Queue,
            format!("Queue is full (max {}).", QUEUE_CAPACITY),
        );
        return 0;
    }

    let added = free.min(count.max(1));
    for _ in 0..added {
        character.queue.push(QueuedActivity {
            location,
            activity_id: activity_id.to_string(),
            town_id: character.current_town.clone(),
        });
    }
    character.note(
        now_ms,
        LogCategory::Queue,
        format!("Queued: {} x{}.", activity.name, added),
    );

    if !character.task_running() && !character.encounter_active() {
        try_start_next(catalog, world, character, now_ms);
    }
    added
}

/// Remove one queued entry by index; only while no task is running
pub fn remove_at(character: &mut Character, index: usize, now_ms: u64) -> bool {
    if character.task_running() || index >= character.queue.len() {
        return false;
    }
    character.queue.remove(index);
    character.note(now_ms, LogCategory::Queue, "Removed queued action.");
    true
}

/// Drop the whole queue; only while no task is running
pub fn clear(character: &mut Character, now_ms: u64) -> bool {
    if character.task_running() {
        return false;
    }
    if !character.queue.is_empty() {
        character.queue.clear();
        character.note(now_ms, LogCategory::Queue, "Queue cleared.");
    }
    true
}

/// Drop queued entries that do not exist in the current town
///
/// Called after travel completes. Logs the removed count when nonzero.
pub(crate) fn prune_for_town(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    now_ms: u64,
) {
    let available: Vec<LocationId> =
        crate::engine::available_locations(catalog, world, character)
            .iter()
            .map(|l| l.id)
            .collect();
    let before = character.queue.len();
    character.queue.retain(|entry| {
        available.contains(&entry.location)
            && catalog.activity(entry.location, &entry.activity_id).is_some()
    });
    let removed = before - character.queue.len();
    if removed > 0 {
        character.note(
            now_ms,
            LogCategory::Queue,
            format!(
                "Travel safety: removed {} queued task(s) not available in the new town.",
                removed
            ),
        );
        tracing::debug!(removed, "queue pruned after travel");
    }
}

/// Pull the next valid entry and start it
///
/// Re-validates each entry with `can_start`; invalid entries are discarded
/// with a log line and the search continues. Terminates by exhausting the
/// queue. Returns the started activity id, if any.
pub(crate) fn try_start_next(
    catalog: &Catalog,
    world: &World,
    character: &mut Character,
    now_ms: u64,
) -> Option<String> {
    if character.task_running() || character.encounter_active() || !character.alive {
        return None;
    }

    while !character.queue.is_empty() {
        let front = character.queue[0].clone();
        let Some(activity) = catalog.activity(front.location, &front.activity_id) else {
            character.queue.remove(0);
            character.note(
                now_ms,
                LogCategory::Queue,
                "A queued action was missing and was skipped.",
            );
            continue;
        };
        let name = activity.name.clone();

        let request = StartRequest {
            location: front.location,
            activity_id: front.activity_id.clone(),
            travel_to: None,
        };
        let check = scheduler::can_start(catalog, world, character, &request);
        if !check.ok {
            character.queue.remove(0);
            character.note(
                now_ms,
                LogCategory::Queue,
                format!("Skipped queued action \"{}\": {}", name, check.why()),
            );
            continue;
        }

        character.queue.remove(0);
        let started = scheduler::start_from_queue(catalog, world, character, &request, now_ms);
        if started.ok {
            return Some(front.activity_id);
        }
        // state changed between check and start; keep draining
    }
    None
}
