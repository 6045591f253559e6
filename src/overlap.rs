//! Overlap grouping and column assignment.
//!
//! Within one rendering cell, events occupying overlapping time must be
//! drawn side by side. [`compute_overlaps`] scores every pair, groups
//! mutually overlapping events into streaks, and assigns each event a
//! column index; the cell divides its width by the largest streak size.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::context::ViewConfig;
use crate::event::Event;
use crate::temporal::in_same_time_step;

/// Per-event result of one overlap pass over one cell.
///
/// Ephemeral: the table is rebuilt from scratch on every pass, so a
/// flag toggle (background/all-day) on an event can never leave a stale
/// pair behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapRecord {
    /// Ids of the events this one overlaps with.
    pub overlaps: Vec<u64>,
    /// Formatted start string, the primary sort key for column order.
    pub start_key: String,
    /// Column index within this event's streak.
    pub position: usize,
}

/// Score pairwise overlaps for the events sharing one rendering cell.
///
/// Returns the overlap table and the largest streak size in the cell;
/// the caller uses the latter as the cell's column count and each
/// record's `position` as the event's column index.
///
/// Background and all-day events never participate in the pairwise test
/// but still receive a record with an empty overlap set, so every event
/// in the cell has a defined column.
pub fn compute_overlaps(
    cell_events: &[&Event],
    config: &ViewConfig,
) -> (BTreeMap<u64, OverlapRecord>, usize) {
    let mut table: BTreeMap<u64, OverlapRecord> = cell_events
        .iter()
        .map(|event| {
            (
                event.id,
                OverlapRecord {
                    overlaps: Vec::new(),
                    start_key: event.start_text.clone(),
                    position: 0,
                },
            )
        })
        .collect();

    for (i, first) in cell_events.iter().enumerate() {
        if first.background || first.all_day {
            continue;
        }
        for second in cell_events.iter().skip(i + 1) {
            if second.background || second.all_day {
                continue;
            }

            let mut overlapping = event_in_range(second, first.start, first.end, config.time);
            if overlapping && config.overlaps_per_time_step {
                overlapping = in_same_time_step(first.start, second.start, config.time_step);
            }

            if overlapping {
                record_pair(&mut table, first.id, second.id);
            }
        }
    }

    assign_positions(&mut table);
    let max_streak = largest_streak(&table);

    (table, max_streak)
}

/// Record a mutual overlap, deduplicated so a repeated qualifying pair
/// cannot inflate the relation.
fn record_pair(table: &mut BTreeMap<u64, OverlapRecord>, a: u64, b: u64) {
    for (from, to) in [(a, b), (b, a)] {
        if let Some(record) = table.get_mut(&from) {
            if !record.overlaps.contains(&to) {
                record.overlaps.push(to);
            }
        }
    }
}

/// Sort each event's neighborhood (its overlaps plus itself) by start
/// string ascending, ids descending on ties, and take the sorted index
/// as the column position.
fn assign_positions(table: &mut BTreeMap<u64, OverlapRecord>) {
    let start_keys: BTreeMap<u64, String> = table
        .iter()
        .map(|(id, record)| (*id, record.start_key.clone()))
        .collect();

    for (id, record) in table.iter_mut() {
        let mut neighborhood: Vec<u64> = record.overlaps.clone();
        neighborhood.push(*id);
        neighborhood.sort_by(|a, b| {
            let key_a = start_keys.get(a);
            let key_b = start_keys.get(b);
            key_a.cmp(&key_b).then(b.cmp(a))
        });
        record.position = neighborhood.iter().position(|n| n == id).unwrap_or(0);
    }
}

/// Largest streak size in the table.
///
/// An event's streak starts at itself plus all its overlap partners;
/// any partner that fails to overlap some other partner cannot share
/// the column division and is excluded. Three chained events A-B-C
/// where A and C are disjoint must yield 2 columns (A and C share a
/// slot), not 3.
fn largest_streak(table: &BTreeMap<u64, OverlapRecord>) -> usize {
    let mut max_streak = 0;

    for record in table.values() {
        let mut excluded: Vec<u64> = Vec::new();
        for &partner in &record.overlaps {
            let disjoint_from_partner = record.overlaps.iter().any(|&other| {
                other != partner
                    && table
                        .get(&other)
                        .is_some_and(|r| !r.overlaps.contains(&partner))
            });
            if disjoint_from_partner && !excluded.contains(&partner) {
                excluded.push(partner);
            }
        }

        let streak = 1 + record.overlaps.len() - excluded.len();
        max_streak = max_streak.max(streak);
    }

    max_streak
}

/// Whether an event's time range intersects `[start, end)`.
///
/// Recurring events delegate to the rule walk. All-day events, and all
/// events when the view is time-less (`with_time` false), compare at
/// civil-day granularity, inclusive of both range ends; timed events
/// use half-open instant containment.
pub fn event_in_range(
    event: &Event,
    start: NaiveDateTime,
    end: NaiveDateTime,
    with_time: bool,
) -> bool {
    if event.repeat.is_some() {
        return recurring_event_in_range(event, start, end);
    }

    if event.all_day || !with_time {
        return event.start.date() <= end.date() && event.end.date() >= start.date();
    }

    event.start < end && event.end > start
}

/// Range test for a recurring event: walk the range day by day, bounded
/// by `repeat.until`, until the rule matches.
fn recurring_event_in_range(event: &Event, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    // A range that closes before the event ever starts cannot match.
    if end <= event.start {
        return false;
    }

    let Some(repeat) = event.repeat.as_ref() else {
        return false;
    };

    let origin = event.start.date();
    let last_day = match repeat.until {
        Some(until) if until < end.date() => until,
        _ => end.date(),
    };

    let mut day = start.date();
    while day <= last_day {
        if repeat.matches(day, origin) {
            return true;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    false
}
