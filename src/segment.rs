//! Multi-day and recurring event segmentation.
//!
//! [`build_segments`] is the full rebuild, run when the view window
//! changes. [`add_day_segment`] / [`remove_day_segment`] grow or shrink
//! an event by one trailing day during an interactive resize, so a drag
//! never pays for a full rebuild per pixel.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::event::{Event, Segment};
use crate::temporal::{day_key, format_event_instant, MINUTES_PER_DAY};

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap()
}

/// Rebuild an event's per-day segments against a view window.
///
/// The previous `segments` mapping is always replaced wholesale, never
/// patched in place; an event whose footprint misses the window ends up
/// with no segments at all, so `days_count` always equals the segment
/// key count whenever segments exist. `occurrences` is an optional
/// precomputed day-key → occurrence-start lookup that short-circuits
/// rule matching for recurring events.
pub fn build_segments(
    event: &mut Event,
    view_start: NaiveDateTime,
    view_end: NaiveDateTime,
    occurrences: Option<&BTreeMap<String, NaiveDateTime>>,
) {
    let segments = if event.repeat.is_some() {
        build_recurring_segments(event, view_start, view_end, occurrences)
    } else {
        build_plain_segments(event, view_start, view_end)
    };

    if segments.is_empty() {
        event.days_count = 1;
        event.segments = None;
    } else {
        event.days_count = segments.len() as i64;
        event.segments = Some(segments);
    }
}

/// Walk civil-day boundaries across the intersection of the event's
/// span with the view window, emitting one segment per day.
fn build_plain_segments(
    event: &Event,
    view_start: NaiveDateTime,
    view_end: NaiveDateTime,
) -> BTreeMap<String, Segment> {
    let mut segments = BTreeMap::new();

    let range_start = event.start.max(view_start);
    let range_end = event.end.min(view_end);
    if range_end < range_start {
        return segments;
    }

    let mut cursor = range_start;
    loop {
        let day = cursor.date();
        segments.insert(day_key(day), day_slice(event, day));

        // Next boundary is the following midnight, stepped as a civil
        // day, not a fixed millisecond offset.
        let next = midnight(day) + Duration::days(1);
        if next > range_end {
            break;
        }
        cursor = next;
    }

    segments
}

/// Walk every day of the view window, opening an occurrence on each day
/// the repeat rule matches and emitting segments until the occurrence's
/// computed end day closes it again.
fn build_recurring_segments(
    event: &Event,
    view_start: NaiveDateTime,
    view_end: NaiveDateTime,
    occurrences: Option<&BTreeMap<String, NaiveDateTime>>,
) -> BTreeMap<String, Segment> {
    let mut segments = BTreeMap::new();

    let Some(repeat) = event.repeat.as_ref() else {
        return segments;
    };

    let duration = event.end - event.start;
    let origin = event.start.date();
    let last_day = view_end.date();

    // Keys of the occurrence currently being emitted; None between
    // occurrences.
    let mut occurrence: Option<(String, String)> = None;

    let mut day = view_start.date();
    while day <= last_day {
        let key = day_key(day);

        if occurrence.is_none() {
            let starts_here = match occurrences {
                Some(lookup) => lookup.contains_key(&key),
                None => repeat.matches(day, origin),
            };
            if starts_here {
                let occ_end = day.and_time(event.start.time()) + duration;
                occurrence = Some((key.clone(), day_key(occ_end.date())));
            }
        }

        if let Some((start_key, end_key)) = &occurrence {
            let is_first = &key == start_key;
            let is_last = &key == end_key;
            segments.insert(
                key.clone(),
                Segment {
                    day: key.clone(),
                    start: if is_first {
                        day.and_time(event.start.time())
                    } else {
                        midnight(day)
                    },
                    start_minutes: if is_first { event.start_minutes } else { 0 },
                    end_minutes: if is_last { event.end_minutes } else { MINUTES_PER_DAY },
                    is_first_day: is_first,
                    is_last_day: is_last,
                    top: 0.0,
                    height: 0.0,
                },
            );

            // Closing an occurrence resets tracking so a later one in
            // the same window can still be found.
            if is_last {
                occurrence = None;
            }
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    segments
}

/// One segment of a plain (non-recurring) event for the given day.
///
/// The first day keeps the event's true start time-of-day, the last its
/// true end time-of-day; interior days run midnight to midnight.
fn day_slice(event: &Event, day: NaiveDate) -> Segment {
    let is_first = day == event.start.date();
    let is_last = day == event.end.date();

    Segment {
        day: day_key(day),
        start: if is_first { event.start } else { midnight(day) },
        start_minutes: if is_first { event.start_minutes } else { 0 },
        end_minutes: if is_last { event.end_minutes } else { MINUTES_PER_DAY },
        is_first_day: is_first,
        is_last_day: is_last,
        top: 0.0,
        height: 0.0,
    }
}

/// Grow a multi-day event by one trailing day.
///
/// Returns the day key of the new trailing segment. If the current
/// trailing segment cannot be found (possible when resize calls race
/// the caller's own throttling), the grow step is skipped and the
/// current end key is returned unchanged; a transiently stale segment
/// beats a failed interaction.
pub fn add_day_segment(event: &mut Event, with_time: bool) -> String {
    let segments = event.segments.get_or_insert_with(BTreeMap::new);

    // First call on a single-day event: synthesize the first-day
    // segment, running to the end of its day.
    if segments.is_empty() {
        let key = day_key(event.start.date());
        segments.insert(
            key.clone(),
            Segment {
                day: key,
                start: event.start,
                start_minutes: event.start_minutes,
                end_minutes: MINUTES_PER_DAY,
                is_first_day: true,
                is_last_day: false,
                top: 0.0,
                height: 0.0,
            },
        );
    }

    let trailing_key = day_key(event.end.date());
    match segments.get_mut(&trailing_key) {
        Some(trailing) => {
            trailing.is_last_day = false;
            trailing.end_minutes = MINUTES_PER_DAY;
        }
        None => return trailing_key,
    }

    let new_end = event.end + Duration::days(1);
    let new_key = day_key(new_end.date());
    segments.insert(
        new_key.clone(),
        Segment {
            day: new_key.clone(),
            start: midnight(new_end.date()),
            start_minutes: 0,
            end_minutes: event.end_minutes,
            is_first_day: false,
            is_last_day: true,
            top: 0.0,
            height: 0.0,
        },
    );

    event.days_count = segments.len() as i64;
    event.end = new_end;
    event.end_text = format_event_instant(new_end, with_time);

    new_key
}

/// Shrink a multi-day event by one trailing day; the mirror of
/// [`add_day_segment`].
///
/// A single remaining segment is never removed; the existing end key is
/// returned and nothing changes.
pub fn remove_day_segment(event: &mut Event, with_time: bool) -> String {
    let trailing_key = day_key(event.end.date());

    let Some(segments) = event.segments.as_mut() else {
        return trailing_key;
    };
    if segments.len() <= 1 {
        return trailing_key;
    }

    segments.remove(&trailing_key);

    let new_end = event.end - Duration::days(1);
    let new_key = day_key(new_end.date());
    if let Some(trailing) = segments.get_mut(&new_key) {
        trailing.is_last_day = true;
        trailing.end_minutes = event.end_minutes;
    }

    event.days_count = segments.len() as i64;
    event.end = new_end;
    event.end_text = format_event_instant(new_end, with_time);

    new_key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Repeat, RepeatRule};
    use crate::temporal::minutes_of_day;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn event(start: NaiveDateTime, end: NaiveDateTime) -> Event {
        Event {
            id: 1,
            start,
            end,
            start_text: format_event_instant(start, true),
            end_text: format_event_instant(end, true),
            start_minutes: minutes_of_day(start),
            end_minutes: minutes_of_day(end),
            title: String::new(),
            content: String::new(),
            background: false,
            all_day: false,
            deletable: true,
            resizable: true,
            draggable: true,
            days_count: 1,
            repeat: None,
            segments: None,
            top: 0.0,
            height: 0.0,
            focused: false,
            dragging: false,
            resizing: false,
        }
    }

    fn assert_segment_invariants(event: &Event) {
        let segments = event.segments.as_ref().expect("segments built");
        assert!(!segments.is_empty());
        assert_eq!(event.days_count, segments.len() as i64);

        let mut firsts = 0;
        let mut lasts = 0;
        let mut previous: Option<NaiveDate> = None;
        for (key, segment) in segments {
            assert_eq!(key, &segment.day);
            let day = NaiveDate::parse_from_str(key, "%Y-%m-%d").unwrap();
            if let Some(prev) = previous {
                if !segment.is_first_day {
                    assert_eq!(day, prev.succ_opt().unwrap(), "segments must be contiguous");
                }
            }
            previous = Some(day);
            firsts += usize::from(segment.is_first_day);
            lasts += usize::from(segment.is_last_day);
        }
        assert!(firsts >= 1);
        assert_eq!(firsts, lasts);
    }

    #[test]
    fn two_day_event_splits_at_midnight() {
        let mut e = event(dt(2019, 11, 2, 18, 0), dt(2019, 11, 3, 2, 0));
        build_segments(&mut e, dt(2019, 10, 28, 0, 0), dt(2019, 11, 4, 0, 0), None);

        let segments = e.segments.as_ref().unwrap();
        assert_eq!(e.days_count, 2);
        assert_eq!(segments.len(), 2);

        let first = &segments["2019-11-02"];
        assert!(first.is_first_day && !first.is_last_day);
        assert_eq!(first.start_minutes, 18 * 60);
        assert_eq!(first.end_minutes, MINUTES_PER_DAY);

        let last = &segments["2019-11-03"];
        assert!(last.is_last_day && !last.is_first_day);
        assert_eq!(last.start_minutes, 0);
        assert_eq!(last.end_minutes, 2 * 60);

        assert_segment_invariants(&e);
    }

    #[test]
    fn interior_days_run_midnight_to_midnight() {
        let mut e = event(dt(2019, 11, 1, 10, 0), dt(2019, 11, 4, 9, 0));
        build_segments(&mut e, dt(2019, 10, 28, 0, 0), dt(2019, 11, 10, 0, 0), None);

        let segments = e.segments.as_ref().unwrap();
        assert_eq!(segments.len(), 4);
        for key in ["2019-11-02", "2019-11-03"] {
            let seg = &segments[key];
            assert!(!seg.is_first_day && !seg.is_last_day);
            assert_eq!(seg.start_minutes, 0);
            assert_eq!(seg.end_minutes, MINUTES_PER_DAY);
        }
        assert_segment_invariants(&e);
    }

    #[test]
    fn view_window_clips_the_segment_range() {
        let mut e = event(dt(2019, 11, 1, 10, 0), dt(2019, 11, 8, 9, 0));
        build_segments(&mut e, dt(2019, 11, 3, 0, 0), dt(2019, 11, 5, 0, 0), None);

        let segments = e.segments.as_ref().unwrap();
        let keys: Vec<_> = segments.keys().cloned().collect();
        assert_eq!(keys, ["2019-11-03", "2019-11-04", "2019-11-05"]);
        // Clipped days are interior days of the event, not firsts/lasts.
        assert!(segments.values().all(|s| !s.is_first_day && !s.is_last_day));
    }

    #[test]
    fn event_outside_window_gets_no_segments() {
        let mut e = event(dt(2019, 11, 1, 10, 0), dt(2019, 11, 2, 9, 0));
        build_segments(&mut e, dt(2019, 12, 1, 0, 0), dt(2019, 12, 8, 0, 0), None);

        // No footprint in the window means no segment map at all, so
        // the days_count/segment-keys invariant cannot drift apart.
        assert!(e.segments.is_none());
        assert_eq!(e.days_count, 1);
    }

    #[test]
    fn recurring_event_with_no_window_matches_gets_no_segments() {
        let mut e = event(dt(2019, 11, 4, 9, 0), dt(2019, 11, 4, 10, 0));
        e.repeat = Some(Repeat {
            every: RepeatRule::Weekly {
                weekdays: BTreeSet::from([1]),
            },
            until: Some(NaiveDate::from_ymd_opt(2019, 11, 11).unwrap()),
        });

        // Window entirely past the rule's until bound.
        build_segments(&mut e, dt(2019, 12, 2, 0, 0), dt(2019, 12, 8, 23, 59), None);

        assert!(e.segments.is_none());
        assert_eq!(e.days_count, 1);
    }

    #[test]
    fn rebuild_replaces_previous_segments() {
        let mut e = event(dt(2019, 11, 2, 18, 0), dt(2019, 11, 3, 2, 0));
        build_segments(&mut e, dt(2019, 10, 28, 0, 0), dt(2019, 11, 4, 0, 0), None);
        build_segments(&mut e, dt(2019, 11, 3, 0, 0), dt(2019, 11, 10, 0, 0), None);

        let keys: Vec<_> = e.segments.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["2019-11-03"]);
    }

    #[test]
    fn weekly_recurrence_emits_one_occurrence_per_matching_weekday() {
        let mut e = event(dt(2019, 11, 4, 9, 0), dt(2019, 11, 4, 10, 0));
        e.repeat = Some(Repeat {
            every: RepeatRule::Weekly {
                weekdays: BTreeSet::from([1, 3]), // Monday, Wednesday
            },
            until: None,
        });

        // Week of Mon 2019-11-04 .. Sun 2019-11-10.
        build_segments(&mut e, dt(2019, 11, 4, 0, 0), dt(2019, 11, 10, 23, 59), None);

        let keys: Vec<_> = e.segments.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["2019-11-04", "2019-11-06"]);
        for segment in e.segments.as_ref().unwrap().values() {
            assert!(segment.is_first_day && segment.is_last_day);
            assert_eq!(segment.start_minutes, 9 * 60);
            assert_eq!(segment.end_minutes, 10 * 60);
        }
    }

    #[test]
    fn recurring_multi_day_occurrence_spans_and_resets() {
        // Friday 22:00 to Saturday 02:00, weekly on Fridays.
        let mut e = event(dt(2019, 11, 1, 22, 0), dt(2019, 11, 2, 2, 0));
        e.repeat = Some(Repeat {
            every: RepeatRule::Weekly {
                weekdays: BTreeSet::from([5]),
            },
            until: None,
        });

        build_segments(&mut e, dt(2019, 11, 1, 0, 0), dt(2019, 11, 14, 23, 59), None);

        let keys: Vec<_> = e.segments.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            ["2019-11-01", "2019-11-02", "2019-11-08", "2019-11-09"]
        );
        let segments = e.segments.as_ref().unwrap();
        assert!(segments["2019-11-08"].is_first_day);
        assert!(segments["2019-11-09"].is_last_day);
        assert_eq!(segments["2019-11-09"].end_minutes, 2 * 60);
    }

    #[test]
    fn recurrence_until_bounds_the_window_walk() {
        let mut e = event(dt(2019, 11, 4, 9, 0), dt(2019, 11, 4, 10, 0));
        e.repeat = Some(Repeat {
            every: RepeatRule::Weekly {
                weekdays: BTreeSet::from([1]),
            },
            until: Some(NaiveDate::from_ymd_opt(2019, 11, 11).unwrap()),
        });

        build_segments(&mut e, dt(2019, 11, 4, 0, 0), dt(2019, 11, 24, 23, 59), None);

        let keys: Vec<_> = e.segments.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["2019-11-04", "2019-11-11"]);
    }

    #[test]
    fn occurrence_lookup_short_circuits_rule_matching() {
        let mut e = event(dt(2019, 11, 4, 9, 0), dt(2019, 11, 4, 10, 0));
        e.repeat = Some(Repeat {
            every: RepeatRule::Weekly {
                weekdays: BTreeSet::from([1]),
            },
            until: None,
        });

        // Lookup says the only occurrence is Tuesday, overriding the rule.
        let lookup = BTreeMap::from([("2019-11-05".to_string(), dt(2019, 11, 5, 9, 0))]);
        build_segments(
            &mut e,
            dt(2019, 11, 4, 0, 0),
            dt(2019, 11, 10, 23, 59),
            Some(&lookup),
        );

        let keys: Vec<_> = e.segments.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["2019-11-05"]);
    }

    #[test]
    fn add_day_segment_synthesizes_first_segment_when_missing() {
        let mut e = event(dt(2019, 11, 2, 9, 0), dt(2019, 11, 2, 11, 0));
        let new_key = add_day_segment(&mut e, true);

        assert_eq!(new_key, "2019-11-03");
        assert_eq!(e.days_count, 2);
        assert_eq!(e.end, dt(2019, 11, 3, 11, 0));
        assert_eq!(e.end_text, "2019-11-03 11:00");

        let segments = e.segments.as_ref().unwrap();
        let first = &segments["2019-11-02"];
        assert!(first.is_first_day && !first.is_last_day);
        assert_eq!(first.end_minutes, MINUTES_PER_DAY);
        let last = &segments["2019-11-03"];
        assert!(last.is_last_day && !last.is_first_day);
        assert_eq!(last.start_minutes, 0);
        assert_eq!(last.end_minutes, 11 * 60);
    }

    #[test]
    fn add_then_remove_restores_the_event() {
        let mut e = event(dt(2019, 11, 2, 18, 0), dt(2019, 11, 3, 2, 0));
        build_segments(&mut e, dt(2019, 10, 28, 0, 0), dt(2019, 11, 10, 0, 0), None);
        e.days_count = e.segments.as_ref().unwrap().len() as i64;

        let before = e.clone();
        add_day_segment(&mut e, true);
        remove_day_segment(&mut e, true);

        assert_eq!(e.end, before.end);
        assert_eq!(e.end_text, before.end_text);
        assert_eq!(e.days_count, before.days_count);
        assert_eq!(e.segments, before.segments);
    }

    #[test]
    fn remove_day_segment_is_a_noop_on_single_segment() {
        let mut e = event(dt(2019, 11, 2, 9, 0), dt(2019, 11, 2, 11, 0));
        build_segments(&mut e, dt(2019, 11, 2, 0, 0), dt(2019, 11, 2, 23, 59), None);

        let before = e.clone();
        let key = remove_day_segment(&mut e, true);

        assert_eq!(key, "2019-11-02");
        assert_eq!(e.end, before.end);
        assert_eq!(e.segments, before.segments);
    }
}
