//! Event and segment model.
//!
//! An [`Event`] is the externally visible scheduling unit. When its
//! rendered footprint covers more than one civil day (or it recurs and
//! is being expanded against a view window), the segmentation engine
//! fills `segments` with one [`Segment`] per covered day; otherwise
//! `segments` stays `None` and `days_count` is 1.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::temporal::day_key;

/// A calendar event.
///
/// `start`/`end` are kept in three shapes because each consumer needs a
/// different one: the parsed instants for arithmetic, the formatted
/// strings for display and overlap sort keys, and the minutes-of-day for
/// pixel geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Formatted start string (day key, plus `HH:mm` if the view shows times).
    pub start_text: String,
    pub end_text: String,
    /// Minutes since midnight of the start day.
    pub start_minutes: u32,
    /// Minutes since midnight of the end day.
    pub end_minutes: u32,

    pub title: String,
    /// Opaque payload rendered inside the event chip.
    pub content: String,

    pub background: bool,
    pub all_day: bool,
    pub deletable: bool,
    pub resizable: bool,
    pub draggable: bool,

    /// Number of civil days the footprint covers; equals the key count
    /// of `segments` when segments exist.
    pub days_count: i64,
    pub repeat: Option<Repeat>,
    /// Per-day slices keyed by `YYYY-MM-DD`, in civil-day order.
    pub segments: Option<BTreeMap<String, Segment>>,

    // Layout output, written by the geometry mapper.
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub height: f32,

    // Transient UI state.
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub dragging: bool,
    #[serde(default)]
    pub resizing: bool,
}

impl Event {
    pub fn is_multi_day(&self) -> bool {
        self.days_count > 1
    }

    /// Day key of the start day.
    pub fn day_key(&self) -> String {
        day_key(self.start.date())
    }

    /// Day key of the end day.
    pub fn end_day_key(&self) -> String {
        day_key(self.end.date())
    }

    /// Whether the event covers `now`.
    pub fn in_progress(&self, now: NaiveDateTime) -> bool {
        self.start <= now && self.end > now
    }

    /// Whether the event's footprint touches the given day key, either
    /// directly or through one of its segments.
    pub fn occupies_day(&self, key: &str) -> bool {
        match &self.segments {
            Some(segments) => segments.contains_key(key),
            None => self.day_key() == key,
        }
    }
}

/// One calendar-day slice of an event's footprint.
///
/// Segments are laid out independently of their event: each carries its
/// own minutes range and geometry output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// The `YYYY-MM-DD` key this slice belongs to.
    pub day: String,
    /// Start instant of the slice (the event's start on the first day,
    /// midnight on every later day).
    pub start: NaiveDateTime,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub is_first_day: bool,
    pub is_last_day: bool,

    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub height: f32,
}

/// Recurrence rule attached to an event.
///
/// There is no count-based termination; a rule runs forever unless
/// `until` bounds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repeat {
    pub every: RepeatRule,
    /// Last day (inclusive) on which the rule can still match.
    pub until: Option<NaiveDate>,
}

/// Repetition unit, one matcher per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum RepeatRule {
    /// Weekly on the given ISO weekday numbers (1 = Monday .. 7 = Sunday).
    /// An empty set falls back to the origin day's weekday.
    Weekly { weekdays: BTreeSet<u8> },
    /// Monthly on the origin day-of-month.
    Monthly,
    /// Yearly on the origin day-of-month and month.
    Yearly,
}

impl Repeat {
    /// Whether the rule produces an occurrence starting on `day`, for an
    /// event originally starting on `origin`.
    pub fn matches(&self, day: NaiveDate, origin: NaiveDate) -> bool {
        if self.until.is_some_and(|until| day > until) {
            return false;
        }

        match &self.every {
            RepeatRule::Weekly { weekdays } => {
                if weekdays.is_empty() {
                    day.weekday() == origin.weekday()
                } else {
                    weekdays.contains(&(day.weekday().number_from_monday() as u8))
                }
            }
            RepeatRule::Monthly => day.day() == origin.day(),
            RepeatRule::Yearly => day.day() == origin.day() && day.month() == origin.month(),
        }
    }
}

/// Caller overrides for event creation; unset fields keep the factory
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub end: Option<NaiveDateTime>,
    pub background: Option<bool>,
    pub all_day: Option<bool>,
    pub deletable: Option<bool>,
    pub resizable: Option<bool>,
    pub draggable: Option<bool>,
    pub repeat: Option<Repeat>,
}
