//! View context: configuration, event collection, and the event factory.
//!
//! The hosting view owns one [`ViewContext`] per calendar instance. The
//! context carries the view's time bounds and pixel scale, the global
//! event collection plus the visible working set, the id source, and
//! the two external hooks: the creation veto and the signal sink.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventDraft};
use crate::locale::Locale;
use crate::segment::build_segments;
use crate::temporal::{count_days, format_event_instant, minutes_of_day, parse_date, DateInput};

/// Time bounds and pixel scale of the current view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// First visible minute of the day.
    pub time_from: u32,
    /// Last visible minute of the day.
    pub time_to: u32,
    /// Pixel height of one time cell.
    pub time_cell_height: f32,
    /// Minutes per time cell.
    pub time_step: u32,
    /// When set, two events only count as overlapping if their starts
    /// fall in the same time-step bucket.
    pub overlaps_per_time_step: bool,
    /// Whether formatted event strings carry a time-of-day part.
    pub time: bool,
    /// Smallest rendered height for degenerate events.
    pub min_event_height: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            time_from: 0,
            time_to: 24 * 60,
            time_cell_height: 40.0,
            time_step: 30,
            overlaps_per_time_step: false,
            time: true,
            min_event_height: 10.0,
        }
    }
}

/// Named signals delivered to the hosting view's sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSignal {
    EventCreate,
    EventChange,
    EventDelete,
}

/// Observer notified of every structural event change.
pub type SignalSink = Box<dyn FnMut(EventSignal, &Event)>;

/// Creation veto: receives the candidate event before insertion and
/// returns whether creation may proceed. A vetoed candidate is simply
/// discarded; it was never inserted, so there is nothing to delete.
pub type CreationHook = Box<dyn FnMut(&Event) -> bool>;

/// Per-view state the layout core operates on.
pub struct ViewContext {
    pub config: ViewConfig,
    pub locale: Locale,
    /// Start of the visible window.
    pub view_start: NaiveDateTime,
    /// End of the visible window.
    pub view_end: NaiveDateTime,
    /// The global event collection.
    pub events: Vec<Event>,
    /// Ids of the events in the current view's working set.
    pub view_event_ids: Vec<u64>,
    pub on_event_create: Option<CreationHook>,
    pub sink: Option<SignalSink>,
    next_event_id: u64,
}

impl ViewContext {
    pub fn new(view_start: NaiveDateTime, view_end: NaiveDateTime) -> Self {
        ViewContext {
            config: ViewConfig::default(),
            locale: Locale::default(),
            view_start,
            view_end,
            events: Vec::new(),
            view_event_ids: Vec::new(),
            on_event_create: None,
            sink: None,
            next_event_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_event_id += 1;
        self.next_event_id
    }

    fn emit(&mut self, signal: EventSignal, index: usize) {
        if let Some(sink) = self.sink.as_mut() {
            sink(signal, &self.events[index]);
        }
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }

    pub fn event(&self, id: u64) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Create an event starting at `start` with a default two-hour
    /// duration, caller overrides winning over the defaults.
    ///
    /// Returns the new event's id, or `None` when the start string is
    /// malformed or the creation hook vetoes; both fail silently per
    /// the layout core's degrade-don't-abort policy.
    pub fn create_event<'a>(
        &mut self,
        start: impl Into<DateInput<'a>>,
        draft: EventDraft,
    ) -> Option<u64> {
        let start = parse_date(start).ok()?;
        let end = draft.end.unwrap_or(start + Duration::hours(2));
        let with_time = self.config.time;

        let mut event = Event {
            id: self.next_id(),
            start,
            end,
            start_text: format_event_instant(start, with_time),
            end_text: format_event_instant(end, with_time),
            start_minutes: minutes_of_day(start),
            end_minutes: minutes_of_day(end),
            title: draft.title.unwrap_or_else(|| "New event".to_string()),
            content: draft.content.unwrap_or_default(),
            background: draft.background.unwrap_or(false),
            all_day: draft.all_day.unwrap_or(false),
            deletable: draft.deletable.unwrap_or(true),
            resizable: draft.resizable.unwrap_or(true),
            draggable: draft.draggable.unwrap_or(true),
            days_count: 1,
            repeat: draft.repeat,
            segments: None,
            top: 0.0,
            height: 0.0,
            focused: false,
            dragging: false,
            resizing: false,
        };

        if let Some(hook) = self.on_event_create.as_mut() {
            if !hook(&event) {
                return None;
            }
        }

        if event.start.date() != event.end.date() {
            event.days_count = count_days(event.start, event.end);
        }
        if event.is_multi_day() || event.repeat.is_some() {
            build_segments(&mut event, self.view_start, self.view_end, None);
        }

        let id = event.id;
        self.events.push(event);
        self.view_event_ids.push(id);

        let index = self.events.len() - 1;
        self.emit(EventSignal::EventCreate, index);
        self.emit(EventSignal::EventChange, index);

        Some(id)
    }

    /// Delete an event from both the global collection and the current
    /// view's working set.
    pub fn delete_event(&mut self, id: u64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };

        self.emit(EventSignal::EventDelete, index);
        self.events.remove(index);
        self.view_event_ids.retain(|&view_id| view_id != id);
        true
    }

    /// Move or resize an event, then restore its derived state: minute
    /// offsets, formatted strings, day count, and segments.
    pub fn update_event_time(&mut self, id: u64, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let with_time = self.config.time;
        let (view_start, view_end) = (self.view_start, self.view_end);

        let Some(index) = self.index_of(id) else {
            return false;
        };

        let event = &mut self.events[index];
        event.start = start;
        event.end = end;
        event.start_minutes = minutes_of_day(start);
        event.end_minutes = minutes_of_day(end);
        event.start_text = format_event_instant(start, with_time);
        event.end_text = format_event_instant(end, with_time);

        if start.date() != end.date() || event.repeat.is_some() {
            event.days_count = count_days(start, end);
            build_segments(event, view_start, view_end, None);
        } else {
            event.days_count = 1;
            event.segments = None;
        }

        self.emit(EventSignal::EventChange, index);
        true
    }

    /// Re-derive segments for every multi-day or recurring event after
    /// the visible window moved.
    ///
    /// Multi-day detection compares the civil dates, not `days_count`:
    /// an event that missed the previous window carries no segments and
    /// a day count of 1, but must regain its segments when the window
    /// swings back over it.
    pub fn refresh_segments(&mut self) {
        let (view_start, view_end) = (self.view_start, self.view_end);
        for event in &mut self.events {
            if event.start.date() != event.end.date() || event.repeat.is_some() {
                build_segments(event, view_start, view_end, None);
            }
        }
    }

    /// Move the visible window and rebuild all derived segments.
    pub fn set_view_window(&mut self, view_start: NaiveDateTime, view_end: NaiveDateTime) {
        self.view_start = view_start;
        self.view_end = view_end;
        self.refresh_segments();
    }

    /// Events whose footprint touches the given day key; the canonical
    /// cell-scoping filter run before an overlap pass.
    pub fn events_for_day(&self, key: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.occupies_day(key))
            .collect()
    }
}
