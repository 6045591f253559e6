//! Civil date/time arithmetic and formatting.
//!
//! Everything here works on `chrono` naive values: the core assumes all
//! timestamps are already in one consistent local civil-time frame, so
//! day stepping is exact calendar stepping and never a wall-clock
//! millisecond offset.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{GridError, GridResult};
use crate::locale::Locale;

/// Minutes in one civil day, the upper bound for a segment's end time.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Step a datetime forward by whole civil days, crossing month and year
/// boundaries.
pub fn add_days(instant: NaiveDateTime, days: i64) -> NaiveDateTime {
    instant + Duration::days(days)
}

/// Step a datetime backward by whole civil days.
pub fn subtract_days(instant: NaiveDateTime, days: i64) -> NaiveDateTime {
    instant - Duration::days(days)
}

/// ISO-8601 week number (1..=53).
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Minutes since midnight for an instant.
pub fn minutes_of_day(instant: NaiveDateTime) -> u32 {
    instant.hour() * 60 + instant.minute()
}

/// Canonical `YYYY-MM-DD` key for a civil day.
///
/// Fast path used everywhere segments are keyed; bypasses the token
/// formatter.
pub fn day_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Inclusive civil-day span between two instants.
///
/// A same-day range yields 1. A range ending exactly at midnight still
/// counts the midnight day, so an event running 18:00 to 02:00 next day
/// spans 2 days and one running 18:00 to 00:00 does too.
pub fn count_days(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end.date() - start.date()).num_days() + 1
}

/// Whether two instants fall within the same time-step bucket.
pub fn in_same_time_step(a: NaiveDateTime, b: NaiveDateTime, step_minutes: u32) -> bool {
    (a - b).num_minutes().abs() <= i64::from(step_minutes)
}

// =============================================================================
// Parsing
// =============================================================================

/// Input to [`parse_date`]: either an already-parsed instant (returned
/// unchanged) or a string to parse.
#[derive(Debug, Clone)]
pub enum DateInput<'a> {
    Parsed(NaiveDateTime),
    Text(&'a str),
}

impl From<NaiveDateTime> for DateInput<'_> {
    fn from(instant: NaiveDateTime) -> Self {
        DateInput::Parsed(instant)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        DateInput::Text(text)
    }
}

/// Parse a civil date string, or pass an already-parsed instant through.
///
/// Strings accept `-` or `/` as the date separator and an optional
/// `HH:MM` or `HH:MM:SS` time part; a bare date parses as midnight.
pub fn parse_date<'a>(input: impl Into<DateInput<'a>>) -> GridResult<NaiveDateTime> {
    let text = match input.into() {
        DateInput::Parsed(instant) => return Ok(instant),
        DateInput::Text(text) => text,
    };

    let normalized = text.trim().replace('/', "-");

    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(&normalized, pattern) {
            return Ok(instant);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        if let Some(instant) = date.and_hms_opt(0, 0, 0) {
            return Ok(instant);
        }
    }

    Err(GridError::InvalidDate(text.to_string()))
}

// =============================================================================
// Today cache
// =============================================================================

/// Single-slot cache for "what day is it".
///
/// Calendar cells ask "is this today?" once per cell per frame; hitting
/// the system clock and formatting every time is wasteful. The slot is
/// invalidated by comparing the cached day-of-month to the live one.
#[derive(Debug, Clone)]
pub struct Today {
    day_of_month: u32,
    date: NaiveDate,
    key: String,
}

impl Today {
    pub fn new() -> Self {
        let date = Local::now().date_naive();
        Today {
            day_of_month: date.day(),
            key: day_key(date),
            date,
        }
    }

    fn refresh(&mut self) {
        let live = Local::now().date_naive();
        if live.day() != self.day_of_month {
            self.day_of_month = live.day();
            self.key = day_key(live);
            self.date = live;
        }
    }

    pub fn date(&mut self) -> NaiveDate {
        self.refresh();
        self.date
    }

    /// Cached `YYYY-MM-DD` string for today.
    pub fn key(&mut self) -> &str {
        self.refresh();
        &self.key
    }

    pub fn is_today(&mut self, date: NaiveDate) -> bool {
        self.date() == date
    }
}

impl Default for Today {
    fn default() -> Self {
        Today::new()
    }
}

// =============================================================================
// Pattern formatting
// =============================================================================

/// Format a date against a token pattern.
///
/// Tokens, matched longest first; any other character is copied through:
/// `YYYY` `YY` `MMMM` (month name as used in a date) `MMM` (short month)
/// `MM` `M` `DD` `D` `S` (ordinal suffix for the day) `dddd` (weekday
/// name) `ddd` (short weekday) `d` (weekday number, 1 = Monday).
pub fn format_date(date: NaiveDate, pattern: &str, locale: &Locale) -> String {
    // Canonical day-key shape skips the token scan.
    if pattern == "YYYY-MM-DD" {
        return day_key(date);
    }

    let weekday_index = date.weekday().num_days_from_monday() as usize;
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while !rest.is_empty() {
        let (token, consumed): (String, usize) = if rest.starts_with("YYYY") {
            (format!("{:04}", date.year()), 4)
        } else if rest.starts_with("YY") {
            (format!("{:02}", date.year() % 100), 2)
        } else if rest.starts_with("MMMM") {
            (locale.month_genitive(date.month()).to_string(), 4)
        } else if rest.starts_with("MMM") {
            (locale.month_short(date.month()).to_string(), 3)
        } else if rest.starts_with("MM") {
            (format!("{:02}", date.month()), 2)
        } else if rest.starts_with('M') {
            (date.month().to_string(), 1)
        } else if rest.starts_with("DD") {
            (format!("{:02}", date.day()), 2)
        } else if rest.starts_with('D') {
            (date.day().to_string(), 1)
        } else if rest.starts_with('S') {
            (ordinal_suffix(date.day()).to_string(), 1)
        } else if rest.starts_with("dddd") {
            (locale.weekday(weekday_index).to_string(), 4)
        } else if rest.starts_with("ddd") {
            (locale.weekday_short(weekday_index).to_string(), 3)
        } else if rest.starts_with('d') {
            ((weekday_index + 1).to_string(), 1)
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            (ch.to_string(), ch.len_utf8())
        };

        out.push_str(&token);
        rest = &rest[consumed..];
    }

    out
}

/// Format a minutes-since-midnight value against a token pattern.
///
/// Tokens: `HH` `H` (24-hour) `hh` `h` (12-hour) `mm` `m` `am` / `AM`
/// (meridiem marker).
pub fn format_time(minutes: u32, pattern: &str) -> String {
    let hour = (minutes / 60) % 24;
    let minute = minutes % 60;
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if minutes % (24 * 60) < 12 * 60 { "am" } else { "pm" };

    let mut out = String::with_capacity(pattern.len() + 4);
    let mut rest = pattern;

    while !rest.is_empty() {
        let (token, consumed): (String, usize) = if rest.starts_with("HH") {
            (format!("{hour:02}"), 2)
        } else if rest.starts_with('H') {
            (hour.to_string(), 1)
        } else if rest.starts_with("hh") {
            (format!("{hour12:02}"), 2)
        } else if rest.starts_with('h') {
            (hour12.to_string(), 1)
        } else if rest.starts_with("mm") {
            (format!("{minute:02}"), 2)
        } else if rest.starts_with('m') {
            (minute.to_string(), 1)
        } else if rest.starts_with("am") {
            (meridiem.to_string(), 2)
        } else if rest.starts_with("AM") {
            (meridiem.to_uppercase(), 2)
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            (ch.to_string(), ch.len_utf8())
        };

        out.push_str(&token);
        rest = &rest[consumed..];
    }

    out
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        d if d % 10 == 1 => "st",
        d if d % 10 == 2 => "nd",
        d if d % 10 == 3 => "rd",
        _ => "th",
    }
}

/// Format an instant the way event `start`/`end` strings are stored:
/// the day key, plus a `HH:mm` part when the view displays times.
pub fn format_event_instant(instant: NaiveDateTime, with_time: bool) -> String {
    if with_time {
        format!(
            "{} {}",
            day_key(instant.date()),
            format_time(minutes_of_day(instant), "HH:mm")
        )
    } else {
        day_key(instant.date())
    }
}
