//! Localized name tables consumed by the date formatter.
//!
//! Hosts ship translations as plain data; the core only indexes into
//! these tables, so any language works without code changes.

use serde::{Deserialize, Serialize};

/// Weekday and month names for one language.
///
/// `months_genitive` is the form used inside a full date ("3 января"),
/// which differs from the standalone form in several languages. For
/// languages without a genitive case it simply repeats `months`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locale {
    /// Monday-first full weekday names.
    pub weekdays: [String; 7],
    /// Monday-first abbreviated weekday names.
    pub weekdays_short: [String; 7],
    /// Standalone month names, January first; read directly by hosts
    /// for month headings, not consumed by the formatter.
    pub months: [String; 12],
    /// Abbreviated month names.
    pub months_short: [String; 12],
    /// Month names as used inside a formatted date.
    pub months_genitive: [String; 12],
}

impl Default for Locale {
    fn default() -> Self {
        let months = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ]
        .map(String::from);

        Locale {
            weekdays: [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ]
            .map(String::from),
            weekdays_short: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"].map(String::from),
            months_short: [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]
            .map(String::from),
            months_genitive: months.clone(),
            months,
        }
    }
}

impl Locale {
    /// Full weekday name for a Monday-first index (0 = Monday).
    pub fn weekday(&self, index: usize) -> &str {
        &self.weekdays[index % 7]
    }

    pub fn weekday_short(&self, index: usize) -> &str {
        &self.weekdays_short[index % 7]
    }

    /// Short month name for a 1-based month number.
    pub fn month_short(&self, month: u32) -> &str {
        &self.months_short[(month as usize - 1) % 12]
    }

    pub fn month_genitive(&self, month: u32) -> &str {
        &self.months_genitive[(month as usize - 1) % 12]
    }
}
