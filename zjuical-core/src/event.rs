//! Calendar events produced by the synthesizer.
//!
//! Events are plain values; the caller owns them and hands them to
//! [`crate::ics::generate_ics`] for serialization.

use std::fmt;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Every event time is a wall-clock time in this zone.
pub const CALENDAR_TZ: Tz = chrono_tz::Asia::Shanghai;

/// Stand-in written to the calendar file for events whose date is not known yet.
pub const UNSCHEDULED_ICS_TIME: &str = "19700101T000000";

/// When an event starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// Local wall-clock time in [`CALENDAR_TZ`].
    Local(NaiveDateTime),
    /// Known to exist but not yet placed on the calendar (e.g. an exam whose
    /// date depends on an unpublished academic calendar).
    Unscheduled,
}

impl EventTime {
    /// Basic-format ICS value (`YYYYMMDDTHHMMSS`), without zone.
    pub fn to_ics_string(&self) -> String {
        match self {
            EventTime::Local(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            EventTime::Unscheduled => UNSCHEDULED_ICS_TIME.to_string(),
        }
    }

    pub fn local(&self) -> Option<NaiveDateTime> {
        match self {
            EventTime::Local(dt) => Some(*dt),
            EventTime::Unscheduled => None,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Local(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventTime::Unscheduled => write!(f, "unscheduled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventTime,
    pub end: Option<NaiveDateTime>,
}

impl CalendarEvent {
    /// Content-derived identifier.
    ///
    /// Hashes description, summary, location and start, so regenerating the
    /// same event yields the same UID while any change to those four yields a
    /// new one. `end` is not part of the identity.
    pub fn uid(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            self.description.as_str(),
            self.summary.as_str(),
            self.location.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(self.start.to_ics_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.summary, self.start)
    }
}
