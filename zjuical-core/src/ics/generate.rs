//! ICS file generation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property};
use tracing::{debug, info};

use crate::error::{ZjuicalError, ZjuicalResult};
use crate::event::{CALENDAR_TZ, CalendarEvent};

const PRODID: &str = "-//ZJU-ICAL//zjuical-core//EN";

/// Fixed definition of the calendar zone; it has had no DST since 1991.
const VTIMEZONE: &[&str] = &[
    "BEGIN:VTIMEZONE",
    "TZID:Asia/Shanghai",
    "X-LIC-LOCATION:Asia/Shanghai",
    "BEGIN:STANDARD",
    "TZOFFSETFROM:+0800",
    "TZOFFSETTO:+0800",
    "TZNAME:CST",
    "DTSTART:16010101T000000",
    "END:STANDARD",
    "END:VTIMEZONE",
];

/// Generate a complete calendar for `events`.
///
/// `stamp` fills DTSTAMP, CREATED and LAST-MODIFIED so that output only
/// depends on the inputs. Events whose UID was already written are dropped.
pub fn generate_ics(
    events: &[CalendarEvent],
    name: &str,
    stamp: DateTime<Utc>,
) -> ZjuicalResult<String> {
    if name.chars().any(char::is_control) {
        return Err(ZjuicalError::IcsGenerate(format!(
            "Calendar name {:?} contains control characters",
            name
        )));
    }

    let stamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    let mut cal = Calendar::new();
    let mut seen = HashSet::new();

    for event in events {
        let uid = event.uid();
        if !seen.insert(uid.clone()) {
            debug!("Dropping duplicate event {}", event);
            continue;
        }
        cal.push(to_vevent(event, &uid, &stamp).done());
    }
    info!("Wrote {} events to calendar '{}'", seen.len(), name);

    Ok(finish_calendar(&cal.done().to_string(), name))
}

fn to_vevent(event: &CalendarEvent, uid: &str, stamp: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(uid);

    ics_event.add_property("DTSTAMP", stamp);
    ics_event.add_property("CREATED", stamp);
    ics_event.add_property("LAST-MODIFIED", stamp);
    ics_event.add_property("SEQUENCE", "0");

    add_zoned_property(&mut ics_event, "DTSTART", event.start.to_ics_string());
    if let Some(end) = event.end {
        add_zoned_property(
            &mut ics_event,
            "DTEND",
            end.format("%Y%m%dT%H%M%S").to_string(),
        );
    }

    let mut summary = Property::new("SUMMARY", &event.summary);
    summary.add_parameter("LANGUAGE", "zh-cn");
    ics_event.append_property(summary);

    if !event.description.is_empty() {
        ics_event.description(&event.description);
    }
    if !event.location.is_empty() {
        ics_event.location(&event.location);
    }

    ics_event
}

fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, value: String) {
    let mut prop = Property::new(name, value);
    prop.add_parameter("TZID", CALENDAR_TZ.name());
    ics_event.append_property(prop);
}

/// Adjust the icalendar crate's output for calendar clients
/// - Replace PRODID and add publishing headers after it
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Insert the VTIMEZONE definition before the first component
/// - CRLF line endings
fn finish_calendar(ics: &str, name: &str) -> String {
    let mut result = String::with_capacity(ics.len() + 512);
    let mut timezone_written = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            push_line(&mut result, &format!("PRODID:{}", PRODID));
            push_line(&mut result, "METHOD:PUBLISH");
            push_line(&mut result, &format!("X-WR-CALNAME:{}", name));
            push_line(&mut result, &format!("X-WR-TIMEZONE:{}", CALENDAR_TZ.name()));
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if !timezone_written && (line == "BEGIN:VEVENT" || line == "END:VCALENDAR") {
            for tz_line in VTIMEZONE {
                push_line(&mut result, tz_line);
            }
            timezone_written = true;
        }

        push_line(&mut result, line);
    }

    result
}

fn push_line(result: &mut String, line: &str) {
    result.push_str(line);
    result.push_str("\r\n");
}
