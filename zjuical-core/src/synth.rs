//! Turns course and exam tables into calendar events for one term.

use tracing::info;

use crate::config::TermConfig;
use crate::course::{Course, CourseTable};
use crate::error::ZjuicalResult;
use crate::event::{CalendarEvent, EventTime};
use crate::exam::ExamTable;
use crate::resolver::TermCalendar;
use crate::time::day_of_week;

pub struct EventSynthesizer<'a> {
    term: &'a TermConfig,
    calendar: &'a TermCalendar,
}

impl<'a> EventSynthesizer<'a> {
    pub fn new(term: &'a TermConfig, calendar: &'a TermCalendar) -> Self {
        EventSynthesizer { term, calendar }
    }

    /// One event per class meeting.
    ///
    /// Each actual date uses its effective date's weekday and week parity;
    /// times are placed on the actual date.
    pub fn course_events<C: Course>(
        &self,
        table: &CourseTable<C>,
    ) -> ZjuicalResult<Vec<CalendarEvent>> {
        info!("Generating course events for {}-{}", self.term.year, self.term.term);
        let mut events = Vec::new();

        for (actual, effective) in self.calendar.entries() {
            let even_week = self.calendar.is_even_week(effective);
            let note = self.calendar.note_for(actual, effective);

            for course in table.classes_of_day(day_of_week(effective), self.term.term) {
                let record = course.record();
                if !record.week_type.admits(even_week) {
                    continue;
                }

                let description = match note {
                    Some(note) => format!("{}\n\n{}", note, course.description()),
                    None => course.description(),
                };

                events.push(CalendarEvent {
                    summary: record.name.clone(),
                    location: record.location_label().to_string(),
                    description,
                    start: EventTime::Local(record.start_datetime(actual)?),
                    end: Some(record.end_datetime(actual)?),
                });
            }
        }

        info!("{} course events", events.len());
        Ok(events)
    }

    /// One event per exam sitting of the table's courses. Sittings already
    /// emitted (through a cross-listed course) are skipped.
    pub fn exam_events<C: Course>(
        &self,
        table: &CourseTable<C>,
        exams: &mut ExamTable,
    ) -> Vec<CalendarEvent> {
        let events: Vec<_> = table
            .iter()
            .flat_map(|course| exams.emit_for(course.record()))
            .collect();

        info!("{} exam events", events.len());
        events
    }
}
