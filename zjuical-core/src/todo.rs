//! Homework deadlines from the course platform.

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use crate::course::UGRS_CLASS_ID_LEN;
use crate::error::{ZjuicalError, ZjuicalResult};
use crate::event::{CALENDAR_TZ, CalendarEvent, EventTime};
use crate::exam::ExamTable;
use crate::raw::truncate_chars;

#[derive(Debug, Clone, Deserialize)]
pub struct Todo {
    pub course_name: String,
    pub course_code: String,
    pub title: String,
    /// RFC 3339 deadline
    pub end_time: String,
    #[serde(default)]
    pub is_student: bool,
}

impl Todo {
    /// Point event at the deadline, in the calendar's zone.
    pub fn to_event(&self, exams: &ExamTable) -> ZjuicalResult<CalendarEvent> {
        let deadline = DateTime::parse_from_rfc3339(self.end_time.trim())
            .map_err(|e| ZjuicalError::field("end_time", format!("'{}': {}", self.end_time, e)))?
            .with_timezone(&CALENDAR_TZ)
            .naive_local();

        let mut description = format!("课程: {}\n作业: {}", self.course_name, self.title);
        let class_id = truncate_chars(&self.course_code, UGRS_CLASS_ID_LEN);
        if let Some(exam) = exams.find_by_class_id(&class_id).first() {
            description.push_str(&format!("\n学分: {:.1}", exam.credit));
        }

        Ok(CalendarEvent {
            summary: format!("{} - {}", self.course_name, self.title),
            location: String::new(),
            description,
            start: EventTime::Local(deadline),
            end: None,
        })
    }
}

/// Events for the student's own todos; rows for other roles are skipped.
pub fn todo_events(todos: &[Todo], exams: &ExamTable) -> ZjuicalResult<Vec<CalendarEvent>> {
    todos
        .iter()
        .filter(|todo| {
            if !todo.is_student {
                debug!("Skipping non-student todo '{}'", todo.title);
            }
            todo.is_student
        })
        .map(|todo| todo.to_event(exams))
        .collect()
}
