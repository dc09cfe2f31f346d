//! Exam sittings and their lookup table.

mod schedule;
mod table;

pub use schedule::{ExamTime, parse_exam_time};
pub use table::{ExamRawRecord, ExamTable};

use std::fmt;

use crate::course::LOCATION_TBD;
use crate::event::{CalendarEvent, EventTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExamKind {
    MidTerm,
    FinalTerm,
    NoExam,
}

impl ExamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamKind::MidTerm => "期中考试",
            ExamKind::FinalTerm => "期末考试",
            ExamKind::NoExam => "无考试",
        }
    }
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One exam sitting of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamRecord {
    pub class_id: String,
    pub name: String,
    pub credit: f64,
    pub kind: ExamKind,
    pub time: ExamTime,
    pub location: Option<String>,
    pub seat: Option<String>,
    /// Set once an event has been produced, so cross-listed courses do not
    /// emit the same sitting twice.
    pub emitted: bool,
}

impl ExamRecord {
    pub fn summary(&self) -> String {
        format!("[务必核对!]{} {}", self.name, self.kind)
    }

    pub fn location_label(&self) -> String {
        let mut label = self
            .location
            .clone()
            .unwrap_or_else(|| LOCATION_TBD.to_string());
        if let Some(seat) = &self.seat {
            label.push_str(&format!(" (座位号: {})", seat));
        }
        label
    }

    pub fn description(&self) -> String {
        let mut description = format!("学分: {:.1}", self.credit);
        if let Some(text) = self.time.unpublished_text() {
            description.push_str(&format!("\n考试时间: {} (校历未发布)", text));
        }
        description
    }

    /// Calendar event for this sitting; `None` for [`ExamKind::NoExam`].
    pub fn to_event(&self) -> Option<CalendarEvent> {
        if self.kind == ExamKind::NoExam {
            return None;
        }
        let (start, end) = match &self.time {
            ExamTime::Scheduled { start, end } => (EventTime::Local(*start), Some(*end)),
            ExamTime::Unpublished { .. } => (EventTime::Unscheduled, None),
            ExamTime::NotApplicable => return None,
        };

        Some(CalendarEvent {
            summary: self.summary(),
            location: self.location_label(),
            description: self.description(),
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn final_exam() -> ExamRecord {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        ExamRecord {
            class_id: "(2024-2025-1)-211G0210".to_string(),
            name: "数据结构（甲）".to_string(),
            credit: 3.5,
            kind: ExamKind::FinalTerm,
            time: ExamTime::Scheduled {
                start: date.and_hms_opt(8, 0, 0).unwrap(),
                end: date.and_hms_opt(10, 0, 0).unwrap(),
            },
            location: Some("紫金港东2-201".to_string()),
            seat: Some("17".to_string()),
            emitted: false,
        }
    }

    #[test]
    fn renders_summary_location_and_description() {
        let exam = final_exam();
        assert_eq!(exam.summary(), "[务必核对!]数据结构（甲） 期末考试");
        assert_eq!(exam.location_label(), "紫金港东2-201 (座位号: 17)");
        assert_eq!(exam.description(), "学分: 3.5");
    }

    #[test]
    fn missing_location_is_tbd() {
        let mut exam = final_exam();
        exam.location = None;
        exam.seat = None;
        assert_eq!(exam.location_label(), LOCATION_TBD);
    }

    #[test]
    fn scheduled_exam_becomes_timed_event() {
        let event = final_exam().to_event().unwrap();
        assert_eq!(event.start.to_ics_string(), "20250110T080000");
        assert!(event.end.is_some());
    }

    #[test]
    fn unpublished_exam_still_becomes_event() {
        let mut exam = final_exam();
        exam.time = ExamTime::Unpublished {
            term_label: "秋冬".to_string(),
            day: 2,
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };

        let event = exam.to_event().unwrap();
        assert_eq!(event.start, EventTime::Unscheduled);
        assert_eq!(event.end, None);
        assert!(event.description.contains("秋冬考试第2天 08:00-10:00"));
    }

    #[test]
    fn no_exam_has_no_event() {
        let mut exam = final_exam();
        exam.kind = ExamKind::NoExam;
        exam.time = ExamTime::NotApplicable;
        assert!(exam.to_event().is_none());
    }
}
