//! Exam time strings.
//!
//! Two forms are published: a dated one, `2024年06月28日(08:00-10:00)`, and a
//! day-ordinal one, `秋冬考试第3天(08:00-10:00)`, used before the academic
//! calendar for the exam period is out.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ZjuicalError, ZjuicalResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamTime {
    Scheduled {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Known sitting whose date cannot be computed yet.
    Unpublished {
        term_label: String,
        day: u32,
        start: NaiveTime,
        end: NaiveTime,
    },
    /// No sitting (the record stands for "no exam").
    NotApplicable,
}

impl ExamTime {
    pub fn is_unpublished(&self) -> bool {
        matches!(self, ExamTime::Unpublished { .. })
    }

    /// Human-readable form of an unpublished sitting, e.g. "秋冬考试第3天 08:00-10:00".
    pub fn unpublished_text(&self) -> Option<String> {
        match self {
            ExamTime::Unpublished {
                term_label,
                day,
                start,
                end,
            } => Some(format!(
                "{}考试第{}天 {}-{}",
                term_label,
                day,
                start.format("%H:%M"),
                end.format("%H:%M")
            )),
            _ => None,
        }
    }
}

const ORDINAL_MARKER: &str = "考试第";

pub fn parse_exam_time(raw: &str) -> ZjuicalResult<ExamTime> {
    let text = raw.trim();
    let malformed = || ZjuicalError::ExamTime(raw.to_string());

    let (head, clock) = text.split_once('(').ok_or_else(malformed)?;
    let (start, end) = parse_clock_range(clock).ok_or_else(malformed)?;

    if let Some((term_label, rest)) = head.split_once(ORDINAL_MARKER) {
        let day: u32 = rest
            .strip_suffix('天')
            .and_then(|n| n.parse().ok())
            .filter(|n| *n >= 1)
            .ok_or_else(malformed)?;
        return Ok(ExamTime::Unpublished {
            term_label: term_label.to_string(),
            day,
            start,
            end,
        });
    }

    let date = NaiveDate::parse_from_str(head, "%Y年%m月%d日").map_err(|_| malformed())?;
    Ok(ExamTime::Scheduled {
        start: date.and_time(start),
        end: date.and_time(end),
    })
}

/// `HH:MM-HH:MM)` → (start, end)
fn parse_clock_range(clock: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = clock.strip_suffix(')')?.split_once('-')?;
    let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
    (start <= end).then_some((start, end))
}
