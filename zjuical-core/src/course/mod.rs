//! Weekly course blocks.
//!
//! A [`CourseRecord`] holds the fields every program reports. The two source
//! programs lay their raw records out differently, so each has its own
//! [`Course`] implementation wrapping a record.

mod grs;
mod table;
mod ugrs;

pub use grs::{GrsCourse, GrsCourseInfo, GrsPeriodSlot, GrsRawCourse, GrsTimetable};
pub use table::CourseTable;
pub use ugrs::{UGRS_CLASS_ID_LEN, UgrsCourse, UgrsRawCourse};
pub(crate) use ugrs::normalize_course_name;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::error::{ZjuicalError, ZjuicalResult};
use crate::term::{Term, WeekType};
use crate::time::{is_valid_period, period_end, period_start, weekday_name};

/// Location text used when a course has none.
pub const LOCATION_TBD: &str = "地点待定";

/// One scheduled weekly class block. Periods cover `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub class_id: String,
    pub name: String,
    pub teacher: String,
    pub location: String,
    pub day_of_week: u32,
    pub week_type: WeekType,
    pub start: u32,
    pub end: u32,
    pub terms: Vec<Term>,
    pub credit: Option<f64>,
}

impl CourseRecord {
    /// Check the invariants every constructor must establish.
    pub fn validate(&self) -> ZjuicalResult<()> {
        weekday_name(self.day_of_week)?;

        if self.start >= self.end {
            return Err(ZjuicalError::field(
                "periods",
                format!("empty period range {}-{}", self.start, self.end),
            ));
        }
        for period in [self.start, self.end - 1] {
            if !is_valid_period(period) {
                return Err(ZjuicalError::UnknownPeriod(period));
            }
        }
        if self.terms.is_empty() {
            return Err(ZjuicalError::TermTags(String::new()));
        }

        Ok(())
    }

    /// Whether two blocks denote the same offering and may be merged.
    pub fn same_offering(&self, other: &CourseRecord) -> bool {
        self.class_id == other.class_id
            && self.day_of_week == other.day_of_week
            && self.week_type == other.week_type
            && self.location == other.location
            && self.teacher == other.teacher
    }

    /// Merged period range if both blocks are the same offering and their
    /// ranges touch or overlap.
    pub fn overlap(&self, other: &CourseRecord) -> Option<(u32, u32)> {
        if !self.same_offering(other) {
            return None;
        }

        if self.start > other.start {
            return other.overlap(self);
        }

        if self.end < other.start {
            return None;
        }

        if self.start == other.start && self.end == other.end {
            warn!(
                "Duplicate course block: {} ({} periods {}-{})",
                self.name,
                weekday_name(self.day_of_week).unwrap_or("?"),
                self.start,
                self.end - 1
            );
        }

        Some((self.start, self.end.max(other.end)))
    }

    pub fn is_in_term(&self, term: Term) -> bool {
        self.terms.contains(&term)
    }

    pub fn start_datetime(&self, day: NaiveDate) -> ZjuicalResult<NaiveDateTime> {
        Ok(day.and_time(period_start(self.start)?))
    }

    pub fn end_datetime(&self, day: NaiveDate) -> ZjuicalResult<NaiveDateTime> {
        Ok(day.and_time(period_end(self.end - 1)?))
    }

    pub fn location_label(&self) -> &str {
        if self.location.is_empty() {
            LOCATION_TBD
        } else {
            &self.location
        }
    }

    /// Description lines shared by all programs.
    pub fn base_description(&self) -> String {
        let credit = match self.credit {
            Some(credit) => format!("{:.1}", credit),
            None => "未知".to_string(),
        };
        format!("教师: {}\n学分: {}", self.teacher, credit)
    }

    pub(crate) fn log_constructed(&self) {
        info!(
            "{}: {} / {}-{}",
            self.name,
            weekday_name(self.day_of_week).unwrap_or("?"),
            self.start,
            self.end - 1
        );
    }
}

/// Contract implemented by each program's course variant.
pub trait Course: Sized {
    /// Raw record as delivered by the program's timetable API.
    type Raw;

    /// Build a validated course from one raw record.
    fn from_raw(raw: &Self::Raw) -> ZjuicalResult<Self>;

    /// Derive the recurrence rule from the program's raw week field.
    fn week_type_from(raw: &str, terms: &[Term]) -> ZjuicalResult<WeekType>;

    fn record(&self) -> &CourseRecord;

    fn record_mut(&mut self) -> &mut CourseRecord;

    /// Full event description for this course.
    fn description(&self) -> String;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A plain course used by table and synthesizer tests.
    #[derive(Debug, Clone, PartialEq)]
    pub struct PlainCourse(pub CourseRecord);

    impl Course for PlainCourse {
        type Raw = CourseRecord;

        fn from_raw(raw: &CourseRecord) -> ZjuicalResult<Self> {
            raw.validate()?;
            Ok(PlainCourse(raw.clone()))
        }

        fn week_type_from(_raw: &str, _terms: &[Term]) -> ZjuicalResult<WeekType> {
            Ok(WeekType::Normal)
        }

        fn record(&self) -> &CourseRecord {
            &self.0
        }

        fn record_mut(&mut self) -> &mut CourseRecord {
            &mut self.0
        }

        fn description(&self) -> String {
            self.0.base_description()
        }
    }

    pub fn block(day_of_week: u32, start: u32, end: u32) -> CourseRecord {
        CourseRecord {
            class_id: "(2024-2025-1)-CS101-01".to_string(),
            name: "操作系统".to_string(),
            teacher: "张三".to_string(),
            location: "东1A-101".to_string(),
            day_of_week,
            week_type: WeekType::Normal,
            start,
            end,
            terms: vec![Term::Autumn],
            credit: None,
        }
    }
}
