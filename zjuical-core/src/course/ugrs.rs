//! Undergraduate timetable records.

use serde::Deserialize;

use crate::course::{Course, CourseRecord};
use crate::error::{ZjuicalError, ZjuicalResult};
use crate::raw::{lenient_opt_string, lenient_string, parse_field, truncate_chars};
use crate::term::{Term, WeekType, parse_term_tags};
use crate::time::period_span_label;

/// Length of the selection-code prefix that identifies a class.
pub const UGRS_CLASS_ID_LEN: usize = 22;

/// One entry of the undergraduate timetable (`kbList`).
#[derive(Debug, Clone, Deserialize)]
pub struct UgrsRawCourse {
    /// Course selection code
    #[serde(rename = "xkkh")]
    pub selection_code: String,
    #[serde(rename = "xqj", deserialize_with = "lenient_string")]
    pub day_of_week: String,
    /// Odd/even week flag
    #[serde(rename = "dsz", default, deserialize_with = "lenient_opt_string")]
    pub parity: Option<String>,
    /// `name<br>time<br>teacher<br>location` listing, optionally followed by `zwf…`
    #[serde(rename = "kcb")]
    pub listing: String,
    #[serde(rename = "xxq")]
    pub term_tags: String,
    #[serde(rename = "djj", deserialize_with = "lenient_string")]
    pub start_period: String,
    #[serde(rename = "skcd", deserialize_with = "lenient_string")]
    pub period_count: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UgrsCourse {
    pub record: CourseRecord,
    /// Week/time text from the listing, e.g. "秋冬{第1-16周}"
    pub time_text: String,
}

/// Normalize ASCII parentheses to full-width, matching exam listings.
pub(crate) fn normalize_course_name(name: &str) -> String {
    name.replace('(', "（").replace(')', "）")
}

impl Course for UgrsCourse {
    type Raw = UgrsRawCourse;

    fn from_raw(raw: &UgrsRawCourse) -> ZjuicalResult<Self> {
        let listing = raw.listing.split("zwf").next().unwrap_or_default();
        let parts: Vec<&str> = listing.split("<br>").collect();
        if parts.len() < 4 {
            return Err(ZjuicalError::field(
                "kcb",
                format!("expected name<br>time<br>teacher<br>location, got '{}'", raw.listing),
            ));
        }

        let terms = parse_term_tags(raw.term_tags.trim())?;
        let start: u32 = parse_field("djj", &raw.start_period)?;
        let count: u32 = parse_field("skcd", &raw.period_count)?;
        let end = start.checked_add(count).ok_or_else(|| {
            ZjuicalError::field("skcd", format!("{} periods from period {}", count, start))
        })?;

        let record = CourseRecord {
            class_id: truncate_chars(&raw.selection_code, UGRS_CLASS_ID_LEN),
            name: normalize_course_name(parts[0]),
            teacher: parts[2].to_string(),
            location: parts[3].trim().to_string(),
            day_of_week: parse_field("xqj", &raw.day_of_week)?,
            week_type: Self::week_type_from(raw.parity.as_deref().unwrap_or_default(), &terms)?,
            start,
            end,
            terms,
            credit: None,
        };
        record.validate()?;
        record.log_constructed();

        Ok(UgrsCourse {
            record,
            time_text: parts[1].to_string(),
        })
    }

    fn week_type_from(raw: &str, _terms: &[Term]) -> ZjuicalResult<WeekType> {
        match raw.trim() {
            "0" => Ok(WeekType::OddOnly),
            "1" => Ok(WeekType::EvenOnly),
            "" | "2" => Ok(WeekType::Normal),
            other => Err(ZjuicalError::field(
                "dsz",
                format!("unknown week parity flag '{}'", other),
            )),
        }
    }

    fn record(&self) -> &CourseRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut CourseRecord {
        &mut self.record
    }

    fn description(&self) -> String {
        format!(
            "{}\n{} {}",
            self.record.base_description(),
            self.time_text,
            period_span_label(self.record.start, self.record.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> UgrsRawCourse {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "xkkh": "(2024-2025-1)-211G0210-0094567-1",
            "xqj": "1",
            "dsz": "0",
            "kcb": "数据结构(甲)<br>秋冬{第1-16周|单周}<br>张三<br>紫金港东1A-101zwf考试信息",
            "xxq": "秋冬",
            "djj": "3",
            "skcd": "2"
        })
    }

    #[test]
    fn parses_listing_fields() {
        let course = UgrsCourse::from_raw(&raw(sample())).unwrap();
        let record = course.record();

        assert_eq!(record.class_id, "(2024-2025-1)-211G0210");
        assert_eq!(record.name, "数据结构（甲）");
        assert_eq!(record.teacher, "张三");
        assert_eq!(record.location, "紫金港东1A-101");
        assert_eq!(record.day_of_week, 1);
        assert_eq!(record.week_type, WeekType::OddOnly);
        assert_eq!((record.start, record.end), (3, 5));
        assert_eq!(record.terms, vec![Term::Autumn, Term::Winter]);
        assert_eq!(record.credit, None);
        assert_eq!(course.time_text, "秋冬{第1-16周|单周}");
    }

    #[test]
    fn numeric_fields_may_be_numbers() {
        let mut value = sample();
        value["xqj"] = json!(5);
        value["djj"] = json!(1);
        value["skcd"] = json!(1);
        value["dsz"] = json!(null);

        let course = UgrsCourse::from_raw(&raw(value)).unwrap();
        assert_eq!(course.record.day_of_week, 5);
        assert_eq!((course.record.start, course.record.end), (1, 2));
        assert_eq!(course.record.week_type, WeekType::Normal);
    }

    #[test]
    fn description_includes_time_text_and_span() {
        let course = UgrsCourse::from_raw(&raw(sample())).unwrap();
        assert_eq!(
            course.description(),
            "教师: 张三\n学分: 未知\n秋冬{第1-16周|单周} 第3-4节"
        );
    }

    #[test]
    fn rejects_unknown_term_tags() {
        let mut value = sample();
        value["xxq"] = json!("短");
        assert!(matches!(
            UgrsCourse::from_raw(&raw(value)),
            Err(ZjuicalError::TermTags(_))
        ));
    }

    #[test]
    fn rejects_truncated_listing() {
        let mut value = sample();
        value["kcb"] = json!("数据结构<br>秋冬");
        assert!(UgrsCourse::from_raw(&raw(value)).is_err());
    }

    #[test]
    fn rejects_unparseable_periods_and_flags() {
        let mut value = sample();
        value["djj"] = json!("x");
        assert!(UgrsCourse::from_raw(&raw(value)).is_err());

        let mut value = sample();
        value["dsz"] = json!("单");
        assert!(UgrsCourse::from_raw(&raw(value)).is_err());
    }

    #[test]
    fn rejects_period_count_past_the_day() {
        let mut value = sample();
        value["djj"] = json!("1");
        value["skcd"] = json!("4294967295");
        assert!(matches!(
            UgrsCourse::from_raw(&raw(value)),
            Err(ZjuicalError::Field { field: "skcd", .. })
        ));
    }

    #[test]
    fn empty_location_is_kept_empty() {
        let mut value = sample();
        value["kcb"] = json!("体育<br>秋冬<br>李四<br>");
        let course = UgrsCourse::from_raw(&raw(value)).unwrap();
        assert_eq!(course.record.location, "");
        assert_eq!(course.record.location_label(), "地点待定");
    }
}
