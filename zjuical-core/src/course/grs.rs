//! Graduate timetable records.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::course::{Course, CourseRecord, CourseTable};
use crate::error::{ZjuicalError, ZjuicalResult};
use crate::raw::{lenient_opt_string, lenient_string, non_empty, parse_field, truncate_chars};
use crate::term::{Term, WeekType, parse_term_tags};
use crate::time::{period_span_label, weekday_name};

/// Length of the class-number prefix that identifies a class.
pub const GRS_CLASS_ID_LEN: usize = 7;

/// Location used for online courses without a room.
pub const ONLINE_LOCATION: &str = "线上";

const ONLINE_MARKERS: [&str; 3] = ["线上", "录播", "直播"];

/// One timetable entry (`pyKcbjSjddVOList` item).
#[derive(Debug, Clone, Deserialize)]
pub struct GrsRawCourse {
    /// Class number
    #[serde(rename = "bjbh", deserialize_with = "lenient_string")]
    pub class_number: String,
    #[serde(rename = "xqj", deserialize_with = "lenient_string")]
    pub day_of_week: String,
    #[serde(rename = "pkxqMc")]
    pub term_tags: String,
    /// Comma-separated teaching weeks
    #[serde(rename = "zc", default, deserialize_with = "lenient_opt_string")]
    pub weeks: Option<String>,
    #[serde(rename = "kcmc")]
    pub name: String,
    #[serde(rename = "xm", default)]
    pub teacher: Option<String>,
    #[serde(rename = "cdmc", default)]
    pub location: Option<String>,
    #[serde(rename = "ksjc", deserialize_with = "lenient_string")]
    pub start_period: String,
    /// Last period, inclusive
    #[serde(rename = "jsjc", deserialize_with = "lenient_string")]
    pub last_period: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrsPeriodSlot {
    #[serde(rename = "pyKcbjSjddVOList", default)]
    pub entries: Vec<GrsRawCourse>,
}

/// `kcbMap`: day number → period number → slot.
pub type GrsTimetable = BTreeMap<String, BTreeMap<String, GrsPeriodSlot>>;

/// Course-selection details (`xxjhnList` item) used to enrich timetable entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrsCourseInfo {
    #[serde(rename = "kcbh", default, deserialize_with = "lenient_opt_string")]
    pub course_number: Option<String>,
    #[serde(rename = "xf", default, deserialize_with = "lenient_opt_string")]
    pub credit: Option<String>,
    /// Course nature code
    #[serde(rename = "kcxzDm", default)]
    pub course_type: Option<String>,
    /// Required/elective
    #[serde(rename = "bx", default)]
    pub elective: Option<String>,
    #[serde(rename = "bz", default)]
    pub comment: Option<String>,
    #[serde(rename = "kkxyMc", default)]
    pub school: Option<String>,
    /// Time/location remark; its first line names the term
    #[serde(rename = "sjddBz", default)]
    pub schedule_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrsCourse {
    pub record: CourseRecord,
    pub term_info: String,
    pub course_type: String,
    pub comment: String,
    pub school: String,
}

impl GrsCourse {
    /// Apply course-selection details for this class.
    pub fn enrich(&mut self, info: &GrsCourseInfo) -> ZjuicalResult<()> {
        if let Some(credit) = non_empty(&info.credit) {
            self.record.credit = Some(parse_field("xf", credit)?);
        }

        self.course_type = non_empty(&info.course_type).unwrap_or_default().to_string();
        if let Some(elective) = non_empty(&info.elective) {
            self.course_type.push_str(&format!("({})", elective));
        }
        self.comment = non_empty(&info.comment).unwrap_or_default().to_string();
        self.school = non_empty(&info.school).unwrap_or_default().to_string();

        if self.record.location.is_empty()
            && ONLINE_MARKERS.iter().any(|m| self.comment.contains(m))
        {
            self.record.location = ONLINE_LOCATION.to_string();
        }

        self.term_info = non_empty(&info.schedule_note)
            .and_then(|note| note.split("<br/>").next())
            .unwrap_or_default()
            .to_string();

        Ok(())
    }
}

impl Course for GrsCourse {
    type Raw = GrsRawCourse;

    fn from_raw(raw: &GrsRawCourse) -> ZjuicalResult<Self> {
        let terms = parse_term_tags(raw.term_tags.trim())?;
        let start: u32 = parse_field("ksjc", &raw.start_period)?;
        let last: u32 = parse_field("jsjc", &raw.last_period)?;
        let end = last
            .checked_add(1)
            .ok_or_else(|| ZjuicalError::field("jsjc", format!("period {} out of range", last)))?;

        let record = CourseRecord {
            class_id: truncate_chars(&raw.class_number, GRS_CLASS_ID_LEN),
            name: raw.name.clone(),
            teacher: raw.teacher.clone().unwrap_or_default(),
            location: non_empty(&raw.location).unwrap_or_default().to_string(),
            day_of_week: parse_field("xqj", &raw.day_of_week)?,
            week_type: Self::week_type_from(raw.weeks.as_deref().unwrap_or_default(), &terms)?,
            start,
            end,
            terms,
            credit: None,
        };
        record.validate()?;
        record.log_constructed();

        Ok(GrsCourse {
            record,
            term_info: String::new(),
            course_type: String::new(),
            comment: String::new(),
            school: String::new(),
        })
    }

    /// Majority parity of the teaching weeks, unless the course meets in more
    /// weeks than an alternating schedule could cover.
    fn week_type_from(raw: &str, terms: &[Term]) -> ZjuicalResult<WeekType> {
        let weeks = raw
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(|w| parse_field::<u32>("zc", w))
            .collect::<ZjuicalResult<Vec<_>>>()?;

        if weeks.is_empty() {
            return Err(ZjuicalError::field("zc", "no teaching weeks listed"));
        }

        let threshold = if terms.len() > 1 { 8 } else { 4 };
        if weeks.len() > threshold {
            return Ok(WeekType::Normal);
        }

        let odd = weeks.iter().filter(|w| *w % 2 == 1).count();
        if odd * 2 > weeks.len() {
            Ok(WeekType::OddOnly)
        } else {
            Ok(WeekType::EvenOnly)
        }
    }

    fn record(&self) -> &CourseRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut CourseRecord {
        &mut self.record
    }

    fn description(&self) -> String {
        let record = &self.record;
        format!(
            "{}\n课号: {}\n课程类型: {}\n学期: {}\n时间: {} {}\n开课学院: {}\n备注: {}",
            record.base_description(),
            record.class_id,
            self.course_type,
            self.term_info,
            weekday_name(record.day_of_week).unwrap_or_default(),
            period_span_label(record.start, record.end),
            self.school,
            self.comment
        )
    }
}

impl CourseTable<GrsCourse> {
    /// Build a table from the nested graduate timetable.
    ///
    /// Entries listing a single week are make-up sessions the registrar lists
    /// separately around holidays; tweaks already cover them, so they are skipped.
    pub fn from_timetable(timetable: &GrsTimetable) -> ZjuicalResult<Self> {
        let mut table = CourseTable::new();

        for day in 1..=7u32 {
            let Some(periods) = timetable.get(&day.to_string()) else {
                continue;
            };
            for period in 1..=15u32 {
                let Some(slot) = periods.get(&period.to_string()) else {
                    continue;
                };
                for raw in &slot.entries {
                    if !raw.weeks.as_deref().unwrap_or_default().contains(',') {
                        debug!("Skipping single-week listing for {}", raw.name);
                        continue;
                    }
                    table.push(GrsCourse::from_raw(raw)?);
                }
            }
        }

        Ok(table)
    }

    /// Attach course-selection details by class number.
    pub fn enrich(&mut self, infos: &[GrsCourseInfo]) -> ZjuicalResult<()> {
        for course in self.iter_mut() {
            let class_id = course.record.class_id.as_str();
            let info = infos
                .iter()
                .find(|info| info.course_number.as_deref() == Some(class_id));
            if let Some(info) = info {
                course.enrich(info)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(weeks: &str, start: u32, last: u32) -> serde_json::Value {
        json!({
            "bjbh": "1234567-01",
            "xqj": 2,
            "pkxqMc": "秋冬",
            "zc": weeks,
            "kcmc": "高级算法",
            "xm": "王五",
            "cdmc": null,
            "ksjc": start,
            "jsjc": last
        })
    }

    fn raw(value: serde_json::Value) -> GrsRawCourse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_entry_fields() {
        let course = GrsCourse::from_raw(&raw(entry("1,2,3,4,5,6,7,8,9", 6, 8))).unwrap();
        let record = course.record();

        assert_eq!(record.class_id, "1234567");
        assert_eq!(record.day_of_week, 2);
        assert_eq!((record.start, record.end), (6, 9));
        assert_eq!(record.location, "");
        assert_eq!(record.week_type, WeekType::Normal);
        assert_eq!(record.terms, vec![Term::Autumn, Term::Winter]);
    }

    #[test]
    fn rejects_last_period_past_the_day() {
        let mut value = entry("1,3,5,7", 6, 7);
        value["jsjc"] = json!(u32::MAX);
        assert!(matches!(
            GrsCourse::from_raw(&raw(value)),
            Err(ZjuicalError::Field { field: "jsjc", .. })
        ));
    }

    #[test]
    fn week_type_thresholds() {
        let two_terms = [Term::Autumn, Term::Winter];
        let one_term = [Term::Autumn];

        assert_eq!(
            GrsCourse::week_type_from("1,3,5,7,9", &one_term).unwrap(),
            WeekType::Normal
        );
        assert_eq!(
            GrsCourse::week_type_from("1,3,5,7,9", &two_terms).unwrap(),
            WeekType::OddOnly
        );
        assert_eq!(
            GrsCourse::week_type_from("2,4,6,8", &one_term).unwrap(),
            WeekType::EvenOnly
        );
        // A tie is not a majority of odd weeks
        assert_eq!(
            GrsCourse::week_type_from("1,2", &one_term).unwrap(),
            WeekType::EvenOnly
        );
        assert!(GrsCourse::week_type_from("", &one_term).is_err());
        assert!(GrsCourse::week_type_from("1,x", &one_term).is_err());
    }

    #[test]
    fn timetable_skips_single_week_listings() {
        let timetable: GrsTimetable = serde_json::from_value(json!({
            "2": {
                "6": { "pyKcbjSjddVOList": [entry("1,3,5,7", 6, 7), entry("9", 6, 7)] },
                "8": { "pyKcbjSjddVOList": [] }
            },
            "7": {
                "1": { "pyKcbjSjddVOList": [entry("2,4,6,8", 1, 2)] }
            }
        }))
        .unwrap();

        let table = CourseTable::from_timetable(&timetable).unwrap();
        assert_eq!(table.len(), 2, "single-week entry should be skipped");
        assert_eq!(table.courses()[0].record.week_type, WeekType::OddOnly);
        assert_eq!(table.courses()[1].record.start, 1);
    }

    #[test]
    fn enrichment_fills_details_and_online_location() {
        let mut table = CourseTable::new();
        table.push(GrsCourse::from_raw(&raw(entry("1,3,5,7", 6, 7))).unwrap());

        let infos: Vec<GrsCourseInfo> = serde_json::from_value(json!([
            { "kcbh": "7654321", "xf": "1" },
            {
                "kcbh": "1234567",
                "xf": 2,
                "kcxzDm": "专业学位课",
                "bx": "必修",
                "bz": "线上直播授课",
                "kkxyMc": "计算机科学与技术学院",
                "sjddBz": "秋冬学期<br/>周二第6-7节"
            }
        ]))
        .unwrap();

        table.enrich(&infos).unwrap();
        let course = &table.courses()[0];

        assert_eq!(course.record.credit, Some(2.0));
        assert_eq!(course.course_type, "专业学位课(必修)");
        assert_eq!(course.school, "计算机科学与技术学院");
        assert_eq!(course.term_info, "秋冬学期");
        assert_eq!(course.record.location, ONLINE_LOCATION);
        assert!(course.description().contains("时间: 星期二 第6-7节"));
    }

    #[test]
    fn enrichment_without_credit_keeps_unknown() {
        let mut course = GrsCourse::from_raw(&raw(entry("1,3,5,7", 6, 7))).unwrap();
        course.enrich(&GrsCourseInfo::default()).unwrap();
        assert_eq!(course.record.credit, None);
        assert!(course.description().contains("学分: 未知"));
    }
}
