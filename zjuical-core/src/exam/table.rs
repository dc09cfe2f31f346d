use serde::Deserialize;
use tracing::{info, warn};

use crate::course::{CourseRecord, UGRS_CLASS_ID_LEN, normalize_course_name};
use crate::error::ZjuicalResult;
use crate::event::CalendarEvent;
use crate::exam::{ExamKind, ExamRecord, ExamTime, parse_exam_time};
use crate::raw::{lenient_opt_string, lenient_string, non_empty, parse_field, truncate_chars};

/// One row of the undergraduate exam listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ExamRawRecord {
    pub xkkh: String,
    pub kcmc: String,
    #[serde(deserialize_with = "lenient_string")]
    pub xf: String,
    /// Final exam time, location and seat
    #[serde(default)]
    pub kssj: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub jsmc: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub zwxh: Option<String>,
    /// Midterm exam time, location and seat
    #[serde(default)]
    pub qzkssj: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub qzjsmc: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub qzzwxh: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExamTable {
    exams: Vec<ExamRecord>,
}

impl ExamTable {
    pub fn from_records(exams: Vec<ExamRecord>) -> Self {
        ExamTable { exams }
    }

    /// One record per published sitting, or a single `NoExam` record when the
    /// class has none.
    pub fn from_raw(raws: &[ExamRawRecord]) -> ZjuicalResult<Self> {
        let mut exams = Vec::new();

        for raw in raws {
            let class_id = truncate_chars(&raw.xkkh, UGRS_CLASS_ID_LEN);
            let name = normalize_course_name(&raw.kcmc);
            let credit: f64 = parse_field("xf", &raw.xf)?;

            let make = |kind, time, location: &Option<String>, seat: &Option<String>| {
                let exam = ExamRecord {
                    class_id: class_id.clone(),
                    name: name.clone(),
                    credit,
                    kind,
                    time,
                    location: non_empty(location).map(str::to_string),
                    seat: non_empty(seat).map(str::to_string),
                    emitted: false,
                };
                log_constructed(&exam);
                exam
            };

            let midterm = non_empty(&raw.qzkssj);
            let final_term = non_empty(&raw.kssj);

            if let Some(time) = midterm {
                exams.push(make(
                    ExamKind::MidTerm,
                    parse_exam_time(time)?,
                    &raw.qzjsmc,
                    &raw.qzzwxh,
                ));
            }
            if let Some(time) = final_term {
                exams.push(make(
                    ExamKind::FinalTerm,
                    parse_exam_time(time)?,
                    &raw.jsmc,
                    &raw.zwxh,
                ));
            }
            if midterm.is_none() && final_term.is_none() {
                exams.push(make(ExamKind::NoExam, ExamTime::NotApplicable, &None, &None));
            }
        }

        Ok(ExamTable { exams })
    }

    pub fn exams(&self) -> &[ExamRecord] {
        &self.exams
    }

    pub fn len(&self) -> usize {
        self.exams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }

    pub fn find_by_class_id(&self, class_id: &str) -> Vec<&ExamRecord> {
        self.exams
            .iter()
            .filter(|exam| exam.class_id == class_id)
            .collect()
    }

    /// Exams of a course. A name differing from the course's is logged but
    /// does not prevent the match.
    pub fn find(&self, course: &CourseRecord) -> Vec<&ExamRecord> {
        let found = self.find_by_class_id(&course.class_id);
        for exam in &found {
            check_name(exam, course);
        }
        found
    }

    /// Events for every not-yet-emitted sitting of a course, marking each
    /// sitting emitted.
    pub fn emit_for(&mut self, course: &CourseRecord) -> Vec<CalendarEvent> {
        let mut events = Vec::new();

        for exam in self
            .exams
            .iter_mut()
            .filter(|exam| exam.class_id == course.class_id)
        {
            check_name(exam, course);
            if exam.emitted || exam.kind == ExamKind::NoExam {
                continue;
            }
            if let Some(event) = exam.to_event() {
                exam.emitted = true;
                events.push(event);
            }
        }

        events
    }
}

fn check_name(exam: &ExamRecord, course: &CourseRecord) {
    if exam.name != course.name {
        warn!(
            "Exam {} is listed as '{}' but the course is '{}'",
            exam.class_id, exam.name, course.name
        );
    }
}

fn log_constructed(exam: &ExamRecord) {
    if exam.time.is_unpublished() {
        warn!(
            "{}: {} {} (exam date not published yet, emitted without a date)",
            exam.kind, exam.name, exam.class_id
        );
    }
    info!("{}: {} {}", exam.kind, exam.name, exam.class_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::test_support::block;
    use serde_json::json;

    fn raws(value: serde_json::Value) -> Vec<ExamRawRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn course() -> CourseRecord {
        let mut course = block(1, 1, 3);
        course.class_id = "(2024-2025-1)-211G0210".to_string();
        course.name = "数据结构（甲）".to_string();
        course
    }

    fn listing() -> Vec<ExamRawRecord> {
        raws(json!([
            {
                "xkkh": "(2024-2025-1)-211G0210-0094567-1",
                "kcmc": "数据结构(甲)",
                "xf": "3.5",
                "kssj": "2025年01月10日(08:00-10:00)",
                "jsmc": "紫金港东2-201",
                "zwxh": 17,
                "qzkssj": "2024年11月05日(10:00-11:30)",
                "qzjsmc": "紫金港西1-101"
            },
            {
                "xkkh": "(2024-2025-1)-081C0130-0094567-1",
                "kcmc": "体育",
                "xf": 1
            }
        ]))
    }

    #[test]
    fn builds_one_record_per_sitting() {
        let table = ExamTable::from_raw(&listing()).unwrap();
        let kinds: Vec<_> = table.exams().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ExamKind::MidTerm, ExamKind::FinalTerm, ExamKind::NoExam]
        );

        let midterm = &table.exams()[0];
        assert_eq!(midterm.class_id, "(2024-2025-1)-211G0210");
        assert_eq!(midterm.name, "数据结构（甲）");
        assert_eq!(midterm.credit, 3.5);
        assert_eq!(midterm.location.as_deref(), Some("紫金港西1-101"));
        assert_eq!(midterm.seat, None);

        let final_term = &table.exams()[1];
        assert_eq!(final_term.seat.as_deref(), Some("17"));

        let none = &table.exams()[2];
        assert_eq!(none.time, ExamTime::NotApplicable);
        assert_eq!(none.credit, 1.0);
    }

    #[test]
    fn empty_time_counts_as_absent() {
        let table = ExamTable::from_raw(&raws(json!([
            { "xkkh": "X", "kcmc": "体育", "xf": "1.0", "kssj": "", "qzkssj": "  " }
        ])))
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.exams()[0].kind, ExamKind::NoExam);
    }

    #[test]
    fn malformed_time_is_fatal() {
        let result = ExamTable::from_raw(&raws(json!([
            { "xkkh": "X", "kcmc": "体育", "xf": "1.0", "kssj": "next tuesday" }
        ])));
        assert!(result.is_err());
    }

    #[test]
    fn find_matches_class_id_only() {
        let table = ExamTable::from_raw(&listing()).unwrap();
        assert_eq!(table.find(&course()).len(), 2);

        let mut other = course();
        other.class_id = "(2024-2025-1)-999".to_string();
        assert!(table.find(&other).is_empty());

        // mismatched names still match
        let mut renamed = course();
        renamed.name = "数据结构".to_string();
        assert_eq!(table.find(&renamed).len(), 2);
    }

    #[test]
    fn emits_each_sitting_once() {
        let mut table = ExamTable::from_raw(&listing()).unwrap();
        let first = table.emit_for(&course());
        let second = table.emit_for(&course());

        assert_eq!(first.len(), 2);
        assert!(second.is_empty(), "cross-listed courses must not re-emit");
        assert!(table.exams()[..2].iter().all(|e| e.emitted));
    }
}
