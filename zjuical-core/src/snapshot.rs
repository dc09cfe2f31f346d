//! Scraped input records and the end-to-end pipeline over them.
//!
//! A snapshot is the JSON written by the scraper for one student, tagged by
//! program:
//!
//! ```json
//! { "program": "ugrs", "exams": [...], "terms": [{ "year": "2024-2025", "term": "秋", "kbList": [...] }], "todos": [...] }
//! { "program": "grs", "terms": [{ "year": "2024-2025", "term": "秋", "kcbMap": {...}, "xxjhnList": [...] }] }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{ClassTerm, ScheduleConfig, TermConfig};
use crate::course::{
    Course, CourseTable, GrsCourse, GrsCourseInfo, GrsTimetable, UgrsCourse, UgrsRawCourse,
};
use crate::error::{ZjuicalError, ZjuicalResult};
use crate::event::CalendarEvent;
use crate::exam::{ExamKind, ExamRawRecord, ExamTable};
use crate::resolver::TermCalendar;
use crate::synth::EventSynthesizer;
use crate::term::Term;
use crate::todo::{Todo, todo_events};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "program", rename_all = "lowercase")]
pub enum Snapshot {
    /// Undergraduate
    Ugrs {
        #[serde(default)]
        exams: Vec<ExamRawRecord>,
        terms: Vec<UgrsTermRecords>,
        #[serde(default)]
        todos: Vec<Todo>,
    },
    /// Graduate
    Grs {
        terms: Vec<GrsTermRecords>,
        #[serde(default)]
        todos: Vec<Todo>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct UgrsTermRecords {
    pub year: String,
    pub term: Term,
    #[serde(rename = "kbList", default)]
    pub courses: Vec<UgrsRawCourse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrsTermRecords {
    pub year: String,
    pub term: Term,
    #[serde(rename = "kcbMap", default)]
    pub timetable: GrsTimetable,
    #[serde(rename = "xxjhnList", default)]
    pub course_info: Vec<GrsCourseInfo>,
}

trait TermRecords {
    fn is_for(&self, class_term: &ClassTerm) -> bool;
}

impl TermRecords for UgrsTermRecords {
    fn is_for(&self, class_term: &ClassTerm) -> bool {
        self.year == class_term.year && self.term == class_term.term
    }
}

impl TermRecords for GrsTermRecords {
    fn is_for(&self, class_term: &ClassTerm) -> bool {
        self.year == class_term.year && self.term == class_term.term
    }
}

fn find_term<'a, T: TermRecords>(
    records: &'a [T],
    class_term: &ClassTerm,
) -> ZjuicalResult<&'a T> {
    records
        .iter()
        .find(|r| r.is_for(class_term))
        .ok_or_else(|| ZjuicalError::MissingRecords {
            year: class_term.year.clone(),
            term: class_term.term,
        })
}

impl Snapshot {
    pub fn load(path: &Path) -> ZjuicalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ZjuicalResult<Self> {
        serde_json::from_str(content).map_err(|e| ZjuicalError::Serialization(e.to_string()))
    }

    /// Events for every term the configuration asks for, plus homework
    /// deadlines when `include_todos` is set.
    pub fn synthesize(
        &self,
        config: &ScheduleConfig,
        include_todos: bool,
    ) -> ZjuicalResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();

        let (exams, todos) = match self {
            Snapshot::Ugrs {
                exams,
                terms,
                todos,
            } => {
                let mut exams = ExamTable::from_raw(exams)?;
                info!("{} exam records", exams.len());

                for class_term in &config.class_terms {
                    let term = config.term_config(class_term)?;
                    let records = find_term(terms, class_term)?;

                    let mut table: CourseTable<UgrsCourse> =
                        CourseTable::from_raw(&records.courses)?;
                    table.merge();
                    table.adopt_credits(&exams);

                    events.extend(term_events(config, term, &table, &mut exams)?);
                }
                (exams, todos)
            }
            Snapshot::Grs { terms, todos } => {
                let mut exams = ExamTable::default();

                for class_term in &config.class_terms {
                    let term = config.term_config(class_term)?;
                    let records = find_term(terms, class_term)?;

                    let mut table: CourseTable<GrsCourse> =
                        CourseTable::from_timetable(&records.timetable)?;
                    table.dedup();
                    table.merge();
                    table.enrich(&records.course_info)?;

                    events.extend(term_events(config, term, &table, &mut exams)?);
                }
                (exams, todos)
            }
        };

        if include_todos {
            let todo_events = todo_events(todos, &exams)?;
            info!("{} todo events", todo_events.len());
            events.extend(todo_events);
        }
        let unlinked = exams
            .exams()
            .iter()
            .filter(|e| !e.emitted && e.kind != ExamKind::NoExam);
        for exam in unlinked {
            debug!("Exam {} {} is not linked to any course", exam.name, exam.kind);
        }

        Ok(events)
    }
}

fn term_events<C: Course>(
    config: &ScheduleConfig,
    term: &TermConfig,
    table: &CourseTable<C>,
    exams: &mut ExamTable,
) -> ZjuicalResult<Vec<CalendarEvent>> {
    info!(
        "Synthesizing {}-{} ({} to {}, {} courses)",
        term.year,
        term.term,
        term.begin,
        term.end,
        table.len()
    );

    let calendar = TermCalendar::resolve(term, &config.tweaks);
    let synth = EventSynthesizer::new(term, &calendar);

    let mut events = synth.course_events(table)?;
    events.extend(synth.exam_events(table, exams));
    Ok(events)
}
