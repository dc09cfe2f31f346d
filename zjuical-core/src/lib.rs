//! Core of zjuical: turns scraped timetable and exam records into calendar
//! events.
//!
//! The pipeline for one term:
//! - raw records → [`CourseTable`] / [`ExamTable`]
//! - merge adjacent blocks and adopt credits from exams
//! - [`TermCalendar::resolve`] maps actual dates to the weekday schedule they follow
//! - [`EventSynthesizer`] walks that mapping and emits [`CalendarEvent`]s
//! - [`generate_ics`] serializes the events
//!
//! [`Snapshot::synthesize`] runs all of it over a scraper snapshot.

pub mod config;
pub mod course;
pub mod error;
pub mod event;
pub mod exam;
pub mod ics;
mod raw;
pub mod resolver;
pub mod snapshot;
pub mod synth;
pub mod term;
pub mod time;
pub mod todo;

pub use config::{ClassTerm, ScheduleConfig, TermConfig, Tweak, TweakKind};
pub use course::{Course, CourseRecord, CourseTable, GrsCourse, UgrsCourse};
pub use error::{ZjuicalError, ZjuicalResult};
pub use event::{CALENDAR_TZ, CalendarEvent, EventTime};
pub use exam::{ExamKind, ExamRecord, ExamTable, ExamTime};
pub use ics::generate_ics;
pub use resolver::TermCalendar;
pub use snapshot::Snapshot;
pub use synth::EventSynthesizer;
pub use term::{Term, WeekType};
pub use todo::Todo;
