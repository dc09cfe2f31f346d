//! Term calendar resolution.
//!
//! Maps every actual date of a term to the date whose weekday schedule it
//! follows, after applying the registrar's holiday adjustments.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{TermConfig, Tweak, TweakKind};
use crate::time::{days_inclusive, is_even_week, monday_of_first_week};

#[derive(Debug, Clone)]
pub struct TermCalendar {
    begin: NaiveDate,
    end: NaiveDate,
    /// actual date → effective date
    mapping: BTreeMap<NaiveDate, NaiveDate>,
    notes: HashMap<NaiveDate, String>,
    monday_of_first_week: NaiveDate,
}

impl TermCalendar {
    /// Build the mapping for a term.
    ///
    /// Tweaks apply in order and later ones overwrite earlier entries for the
    /// same date. Only dates inside the term are ever added; tweaks reaching
    /// outside it are applied to the part that overlaps.
    pub fn resolve(term: &TermConfig, tweaks: &[Tweak]) -> Self {
        let mut calendar = TermCalendar {
            begin: term.begin,
            end: term.end,
            mapping: days_inclusive(term.begin, term.end)
                .map(|d| (d, d))
                .collect(),
            notes: HashMap::new(),
            monday_of_first_week: monday_of_first_week(term.begin, term.first_week_number),
        };

        for tweak in tweaks
            .iter()
            .filter(|t| t.intersects(term.begin, term.end))
        {
            calendar.apply(tweak);
        }

        calendar
    }

    fn apply(&mut self, tweak: &Tweak) {
        debug!(
            "Applying {:?} {} -> {} ({})",
            tweak.kind, tweak.from, tweak.to, tweak.description
        );

        match tweak.kind {
            TweakKind::Clear => {
                for day in days_inclusive(tweak.from, tweak.to) {
                    self.mapping.remove(&day);
                }
            }
            TweakKind::Copy => {
                self.assign(tweak.to, tweak.from);
                self.annotate(tweak.to, &tweak.description);
            }
            TweakKind::Move => {
                self.assign(tweak.to, tweak.from);
                self.mapping.remove(&tweak.from);
                self.annotate(tweak.from, &tweak.description);
            }
            TweakKind::Exchange => {
                self.assign(tweak.to, tweak.from);
                self.assign(tweak.from, tweak.to);
                self.annotate(tweak.from, &tweak.description);
                self.annotate(tweak.to, &tweak.description);
            }
            TweakKind::Pending => {}
        }
    }

    fn assign(&mut self, actual: NaiveDate, effective: NaiveDate) {
        if self.contains_date(actual) {
            self.mapping.insert(actual, effective);
        }
    }

    fn annotate(&mut self, day: NaiveDate, description: &str) {
        self.notes.insert(day, description.to_string());
    }

    fn contains_date(&self, day: NaiveDate) -> bool {
        self.begin <= day && day <= self.end
    }

    /// `(actual, effective)` pairs in date order.
    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, NaiveDate)> + '_ {
        self.mapping.iter().map(|(actual, effective)| (*actual, *effective))
    }

    /// Actual dates that hold classes.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.mapping.keys().copied()
    }

    pub fn effective_date(&self, actual: NaiveDate) -> Option<NaiveDate> {
        self.mapping.get(&actual).copied()
    }

    /// Adjustment note shown on an actual date's events.
    ///
    /// A note attached to the actual date wins; otherwise the note of the
    /// effective date is used, so a moved day's reason shows where the
    /// classes now take place.
    pub fn note_for(&self, actual: NaiveDate, effective: NaiveDate) -> Option<&str> {
        self.notes
            .get(&actual)
            .or_else(|| self.notes.get(&effective))
            .map(String::as_str)
    }

    pub fn is_even_week(&self, effective: NaiveDate) -> bool {
        is_even_week(self.monday_of_first_week, effective)
    }

    pub fn monday_of_first_week(&self) -> NaiveDate {
        self.monday_of_first_week
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
