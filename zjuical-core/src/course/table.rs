//! Ordered course collections for one program and term.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::course::Course;
use crate::error::ZjuicalResult;
use crate::exam::ExamTable;
use crate::term::Term;

#[derive(Debug, Clone)]
pub struct CourseTable<C: Course> {
    courses: Vec<C>,
}

impl<C: Course> Default for CourseTable<C> {
    fn default() -> Self {
        CourseTable {
            courses: Vec::new(),
        }
    }
}

impl<C: Course> CourseTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw records in the order they were delivered.
    pub fn from_raw<'a, I>(raws: I) -> ZjuicalResult<Self>
    where
        I: IntoIterator<Item = &'a C::Raw>,
        C::Raw: 'a,
    {
        let courses = raws
            .into_iter()
            .map(C::from_raw)
            .collect::<ZjuicalResult<Vec<_>>>()?;
        Ok(CourseTable { courses })
    }

    pub fn push(&mut self, course: C) {
        self.courses.push(course);
    }

    pub fn courses(&self) -> &[C] {
        &self.courses
    }

    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.courses.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut C> {
        self.courses.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Merge adjacent or overlapping blocks of the same offering.
    ///
    /// The block with the smaller index absorbs the other. Passes repeat until
    /// nothing merges, since widening a block can make it touch one that an
    /// earlier comparison in the same pass rejected.
    pub fn merge(&mut self) {
        let n = self.courses.len();
        let mut discarded = vec![false; n];

        loop {
            let mut merged_any = false;

            for i in 0..n {
                if discarded[i] {
                    continue;
                }
                for j in (i + 1)..n {
                    if discarded[j] {
                        continue;
                    }
                    let Some((start, end)) =
                        self.courses[i].record().overlap(self.courses[j].record())
                    else {
                        continue;
                    };

                    let survivor = self.courses[i].record_mut();
                    survivor.start = start;
                    survivor.end = end;
                    discarded[j] = true;
                    merged_any = true;
                }
            }

            if !merged_any {
                break;
            }
        }

        let before = self.courses.len();
        let mut index = 0;
        self.courses.retain(|_| {
            let keep = !discarded[index];
            index += 1;
            keep
        });
        info!("Merged course blocks: {} -> {}", before, self.courses.len());
    }

    /// Drop repeated blocks, keeping the first occurrence.
    ///
    /// Must run before [`merge`](Self::merge): exact repeats would otherwise be
    /// folded into neighbouring blocks.
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        let before = self.courses.len();

        self.courses.retain(|course| {
            let r = course.record();
            seen.insert((
                r.class_id.clone(),
                r.day_of_week,
                r.start,
                r.end,
                r.location.clone(),
                r.teacher.clone(),
            ))
        });

        if self.courses.len() != before {
            debug!(
                "Removed {} repeated course blocks",
                before - self.courses.len()
            );
        }
    }

    /// Take each course's credit from the first exam sharing its class id.
    pub fn adopt_credits(&mut self, exams: &ExamTable) {
        for course in &mut self.courses {
            let credit = exams.find(course.record()).first().map(|exam| exam.credit);
            if let Some(credit) = credit {
                course.record_mut().credit = Some(credit);
            }
        }
    }

    /// Courses meeting on a weekday (1 = Monday) during a term.
    pub fn classes_of_day(&self, day_of_week: u32, term: Term) -> Vec<&C> {
        self.courses
            .iter()
            .filter(|c| c.record().day_of_week == day_of_week && c.record().is_in_term(term))
            .collect()
    }
}
