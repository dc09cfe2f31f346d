//! Academic terms and week recurrence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ZjuicalError, ZjuicalResult};

/// An academic term as named by the registrar.
///
/// Only the four regular terms can appear in a course's term tags; the short
/// and vacation terms exist so that configuration files naming them still parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "秋")]
    Autumn,
    #[serde(rename = "冬")]
    Winter,
    #[serde(rename = "短1")]
    ShortA,
    #[serde(rename = "暑")]
    SummerVacation,
    #[serde(rename = "春")]
    Spring,
    #[serde(rename = "夏")]
    Summer,
    #[serde(rename = "短2")]
    ShortB,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Autumn => "秋",
            Term::Winter => "冬",
            Term::ShortA => "短1",
            Term::SummerVacation => "暑",
            Term::Spring => "春",
            Term::Summer => "夏",
            Term::ShortB => "短2",
        }
    }

    /// Map a single term-tag character from a course listing.
    pub fn from_tag(tag: char) -> Option<Term> {
        match tag {
            '春' => Some(Term::Spring),
            '夏' => Some(Term::Summer),
            '秋' => Some(Term::Autumn),
            '冬' => Some(Term::Winter),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Term {
    type Err = ZjuicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "秋" => Ok(Term::Autumn),
            "冬" => Ok(Term::Winter),
            "短1" => Ok(Term::ShortA),
            "暑" => Ok(Term::SummerVacation),
            "春" => Ok(Term::Spring),
            "夏" => Ok(Term::Summer),
            "短2" => Ok(Term::ShortB),
            other => Err(ZjuicalError::Config(format!("Unknown term '{}'", other))),
        }
    }
}

/// Parse a compact term-tag string such as "秋冬" into its terms.
pub fn parse_term_tags(tags: &str) -> ZjuicalResult<Vec<Term>> {
    let mut terms = Vec::new();

    for tag in tags.chars() {
        let term = Term::from_tag(tag).ok_or_else(|| ZjuicalError::TermTags(tags.to_string()))?;
        if !terms.contains(&term) {
            terms.push(term);
        }
    }

    if terms.is_empty() {
        return Err(ZjuicalError::TermTags(tags.to_string()));
    }

    Ok(terms)
}

/// Which weeks a course block meets in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeekType {
    Normal,
    OddOnly,
    EvenOnly,
}

impl WeekType {
    /// Whether a block of this type meets in a week of the given parity.
    pub fn admits(self, even_week: bool) -> bool {
        match self {
            WeekType::Normal => true,
            WeekType::OddOnly => !even_week,
            WeekType::EvenOnly => even_week,
        }
    }
}
