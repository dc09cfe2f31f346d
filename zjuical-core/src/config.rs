//! Schedule configuration: which terms to generate, the term calendars, and
//! the holiday adjustments ("tweaks") published by the registrar.
//!
//! Files are JSON (or TOML, by extension) with the registrar-style key layout:
//!
//! ```json
//! {
//!   "lastUpdated": 20240901,
//!   "classTerms": ["2024-2025:秋", "2024-2025:冬"],
//!   "termConfigs": [
//!     { "Year": "2024-2025", "Term": "秋", "Begin": 20240909, "End": 20241110, "FirstWeekNo": 1 }
//!   ],
//!   "tweaks": [
//!     { "TweakType": "Clear", "Description": "国庆节", "From": 20241001, "To": 20241007 }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ZjuicalError, ZjuicalResult};
use crate::term::Term;
use crate::time::date_from_yyyymmdd;

/// Date bounds and week numbering of one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermConfig {
    pub year: String,
    pub term: Term,
    pub begin: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
    /// Number of the week containing `begin`.
    pub first_week_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TweakKind {
    /// No classes on `[from, to]`.
    Clear,
    /// `to` follows `from`'s schedule.
    Copy,
    /// `to` follows `from`'s schedule; `from` has no classes.
    Move,
    /// `from` and `to` swap schedules.
    Exchange,
    /// Announced but not scheduled yet. Never applied.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweak {
    pub kind: TweakKind,
    pub description: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Tweak {
    /// Whether `[from, to]` touches `[begin, end]`.
    pub fn intersects(&self, begin: NaiveDate, end: NaiveDate) -> bool {
        let (lo, hi) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        lo <= end && hi >= begin
    }
}

/// A requested term, written `"<year>:<term>"` in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTerm {
    pub year: String,
    pub term: Term,
}

impl fmt::Display for ClassTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.term)
    }
}

impl FromStr for ClassTerm {
    type Err = ZjuicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, term) = s.split_once(':').ok_or_else(|| {
            ZjuicalError::Config(format!("Invalid class term '{}'. Expected <year>:<term>", s))
        })?;
        Ok(ClassTerm {
            year: year.trim().to_string(),
            term: term.trim().parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub last_updated: NaiveDate,
    pub class_terms: Vec<ClassTerm>,
    pub term_configs: Vec<TermConfig>,
    pub tweaks: Vec<Tweak>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScheduleConfig {
    last_updated: u32,
    #[serde(default)]
    class_terms: Vec<String>,
    #[serde(default)]
    term_configs: Vec<RawTermConfig>,
    #[serde(default)]
    tweaks: Vec<RawTweak>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTermConfig {
    year: String,
    term: Term,
    begin: u32,
    end: u32,
    #[serde(rename = "FirstWeekNo")]
    first_week_number: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTweak {
    tweak_type: TweakKind,
    #[serde(default)]
    description: String,
    from: u32,
    to: u32,
}

/// Week numbers run within one academic year.
const MAX_FIRST_WEEK_NUMBER: u32 = 53;

impl TryFrom<RawTermConfig> for TermConfig {
    type Error = ZjuicalError;

    fn try_from(raw: RawTermConfig) -> ZjuicalResult<Self> {
        let config = TermConfig {
            year: raw.year,
            term: raw.term,
            begin: date_from_yyyymmdd(raw.begin)?,
            end: date_from_yyyymmdd(raw.end)?,
            first_week_number: raw.first_week_number,
        };

        if config.begin > config.end {
            return Err(ZjuicalError::Config(format!(
                "Term {}-{} begins ({}) after it ends ({})",
                config.year, config.term, config.begin, config.end
            )));
        }
        if !(1..=MAX_FIRST_WEEK_NUMBER).contains(&config.first_week_number) {
            return Err(ZjuicalError::Config(format!(
                "Term {}-{} has FirstWeekNo {}; expected 1 to {}",
                config.year, config.term, config.first_week_number, MAX_FIRST_WEEK_NUMBER
            )));
        }

        Ok(config)
    }
}

impl TryFrom<RawTweak> for Tweak {
    type Error = ZjuicalError;

    fn try_from(raw: RawTweak) -> ZjuicalResult<Self> {
        Ok(Tweak {
            kind: raw.tweak_type,
            description: raw.description,
            from: date_from_yyyymmdd(raw.from)?,
            to: date_from_yyyymmdd(raw.to)?,
        })
    }
}

impl TryFrom<RawScheduleConfig> for ScheduleConfig {
    type Error = ZjuicalError;

    fn try_from(raw: RawScheduleConfig) -> ZjuicalResult<Self> {
        Ok(ScheduleConfig {
            last_updated: date_from_yyyymmdd(raw.last_updated)?,
            class_terms: raw
                .class_terms
                .iter()
                .map(|s| s.parse())
                .collect::<ZjuicalResult<_>>()?,
            term_configs: raw
                .term_configs
                .into_iter()
                .map(TermConfig::try_from)
                .collect::<ZjuicalResult<_>>()?,
            tweaks: raw
                .tweaks
                .into_iter()
                .map(Tweak::try_from)
                .collect::<ZjuicalResult<_>>()?,
        })
    }
}

impl ScheduleConfig {
    /// Parse configuration text; `toml` selects TOML instead of JSON.
    pub fn parse(content: &str, toml: bool) -> ZjuicalResult<Self> {
        let raw: RawScheduleConfig = if toml {
            toml::from_str(content).map_err(|e| ZjuicalError::Config(e.to_string()))?
        } else {
            serde_json::from_str(content).map_err(|e| ZjuicalError::Config(e.to_string()))?
        };
        raw.try_into()
    }

    /// Load one configuration file.
    pub fn load(path: &Path) -> ZjuicalResult<Self> {
        if !path.exists() {
            return Err(ZjuicalError::Config(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, is_toml(path))
            .map_err(|e| ZjuicalError::Config(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded {} ({} terms, {} tweaks)",
            path.display(),
            config.class_terms.len(),
            config.tweaks.len()
        );
        Ok(config)
    }

    /// Load and merge every `config*.json` / `config*.toml` in `dir`.
    ///
    /// Files are read in name order. Earlier files win: class terms, term
    /// configs (by year and term) and tweaks (by dates and kind) already seen
    /// are skipped. `last_updated` is the latest of all files.
    pub fn load_all(dir: &Path) -> ZjuicalResult<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_config_file(path))
            .collect();
        paths.sort();

        let mut merged: Option<ScheduleConfig> = None;
        for path in &paths {
            let config = Self::load(path)?;
            merged = Some(match merged {
                None => config,
                Some(mut acc) => {
                    acc.absorb(config);
                    acc
                }
            });
        }

        let merged = merged.ok_or_else(|| {
            ZjuicalError::Config(format!("No config*.json files found in {}", dir.display()))
        })?;
        info!(
            "Merged {} config files: {} terms",
            paths.len(),
            merged.class_terms.len()
        );
        Ok(merged)
    }

    fn absorb(&mut self, other: ScheduleConfig) {
        self.last_updated = self.last_updated.max(other.last_updated);

        for class_term in other.class_terms {
            if !self.class_terms.contains(&class_term) {
                self.class_terms.push(class_term);
            }
        }
        for term_config in other.term_configs {
            let known = self
                .term_configs
                .iter()
                .any(|tc| tc.year == term_config.year && tc.term == term_config.term);
            if !known {
                self.term_configs.push(term_config);
            }
        }
        for tweak in other.tweaks {
            let known = self
                .tweaks
                .iter()
                .any(|t| t.from == tweak.from && t.to == tweak.to && t.kind == tweak.kind);
            if !known {
                self.tweaks.push(tweak);
            }
        }
    }

    pub fn term_config(&self, class_term: &ClassTerm) -> ZjuicalResult<&TermConfig> {
        self.term_configs
            .iter()
            .find(|tc| tc.year == class_term.year && tc.term == class_term.term)
            .ok_or_else(|| ZjuicalError::TermNotConfigured {
                year: class_term.year.clone(),
                term: class_term.term,
            })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

fn is_config_file(path: &Path) -> bool {
    let named = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("config"));
    let typed = path
        .extension()
        .is_some_and(|ext| ext == "json" || ext == "toml");
    path.is_file() && named && typed
}
