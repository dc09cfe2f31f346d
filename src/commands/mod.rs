pub mod generate;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::Args;
use tracing::info;
use zjuical_core::{ScheduleConfig, Snapshot, generate_ics};

/// Inputs shared by every command that renders a calendar.
#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Snapshot written by the scraper
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Schedule configuration file (JSON, or TOML by extension)
    #[arg(short, long, default_value = "configs/config.json", conflicts_with = "all")]
    pub config: PathBuf,

    /// Merge every config*.json / config*.toml in --configs-dir instead
    #[arg(long)]
    pub all: bool,

    #[arg(long, default_value = "configs")]
    pub configs_dir: PathBuf,

    /// Add homework deadlines
    #[arg(long)]
    pub include_todos: bool,

    /// Calendar name shown by calendar clients
    #[arg(long, default_value = "ZJU 课程表")]
    pub name: String,
}

impl Source {
    pub fn load_config(&self) -> Result<ScheduleConfig> {
        if self.all {
            ScheduleConfig::load_all(&self.configs_dir).with_context(|| {
                format!("Could not load configs from {}", self.configs_dir.display())
            })
        } else {
            ScheduleConfig::load(&self.config)
                .with_context(|| format!("Could not load {}", self.config.display()))
        }
    }

    /// Run the whole pipeline and return the calendar text.
    ///
    /// Timestamps in the output come from the configuration's `lastUpdated`,
    /// so unchanged inputs render byte-identical calendars.
    pub fn render(&self) -> Result<String> {
        let config = self.load_config()?;
        let snapshot = Snapshot::load(&self.snapshot)
            .with_context(|| format!("Could not read snapshot {}", self.snapshot.display()))?;

        let events = snapshot.synthesize(&config, self.include_todos)?;
        info!("{} events before deduplication", events.len());

        let stamp = config.last_updated.and_time(NaiveTime::MIN).and_utc();
        Ok(generate_ics(&events, &self.name, stamp)?)
    }
}
