use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::commands::Source;

pub fn run(source: &Source, output: &Path, force: bool) -> Result<()> {
    if output.exists() {
        if !force {
            anyhow::bail!(
                "{} already exists.\n\nRe-run with --force to overwrite it.",
                output.display()
            );
        }
        warn!("Overwriting {}", output.display());
    }

    let ics = source.render()?;
    std::fs::write(output, ics)
        .with_context(|| format!("Could not write {}", output.display()))?;

    println!("Calendar written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CONFIG: &str = r#"{
        "lastUpdated": 20240901,
        "classTerms": ["2024-2025:秋"],
        "termConfigs": [
            { "Year": "2024-2025", "Term": "秋", "Begin": 20240902, "End": 20240908, "FirstWeekNo": 1 }
        ],
        "tweaks": []
    }"#;

    const SNAPSHOT: &str = r#"{
        "program": "ugrs",
        "exams": [],
        "terms": [{
            "year": "2024-2025",
            "term": "秋",
            "kbList": [{
                "xkkh": "(2024-2025-1)-211G0210-0094567-1",
                "xqj": "1",
                "kcb": "数据结构<br>秋冬{第1-16周}<br>张三<br>东1A-101",
                "xxq": "秋冬",
                "djj": "1",
                "skcd": "2"
            }]
        }]
    }"#;

    fn source(dir: &TempDir) -> Source {
        let config = dir.path().join("config.json");
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(&config, CONFIG).unwrap();
        std::fs::write(&snapshot, SNAPSHOT).unwrap();

        Source {
            snapshot,
            config,
            all: false,
            configs_dir: PathBuf::from("configs"),
            include_todos: false,
            name: "课表".to_string(),
        }
    }

    #[test]
    fn writes_calendar() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.ics");

        run(&source(&dir), &output, false).unwrap();

        let ics = std::fs::read_to_string(&output).unwrap();
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("DTSTART;TZID=Asia/Shanghai:20240902T080000"));
        assert!(ics.contains("DTSTAMP:20240901T000000Z"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.ics");
        std::fs::write(&output, "keep me").unwrap();

        assert!(run(&source(&dir), &output, false).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

        run(&source(&dir), &output, true).unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().starts_with("BEGIN:VCALENDAR"));
    }

    #[test]
    fn all_merges_config_directory() {
        let dir = TempDir::new().unwrap();
        let mut source = source(&dir);
        source.all = true;
        source.configs_dir = dir.path().to_path_buf();

        let ics = source.render().unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }
}
