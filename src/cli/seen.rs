//! Seen-state commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use onboard::config::Config;
use onboard::seen::{SeenKey, SeenStore};
use onboard::storage::SqliteStore;
use onboard::widget::auto_start_candidates;

use super::document::TourDocument;

#[derive(Debug, Subcommand)]
pub enum SeenCommand {
    /// Whether a tour version was completed.
    Check {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Record a tour version as completed.
    Mark {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Forget that a tour version was completed.
    Reset {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Forget every completed tour.
    Clear,
}

/// Identifies one tour version on one sheet.
#[derive(Debug, clap::Args)]
pub struct KeyArgs {
    #[arg(long)]
    app: String,

    #[arg(long)]
    sheet: String,

    #[arg(long)]
    tour: String,

    #[arg(long, default_value_t = 1)]
    version: u32,
}

impl KeyArgs {
    fn key(&self) -> SeenKey<'_> {
        SeenKey {
            app_id: &self.app,
            sheet_id: &self.sheet,
            tour_id: &self.tour,
            tour_version: self.version,
        }
    }
}

/// Open the seen-state database: `--store`, then config, then the default.
pub(super) fn open_store(config: &Config, flag: Option<&Path>) -> Result<SeenStore, String> {
    let path: PathBuf = match (flag, &config.store_path) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => path.clone(),
        (None, None) => SqliteStore::default_path()
            .ok_or_else(|| "cannot determine home directory for the seen-state store".to_string())?,
    };
    let store = SqliteStore::open(&path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    Ok(SeenStore::new(store))
}

pub(super) fn cmd_seen(seen: &SeenStore, command: &SeenCommand) -> Result<(), String> {
    match command {
        SeenCommand::Check { key } => {
            let key = key.key();
            match seen.record(key) {
                Some(record) => println!("{key}: seen at {}", record.timestamp),
                None if seen.has_seen(key) => println!("{key}: seen"),
                None => println!("{key}: not seen"),
            }
        }
        SeenCommand::Mark { key } => {
            let key = key.key();
            seen.mark_seen(key);
            eprintln!("Marked {key}");
        }
        SeenCommand::Reset { key } => {
            let key = key.key();
            seen.reset_seen(key);
            eprintln!("Reset {key}");
        }
        SeenCommand::Clear => {
            let count = seen.clear_all();
            eprintln!("Cleared {count} entr{}", if count == 1 { "y" } else { "ies" });
        }
    }
    Ok(())
}

pub(super) fn cmd_autostart(
    seen: &SeenStore,
    doc: &Path,
    app: Option<&str>,
    sheet: Option<&str>,
) -> Result<(), String> {
    let document = TourDocument::load(doc)?;
    let candidates = auto_start_candidates(&document.tours, app, sheet, seen);
    if candidates.is_empty() {
        eprintln!("No tours would start automatically.");
        return Ok(());
    }
    for tour in candidates {
        println!(
            "{} ({}, v{})",
            tour.tour_name,
            tour.id().unwrap_or("no id"),
            tour.tour_version
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use onboard::storage::MemoryStore;
    use tempfile::TempDir;

    use super::*;

    fn key_args(tour: &str) -> KeyArgs {
        KeyArgs {
            app: "app".to_string(),
            sheet: "sheet".to_string(),
            tour: tour.to_string(),
            version: 2,
        }
    }

    #[test]
    fn mark_check_reset() {
        let seen = SeenStore::new(MemoryStore::new());
        let args = key_args("t1");

        cmd_seen(&seen, &SeenCommand::Mark { key: key_args("t1") }).unwrap();
        assert!(seen.has_seen(args.key()));

        cmd_seen(&seen, &SeenCommand::Check { key: key_args("t1") }).unwrap();
        cmd_seen(&seen, &SeenCommand::Reset { key: key_args("t1") }).unwrap();
        assert!(!seen.has_seen(args.key()));
    }

    #[test]
    fn clear_removes_everything() {
        let seen = SeenStore::new(MemoryStore::new());
        seen.mark_seen(key_args("a").key());
        seen.mark_seen(key_args("b").key());

        cmd_seen(&seen, &SeenCommand::Clear).unwrap();
        assert!(!seen.has_seen(key_args("a").key()));
        assert!(!seen.has_seen(key_args("b").key()));
    }

    #[test]
    fn store_flag_wins_over_config() {
        let dir = TempDir::new().unwrap();
        let flag = dir.path().join("flag.sqlite");
        let config = Config {
            store_path: Some(dir.path().join("config.sqlite")),
            ..Config::default()
        };

        let seen = open_store(&config, Some(&flag)).unwrap();
        seen.mark_seen(key_args("t").key());
        assert!(flag.exists());
        assert!(!dir.path().join("config.sqlite").exists());
    }
}
