//! CLI interface for Onboard.
//!
//! Works on tour documents: JSON files shaped like the host stores them,
//! `{"tours": [...], "theme": {...}, "widget": {...}}`. Each subcommand is
//! non-interactive: arguments in, text or JSON out.
//!
//! - `onboard theme|render|steps|objects|detect`: inspect how tours resolve.
//! - `onboard import|export|backfill`: move and repair tour documents.
//! - `onboard seen ...|autostart`: the per-user seen-state.

mod document;
mod format;
mod seen;
mod tours;
mod transfer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use onboard::config::Config;

use seen::SeenCommand;

/// Onboard: resolve and inspect guided tours.
#[derive(Debug, Parser)]
#[command(name = "onboard", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Log debug output to stderr (overridden by `ONBOARD_LOG`).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: moving tours between apps
  1. onboard backfill sales.json
     → assigns ids to tours that lack one
  2. onboard export sales.json --out sales-tours.json
  3. onboard import sales-tours.json --into finance.json --mode replaceMatching

Inspect:
  onboard steps sales.json --tour "Welcome" --platform cloud
  onboard theme --preset leanGreen --css
  onboard detect "https://tenant.qlikcloud.com/sense/app/1/sheet/abc-123"
  onboard seen check --app 1 --sheet abc-123 --tour t0 --version 2"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a theme to its CSS variables.
    ///
    /// Uses the theme of `--doc` when given, else `--preset`.
    Theme {
        /// Preset name (default, leanGreen, corporateBlue, corporateGold).
        #[arg(long)]
        preset: Option<String>,

        /// Tour document whose theme to resolve.
        #[arg(long)]
        doc: Option<PathBuf>,

        /// Print a scoped CSS block instead of `name: value` lines.
        #[arg(long)]
        css: bool,
    },

    /// Render step-description Markdown to HTML.
    ///
    /// Reads the file, or stdin when no file is given.
    Render {
        file: Option<PathBuf>,
    },

    /// Show the playable steps of each tour in a document.
    Steps {
        doc: PathBuf,

        /// Only this tour (by name or id).
        #[arg(long)]
        tour: Option<String>,

        /// Platform whose selectors to use.
        #[arg(long, default_value = "client-managed")]
        platform: String,

        /// Selector variant within the platform.
        #[arg(long, default_value = "default")]
        code_path: String,
    },

    /// List the objects a step can target.
    ///
    /// Reads a JSON array of `{id, type, title}` as listed by the host.
    Objects {
        file: PathBuf,

        /// Ids on the current sheet. Can be specified multiple times.
        #[arg(long = "on-sheet")]
        on_sheet: Vec<String>,
    },

    /// Detect the platform for a page location.
    Detect {
        /// The page URL.
        location: String,

        /// Platform the host reports, if any (client-managed, cloud).
        #[arg(long)]
        reported: Option<String>,

        /// Host release the host reports.
        #[arg(long, requires = "reported")]
        version: Option<String>,

        /// Selector variant the host reports.
        #[arg(long, requires = "reported")]
        code_path: Option<String>,
    },

    /// Import tours from an export file into a tour document.
    Import {
        /// The export file.
        file: PathBuf,

        /// Tour document to merge into. Written in place unless `--out`.
        #[arg(long)]
        into: PathBuf,

        /// replaceAll, replaceMatching, or addToExisting.
        #[arg(long, default_value = "addToExisting")]
        mode: String,

        /// Also take the theme and widget settings from the file.
        #[arg(long)]
        with_settings: bool,

        /// Write the merged document here instead.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export a tour document's tours and settings.
    ///
    /// Writes to `--out` (if given) or stdout.
    Export {
        doc: PathBuf,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Give every tour without an id a fresh one, in place.
    Backfill {
        doc: PathBuf,
    },

    /// Query or change which tour versions were seen.
    Seen {
        #[command(subcommand)]
        command: SeenCommand,

        /// Seen-state database (default from config, then `~/.onboard/seen.sqlite`).
        #[arg(long, global = true)]
        store: Option<PathBuf>,
    },

    /// List the tours that would start on their own.
    Autostart {
        doc: PathBuf,

        #[arg(long)]
        app: Option<String>,

        #[arg(long)]
        sheet: Option<String>,

        /// Seen-state database (default from config, then `~/.onboard/seen.sqlite`).
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

/// Run the CLI, returning an error message on failure.
pub async fn run(cli: Cli, config: &Config) -> Result<(), String> {
    match cli.command {
        Command::Theme { preset, doc, css } => {
            tours::cmd_theme(preset.as_deref(), doc.as_deref(), css)
        }
        Command::Render { file } => tours::cmd_render(file.as_deref()),
        Command::Steps {
            doc,
            tour,
            platform,
            code_path,
        } => tours::cmd_steps(config, &doc, tour.as_deref(), &platform, &code_path),
        Command::Objects { file, on_sheet } => tours::cmd_objects(&file, &on_sheet),
        Command::Detect {
            location,
            reported,
            version,
            code_path,
        } => {
            let reported = tours::Reported {
                platform: reported,
                version,
                code_path,
            };
            tours::cmd_detect(config, &location, reported).await
        }
        Command::Import {
            file,
            into,
            mode,
            with_settings,
            out,
        } => transfer::cmd_import(&file, &into, &mode, with_settings, out.as_deref()).await,
        Command::Export { doc, out } => transfer::cmd_export(&doc, out.as_deref()),
        Command::Backfill { doc } => transfer::cmd_backfill(&doc),
        Command::Seen { command, store } => {
            let seen = seen::open_store(config, store.as_deref())?;
            seen::cmd_seen(&seen, &command)
        }
        Command::Autostart {
            doc,
            app,
            sheet,
            store,
        } => {
            let seen = seen::open_store(config, store.as_deref())?;
            seen::cmd_autostart(&seen, &doc, app.as_deref(), sheet.as_deref())
        }
    }
}
