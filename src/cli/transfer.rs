//! Moving tours between documents: import, export, backfill.

use std::fs;
use std::path::Path;

use onboard::transfer::{self, FileSource, MergeMode};
use onboard::widget::ensure_tour_ids;

use super::document::TourDocument;

pub(super) async fn cmd_import(
    file: &Path,
    into: &Path,
    mode: &str,
    with_settings: bool,
    out: Option<&Path>,
) -> Result<(), String> {
    let imported = transfer::import(&FileSource::new(Some(file.to_path_buf())))
        .await
        .map_err(|e| format!("{}: {e}", file.display()))?;

    let mode = MergeMode::from_name(mode);
    let mut document = TourDocument::load_or_default(into)?;
    let before = document.tours.len();
    document.tours = transfer::merge(&document.tours, &imported.tours, mode);

    if with_settings {
        if let Some(theme) = imported.theme {
            document.theme = theme;
        }
        if let Some(widget) = imported.widget {
            document.widget = widget;
        }
    }

    let target = out.unwrap_or(into);
    document.save(target)?;
    eprintln!(
        "Imported {} tour(s) ({mode}): {before} → {} in {}",
        imported.tours.len(),
        document.tours.len(),
        target.display()
    );
    Ok(())
}

pub(super) fn cmd_export(doc: &Path, out: Option<&Path>) -> Result<(), String> {
    let document = TourDocument::load(doc)?;
    let bundle = transfer::export(&document.tours, &document.theme, &document.widget);
    let json =
        transfer::to_json(&bundle).map_err(|e| format!("failed to serialize export: {e}"))?;

    match out {
        Some(path) => {
            fs::write(path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!(
                "Exported {} tour(s) to {}",
                bundle.tours.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub(super) fn cmd_backfill(doc: &Path) -> Result<(), String> {
    let mut document = TourDocument::load(doc)?;
    match ensure_tour_ids(&document.tours) {
        Some(tours) => {
            let missing = document
                .tours
                .iter()
                .filter(|t| t.id().is_none())
                .count();
            document.tours = tours;
            document.save(doc)?;
            eprintln!("Assigned ids to {missing} tour(s) in {}", doc.display());
        }
        None => eprintln!("All tours already have ids."),
    }
    Ok(())
}
