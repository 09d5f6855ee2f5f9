//! Analysis-mode widget logic: tour ids and auto-start.

use std::time::Duration;

use tracing::{debug, info};

use crate::model::Tour;
use crate::player::RunContext;
use crate::seen::{SeenKey, SeenStore};
use crate::session::Session;
use crate::transfer::fresh_id;

/// Pause before an auto-started tour, so sheet objects can finish rendering.
pub const AUTO_START_DELAY: Duration = Duration::from_millis(500);

/// Give every tour without an id a fresh one.
///
/// Returns `None` when all tours already had ids, so the caller knows there
/// is nothing to write back.
pub fn ensure_tour_ids(tours: &[Tour]) -> Option<Vec<Tour>> {
    if tours.iter().all(|t| t.id().is_some()) {
        return None;
    }
    let tours = tours
        .iter()
        .map(|tour| match tour.id() {
            Some(_) => tour.clone(),
            None => Tour {
                tour_id: Some(fresh_id()),
                ..tour.clone()
            },
        })
        .collect();
    Some(tours)
}

/// Tours that should start on their own when the sheet opens.
///
/// `show_once` tours are skipped once seen. Without an app, sheet, and
/// tour id the seen-state cannot be checked, so such tours count as unseen.
pub fn auto_start_candidates<'a>(
    tours: &'a [Tour],
    app_id: Option<&str>,
    sheet_id: Option<&str>,
    seen: &SeenStore,
) -> Vec<&'a Tour> {
    tours
        .iter()
        .filter(|tour| tour.auto_start)
        .filter(|tour| {
            if !tour.show_once {
                return true;
            }
            let (Some(app_id), Some(sheet_id), Some(tour_id)) = (app_id, sheet_id, tour.id()) else {
                return true;
            };
            let already = seen.has_seen(SeenKey {
                app_id,
                sheet_id,
                tour_id,
                tour_version: tour.tour_version,
            });
            if already {
                debug!(tour = %tour.tour_name, "already seen, skipping auto-start");
            }
            !already
        })
        .collect()
}

/// Start the first auto-start candidate after [`AUTO_START_DELAY`].
///
/// Only one tour can be on screen, so later candidates wait for the next
/// sheet open. Returns the tour that started, if any.
pub async fn auto_start<'a>(
    session: &mut Session,
    tours: &'a [Tour],
    app_id: Option<&str>,
    sheet_id: Option<&str>,
) -> Option<&'a Tour> {
    let candidates = auto_start_candidates(tours, app_id, sheet_id, &session.context().seen);
    if candidates.is_empty() {
        return None;
    }
    tokio::time::sleep(AUTO_START_DELAY).await;

    for tour in candidates {
        let context = RunContext {
            app_id: app_id.map(str::to_string),
            sheet_id: sheet_id.map(str::to_string),
            ..session.context()
        };
        if session.start_tour(tour, context) {
            info!(tour = %tour.tour_name, "auto-started");
            return Some(tour);
        }
        debug!(tour = %tour.tour_name, "nothing to show, trying next candidate");
    }
    None
}
