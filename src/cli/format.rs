//! Output formatting for CLI display.

use onboard::model::Tour;
use onboard::platform::SheetObject;
use onboard::steps::{DialogDirective, RunnableStep};

/// One-line heading for a tour.
pub(super) fn format_tour_heading(tour: &Tour, runnable: usize) -> String {
    let id = tour.id().unwrap_or("no id");
    let mut flags = Vec::new();
    if tour.auto_start {
        flags.push("auto-start");
    }
    if tour.show_once {
        flags.push("once");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!(
        "{} ({id}, v{}): {runnable} of {} steps{flags}",
        tour.tour_name,
        tour.tour_version,
        tour.steps.len()
    )
}

/// Where a runnable step anchors: its selector, or its dialog size.
pub(super) fn format_anchor(step: &RunnableStep) -> String {
    match (step.selector(), step.dialog()) {
        (Some(selector), _) => selector.to_string(),
        (None, Some(DialogDirective::Custom { width, height })) => {
            format!("dialog {width}x{height}")
        }
        (None, Some(DialogDirective::Tier(size))) => format!("dialog {}", size.as_str()),
        (None, None) => "-".to_string(),
    }
}

/// A numbered line per step, with the rendered body indented below.
pub(super) fn format_steps(steps: &[RunnableStep]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let title = if step.popover.title.is_empty() {
                "(No title)"
            } else {
                &step.popover.title
            };
            let mut line = format!(
                "  {}. {title}  @ {} ({} {})",
                i + 1,
                format_anchor(step),
                step.popover.side.as_str(),
                step.popover.align.as_str()
            );
            for body in step.popover.html.lines().filter(|l| !l.trim().is_empty()) {
                line.push_str("\n       ");
                line.push_str(body);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Objects as aligned `id  type  title` rows.
pub(super) fn format_objects(objects: &[SheetObject]) -> String {
    let id_width = objects.iter().map(|o| o.id.len()).max().unwrap_or(0);
    let type_width = objects.iter().map(|o| o.object_type.len()).max().unwrap_or(0);
    objects
        .iter()
        .map(|o| {
            format!(
                "{:id_width$}  {:type_width$}  {}",
                o.id, o.object_type, o.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
