//! Platform-specific host operations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Host, Platform, PlatformKind, SelectorRegistry, SelectorSet};

/// Object types that can never be a tour target.
const EXCLUDED_TYPES: &[&str] = &[
    "sheet",
    "story",
    "appprops",
    "loadmodel",
    "dimension",
    "measure",
    "masterobject",
    "qix-system-dimension",
    "onboard-qs",
];

/// Sheet ids read from the DOM shorter than this are ignored.
const MIN_DOM_SHEET_ID_LEN: usize = 6;

/// An app object as listed by the host engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub id: String,

    #[serde(rename = "type")]
    pub object_type: String,

    #[serde(default)]
    pub title: Option<String>,
}

/// An object a tour step may point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetObject {
    pub id: String,
    pub title: String,

    #[serde(rename = "type")]
    pub object_type: String,
}

/// Host operations for one detected platform.
#[derive(Debug, Clone)]
pub struct PlatformAdapter {
    platform: Platform,
    selectors: SelectorSet,
}

impl PlatformAdapter {
    pub fn new(platform: Platform, registry: &SelectorRegistry) -> Self {
        let selectors = registry.selectors(platform.kind.as_str(), &platform.code_path);
        Self {
            platform,
            selectors,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn selectors(&self) -> &SelectorSet {
        &self.selectors
    }

    /// The selector for one object on this platform.
    pub fn object_selector(&self, id: &str) -> String {
        self.selectors.object_by_id(id)
    }

    /// Find the current sheet id.
    ///
    /// The location URL is tried first. Client-managed hosts also answer
    /// through their navigation API and, failing that, through attributes
    /// of the sheet container element.
    pub fn current_sheet_id(&self, host: &dyn Host) -> Option<String> {
        if let Some(id) = sheet_id_from_location(&host.location()) {
            debug!(sheet_id = id, "sheet id from location");
            return Some(id.to_string());
        }
        if self.platform.kind == PlatformKind::Cloud {
            debug!("no sheet id in location");
            return None;
        }

        if let Some(id) = host.navigation_sheet_id().filter(|id| !id.is_empty()) {
            debug!(sheet_id = %id, "sheet id from navigation");
            return Some(id);
        }

        let element = host.query_selector(&self.selectors.sheet_container)?;
        let id = host
            .attribute(&element, "data-id")
            .filter(|v| !v.is_empty())
            .or_else(|| host.attribute(&element, "data-qid").filter(|v| !v.is_empty()))
            .or_else(|| {
                host.attribute(&element, "id")
                    .map(|v| v.replace("qv-sheet-", ""))
            })
            .filter(|id| id.len() >= MIN_DOM_SHEET_ID_LEN);
        match &id {
            Some(id) => debug!(sheet_id = %id, "sheet id from DOM"),
            None => debug!("could not detect sheet id"),
        }
        id
    }

    /// Objects a step can target, sorted by title.
    ///
    /// `sheet_members` restricts the list to objects on the current sheet,
    /// unless that would leave nothing.
    pub fn targetable_objects(&self, infos: &[ObjectInfo], sheet_members: &[String]) -> Vec<SheetObject> {
        targetable_objects(infos, sheet_members)
    }

    /// Add a stylesheet to the page once.
    ///
    /// Does nothing when an element with `id` already exists.
    pub fn inject_stylesheet(&self, host: &dyn Host, css: &str, id: &str) {
        if host.has_element_id(id) {
            return;
        }
        host.append_style(id, css);
        debug!(id, "injected stylesheet");
    }
}

fn sheet_id_from_location(location: &str) -> Option<&str> {
    let (_, after) = location.split_once("/sheet/")?;
    let end = after
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(after.len());
    let id = &after[..end];
    (!id.is_empty()).then_some(id)
}

fn targetable_objects(infos: &[ObjectInfo], sheet_members: &[String]) -> Vec<SheetObject> {
    let on_sheet: Vec<&ObjectInfo> = infos
        .iter()
        .filter(|info| sheet_members.contains(&info.id))
        .collect();
    let candidates: Vec<&ObjectInfo> = if on_sheet.is_empty() {
        infos.iter().collect()
    } else {
        on_sheet
    };

    let mut objects: Vec<SheetObject> = candidates
        .into_iter()
        .filter(|info| {
            !EXCLUDED_TYPES.contains(&info.object_type.as_str())
                && !info.object_type.contains("system")
        })
        .map(|info| SheetObject {
            id: info.id.clone(),
            title: info
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| info.id.clone()),
            object_type: info.object_type.clone(),
        })
        .collect();
    objects.sort_by(|a, b| compare_titles(&a.title, &b.title));
    objects
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Whether the host is in edit mode.
///
/// An explicit read-only flag wins over the location.
pub fn is_edit_mode(read_only: Option<bool>, location: &str) -> bool {
    match read_only {
        Some(read_only) => !read_only,
        None => location.contains("/state/edit"),
    }
}
