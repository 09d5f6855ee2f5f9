//! Tour documents on disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use onboard::model::{ThemeConfig, Tour, WidgetConfig};

/// Tours and settings as the host stores them for one widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TourDocument {
    #[serde(default)]
    pub tours: Vec<Tour>,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub widget: WidgetConfig,
}

impl TourDocument {
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("invalid tour document {}: {e}", path.display()))
    }

    /// Load `path`, or an empty document if it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize tour document: {e}"))?;
        fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))
    }

    /// The tour with this name or id.
    pub fn find(&self, name_or_id: &str) -> Option<&Tour> {
        self.tours
            .iter()
            .find(|t| t.tour_name == name_or_id || t.id() == Some(name_or_id))
    }
}
