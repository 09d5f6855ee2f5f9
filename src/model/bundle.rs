//! The interchange document written by export and read by import.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ThemeConfig, Tour, WidgetConfig};

/// Current schema version for export files.
pub const EXPORT_VERSION: u32 = 1;

/// Tours plus the theme and widget settings they were authored with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourBundle {
    pub version: u32,
    pub exported_at: Timestamp,
    pub tours: Vec<Tour>,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
}
