//! Widget settings: how the start button is presented.

use serde::{Deserialize, Serialize};

/// Start-button configuration for the analysis-mode widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// When off, only auto-start tours run.
    #[serde(default = "default_show_button")]
    pub show_button: bool,

    #[serde(default = "default_button_text")]
    pub button_text: String,

    #[serde(default)]
    pub button_style: ButtonStyle,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            show_button: default_show_button(),
            button_text: default_button_text(),
            button_style: ButtonStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Minimal,
}

fn default_show_button() -> bool {
    true
}

fn default_button_text() -> String {
    "Start Tour".to_string()
}
