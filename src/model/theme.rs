//! Theme configuration: a preset name plus per-property overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The theme as stored by the host or carried in an export bundle.
///
/// Overrides sit next to `preset` as flat keys (`buttonBgColor`,
/// `popoverFontSize`, ...). Keys the resolver does not declare are kept
/// so they survive a round-trip, but have no effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(flatten)]
    pub overrides: BTreeMap<String, OverrideValue>,
}

impl ThemeConfig {
    /// A config selecting `preset` with no overrides.
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            overrides: BTreeMap::new(),
        }
    }

    /// Builder-style override.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: OverrideValue) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }
}

/// A single override value, in whichever shape the source produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// Colour-picker form: `{ "color": "#ff0000", "index": -1 }`.
    /// Older persisted values may lack the leading `#`.
    Picker {
        color: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<i64>,
    },

    /// Free text from a property-panel input.
    Text(String),

    /// A bare number, as presets and some imports carry sizes.
    Number(f64),

    /// Anything else (booleans, null, unexpected objects).
    Other(serde_json::Value),
}

impl OverrideValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn picker(color: impl Into<String>) -> Self {
        Self::Picker {
            color: color.into(),
            index: Some(-1),
        }
    }
}
