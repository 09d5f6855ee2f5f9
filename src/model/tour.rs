//! Tour and step types: what the author configured.

use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// A named, versioned walkthrough over a sheet.
///
/// `tour_id` is `None` only for tours created outside the editor that have
/// not been backfilled yet (see [`crate::widget::ensure_tour_ids`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_id: Option<String>,

    #[serde(default)]
    pub tour_name: String,

    /// Part of the seen-state key. Incrementing it re-shows the tour
    /// to users who saw an earlier version.
    #[serde(default = "default_tour_version", deserialize_with = "tour_version")]
    pub tour_version: u32,

    #[serde(default)]
    pub auto_start: bool,

    #[serde(default = "default_true")]
    pub show_once: bool,

    #[serde(default = "default_true")]
    pub show_progress: bool,

    #[serde(default = "default_true")]
    pub allow_keyboard: bool,

    #[serde(default = "default_overlay_color")]
    pub overlay_color: String,

    /// Percentage, 0–100.
    #[serde(default = "default_overlay_opacity", deserialize_with = "overlay_opacity")]
    pub overlay_opacity: u8,

    #[serde(default = "default_stage_padding", deserialize_with = "stage_padding")]
    pub stage_padding: u32,

    #[serde(default = "default_stage_radius", deserialize_with = "stage_radius")]
    pub stage_radius: u32,

    #[serde(default = "default_next_text")]
    pub next_btn_text: String,

    #[serde(default = "default_prev_text")]
    pub prev_btn_text: String,

    #[serde(default = "default_done_text")]
    pub done_btn_text: String,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Tour {
    /// A tour with editor defaults and no steps.
    pub fn new(tour_id: impl Into<String>, tour_name: impl Into<String>) -> Self {
        Self {
            tour_id: Some(tour_id.into()),
            tour_name: tour_name.into(),
            tour_version: default_tour_version(),
            auto_start: false,
            show_once: true,
            show_progress: true,
            allow_keyboard: true,
            overlay_color: default_overlay_color(),
            overlay_opacity: default_overlay_opacity(),
            stage_padding: default_stage_padding(),
            stage_radius: default_stage_radius(),
            next_btn_text: default_next_text(),
            prev_btn_text: default_prev_text(),
            done_btn_text: default_done_text(),
            steps: Vec::new(),
        }
    }

    /// The identifier, treating an empty string as missing.
    pub fn id(&self) -> Option<&str> {
        self.tour_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// How a step locates its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    /// A sheet object, addressed by its object id.
    #[default]
    Object,

    /// A raw CSS selector written by the author.
    Css,

    /// No target: the step is a standalone dialog.
    None,
}

/// Which side of the target the popover sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopoverSide {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl PopoverSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Popover alignment along the chosen side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopoverAlign {
    Start,
    #[default]
    Center,
    End,
}

impl PopoverAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

/// Size tier for standalone dialog steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogSize {
    Dynamic,
    Small,
    #[default]
    Medium,
    Large,
    XLarge,

    /// Explicit pixel dimensions from `customDialogWidth`/`customDialogHeight`.
    Custom,
}

impl DialogSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::XLarge => "x-large",
            Self::Custom => "custom",
        }
    }
}

/// One unit of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, deserialize_with = "lenient::variant")]
    pub selector_type: SelectorType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css_selector: Option<String>,

    #[serde(default)]
    pub popover_title: String,

    /// Markdown source.
    #[serde(default)]
    pub popover_description: String,

    #[serde(default, deserialize_with = "lenient::variant")]
    pub popover_side: PopoverSide,

    #[serde(default, deserialize_with = "lenient::variant")]
    pub popover_align: PopoverAlign,

    #[serde(default = "default_true")]
    pub disable_interaction: bool,

    #[serde(
        default,
        deserialize_with = "lenient::optional_variant",
        skip_serializing_if = "Option::is_none"
    )]
    pub dialog_size: Option<DialogSize>,

    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_dialog_width: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_dialog_height: Option<u32>,
}

/// The authoritative target of a step, after applying the selector type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget<'a> {
    /// A sheet object id, resolved to a selector through the registry.
    Object(&'a str),

    /// An author-supplied CSS selector, used verbatim.
    Css(&'a str),

    /// A standalone dialog with no element.
    Dialog(DialogSize),
}

impl Step {
    /// A step bound to a sheet object.
    pub fn object(object_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            target_object_id: Some(object_id.into()),
            popover_title: title.into(),
            ..Self::blank(SelectorType::Object)
        }
    }

    /// A step bound to a custom CSS selector.
    pub fn css(selector: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            custom_css_selector: Some(selector.into()),
            popover_title: title.into(),
            ..Self::blank(SelectorType::Css)
        }
    }

    /// A standalone dialog step.
    pub fn dialog(size: DialogSize, title: impl Into<String>) -> Self {
        Self {
            dialog_size: Some(size),
            popover_title: title.into(),
            ..Self::blank(SelectorType::None)
        }
    }

    fn blank(selector_type: SelectorType) -> Self {
        Self {
            selector_type,
            target_object_id: None,
            custom_css_selector: None,
            popover_title: String::new(),
            popover_description: String::new(),
            popover_side: PopoverSide::default(),
            popover_align: PopoverAlign::default(),
            disable_interaction: true,
            dialog_size: None,
            custom_dialog_width: None,
            custom_dialog_height: None,
        }
    }

    /// Resolve which field is authoritative for this step.
    ///
    /// Returns `None` when the step has nothing to point at. A `css` step
    /// with an empty selector falls back to its object id, if any.
    pub fn target(&self) -> Option<StepTarget<'_>> {
        fn non_empty(s: Option<&str>) -> Option<&str> {
            s.filter(|s| !s.is_empty())
        }

        let object = non_empty(self.target_object_id.as_deref());
        match self.selector_type {
            SelectorType::None => Some(StepTarget::Dialog(self.dialog_size.unwrap_or_default())),
            SelectorType::Css => non_empty(self.custom_css_selector.as_deref())
                .map(StepTarget::Css)
                .or_else(|| object.map(StepTarget::Object)),
            SelectorType::Object => object.map(StepTarget::Object),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tour_version() -> u32 {
    1
}

fn default_overlay_color() -> String {
    "rgba(0, 0, 0, 0.6)".to_string()
}

fn default_overlay_opacity() -> u8 {
    60
}

fn default_stage_padding() -> u32 {
    8
}

fn default_stage_radius() -> u32 {
    5
}

fn default_next_text() -> String {
    "Next".to_string()
}

fn default_prev_text() -> String {
    "Previous".to_string()
}

fn default_done_text() -> String {
    "Done".to_string()
}

/// Zero or blank means version 1.
fn tour_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let version = lenient::number(deserializer)?.map(|n| lenient::round_within(n, u32::MAX));
    Ok(version.filter(|v| *v > 0).unwrap_or_else(default_tour_version))
}

/// A percentage, clamped to 0–100.
fn overlay_opacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(lenient::number(deserializer)?
        .map(|n| lenient::round_within(n, 100))
        .and_then(|n| u8::try_from(n).ok())
        .unwrap_or_else(default_overlay_opacity))
}

fn stage_padding<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient::optional_count(deserializer)?.unwrap_or_else(default_stage_padding))
}

fn stage_radius<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient::optional_count(deserializer)?.unwrap_or_else(default_stage_radius))
}
