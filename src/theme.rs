//! Theme resolution: cascade a preset with per-property overrides.
//!
//! The result is a flat map of CSS custom property to value. It is the same
//! whether the [`ThemeConfig`] came from the property panel or an import
//! bundle, since both normalize to the same override shapes.

pub mod presets;

use tracing::debug;

use crate::model::{OverrideValue, ThemeConfig};

pub use presets::{PRESETS, Preset};

/// Default scope for popover theme CSS. Popovers are appended to the
/// document body, outside the widget, so they need their own block.
pub const POPOVER_SCOPE: &str = ".onboard-qs-popover";

/// Every themeable property.
///
/// Discriminants index into [`Preset`] values; keep the order in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThemeKey {
    ButtonBgColor,
    ButtonTextColor,
    ButtonHoverBgColor,
    ButtonBorderColor,
    ButtonFontSize,
    ButtonBorderRadius,
    ButtonFontWeight,
    MenuBgColor,
    MenuTextColor,
    MenuHoverBgColor,
    PopoverBgColor,
    PopoverTextColor,
    PopoverTitleColor,
    PopoverButtonBgColor,
    PopoverButtonTextColor,
    PopoverButtonHoverBgColor,
    PopoverPrevBgColor,
    PopoverPrevTextColor,
    PopoverPrevHoverBgColor,
    PopoverFontSize,
    PopoverBorderRadius,
    ProgressBarColor,
    FontFamily,
}

impl ThemeKey {
    pub const ALL: [Self; 23] = [
        Self::ButtonBgColor,
        Self::ButtonTextColor,
        Self::ButtonHoverBgColor,
        Self::ButtonBorderColor,
        Self::ButtonFontSize,
        Self::ButtonBorderRadius,
        Self::ButtonFontWeight,
        Self::MenuBgColor,
        Self::MenuTextColor,
        Self::MenuHoverBgColor,
        Self::PopoverBgColor,
        Self::PopoverTextColor,
        Self::PopoverTitleColor,
        Self::PopoverButtonBgColor,
        Self::PopoverButtonTextColor,
        Self::PopoverButtonHoverBgColor,
        Self::PopoverPrevBgColor,
        Self::PopoverPrevTextColor,
        Self::PopoverPrevHoverBgColor,
        Self::PopoverFontSize,
        Self::PopoverBorderRadius,
        Self::ProgressBarColor,
        Self::FontFamily,
    ];

    /// The key as it appears in a [`ThemeConfig`].
    pub fn name(self) -> &'static str {
        match self {
            Self::ButtonBgColor => "buttonBgColor",
            Self::ButtonTextColor => "buttonTextColor",
            Self::ButtonHoverBgColor => "buttonHoverBgColor",
            Self::ButtonBorderColor => "buttonBorderColor",
            Self::ButtonFontSize => "buttonFontSize",
            Self::ButtonBorderRadius => "buttonBorderRadius",
            Self::ButtonFontWeight => "buttonFontWeight",
            Self::MenuBgColor => "menuBgColor",
            Self::MenuTextColor => "menuTextColor",
            Self::MenuHoverBgColor => "menuHoverBgColor",
            Self::PopoverBgColor => "popoverBgColor",
            Self::PopoverTextColor => "popoverTextColor",
            Self::PopoverTitleColor => "popoverTitleColor",
            Self::PopoverButtonBgColor => "popoverButtonBgColor",
            Self::PopoverButtonTextColor => "popoverButtonTextColor",
            Self::PopoverButtonHoverBgColor => "popoverButtonHoverBgColor",
            Self::PopoverPrevBgColor => "popoverPrevBgColor",
            Self::PopoverPrevTextColor => "popoverPrevTextColor",
            Self::PopoverPrevHoverBgColor => "popoverPrevHoverBgColor",
            Self::PopoverFontSize => "popoverFontSize",
            Self::PopoverBorderRadius => "popoverBorderRadius",
            Self::ProgressBarColor => "progressBarColor",
            Self::FontFamily => "fontFamily",
        }
    }

    /// The CSS custom property this key drives.
    pub fn css_var(self) -> &'static str {
        match self {
            Self::ButtonBgColor => "--oqs-btn-bg",
            Self::ButtonTextColor => "--oqs-btn-text",
            Self::ButtonHoverBgColor => "--oqs-btn-hover-bg",
            Self::ButtonBorderColor => "--oqs-btn-border",
            Self::ButtonFontSize => "--oqs-btn-font-size",
            Self::ButtonBorderRadius => "--oqs-btn-border-radius",
            Self::ButtonFontWeight => "--oqs-btn-font-weight",
            Self::MenuBgColor => "--oqs-menu-bg",
            Self::MenuTextColor => "--oqs-menu-text",
            Self::MenuHoverBgColor => "--oqs-menu-hover-bg",
            Self::PopoverBgColor => "--oqs-popover-bg",
            Self::PopoverTextColor => "--oqs-popover-text",
            Self::PopoverTitleColor => "--oqs-popover-title",
            Self::PopoverButtonBgColor => "--oqs-popover-btn-bg",
            Self::PopoverButtonTextColor => "--oqs-popover-btn-text",
            Self::PopoverButtonHoverBgColor => "--oqs-popover-btn-hover-bg",
            Self::PopoverPrevBgColor => "--oqs-popover-prev-bg",
            Self::PopoverPrevTextColor => "--oqs-popover-prev-text",
            Self::PopoverPrevHoverBgColor => "--oqs-popover-prev-hover-bg",
            Self::PopoverFontSize => "--oqs-popover-font-size",
            Self::PopoverBorderRadius => "--oqs-popover-border-radius",
            Self::ProgressBarColor => "--oqs-progress-color",
            Self::FontFamily => "--oqs-font-family",
        }
    }

    /// Whether the value is a pixel length and gets a `px` suffix.
    pub fn is_pixel(self) -> bool {
        matches!(
            self,
            Self::ButtonFontSize
                | Self::ButtonBorderRadius
                | Self::PopoverFontSize
                | Self::PopoverBorderRadius
        )
    }
}

/// The fully cascaded theme, one value per [`ThemeKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTheme {
    values: Vec<String>,
}

impl ResolvedTheme {
    /// The resolved value for a key.
    pub fn get(&self, key: ThemeKey) -> &str {
        &self.values[key as usize]
    }

    /// The resolved value for a CSS custom property name.
    pub fn var(&self, css_var: &str) -> Option<&str> {
        ThemeKey::ALL
            .iter()
            .find(|k| k.css_var() == css_var)
            .map(|k| self.get(*k))
    }

    /// `(css variable, value)` pairs in declaration order.
    pub fn css_vars(&self) -> impl Iterator<Item = (&'static str, &str)> {
        ThemeKey::ALL
            .iter()
            .map(|k| (k.css_var(), self.values[*k as usize].as_str()))
    }

    /// A style block scoping the variables to `selector`.
    pub fn to_css(&self, selector: &str) -> String {
        let declarations: Vec<String> = self
            .css_vars()
            .map(|(var, value)| format!("  {var}: {value};"))
            .collect();
        format!("{selector} {{\n{}\n}}", declarations.join("\n"))
    }
}

/// Resolve a theme config against its preset.
///
/// An unknown or missing preset name falls back to the `default` preset.
pub fn resolve(config: &ThemeConfig) -> ResolvedTheme {
    let preset_name = config.preset.as_deref().unwrap_or(presets::DEFAULT.name);
    let preset = presets::find(preset_name).unwrap_or_else(|| {
        debug!(preset = preset_name, "unknown theme preset, using default");
        &presets::DEFAULT
    });

    let values = ThemeKey::ALL
        .iter()
        .map(|&key| {
            let value = config
                .overrides
                .get(key.name())
                .and_then(override_value)
                .unwrap_or_else(|| preset.get(key).to_string());

            if key.is_pixel() {
                to_pixels(value)
            } else {
                value
            }
        })
        .collect();

    ResolvedTheme { values }
}

/// Extract an override, or `None` when it is empty and the preset applies.
fn override_value(raw: &OverrideValue) -> Option<String> {
    match raw {
        OverrideValue::Picker { color, .. } => {
            if color.is_empty() {
                None
            } else if color.starts_with('#') {
                Some(color.clone())
            } else {
                Some(format!("#{color}"))
            }
        }
        OverrideValue::Text(text) if text.is_empty() => None,
        OverrideValue::Text(text) => Some(text.clone()),
        OverrideValue::Number(n) => Some(n.to_string()),
        OverrideValue::Other(serde_json::Value::Null) => None,
        OverrideValue::Other(serde_json::Value::String(s)) if s.is_empty() => None,
        OverrideValue::Other(other) => Some(other.to_string()),
    }
}

/// Append `px` to numeric values; leave anything else untouched.
fn to_pixels(value: String) -> String {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => format!("{n}px"),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lean_green_without_overrides() {
        let theme = resolve(&ThemeConfig::preset("leanGreen"));

        assert_eq!(theme.get(ThemeKey::ButtonBgColor), "#009845");
        assert_eq!(theme.var("--oqs-btn-bg"), Some("#009845"));
    }

    #[test]
    fn pixel_keys_get_suffix() {
        let theme = resolve(&ThemeConfig::preset("corporateBlue"));

        assert_eq!(theme.get(ThemeKey::ButtonFontSize), "14px");
        assert_eq!(theme.get(ThemeKey::PopoverBorderRadius), "3px");
        assert_eq!(theme.get(ThemeKey::ButtonFontWeight), "600");
    }

    #[test]
    fn unknown_or_missing_preset_uses_default() {
        let unknown = resolve(&ThemeConfig::preset("neon"));
        let missing = resolve(&ThemeConfig::default());

        assert_eq!(unknown.get(ThemeKey::ButtonBgColor), "#595959");
        assert_eq!(unknown, missing);
    }

    #[test]
    fn picker_color_gains_hash() {
        let config = ThemeConfig::preset("default")
            .with("buttonBgColor", OverrideValue::picker("ff0000"))
            .with("menuBgColor", OverrideValue::picker("#00ff00"));
        let theme = resolve(&config);

        assert_eq!(theme.get(ThemeKey::ButtonBgColor), "#ff0000");
        assert_eq!(theme.get(ThemeKey::MenuBgColor), "#00ff00");
    }

    #[test]
    fn empty_overrides_fall_through_to_preset() {
        let config = ThemeConfig::preset("leanGreen")
            .with("buttonBgColor", OverrideValue::picker(""))
            .with("fontFamily", OverrideValue::text(""))
            .with("menuBgColor", OverrideValue::Other(serde_json::Value::Null));
        let theme = resolve(&config);

        assert_eq!(theme, resolve(&ThemeConfig::preset("leanGreen")));
    }

    #[test]
    fn pixel_override_from_text_or_number() {
        let config = ThemeConfig::preset("default")
            .with("buttonFontSize", OverrideValue::text("16"))
            .with("popoverFontSize", OverrideValue::Number(12.5))
            .with("buttonBorderRadius", OverrideValue::text("50%"));
        let theme = resolve(&config);

        assert_eq!(theme.get(ThemeKey::ButtonFontSize), "16px");
        assert_eq!(theme.get(ThemeKey::PopoverFontSize), "12.5px");
        assert_eq!(theme.get(ThemeKey::ButtonBorderRadius), "50%");
    }

    #[test]
    fn undeclared_keys_are_ignored() {
        let config = ThemeConfig::preset("default").with("sparkle", OverrideValue::text("yes"));
        assert_eq!(resolve(&config), resolve(&ThemeConfig::preset("default")));
    }

    #[test]
    fn css_block_lists_every_variable() {
        let css = resolve(&ThemeConfig::preset("default")).to_css(POPOVER_SCOPE);

        assert!(css.starts_with(".onboard-qs-popover {\n"));
        assert!(css.contains("  --oqs-btn-bg: #595959;\n"));
        assert!(css.ends_with("\n}"));
        assert_eq!(css.lines().count(), ThemeKey::ALL.len() + 2);
    }

    #[test]
    fn same_result_from_panel_and_import_shapes() {
        let panel = ThemeConfig::preset("default")
            .with("buttonBgColor", OverrideValue::picker("#123456"))
            .with("buttonFontSize", OverrideValue::text("15"));
        let imported: ThemeConfig = serde_json::from_str(
            r##"{"preset": "default", "buttonBgColor": {"color": "123456"}, "buttonFontSize": 15}"##,
        )
        .unwrap();

        assert_eq!(resolve(&panel), resolve(&imported));
    }
}
