//! Built-in theme presets.
//!
//! Each preset is complete: it carries a value for every [`ThemeKey`], so
//! the resolver never has to look past the preset for a base value.

use super::ThemeKey;

const QLIK_FONT: &str = "'QlikView Sans', 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif";
const OPEN_SANS: &str = "'Open Sans', Arial, sans-serif";

/// A named, complete default theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub label: &'static str,
    values: [&'static str; ThemeKey::ALL.len()],
}

impl Preset {
    /// The preset's value for `key`, before pixel coercion.
    pub fn get(&self, key: ThemeKey) -> &'static str {
        self.values[key as usize]
    }
}

/// Neutral, minimal palette. A blank canvas for overrides.
pub const DEFAULT: Preset = Preset {
    name: "default",
    label: "Default",
    values: [
        "#595959", // buttonBgColor
        "#ffffff", // buttonTextColor
        "#404040", // buttonHoverBgColor
        "#595959", // buttonBorderColor
        "13",      // buttonFontSize
        "4",       // buttonBorderRadius
        "500",     // buttonFontWeight
        "#ffffff", // menuBgColor
        "#333333", // menuTextColor
        "#f0f0f0", // menuHoverBgColor
        "#ffffff", // popoverBgColor
        "#555555", // popoverTextColor
        "#333333", // popoverTitleColor
        "#595959", // popoverButtonBgColor
        "#ffffff", // popoverButtonTextColor
        "#404040", // popoverButtonHoverBgColor
        "#e8e8e8", // popoverPrevBgColor
        "#333333", // popoverPrevTextColor
        "#d0d0d0", // popoverPrevHoverBgColor
        "13",      // popoverFontSize
        "4",       // popoverBorderRadius
        "#595959", // progressBarColor
        QLIK_FONT, // fontFamily
    ],
};

/// Full-spectrum Qlik-green theme.
pub const LEAN_GREEN: Preset = Preset {
    name: "leanGreen",
    label: "The Lean Green Machine",
    values: [
        "#009845", "#ffffff", "#007a38", "#009845", "13", "4", "500", "#ffffff", "#333333",
        "#e8f5ee", "#ffffff", "#555555", "#006b30", "#009845", "#ffffff", "#007a38", "#e8f5ee",
        "#006b30", "#c8ebd5", "13", "4", "#00b856", QLIK_FONT,
    ],
};

/// Authoritative blue palette with gold accents.
pub const CORPORATE_BLUE: Preset = Preset {
    name: "corporateBlue",
    label: "Corporate Blue",
    values: [
        "#165A9B", "#ffffff", "#0C3256", "#165A9B", "14", "3", "600", "#ffffff", "#222222",
        "#e6eef6", "#ffffff", "#404041", "#0C3256", "#165A9B", "#ffffff", "#0C3256", "#EFEFEF",
        "#222222", "#D0D2D3", "14", "3", "#FFCC33", OPEN_SANS,
    ],
};

/// Warm gold palette with blue accents.
pub const CORPORATE_GOLD: Preset = Preset {
    name: "corporateGold",
    label: "Corporate Gold",
    values: [
        "#FFCC33", "#222222", "#FFE494", "#222222", "14", "3", "600", "#ffffff", "#222222",
        "#FFFAE6", "#ffffff", "#404041", "#0C3256", "#165A9B", "#ffffff", "#0C3256", "#EFEFEF",
        "#222222", "#D0D2D3", "14", "3", "#165A9B", OPEN_SANS,
    ],
};

/// Every built-in preset, default first.
pub static PRESETS: [Preset; 4] = [DEFAULT, LEAN_GREEN, CORPORATE_BLUE, CORPORATE_GOLD];

/// Look up a preset by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}
