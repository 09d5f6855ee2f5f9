//! Core data model for Onboard.
//!
//! These types mirror what the host document model stores:
//! tours, their steps, the theme configuration, and the widget settings.
//! They also define the interchange bundle used for export and import.
//!
//! Every type serializes with camelCase field names so a bundle written by
//! the host round-trips unchanged. Missing fields take the same defaults the
//! property panel would assign.

mod bundle;
mod lenient;
mod theme;
mod tour;
mod widget;

pub use bundle::{EXPORT_VERSION, TourBundle};
pub use theme::{OverrideValue, ThemeConfig};
pub use tour::{
    DialogSize, PopoverAlign, PopoverSide, SelectorType, Step, StepTarget, Tour,
};
pub use widget::{ButtonStyle, WidgetConfig};
