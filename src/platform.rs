//! Host platform: which flavour of the host we run in, and how to reach
//! its DOM.
//!
//! The host differs between client-managed installs and the cloud service,
//! and its DOM changes between releases. Everything platform-specific goes
//! through the [`SelectorRegistry`] and the [`PlatformAdapter`]; the rest of
//! the engine only sees a [`Platform`] value and the [`Host`] trait.

mod adapter;
mod detect;
mod selectors;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use adapter::{ObjectInfo, PlatformAdapter, SheetObject, is_edit_mode};
pub use detect::{DetectionError, PlatformQuery, PlatformResolver, Resolution, detect_from_location};
pub use selectors::{BASELINE_PLATFORM, SelectorOverrides, SelectorRegistry, SelectorSet};

/// Code path used when nothing more specific is known.
pub const DEFAULT_CODE_PATH: &str = "default";

/// The host flavours the engine knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKind {
    /// Self-hosted installation.
    ClientManaged,

    /// The hosted cloud service.
    Cloud,
}

impl PlatformKind {
    /// The registry key for this platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientManaged => "client-managed",
            Self::Cloud => "cloud",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub kind: PlatformKind,

    /// Host release, when the host reports one.
    pub version: Option<String>,

    /// Which selector variant to use (see [`SelectorRegistry`]).
    pub code_path: String,
}

impl Platform {
    /// A platform with no version and the default code path.
    pub fn new(kind: PlatformKind) -> Self {
        Self {
            kind,
            version: None,
            code_path: DEFAULT_CODE_PATH.to_string(),
        }
    }
}

/// An opaque handle to a host DOM element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

/// What the engine needs from the hosting page.
///
/// Implemented by the browser glue, and by test doubles. Methods take
/// `&self`; hosts keep any mutable state behind interior mutability since
/// everything runs on one thread.
pub trait Host {
    /// The current page location.
    fn location(&self) -> String;

    /// The current sheet according to the host's navigation API, if it
    /// has one.
    fn navigation_sheet_id(&self) -> Option<String> {
        None
    }

    /// First element matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<ElementRef>;

    /// An attribute of an element previously returned by this host.
    fn attribute(&self, element: &ElementRef, name: &str) -> Option<String>;

    /// Whether an element with this `id` exists.
    fn has_element_id(&self, id: &str) -> bool;

    /// Append a `<style id=...>` element to the document head.
    fn append_style(&self, id: &str, css: &str);
}

#[cfg(test)]
pub(crate) mod testing {
    //! An in-memory [`Host`] for tests.

    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::{ElementRef, Host};

    #[derive(Default)]
    pub struct FakeHost {
        pub location: String,
        pub navigation: Option<String>,
        /// selector → element
        pub elements: RefCell<BTreeMap<String, ElementRef>>,
        /// (element, attribute) → value
        pub attributes: BTreeMap<(String, String), String>,
        pub styles: RefCell<BTreeMap<String, String>>,
        pub queries: RefCell<Vec<String>>,
    }

    impl FakeHost {
        pub fn at(location: &str) -> Self {
            Self {
                location: location.to_string(),
                ..Self::default()
            }
        }

        pub fn add_element(&self, selector: &str, handle: &str) {
            self.elements
                .borrow_mut()
                .insert(selector.to_string(), ElementRef(handle.to_string()));
        }
    }

    impl Host for FakeHost {
        fn location(&self) -> String {
            self.location.clone()
        }

        fn navigation_sheet_id(&self) -> Option<String> {
            self.navigation.clone()
        }

        fn query_selector(&self, selector: &str) -> Option<ElementRef> {
            self.queries.borrow_mut().push(selector.to_string());
            self.elements.borrow().get(selector).cloned()
        }

        fn attribute(&self, element: &ElementRef, name: &str) -> Option<String> {
            self.attributes
                .get(&(element.0.clone(), name.to_string()))
                .cloned()
        }

        fn has_element_id(&self, id: &str) -> bool {
            self.styles.borrow().contains_key(id)
        }

        fn append_style(&self, id: &str, css: &str) {
            self.styles
                .borrow_mut()
                .insert(id.to_string(), css.to_string());
        }
    }
}
