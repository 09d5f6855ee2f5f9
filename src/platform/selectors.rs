//! DOM selectors per platform and code path.
//!
//! Each platform has a `default` selector set. A code path (a host release
//! line with a different DOM) only lists the keys that differ; lookups merge
//! it over the platform default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::DEFAULT_CODE_PATH;

/// Platform whose defaults apply when an unknown platform is requested.
pub const BASELINE_PLATFORM: &str = "client-managed";

/// A complete set of selectors for one platform and code path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectorSet {
    /// Template with an `{id}` placeholder.
    pub object_by_id: String,
    pub all_objects: String,
    pub sheet_container: String,
    pub sheet_title: String,
    pub toolbar: String,

    /// Attribute carrying the object id, where the class name does not.
    pub object_id_attr: Option<String>,
}

impl SelectorSet {
    /// The selector for a single object.
    pub fn object_by_id(&self, id: &str) -> String {
        self.object_by_id.replace("{id}", id)
    }

    fn merged(&self, overrides: &SelectorOverrides) -> Self {
        let pick = |over: &Option<String>, base: &String| over.clone().unwrap_or_else(|| base.clone());
        Self {
            object_by_id: pick(&overrides.object_by_id, &self.object_by_id),
            all_objects: pick(&overrides.all_objects, &self.all_objects),
            sheet_container: pick(&overrides.sheet_container, &self.sheet_container),
            sheet_title: pick(&overrides.sheet_title, &self.sheet_title),
            toolbar: pick(&overrides.toolbar, &self.toolbar),
            object_id_attr: overrides
                .object_id_attr
                .clone()
                .or_else(|| self.object_id_attr.clone()),
        }
    }
}

/// A partial selector set, as written in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectorOverrides {
    pub object_by_id: Option<String>,
    pub all_objects: Option<String>,
    pub sheet_container: Option<String>,
    pub sheet_title: Option<String>,
    pub toolbar: Option<String>,
    pub object_id_attr: Option<String>,
}

#[derive(Debug, Clone)]
struct PlatformSelectors {
    default: SelectorSet,
    code_paths: BTreeMap<String, SelectorOverrides>,
}

/// Selectors for every known platform.
#[derive(Debug, Clone)]
pub struct SelectorRegistry {
    platforms: BTreeMap<String, PlatformSelectors>,

    /// Copy of the baseline platform's default set.
    baseline: SelectorSet,
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SelectorRegistry {
    /// The built-in client-managed and cloud selectors.
    pub fn builtin() -> Self {
        let client_managed = SelectorSet {
            object_by_id: ".qv-object-{id}".to_string(),
            all_objects: ".qv-object".to_string(),
            sheet_container: ".qv-sheet, .qv-panel-sheet, .qv-panel-content".to_string(),
            sheet_title: ".sheet-title-container, .qs-sheet-title".to_string(),
            toolbar: ".qv-toolbar-container, .qs-toolbar".to_string(),
            object_id_attr: None,
        };
        let cloud = SelectorSet {
            object_by_id: r#"[data-testid="object-{id}"], .qv-object-{id}"#.to_string(),
            all_objects: r#"[data-testid^="object-"], .qv-object"#.to_string(),
            sheet_container: r#"[data-testid="sheet-container"], .qv-sheet"#.to_string(),
            sheet_title: r#"[data-testid="sheet-title"]"#.to_string(),
            toolbar: r#"[data-testid="toolbar"]"#.to_string(),
            object_id_attr: Some("data-testid".to_string()),
        };

        let baseline = client_managed.clone();
        let platforms = [(BASELINE_PLATFORM, client_managed), ("cloud", cloud)]
            .into_iter()
            .map(|(name, default)| {
                let selectors = PlatformSelectors {
                    default,
                    code_paths: BTreeMap::new(),
                };
                (name.to_string(), selectors)
            })
            .collect();

        Self {
            platforms,
            baseline,
        }
    }

    /// Apply config overrides: `platform → code path → keys`.
    ///
    /// Overrides for the `default` code path change the platform default.
    /// A platform the registry does not know starts from the baseline
    /// platform's default.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, BTreeMap<String, SelectorOverrides>>,
    ) -> Self {
        for (platform, code_paths) in overrides {
            let baseline = self.baseline().clone();
            let entry = self
                .platforms
                .entry(platform.clone())
                .or_insert_with(|| PlatformSelectors {
                    default: baseline,
                    code_paths: BTreeMap::new(),
                });

            for (code_path, keys) in code_paths {
                if code_path == DEFAULT_CODE_PATH {
                    entry.default = entry.default.merged(keys);
                    if platform == BASELINE_PLATFORM {
                        self.baseline = entry.default.clone();
                    }
                } else {
                    entry.code_paths.insert(code_path.clone(), keys.clone());
                }
            }
        }
        self
    }

    /// Names of the registered platforms.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    /// The selectors for `platform` on `code_path`.
    ///
    /// An unknown platform gets the baseline platform's default set; an
    /// unknown code path gets the platform default.
    pub fn selectors(&self, platform: &str, code_path: &str) -> SelectorSet {
        let Some(entry) = self.platforms.get(platform) else {
            warn!(platform, "unknown platform, using {BASELINE_PLATFORM} selectors");
            return self.baseline().clone();
        };

        match entry.code_paths.get(code_path) {
            Some(overrides) => entry.default.merged(overrides),
            None => {
                if code_path != DEFAULT_CODE_PATH {
                    debug!(platform, code_path, "no selectors for code path, using default");
                }
                entry.default.clone()
            }
        }
    }

    /// The selector for one object.
    pub fn object_selector(&self, platform: &str, code_path: &str, id: &str) -> String {
        self.selectors(platform, code_path).object_by_id(id)
    }

    fn baseline(&self) -> &SelectorSet {
        &self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_object_selectors() {
        let registry = SelectorRegistry::builtin();
        assert_eq!(
            registry.object_selector("client-managed", "default", "abc"),
            ".qv-object-abc"
        );
        assert_eq!(
            registry.object_selector("cloud", "default", "abc"),
            r#"[data-testid="object-abc"], .qv-object-abc"#
        );
    }

    #[test]
    fn unknown_platform_uses_baseline() {
        let registry = SelectorRegistry::builtin();
        assert_eq!(
            registry.selectors("desktop", "default"),
            registry.selectors(BASELINE_PLATFORM, "default")
        );
    }

    #[test]
    fn unknown_code_path_uses_default() {
        let registry = SelectorRegistry::builtin();
        assert_eq!(
            registry.selectors("cloud", "2031-preview"),
            registry.selectors("cloud", "default")
        );
    }

    #[test]
    fn code_path_keys_win_over_default() {
        let mut cloud = BTreeMap::new();
        cloud.insert(
            "may-2025".to_string(),
            SelectorOverrides {
                toolbar: Some("#new-toolbar".to_string()),
                ..SelectorOverrides::default()
            },
        );
        let overrides = BTreeMap::from([("cloud".to_string(), cloud)]);
        let registry = SelectorRegistry::builtin().with_overrides(&overrides);

        let set = registry.selectors("cloud", "may-2025");
        assert_eq!(set.toolbar, "#new-toolbar");
        assert_eq!(set.sheet_title, r#"[data-testid="sheet-title"]"#);
        assert_eq!(set.object_id_attr.as_deref(), Some("data-testid"));

        // The default set is untouched.
        assert_eq!(
            registry.selectors("cloud", "default").toolbar,
            r#"[data-testid="toolbar"]"#
        );
    }

    #[test]
    fn config_can_add_a_platform() {
        let desktop = BTreeMap::from([(
            "default".to_string(),
            SelectorOverrides {
                object_by_id: Some("#obj-{id}".to_string()),
                ..SelectorOverrides::default()
            },
        )]);
        let overrides = BTreeMap::from([("desktop".to_string(), desktop)]);
        let registry = SelectorRegistry::builtin().with_overrides(&overrides);

        assert_eq!(registry.object_selector("desktop", "default", "x1"), "#obj-x1");
        assert_eq!(registry.selectors("desktop", "default").all_objects, ".qv-object");
        assert!(registry.platforms().any(|p| p == "desktop"));
    }
}
