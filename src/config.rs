//! Onboard configuration.
//!
//! Loaded from `~/.onboard/config.toml`. Every key is optional; a missing
//! file means defaults.
//!
//! ```toml
//! store-path = "/var/lib/onboard/seen.sqlite"
//! detection-timeout-ms = 1500
//!
//! [selectors.cloud.may-2025]
//! toolbar = "[data-testid='qs-toolbar']"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform::{SelectorOverrides, SelectorRegistry};

const DEFAULT_DETECTION_TIMEOUT_MS: u64 = 2000;

/// Onboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Seen-state database. Defaults to `~/.onboard/seen.sqlite`.
    pub store_path: Option<PathBuf>,

    /// How long platform detection may take before falling back.
    pub detection_timeout_ms: u64,

    /// Extra or replacement selectors: platform → code path → keys.
    pub selectors: BTreeMap<String, BTreeMap<String, SelectorOverrides>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            detection_timeout_ms: DEFAULT_DETECTION_TIMEOUT_MS,
            selectors: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config from `~/.onboard/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.onboard/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".onboard").join("config.toml"))
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_millis(self.detection_timeout_ms)
    }

    /// The built-in selectors with this config's overrides applied.
    pub fn registry(&self) -> SelectorRegistry {
        SelectorRegistry::builtin().with_overrides(&self.selectors)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.detection_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn parses_kebab_case_keys_and_selectors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
store-path = "/tmp/seen.sqlite"
detection-timeout-ms = 750

[selectors.cloud.may-2025]
toolbar = "#tb"
object-id-attr = "data-qid"
"##,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/seen.sqlite")));
        assert_eq!(config.detection_timeout(), Duration::from_millis(750));

        let set = config.registry().selectors("cloud", "may-2025");
        assert_eq!(set.toolbar, "#tb");
        assert_eq!(set.object_id_attr.as_deref(), Some("data-qid"));
    }

    #[test]
    fn invalid_config_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "detection-timeout-ms = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.starts_with("invalid config at "), "{err}");
    }
}
