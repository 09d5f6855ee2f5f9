//! Which tour versions a user has already completed.
//!
//! Keys live in the `onboard-qs` namespace:
//!
//! ```text
//! onboard-qs:<appId>:<sheetId>:<tourId>:v<tourVersion> → {"timestamp": ..., "version": ...}
//! ```
//!
//! Bumping a tour's version changes the key, so the tour shows again while
//! the old record stays. Nothing here fails: storage errors are logged and
//! reads degrade to "not seen".

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

/// Namespace prefix for every seen-state key.
pub const NAMESPACE: &str = "onboard-qs";

/// Identifies one tour version on one sheet of one app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenKey<'a> {
    pub app_id: &'a str,
    pub sheet_id: &'a str,
    pub tour_id: &'a str,
    pub tour_version: u32,
}

impl fmt::Display for SeenKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{NAMESPACE}:{}:{}:{}:v{}",
            self.app_id, self.sheet_id, self.tour_id, self.tour_version
        )
    }
}

/// The value stored under a [`SeenKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub timestamp: Timestamp,
    pub version: u32,
}

/// Failure-tolerant seen-state on top of any [`KeyValueStore`].
pub struct SeenStore {
    store: Box<dyn KeyValueStore>,
}

impl SeenStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Whether this tour version was completed. Unreadable means no.
    pub fn has_seen(&self, key: SeenKey<'_>) -> bool {
        let key = key.to_string();
        match self.store.get(&key) {
            Ok(value) => {
                let seen = value.is_some();
                debug!(%key, seen, "seen-state read");
                seen
            }
            Err(e) => {
                warn!(%key, error = %e, "could not read seen-state");
                false
            }
        }
    }

    /// Record completion of this tour version, now.
    pub fn mark_seen(&self, key: SeenKey<'_>) {
        let record = SeenRecord {
            timestamp: Timestamp::now(),
            version: key.tour_version,
        };
        let key = key.to_string();
        let value = match serde_json::to_string(&record) {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "could not encode seen record");
                return;
            }
        };
        match self.store.set(&key, &value) {
            Ok(()) => debug!(%key, "marked seen"),
            Err(e) => warn!(%key, error = %e, "could not write seen-state"),
        }
    }

    /// The stored record, if it exists and parses.
    pub fn record(&self, key: SeenKey<'_>) -> Option<SeenRecord> {
        let key = key.to_string();
        let value = match self.store.get(&key) {
            Ok(value) => value?,
            Err(e) => {
                warn!(%key, error = %e, "could not read seen-state");
                return None;
            }
        };
        serde_json::from_str(&value)
            .inspect_err(|e| debug!(%key, error = %e, "unparseable seen record"))
            .ok()
    }

    /// Forget this tour version.
    pub fn reset_seen(&self, key: SeenKey<'_>) {
        let key = key.to_string();
        match self.store.remove(&key) {
            Ok(existed) => debug!(%key, existed, "reset seen-state"),
            Err(e) => warn!(%key, error = %e, "could not remove seen-state"),
        }
    }

    /// Remove every key in the namespace. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        match self.store.remove_prefix(&format!("{NAMESPACE}:")) {
            Ok(count) => {
                info!(count, "cleared seen-state entries");
                count
            }
            Err(e) => {
                warn!(error = %e, "could not clear seen-state");
                0
            }
        }
    }
}
