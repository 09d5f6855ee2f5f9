//! Moving tours between apps: export, import validation, and merging.
//!
//! The interchange file is a [`TourBundle`]. Import checks the raw JSON
//! shape first and reports the first problem in the author's terms, before
//! anything is merged.

use std::future::Future;
use std::path::PathBuf;
use std::{fmt, io};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::{EXPORT_VERSION, ThemeConfig, Tour, TourBundle, WidgetConfig};

/// The first structural problem found in an import file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Import data must be a JSON object")]
    NotAnObject,

    #[error("Import data must contain a \"tours\" array")]
    MissingTours,

    #[error("Tour at index {0} is not an object")]
    TourNotObject(usize),

    #[error("Tour at index {0} is missing a valid \"tourName\"")]
    MissingName(usize),

    #[error("Tour at index {0} is missing a valid \"tourId\"")]
    MissingId(usize),

    #[error("Tour \"{0}\" is missing a \"steps\" array")]
    MissingSteps(String),

    #[error("Tour \"{name}\" is malformed: {reason}")]
    Malformed { name: String, reason: String },
}

/// Why an import produced nothing.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The user backed out of choosing a file.
    #[error("import cancelled")]
    Cancelled,

    #[error("failed to read file: {0}")]
    Read(#[from] io::Error),

    #[error("invalid import file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid import file: {0}")]
    Invalid(#[from] ValidationError),
}

/// A validated import.
///
/// `theme` and `widget` are `None` when the file has none, or has something
/// other than an object there.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedBundle {
    pub tours: Vec<Tour>,
    pub theme: Option<ThemeConfig>,
    pub widget: Option<WidgetConfig>,
}

/// How imported tours combine with the existing ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeMode {
    /// Drop every existing tour.
    ReplaceAll,

    /// Replace tours with the same name, keep the rest.
    ReplaceMatching,

    /// Keep everything and append.
    #[default]
    AddToExisting,
}

impl MergeMode {
    /// Parse a mode name. Unknown names mean [`MergeMode::AddToExisting`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "replaceAll" => Self::ReplaceAll,
            "replaceMatching" => Self::ReplaceMatching,
            "addToExisting" => Self::AddToExisting,
            other => {
                warn!(mode = other, "unknown import mode, defaulting to addToExisting");
                Self::AddToExisting
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReplaceAll => "replaceAll",
            Self::ReplaceMatching => "replaceMatching",
            Self::AddToExisting => "addToExisting",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A new tour identifier.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check the shape of an import file and decode it.
pub fn validate(raw: &Value) -> Result<ImportedBundle, ValidationError> {
    let root = match raw {
        Value::Object(map) => Some(map),
        // An array is an object to the authoring tool; it simply has no tours.
        Value::Array(_) => None,
        _ => return Err(ValidationError::NotAnObject),
    };
    let raw_tours = root
        .and_then(|map| map.get("tours"))
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingTours)?;

    for (i, tour) in raw_tours.iter().enumerate() {
        let fields = match tour {
            Value::Object(fields) => Some(fields),
            Value::Array(_) => None,
            _ => return Err(ValidationError::TourNotObject(i)),
        };
        let text = |key: &str| {
            fields
                .and_then(|f| f.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        let name = text("tourName").ok_or(ValidationError::MissingName(i))?;
        text("tourId").ok_or(ValidationError::MissingId(i))?;
        if !fields
            .and_then(|f| f.get("steps"))
            .is_some_and(Value::is_array)
        {
            return Err(ValidationError::MissingSteps(name.to_string()));
        }
    }

    let tours = raw_tours
        .iter()
        .map(|tour| {
            serde_json::from_value::<Tour>(tour.clone()).map_err(|e| ValidationError::Malformed {
                name: tour
                    .get("tourName")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImportedBundle {
        tours,
        theme: section(root, "theme"),
        widget: section(root, "widget"),
    })
}

/// Decode an optional object-valued section, dropping anything else.
fn section<T: serde::de::DeserializeOwned>(
    root: Option<&serde_json::Map<String, Value>>,
    key: &str,
) -> Option<T> {
    let value = root?.get(key).filter(|v| v.is_object())?;
    serde_json::from_value(value.clone())
        .inspect_err(|e| warn!(section = key, error = %e, "ignoring unreadable import section"))
        .ok()
}

/// Combine imported tours with existing ones.
///
/// Every imported tour gets a fresh id, except one that replaces an
/// existing tour of the same name under [`MergeMode::ReplaceMatching`],
/// which keeps the existing id.
pub fn merge(existing: &[Tour], imported: &[Tour], mode: MergeMode) -> Vec<Tour> {
    let with_fresh_id = |tour: &Tour| Tour {
        tour_id: Some(fresh_id()),
        ..tour.clone()
    };

    match mode {
        MergeMode::ReplaceAll => imported.iter().map(with_fresh_id).collect(),
        MergeMode::AddToExisting => existing
            .iter()
            .cloned()
            .chain(imported.iter().map(with_fresh_id))
            .collect(),
        MergeMode::ReplaceMatching => {
            let mut result = existing.to_vec();
            for tour in imported {
                match result.iter_mut().find(|t| t.tour_name == tour.tour_name) {
                    Some(slot) => {
                        *slot = Tour {
                            tour_id: slot.tour_id.take(),
                            ..tour.clone()
                        };
                    }
                    None => result.push(with_fresh_id(tour)),
                }
            }
            result
        }
    }
}

/// Package tours and settings for export.
pub fn export(tours: &[Tour], theme: &ThemeConfig, widget: &WidgetConfig) -> TourBundle {
    TourBundle {
        version: EXPORT_VERSION,
        exported_at: Timestamp::now(),
        tours: tours.to_vec(),
        theme: theme.clone(),
        widget: widget.clone(),
    }
}

/// Pretty-printed JSON for a bundle.
pub fn to_json(bundle: &TourBundle) -> serde_json::Result<String> {
    serde_json::to_string_pretty(bundle)
}

/// Where an import file comes from. Reading may wait on the user.
pub trait BundleSource {
    fn read(&self) -> impl Future<Output = Result<String, ImportError>>;
}

/// A file on disk. No path means the user chose nothing.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: Option<PathBuf>,
}

impl FileSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl BundleSource for FileSource {
    async fn read(&self) -> Result<String, ImportError> {
        let path = self.path.as_ref().ok_or(ImportError::Cancelled)?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Read, parse, and validate an import.
pub async fn import(source: &impl BundleSource) -> Result<ImportedBundle, ImportError> {
    let text = source.read().await?;
    let raw: Value = serde_json::from_str(&text)?;
    let bundle = validate(&raw)?;
    info!(tours = bundle.tours.len(), "import file parsed");
    Ok(bundle)
}
