//! Inspection commands: theme, render, steps, objects, detect.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::rc::Rc;

use onboard::config::Config;
use onboard::markdown;
use onboard::model::ThemeConfig;
use onboard::platform::{
    DetectionError, ElementRef, Host, ObjectInfo, Platform, PlatformAdapter, PlatformKind,
    PlatformQuery, PlatformResolver, Resolution, SelectorRegistry, is_edit_mode,
};
use onboard::steps::StepBuilder;
use onboard::theme::{self, POPOVER_SCOPE};

use super::document::TourDocument;
use super::format::{format_objects, format_steps, format_tour_heading};

/// What the host reported about itself, as given on the command line.
#[derive(Debug, Default)]
pub(super) struct Reported {
    pub platform: Option<String>,
    pub version: Option<String>,
    pub code_path: Option<String>,
}

impl PlatformQuery for Reported {
    async fn query(&self) -> Result<Platform, DetectionError> {
        let Some(name) = self.platform.as_deref() else {
            return Err(DetectionError::Unavailable(
                "host reported no platform".to_string(),
            ));
        };
        let kind = parse_kind(name)
            .ok_or_else(|| DetectionError::Failed(format!("unknown platform '{name}'")))?;

        let mut platform = Platform::new(kind);
        platform.version = self.version.clone();
        if let Some(code_path) = &self.code_path {
            platform.code_path = code_path.clone();
        }
        Ok(platform)
    }
}

fn parse_kind(name: &str) -> Option<PlatformKind> {
    match name {
        "client-managed" => Some(PlatformKind::ClientManaged),
        "cloud" => Some(PlatformKind::Cloud),
        _ => None,
    }
}

/// A page known only by its URL. It has no elements.
struct UrlHost {
    location: String,
}

impl Host for UrlHost {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn query_selector(&self, _selector: &str) -> Option<ElementRef> {
        None
    }

    fn attribute(&self, _element: &ElementRef, _name: &str) -> Option<String> {
        None
    }

    fn has_element_id(&self, _id: &str) -> bool {
        false
    }

    fn append_style(&self, _id: &str, _css: &str) {}
}

pub(super) fn cmd_theme(preset: Option<&str>, doc: Option<&Path>, css: bool) -> Result<(), String> {
    let config = match (doc, preset) {
        (Some(path), _) => TourDocument::load(path)?.theme,
        (None, Some(name)) => {
            if theme::presets::find(name).is_none() {
                let known: Vec<&str> = theme::presets::PRESETS.iter().map(|p| p.name).collect();
                return Err(format!(
                    "unknown preset '{name}' (known: {})",
                    known.join(", ")
                ));
            }
            ThemeConfig::preset(name)
        }
        (None, None) => ThemeConfig::default(),
    };

    let resolved = theme::resolve(&config);
    if css {
        println!("{}", resolved.to_css(POPOVER_SCOPE));
    } else {
        for (var, value) in resolved.css_vars() {
            println!("{var}: {value}");
        }
    }
    Ok(())
}

pub(super) fn cmd_render(file: Option<&Path>) -> Result<(), String> {
    let source = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            source
        }
    };
    println!("{}", markdown::render(&source));
    Ok(())
}

pub(super) fn cmd_steps(
    config: &Config,
    doc: &Path,
    tour: Option<&str>,
    platform: &str,
    code_path: &str,
) -> Result<(), String> {
    let document = TourDocument::load(doc)?;
    let tours = match tour {
        Some(name) => vec![
            document
                .find(name)
                .ok_or_else(|| format!("no tour named '{name}' in {}", doc.display()))?,
        ],
        None => document.tours.iter().collect(),
    };

    let host = Rc::new(UrlHost {
        location: String::new(),
    });
    let builder = StepBuilder::new(Rc::new(config.registry()), host);

    for (i, tour) in tours.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        let steps = builder.build(tour, platform, code_path);
        println!("{}", format_tour_heading(tour, steps.len()));
        if !steps.is_empty() {
            println!("{}", format_steps(&steps));
        }
    }
    Ok(())
}

pub(super) fn cmd_objects(file: &Path, on_sheet: &[String]) -> Result<(), String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let infos: Vec<ObjectInfo> = serde_json::from_str(&json)
        .map_err(|e| format!("invalid object list {}: {e}", file.display()))?;

    // Filtering and labelling do not depend on the platform.
    let adapter = PlatformAdapter::new(
        Platform::new(PlatformKind::ClientManaged),
        &SelectorRegistry::builtin(),
    );
    let objects = adapter.targetable_objects(&infos, on_sheet);
    if objects.is_empty() {
        eprintln!("No targetable objects.");
    } else {
        println!("{}", format_objects(&objects));
    }
    Ok(())
}

pub(super) async fn cmd_detect(
    config: &Config,
    location: &str,
    reported: Reported,
) -> Result<(), String> {
    let mut resolver = PlatformResolver::new(config.detection_timeout());
    let platform = resolver.detect(&reported, location).await;

    println!("platform: {}", platform.kind);
    println!("version: {}", platform.version.as_deref().unwrap_or("unknown"));
    println!("code path: {}", platform.code_path);
    match resolver.state() {
        Resolution::Degraded { reason, .. } => println!("detection: from location ({reason})"),
        Resolution::Resolved(_) | Resolution::Pending => println!("detection: reported by host"),
    }

    let host = UrlHost {
        location: location.to_string(),
    };
    let registry = config.registry();
    if let Some(adapter) = resolver.adapter(&registry) {
        let sheet = adapter.current_sheet_id(&host);
        println!("sheet: {}", sheet.as_deref().unwrap_or("(none)"));
    }
    let mode = if is_edit_mode(None, location) {
        "edit"
    } else {
        "analysis"
    };
    println!("mode: {mode}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reported(platform: Option<&str>) -> Reported {
        Reported {
            platform: platform.map(str::to_string),
            ..Reported::default()
        }
    }

    #[tokio::test]
    async fn reported_platform_is_parsed() {
        let mut query = reported(Some("cloud"));
        query.version = Some("2025.5".to_string());
        query.code_path = Some("may-2025".to_string());

        let platform = query.query().await.unwrap();
        assert_eq!(platform.kind, PlatformKind::Cloud);
        assert_eq!(platform.version.as_deref(), Some("2025.5"));
        assert_eq!(platform.code_path, "may-2025");
    }

    #[tokio::test]
    async fn nothing_reported_is_unavailable() {
        let err = reported(None).query().await.unwrap_err();
        assert!(matches!(err, DetectionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unknown_platform_fails() {
        let err = reported(Some("desktop")).query().await.unwrap_err();
        assert!(matches!(err, DetectionError::Failed(_)));
    }

    #[tokio::test]
    async fn resolver_degrades_to_location() {
        let mut resolver = PlatformResolver::default();
        let platform = resolver
            .detect(&reported(None), "https://t.eu.qlikcloud.com/sense/app/1")
            .await;
        assert_eq!(platform.kind, PlatformKind::Cloud);
        assert!(matches!(resolver.state(), Resolution::Degraded { .. }));
    }

    #[test]
    fn url_host_finds_sheet_in_location() {
        let host = UrlHost {
            location: "https://h/sense/app/1/sheet/abc-123/state/analysis".to_string(),
        };
        let adapter = PlatformAdapter::new(
            Platform::new(PlatformKind::ClientManaged),
            &SelectorRegistry::builtin(),
        );
        assert_eq!(adapter.current_sheet_id(&host).as_deref(), Some("abc-123"));
    }
}
