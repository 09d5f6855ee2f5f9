//! Platform detection.
//!
//! Detection runs once per session. The host is asked through a
//! [`PlatformQuery`], bounded by a timeout; if the query fails the platform is
//! guessed from the page location and the resolver records why.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Platform, PlatformAdapter, PlatformKind, SelectorRegistry};

/// How long the query may take before the location fallback is used.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    #[error("host platform API unavailable: {0}")]
    Unavailable(String),

    #[error("platform query failed: {0}")]
    Failed(String),

    #[error("platform query timed out after {0:?}")]
    TimedOut(Duration),
}

/// Asks the host which platform it is.
pub trait PlatformQuery {
    fn query(&self) -> impl Future<Output = Result<Platform, DetectionError>>;
}

/// Where detection stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not detected yet. Consumers must not guess.
    Pending,

    /// The query answered.
    Resolved(Platform),

    /// The query failed and the platform was derived from the location.
    Degraded {
        platform: Platform,
        reason: DetectionError,
    },
}

/// Detects the platform once and caches the answer.
#[derive(Debug)]
pub struct PlatformResolver {
    state: Resolution,
    timeout: Duration,
}

impl Default for PlatformResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl PlatformResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: Resolution::Pending,
            timeout,
        }
    }

    /// Detect the platform, or return the cached result.
    ///
    /// Only the first call reaches the query.
    pub async fn detect(&mut self, query: &impl PlatformQuery, location: &str) -> Platform {
        if let Some(platform) = self.current() {
            return platform.clone();
        }

        let (platform, state) = match tokio::time::timeout(self.timeout, query.query()).await {
            Ok(Ok(platform)) => {
                info!(
                    platform = %platform.kind,
                    version = platform.version.as_deref().unwrap_or("unknown"),
                    code_path = %platform.code_path,
                    "platform detected"
                );
                (platform.clone(), Resolution::Resolved(platform))
            }
            Ok(Err(reason)) => degrade(location, reason),
            Err(_) => degrade(location, DetectionError::TimedOut(self.timeout)),
        };

        self.state = state;
        platform
    }

    /// The detected platform, or `None` while detection is pending.
    pub fn current(&self) -> Option<&Platform> {
        match &self.state {
            Resolution::Pending => None,
            Resolution::Resolved(platform) | Resolution::Degraded { platform, .. } => {
                Some(platform)
            }
        }
    }

    pub fn state(&self) -> &Resolution {
        &self.state
    }

    /// An adapter for the detected platform, or `None` while pending.
    pub fn adapter(&self, registry: &SelectorRegistry) -> Option<PlatformAdapter> {
        self.current()
            .map(|platform| PlatformAdapter::new(platform.clone(), registry))
    }
}

fn degrade(location: &str, reason: DetectionError) -> (Platform, Resolution) {
    let platform = detect_from_location(location);
    warn!(%reason, platform = %platform.kind, "platform detection failed, using location");
    (
        platform.clone(),
        Resolution::Degraded { platform, reason },
    )
}

/// Guess the platform from the page location alone.
///
/// Only the kind can be derived; the code path is always the default.
pub fn detect_from_location(location: &str) -> Platform {
    let lower = location.to_ascii_lowercase();
    let kind = if lower.contains("qlikcloud.com") || lower.contains(".qlik.com/sense") {
        PlatformKind::Cloud
    } else {
        PlatformKind::ClientManaged
    };
    debug!(location, platform = %kind, "platform from location");
    Platform::new(kind)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Scripted {
        answer: Result<Platform, DetectionError>,
        delay: Duration,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn answering(answer: Result<Platform, DetectionError>) -> Self {
            Self {
                answer,
                delay: Duration::ZERO,
                calls: Cell::new(0),
            }
        }
    }

    impl PlatformQuery for Scripted {
        async fn query(&self) -> Result<Platform, DetectionError> {
            self.calls.set(self.calls.get() + 1);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone()
        }
    }

    fn cloud_may() -> Platform {
        Platform {
            kind: PlatformKind::Cloud,
            version: Some("2025.5".to_string()),
            code_path: "may-2025".to_string(),
        }
    }

    #[test]
    fn location_patterns() {
        let cases = [
            ("https://tenant.eu.qlikcloud.com/sense/app/1", PlatformKind::Cloud),
            ("https://TENANT.QLIKCLOUD.COM/hub", PlatformKind::Cloud),
            ("https://acme.qlik.com/sense/app/x", PlatformKind::Cloud),
            ("https://bi.acme.local/sense/app/x", PlatformKind::ClientManaged),
            ("http://localhost:4848/hub", PlatformKind::ClientManaged),
        ];
        for (location, kind) in cases {
            let platform = detect_from_location(location);
            assert_eq!(platform.kind, kind, "{location}");
            assert_eq!(platform.code_path, "default");
            assert_eq!(platform.version, None);
        }
    }

    #[test]
    fn pending_until_detected() {
        let resolver = PlatformResolver::default();
        assert_eq!(resolver.current(), None);
        assert_eq!(resolver.state(), &Resolution::Pending);
        assert!(resolver.adapter(&SelectorRegistry::builtin()).is_none());
    }

    #[tokio::test]
    async fn query_answer_is_cached() {
        let query = Scripted::answering(Ok(cloud_may()));
        let mut resolver = PlatformResolver::default();

        let first = resolver.detect(&query, "http://localhost/").await;
        let second = resolver.detect(&query, "http://localhost/").await;

        assert_eq!(first, cloud_may());
        assert_eq!(second, first);
        assert_eq!(query.calls.get(), 1);
        assert_eq!(resolver.state(), &Resolution::Resolved(cloud_may()));
    }

    #[tokio::test]
    async fn failed_query_degrades_to_location() {
        let query = Scripted::answering(Err(DetectionError::Unavailable("no product-info".into())));
        let mut resolver = PlatformResolver::default();

        let platform = resolver
            .detect(&query, "https://x.qlikcloud.com/sense/app/1")
            .await;

        assert_eq!(platform, Platform::new(PlatformKind::Cloud));
        assert!(matches!(
            resolver.state(),
            Resolution::Degraded {
                reason: DetectionError::Unavailable(_),
                ..
            }
        ));

        // Degraded is final too.
        resolver.detect(&query, "https://x.qlikcloud.com/").await;
        assert_eq!(query.calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_query_times_out() {
        let mut query = Scripted::answering(Ok(cloud_may()));
        query.delay = Duration::from_secs(10);
        let mut resolver = PlatformResolver::new(Duration::from_millis(50));

        let platform = resolver.detect(&query, "http://qs.local/hub").await;

        assert_eq!(platform.kind, PlatformKind::ClientManaged);
        assert_eq!(
            resolver.state(),
            &Resolution::Degraded {
                platform: Platform::new(PlatformKind::ClientManaged),
                reason: DetectionError::TimedOut(Duration::from_millis(50)),
            }
        );
    }

    #[tokio::test]
    async fn adapter_follows_detected_platform() {
        let query = Scripted::answering(Ok(cloud_may()));
        let mut resolver = PlatformResolver::default();
        resolver.detect(&query, "").await;

        let adapter = resolver.adapter(&SelectorRegistry::builtin());
        assert_eq!(
            adapter.map(|a| a.object_selector("o1")),
            Some(r#"[data-testid="object-o1"], .qv-object-o1"#.to_string())
        );
    }
}
