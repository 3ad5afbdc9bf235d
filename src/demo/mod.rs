// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A small application-packaging build used by the binary and the tests.
//!
//! `LaunchMode` is the only initial item. Requesting `ArtifactResult` keeps
//! the scanning, indexing, feature, resource and banner steps; `native-image`
//! and `dev-ui-cards` are only kept when their own items are requested, and
//! the weak `feature-metrics` step is never kept.

pub mod items;
pub mod steps;

use crate::chain::ChainBuilder;
use crate::errors::DeclarationError;

/// Register every demo step with `LaunchMode` declared as the initial item.
pub fn demo_chain() -> Result<ChainBuilder, DeclarationError> {
    let mut builder = ChainBuilder::new();
    builder.add_initial::<items::LaunchMode>()?;

    for step in [
        steps::setup_logging(),
        steps::scan_sources(),
        steps::index_classes(),
        steps::feature("feature-rest", "rest"),
        steps::feature("feature-jdbc", "jdbc"),
        steps::feature("feature-cache", "cache"),
        steps::weak_feature("feature-metrics", "metrics"),
        steps::default_banner(),
        steps::custom_banner(),
        steps::generate_config(),
        steps::generate_reflection(),
        steps::package_jar(),
        steps::native_image(),
        steps::dev_ui_cards(),
    ] {
        builder.register(step)?;
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::items::*;
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_demo_packages_artifact() {
        let mut builder = demo_chain().unwrap();
        builder.request_final::<ArtifactResult>();
        let chain = builder.build().unwrap();

        assert!(!chain.contains_step("feature-metrics"));
        assert!(!chain.contains_step("native-image"));
        assert!(!chain.contains_step("dev-ui-cards"));
        assert!(chain.contains_step("setup-logging"));

        let result = chain
            .execution()
            .provide(LaunchMode("dev".to_string()))
            .run()
            .await
            .unwrap();

        let artifact = result.consume::<ArtifactResult>().unwrap();
        assert_eq!(artifact.path, "target/acme-app-runner.jar");
        assert_eq!(artifact.classes, 4);
        assert_eq!(artifact.features, vec!["rest", "jdbc", "cache"]);
        assert_eq!(artifact.resources[0], "META-INF/application.properties");
        assert_eq!(artifact.resources.len(), 5);
        assert_eq!(artifact.banner.as_deref(), Some("acme greeting app [dev]"));
        assert!(result.is_present::<LoggingSetup>());
    }

    async fn packaged(extra_finals: bool) -> serde_json::Value {
        let mut builder = demo_chain().unwrap();
        builder.request_final::<ArtifactResult>();
        if extra_finals {
            builder
                .request_final::<NativeImage>()
                .request_final::<DevUiCard>()
                .request_final::<GeneratedResource>();
        }
        let chain = builder.build().unwrap();
        let result = chain
            .execution()
            .provide(LaunchMode("prod".to_string()))
            .run()
            .await
            .unwrap();
        serde_json::to_value(result.consume::<ArtifactResult>().unwrap()).unwrap()
    }

    /// Keeping more steps does not change the requested output.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pruning_does_not_change_artifact() {
        let pruned = packaged(false).await;
        let full = packaged(true).await;
        assert_eq!(pruned, full);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeated_runs_are_identical() {
        let first = packaged(false).await;
        let second = packaged(false).await;
        assert_eq!(first, second);
        assert_eq!(first["features"], serde_json::json!(["rest", "jdbc", "cache"]));
    }

    #[test]
    fn test_overridable_banner_is_replaced() {
        let mut builder = demo_chain().unwrap();
        builder.request_final::<BannerItem>();
        let chain = builder.build().unwrap();

        assert!(chain.contains_step("custom-banner"));
        assert!(!chain.contains_step("default-banner"));
    }

    #[test]
    fn test_native_image_extends_chain() {
        let mut builder = demo_chain().unwrap();
        builder.request_final::<NativeImage>();
        let chain = builder.build().unwrap();

        let package = chain.wave_of("package-jar").unwrap();
        assert_eq!(chain.wave_of("native-image"), Some(package + 1));
    }
}
