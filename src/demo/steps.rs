// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Demo step declarations and actions.

use anyhow::Context;

use crate::chain::{StepDescriptor, StepInputs, StepOutputs};
use crate::demo::items::{
    ApplicationSources, ArtifactResult, BannerItem, DevUiCard, FeatureBuildItem,
    GeneratedResource, IndexedClasses, LaunchMode, LoggingSetup, NativeImage,
};
use crate::traits::StepAction;

pub fn setup_logging() -> StepDescriptor {
    StepDescriptor::builder("setup-logging")
        .produces::<LoggingSetup>()
        .always_active()
        .build(|_| {
            tracing::debug!("demo logging configured");
            Ok(StepOutputs::new().with(LoggingSetup))
        })
}

pub fn scan_sources() -> StepDescriptor {
    StepDescriptor::builder("scan-sources")
        .consumes::<LaunchMode>()
        .produces::<ApplicationSources>()
        .build(|inputs| {
            let mode = inputs.consume::<LaunchMode>()?;
            let mut sources = vec![
                "org/acme/GreetingResource.java".to_string(),
                "org/acme/GreetingService.java".to_string(),
                "org/acme/Fruit.java".to_string(),
            ];
            if mode.0 == "dev" {
                sources.push("org/acme/DevServicesConfig.java".to_string());
            }
            Ok(StepOutputs::new().with(ApplicationSources(sources)))
        })
}

pub fn index_classes() -> StepDescriptor {
    StepDescriptor::builder("index-classes")
        .consumes::<ApplicationSources>()
        .produces::<IndexedClasses>()
        .build(index)
}

fn index(inputs: &StepInputs) -> anyhow::Result<StepOutputs> {
    let sources = inputs.consume::<ApplicationSources>()?;
    let classes = sources
        .0
        .iter()
        .map(|source| {
            source
                .strip_suffix(".java")
                .map(|class| class.replace('/', "."))
                .with_context(|| format!("not a java source: {}", source))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(StepOutputs::new().with(IndexedClasses(classes)))
}

pub fn feature(id: &'static str, name: &'static str) -> StepDescriptor {
    StepDescriptor::builder(id)
        .produces::<FeatureBuildItem>()
        .build(move |_| Ok(StepOutputs::new().with(FeatureBuildItem(name.to_string()))))
}

/// Contributes a feature only when something else keeps the step.
pub fn weak_feature(id: &'static str, name: &'static str) -> StepDescriptor {
    StepDescriptor::builder(id)
        .produces_weak::<FeatureBuildItem>()
        .build(move |_| Ok(StepOutputs::new().with(FeatureBuildItem(name.to_string()))))
}

pub fn default_banner() -> StepDescriptor {
    StepDescriptor::builder("default-banner")
        .produces_overridable::<BannerItem>()
        .build(|_| Ok(StepOutputs::new().with(BannerItem("powered by the-buildchain".into()))))
}

pub fn custom_banner() -> StepDescriptor {
    StepDescriptor::builder("custom-banner")
        .consumes_optional::<LaunchMode>()
        .produces::<BannerItem>()
        .build(|inputs| {
            let mode = inputs
                .get::<LaunchMode>()
                .map(|mode| mode.0.as_str())
                .unwrap_or("prod");
            Ok(StepOutputs::new().with(BannerItem(format!("acme greeting app [{}]", mode))))
        })
}

pub fn generate_config() -> StepDescriptor {
    StepDescriptor::builder("generate-config")
        .consumes::<IndexedClasses>()
        .produces::<GeneratedResource>()
        .build(|inputs| {
            let classes = inputs.consume::<IndexedClasses>()?;
            Ok(StepOutputs::new().with(GeneratedResource {
                name: "META-INF/application.properties".to_string(),
                size: classes.0.len() * 32,
            }))
        })
}

pub fn generate_reflection() -> StepDescriptor {
    StepDescriptor::builder("generate-reflection")
        .consumes::<IndexedClasses>()
        .produces::<GeneratedResource>()
        .build(|inputs| {
            let classes = inputs.consume::<IndexedClasses>()?;
            let mut outputs = StepOutputs::new();
            outputs.produce_all(classes.0.iter().map(|class| GeneratedResource {
                name: format!("reflection/{}.json", class),
                size: class.len(),
            }));
            Ok(outputs)
        })
}

/// Packages indexed classes, features and resources into the final artifact.
pub struct PackageJar {
    output_dir: String,
}

impl PackageJar {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl StepAction for PackageJar {
    fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutputs> {
        let classes = inputs.consume::<IndexedClasses>()?;
        let artifact = ArtifactResult {
            path: format!("{}/acme-app-runner.jar", self.output_dir),
            classes: classes.0.len(),
            features: inputs
                .consume_multi::<FeatureBuildItem>()
                .into_iter()
                .map(|feature| feature.0.clone())
                .collect(),
            resources: inputs
                .consume_multi::<GeneratedResource>()
                .into_iter()
                .map(|resource| resource.name.clone())
                .collect(),
            banner: inputs.get::<BannerItem>().map(|banner| banner.0.clone()),
        };
        Ok(StepOutputs::new().with(artifact))
    }
}

pub fn package_jar() -> StepDescriptor {
    StepDescriptor::builder("package-jar")
        .consumes::<IndexedClasses>()
        .consumes_optional::<FeatureBuildItem>()
        .consumes_optional::<GeneratedResource>()
        .consumes_optional::<BannerItem>()
        .after::<LoggingSetup>()
        .produces::<ArtifactResult>()
        .build_action(PackageJar::new("target"))
}

pub fn native_image() -> StepDescriptor {
    StepDescriptor::builder("native-image")
        .consumes::<ArtifactResult>()
        .produces::<NativeImage>()
        .build(|inputs| {
            let artifact = inputs.consume::<ArtifactResult>()?;
            let binary = artifact.path.trim_end_matches(".jar").to_string();
            Ok(StepOutputs::new().with(NativeImage(binary)))
        })
}

pub fn dev_ui_cards() -> StepDescriptor {
    StepDescriptor::builder("dev-ui-cards")
        .consumes_optional::<FeatureBuildItem>()
        .produces::<DevUiCard>()
        .build(|inputs| {
            let mut outputs = StepOutputs::new();
            outputs.produce_all(
                inputs
                    .consume_multi::<FeatureBuildItem>()
                    .into_iter()
                    .map(|feature| DevUiCard(format!("{} card", feature.0))),
            );
            Ok(outputs)
        })
}
