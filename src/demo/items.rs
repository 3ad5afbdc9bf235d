// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build item kinds exchanged by the demo steps.

use serde::Serialize;

use crate::chain::{BuildItem, Cardinality};

/// Caller-supplied launch mode (`prod`, `dev`, `test`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchMode(pub String);

impl BuildItem for LaunchMode {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, Clone)]
pub struct ApplicationSources(pub Vec<String>);

impl BuildItem for ApplicationSources {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, Clone)]
pub struct IndexedClasses(pub Vec<String>);

impl BuildItem for IndexedClasses {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

/// One enabled extension feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureBuildItem(pub String);

impl BuildItem for FeatureBuildItem {
    const CARDINALITY: Cardinality = Cardinality::Multi;
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedResource {
    pub name: String,
    pub size: usize,
}

impl BuildItem for GeneratedResource {
    const CARDINALITY: Cardinality = Cardinality::Multi;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerItem(pub String);

impl BuildItem for BannerItem {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

/// Logging has been configured.
#[derive(Debug)]
pub struct LoggingSetup;

impl BuildItem for LoggingSetup {
    const CARDINALITY: Cardinality = Cardinality::Marker;
}

/// The packaged application.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactResult {
    pub path: String,
    pub classes: usize,
    pub features: Vec<String>,
    pub resources: Vec<String>,
    pub banner: Option<String>,
}

impl BuildItem for ArtifactResult {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, Clone)]
pub struct NativeImage(pub String);

impl BuildItem for NativeImage {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, Clone)]
pub struct DevUiCard(pub String);

impl BuildItem for DevUiCard {
    const CARDINALITY: Cardinality = Cardinality::Multi;
}
