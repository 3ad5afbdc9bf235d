// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build item identities and the per-builder item type registry.
//!
//! A build item kind is an ordinary Rust type implementing [`BuildItem`]. Its
//! identity is the type itself, and its cardinality is fixed by the type's
//! `CARDINALITY` constant, so two declarations of the same kind can never
//! disagree about whether it is single-valued, multi-valued or a marker.
//!
//! # Examples
//!
//! ```
//! use the_buildchain::chain::{BuildItem, Cardinality, ItemId};
//!
//! struct Jar(String);
//! impl BuildItem for Jar {
//!     const CARDINALITY: Cardinality = Cardinality::Single;
//! }
//!
//! let id = ItemId::of::<Jar>();
//! assert_eq!(id.cardinality(), Cardinality::Single);
//! assert_eq!(id.short_name(), "Jar");
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::ChainBuildError;

/// Type-erased item value as it travels between steps and the result store.
pub type ItemValue = Arc<dyn Any + Send + Sync>;

/// How many values of an item kind may exist in one build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one producer per run supplies the value.
    Single,
    /// Every producer may contribute; values are aggregated in producer registration order.
    Multi,
    /// No payload; only presence and ordering matter.
    Marker,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Multi => write!(f, "multi"),
            Cardinality::Marker => write!(f, "marker"),
        }
    }
}

/// A value exchanged between build steps.
pub trait BuildItem: Any + Send + Sync {
    const CARDINALITY: Cardinality;
}

/// Identity of a build item kind.
///
/// Equality and hashing use the underlying `TypeId` only.
#[derive(Clone, Copy)]
pub struct ItemId {
    type_id: TypeId,
    name: &'static str,
    cardinality: Cardinality,
}

impl ItemId {
    pub fn of<T: BuildItem>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            cardinality: T::CARDINALITY,
        }
    }

    /// Full type path of the item kind.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, used in diagnostics and DOT output.
    pub fn short_name(&self) -> &'static str {
        // Generic parameters may contain `::` themselves, so only look before the first `<`.
        let base_end = self.name.find('<').unwrap_or(self.name.len());
        let start = self.name[..base_end].rfind("::").map(|i| i + 2).unwrap_or(0);
        &self.name[start..]
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_single(&self) -> bool {
        self.cardinality == Cardinality::Single
    }

    pub fn is_multi(&self) -> bool {
        self.cardinality == Cardinality::Multi
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ItemId {}

impl Hash for ItemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.short_name(), self.cardinality)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl Serialize for ItemId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Whether an item kind is a terminal output the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finality {
    #[default]
    Intermediate,
    Final,
}

#[derive(Debug, Clone, Copy, Default)]
struct ItemFlags {
    finality: Finality,
    initial: bool,
}

/// Every item kind a [`ChainBuilder`](crate::chain::ChainBuilder) has seen, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: IndexMap<ItemId, ItemFlags>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item kind without changing its flags.
    pub fn note(&mut self, id: ItemId) {
        self.items.entry(id).or_default();
    }

    pub fn mark_final(&mut self, id: ItemId) {
        self.items.entry(id).or_default().finality = Finality::Final;
    }

    pub fn mark_initial(&mut self, id: ItemId) {
        self.items.entry(id).or_default().initial = true;
    }

    pub fn finality(&self, id: &ItemId) -> Finality {
        self.items.get(id).map(|f| f.finality).unwrap_or_default()
    }

    pub fn is_initial(&self, id: &ItemId) -> bool {
        self.items.get(id).map(|f| f.initial).unwrap_or(false)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.items.keys()
    }

    pub fn finals(&self) -> impl Iterator<Item = &ItemId> {
        self.items
            .iter()
            .filter(|(_, flags)| flags.finality == Finality::Final)
            .map(|(id, _)| id)
    }

    pub fn initials(&self) -> impl Iterator<Item = &ItemId> {
        self.items
            .iter()
            .filter(|(_, flags)| flags.initial)
            .map(|(id, _)| id)
    }

    /// Resolve an item kind by its full type path or by an unambiguous short name.
    pub fn resolve(&self, name: &str) -> Result<ItemId, ChainBuildError> {
        if let Some(id) = self.items.keys().find(|id| id.name() == name) {
            return Ok(*id);
        }

        let candidates: Vec<ItemId> = self
            .items
            .keys()
            .filter(|id| id.short_name() == name)
            .copied()
            .collect();

        match candidates.as_slice() {
            [] => Err(ChainBuildError::UnknownItem {
                name: name.to_string(),
            }),
            [only] => Ok(*only),
            _ => Err(ChainBuildError::AmbiguousItem {
                name: name.to_string(),
                candidates: candidates.iter().map(|id| id.name().to_string()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    impl BuildItem for Alpha {
        const CARDINALITY: Cardinality = Cardinality::Single;
    }

    struct Beta;
    impl BuildItem for Beta {
        const CARDINALITY: Cardinality = Cardinality::Multi;
    }

    mod other {
        use super::super::{BuildItem, Cardinality};

        pub struct Alpha;
        impl BuildItem for Alpha {
            const CARDINALITY: Cardinality = Cardinality::Marker;
        }
    }

    #[test]
    fn test_item_id_identity() {
        assert_eq!(ItemId::of::<Alpha>(), ItemId::of::<Alpha>());
        assert_ne!(ItemId::of::<Alpha>(), ItemId::of::<Beta>());
        assert_ne!(ItemId::of::<Alpha>(), ItemId::of::<other::Alpha>());
        assert!(ItemId::of::<Beta>().is_multi());
        assert_eq!(ItemId::of::<other::Alpha>().cardinality(), Cardinality::Marker);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(ItemId::of::<Alpha>().short_name(), "Alpha");
        assert!(ItemId::of::<Alpha>().name().ends_with("::Alpha"));
    }

    #[test]
    fn test_registry_flags() {
        let mut registry = ItemRegistry::new();
        registry.note(ItemId::of::<Alpha>());
        registry.mark_final(ItemId::of::<Beta>());
        registry.mark_initial(ItemId::of::<other::Alpha>());

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.finality(&ItemId::of::<Alpha>()), Finality::Intermediate);
        assert_eq!(registry.finality(&ItemId::of::<Beta>()), Finality::Final);
        assert!(registry.is_initial(&ItemId::of::<other::Alpha>()));
        assert_eq!(registry.finals().count(), 1);
        assert_eq!(registry.initials().count(), 1);

        // noting again keeps existing flags
        registry.note(ItemId::of::<Beta>());
        assert_eq!(registry.finality(&ItemId::of::<Beta>()), Finality::Final);
    }

    #[test]
    fn test_resolve_by_name() {
        let mut registry = ItemRegistry::new();
        registry.note(ItemId::of::<Alpha>());
        registry.note(ItemId::of::<Beta>());

        assert_eq!(registry.resolve("Beta").unwrap(), ItemId::of::<Beta>());
        let full = ItemId::of::<Alpha>().name();
        assert_eq!(registry.resolve(full).unwrap(), ItemId::of::<Alpha>());
        assert!(matches!(
            registry.resolve("Gamma"),
            Err(ChainBuildError::UnknownItem { .. })
        ));

        registry.note(ItemId::of::<other::Alpha>());
        assert!(matches!(
            registry.resolve("Alpha"),
            Err(ChainBuildError::AmbiguousItem { .. })
        ));
    }
}
