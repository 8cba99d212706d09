//! # Material Catalog
//!
//! Read-only reference definitions for the materials a yard buys and sells.
//! Each definition carries the material's native unit and whether it is an
//! intrinsically countable item — countable materials (batteries, converters,
//! complete units) are permanently pinned to `Each` pricing by the engine.
//!
//! The catalog is supplied by the hosting application; [`MaterialCatalog::builtin`]
//! provides a static yard catalog for demos and tests.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::catalog::MaterialCatalog;
//!
//! let catalog = MaterialCatalog::builtin();
//! let copper = catalog.get("Copper #1").unwrap();
//! assert!(!copper.is_countable);
//!
//! let battery = catalog.get("Car Battery").unwrap();
//! assert!(battery.is_countable);
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// A single material reference definition.
///
/// External and read-only from the engine's perspective: lines reference a
/// definition by name and the engine only reads the countable flag and
/// native unit from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    /// Unique material name (the foreign key lines store)
    pub name: String,

    /// The unit the material is natively traded in
    pub native_unit: Unit,

    /// Whether this material is an intrinsically countable item.
    ///
    /// Countable materials are permanently pinned to `Each` pricing;
    /// the engine enforces this, user input never overrides it.
    pub is_countable: bool,
}

impl MaterialDefinition {
    /// Create a mass-traded material definition
    pub fn by_weight(name: impl Into<String>, native_unit: Unit) -> Self {
        MaterialDefinition {
            name: name.into(),
            native_unit,
            is_countable: false,
        }
    }

    /// Create a countable material definition (always priced per each)
    pub fn by_count(name: impl Into<String>) -> Self {
        MaterialDefinition {
            name: name.into(),
            native_unit: Unit::Each,
            is_countable: true,
        }
    }
}

/// Name-keyed material catalog.
///
/// A `BTreeMap` keeps `names()` in stable order for UI dropdowns and
/// deterministic JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialCatalog {
    materials: BTreeMap<String, MaterialDefinition>,
}

impl MaterialCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        MaterialCatalog::default()
    }

    /// Build a catalog from a list of definitions.
    ///
    /// Later duplicates replace earlier ones.
    pub fn from_definitions(defs: impl IntoIterator<Item = MaterialDefinition>) -> Self {
        let mut catalog = MaterialCatalog::new();
        for def in defs {
            catalog.insert(def);
        }
        catalog
    }

    /// The builtin demo catalog (typical yard materials)
    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    /// Look up a definition by name.
    ///
    /// An unknown name is "no constraint applied", not an error — callers
    /// treat `None` as a cleared selection.
    pub fn get(&self, name: &str) -> Option<&MaterialDefinition> {
        self.materials.get(name)
    }

    /// Insert or replace a definition
    pub fn insert(&mut self, def: MaterialDefinition) {
        self.materials.insert(def.name.clone(), def);
    }

    /// Material names in stable (sorted) order, for UI selection
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

static BUILTIN_CATALOG: Lazy<MaterialCatalog> = Lazy::new(|| {
    MaterialCatalog::from_definitions([
        // Non-ferrous, traded per pound
        MaterialDefinition::by_weight("Copper #1", Unit::Pound),
        MaterialDefinition::by_weight("Copper #2", Unit::Pound),
        MaterialDefinition::by_weight("Brass Yellow", Unit::Pound),
        MaterialDefinition::by_weight("Aluminum Cans", Unit::Pound),
        MaterialDefinition::by_weight("Aluminum 6061", Unit::Pound),
        MaterialDefinition::by_weight("Insulated Wire", Unit::Pound),
        MaterialDefinition::by_weight("Stainless 304", Unit::Pound),
        // Ferrous, traded per net ton
        MaterialDefinition::by_weight("Shred Steel", Unit::NetTon),
        MaterialDefinition::by_weight("HMS 1", Unit::NetTon),
        MaterialDefinition::by_weight("P&S 5ft", Unit::NetTon),
        MaterialDefinition::by_weight("Cast Iron", Unit::NetTon),
        // Countable items, always priced per each
        MaterialDefinition::by_count("Car Battery"),
        MaterialDefinition::by_count("Catalytic Converter"),
        MaterialDefinition::by_count("Electric Motor (Large)"),
        MaterialDefinition::by_count("Complete Appliance"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = MaterialCatalog::builtin();
        assert!(!catalog.is_empty());

        let shred = catalog.get("Shred Steel").unwrap();
        assert_eq!(shred.native_unit, Unit::NetTon);
        assert!(!shred.is_countable);

        let converter = catalog.get("Catalytic Converter").unwrap();
        assert_eq!(converter.native_unit, Unit::Each);
        assert!(converter.is_countable);
    }

    #[test]
    fn test_unknown_material_is_none() {
        let catalog = MaterialCatalog::builtin();
        assert!(catalog.get("Unobtainium").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let catalog = MaterialCatalog::from_definitions([
            MaterialDefinition::by_weight("Zinc", Unit::Pound),
            MaterialDefinition::by_weight("Aluminum Cans", Unit::Pound),
        ]);
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["Aluminum Cans", "Zinc"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = MaterialCatalog::new();
        catalog.insert(MaterialDefinition::by_weight("Lead", Unit::Pound));
        catalog.insert(MaterialDefinition::by_weight("Lead", Unit::Kilogram));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Lead").unwrap().native_unit, Unit::Kilogram);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let catalog = MaterialCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let roundtrip: MaterialCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(catalog, roundtrip);
    }
}
