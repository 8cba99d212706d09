//! # Material Line
//!
//! One editable row of a tally sheet: a material selection, a net weight,
//! a unit price, and the derived estimated total. Lines are created empty,
//! mutated field-by-field through the engine operations, and removed on
//! explicit delete — no soft-delete, no history.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::UnitPrice;
use crate::units::Unit;

/// A single material line on a tally sheet.
///
/// ## Weight-mode dependent storage
///
/// `net_weight` is stored in the unit implied by the sheet's current
/// [`WeightMode`](crate::units::WeightMode): pounds in `Scale` mode, the
/// line's own `pricing_unit` in `Price` mode. The same stored number
/// changes meaning when the sheet-wide mode flips, and the flip is applied
/// as one eager reinterpretation pass over every line (see
/// [`engine::apply_weight_mode_change`](crate::engine::apply_weight_mode_change)).
///
/// Lines for intrinsically countable materials keep their quantity in
/// `net_weight` as a unit-less count; mode flips never touch them.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "7f8c9f4e-4f3a-4e2a-9b1a-2d3c4e5f6a7b",
///   "material_name": "Copper #1",
///   "net_weight": 250.0,
///   "unit_price": { "type": "Fixed", "amount": 2.85 },
///   "pricing_unit": "pound",
///   "is_each_material": false,
///   "estimated_total": 712.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    /// Opaque stable identifier, assigned at creation, never reused
    pub id: Uuid,

    /// Catalog material name, or empty when unselected
    pub material_name: String,

    /// Net weight in the unit implied by the sheet's weight mode,
    /// or a unit-less count for countable materials
    pub net_weight: f64,

    /// Fixed amount or market-index formula, never both
    pub unit_price: UnitPrice,

    /// The unit the price applies to; pinned to `Each` while the
    /// resolved material is countable
    pub pricing_unit: Unit,

    /// Cache of the resolved material's countable flag, kept in sync
    /// whenever `material_name` changes
    pub is_each_material: bool,

    /// Fully derived; recomputed on every change, never set directly
    pub estimated_total: f64,
}

impl MaterialLine {
    /// Create an empty line (the "add row" action)
    pub fn new() -> Self {
        MaterialLine {
            id: Uuid::new_v4(),
            material_name: String::new(),
            net_weight: 0.0,
            unit_price: UnitPrice::default(),
            pricing_unit: Unit::Pound,
            is_each_material: false,
            estimated_total: 0.0,
        }
    }

    /// Whether the line is in formula pricing mode
    pub fn is_formula_mode(&self) -> bool {
        self.unit_price.is_formula()
    }
}

impl Default for MaterialLine {
    fn default() -> Self {
        MaterialLine::new()
    }
}
