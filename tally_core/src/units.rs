//! # Weight Units
//!
//! The five units a material line can be weighed or priced in, plus the
//! conversion between them. Pounds are the canonical unit: every mass
//! conversion goes through pounds using fixed factors.
//!
//! `Each` is deliberately non-convertible. A count of discrete items
//! (batteries, converters, complete units) has no mass equivalence, so any
//! conversion touching `Each` returns the quantity unchanged — that is the
//! contract, not an error.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::units::{convert, Unit};
//!
//! // 2000 lb of shred is exactly one net ton
//! assert_eq!(convert(2000.0, Unit::Pound, Unit::NetTon), 1.0);
//!
//! // counts never convert
//! assert_eq!(convert(5.0, Unit::Each, Unit::Pound), 5.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TallyError;

/// Pounds per net (short) ton
pub const LB_PER_NET_TON: f64 = 2000.0;
/// Pounds per kilogram
pub const LB_PER_KILOGRAM: f64 = 2.20462;
/// Pounds per metric ton (tonne)
pub const LB_PER_METRIC_TON: f64 = 2204.62;

/// Weight/pricing unit for a material line.
///
/// The enum itself is the API boundary: calling code cannot hand the
/// converter a unit outside these five members. External text (CLI input,
/// hand-edited sheet JSON) enters through [`FromStr`], which rejects
/// anything unrecognized with [`TallyError::UnknownUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Pound (lb) - the canonical mass unit
    Pound,
    /// Net ton (NT) - 2000 lb, the US scrap trade short ton
    NetTon,
    /// Kilogram (kg)
    Kilogram,
    /// Metric ton (MT) - 1000 kg
    MetricTon,
    /// Each - a count of discrete items, no mass equivalence
    Each,
}

impl Unit {
    /// All unit variants for UI selection
    pub const ALL: [Unit; 5] = [
        Unit::Pound,
        Unit::NetTon,
        Unit::Kilogram,
        Unit::MetricTon,
        Unit::Each,
    ];

    /// The mass units (everything except `Each`)
    pub const MASS: [Unit; 4] = [Unit::Pound, Unit::NetTon, Unit::Kilogram, Unit::MetricTon];

    /// Whether this unit measures mass (false only for `Each`)
    pub fn is_mass(&self) -> bool {
        !matches!(self, Unit::Each)
    }

    /// Pounds per one of this unit.
    ///
    /// Returns `None` for `Each` — a count has no pound equivalence.
    pub fn pounds_per_unit(&self) -> Option<f64> {
        match self {
            Unit::Pound => Some(1.0),
            Unit::NetTon => Some(LB_PER_NET_TON),
            Unit::Kilogram => Some(LB_PER_KILOGRAM),
            Unit::MetricTon => Some(LB_PER_METRIC_TON),
            Unit::Each => None,
        }
    }

    /// Get the short code used in sheet JSON and CLI input
    pub fn code(&self) -> &'static str {
        match self {
            Unit::Pound => "pound",
            Unit::NetTon => "net_ton",
            Unit::Kilogram => "kilogram",
            Unit::MetricTon => "metric_ton",
            Unit::Each => "each",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Unit::Pound => "Pound",
            Unit::NetTon => "Net Ton",
            Unit::Kilogram => "Kilogram",
            Unit::MetricTon => "Metric Ton",
            Unit::Each => "Each",
        }
    }

    /// Get the abbreviation used in tables (e.g., "lb", "NT")
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Unit::Pound => "lb",
            Unit::NetTon => "NT",
            Unit::Kilogram => "kg",
            Unit::MetricTon => "MT",
            Unit::Each => "ea",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Unit {
    type Err = TallyError;

    /// Parse from common string representations.
    ///
    /// This is the boundary where invalid unit codes are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "pound" | "pounds" | "lb" | "lbs" => Ok(Unit::Pound),
            "net_ton" | "nt" | "ton" | "short_ton" => Ok(Unit::NetTon),
            "kilogram" | "kilograms" | "kg" | "kgs" => Ok(Unit::Kilogram),
            "metric_ton" | "mt" | "tonne" => Ok(Unit::MetricTon),
            "each" | "ea" | "count" => Ok(Unit::Each),
            _ => Err(TallyError::unknown_unit(s)),
        }
    }
}

/// Convert a quantity between units.
///
/// - `from == to` returns the quantity unchanged (including `Each` to `Each`).
/// - Any conversion involving `Each` returns the quantity unchanged: a count
///   of discrete items is unit-less and must never be mass-converted.
/// - Otherwise the quantity is taken to pounds with a fixed factor and then
///   to the destination unit.
///
/// Pure function — no side effects, deterministic, safe from any caller.
pub fn convert(quantity: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return quantity;
    }
    // Counts have no mass equivalence; pass through untouched.
    let (from_lb, to_lb) = match (from.pounds_per_unit(), to.pounds_per_unit()) {
        (Some(f), Some(t)) => (f, t),
        _ => return quantity,
    };
    quantity * from_lb / to_lb
}

/// Global weight display mode for a sheet.
///
/// This mode decides what a line's stored `net_weight` *means*:
///
/// - `Scale`: every non-each line's weight is stored in pounds, as read
///   off the scale.
/// - `Price`: every non-each line's weight is stored in that line's own
///   pricing unit.
///
/// Flipping the mode triggers one eager reinterpretation pass over the
/// whole line collection (see `engine::apply_weight_mode_change`), never a
/// lazy per-read conversion — repeated toggling must not double-convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// Weights stored in pounds (scale reading)
    Scale,
    /// Weights stored in each line's pricing unit
    Price,
}

impl Default for WeightMode {
    fn default() -> Self {
        WeightMode::Scale
    }
}

impl WeightMode {
    /// Get the short code used in sheet JSON and CLI input
    pub fn code(&self) -> &'static str {
        match self {
            WeightMode::Scale => "scale",
            WeightMode::Price => "price",
        }
    }
}

impl fmt::Display for WeightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for WeightMode {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scale" => Ok(WeightMode::Scale),
            "price" => Ok(WeightMode::Price),
            _ => Err(TallyError::unknown_weight_mode(s)),
        }
    }
}
