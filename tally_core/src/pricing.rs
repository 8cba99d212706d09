//! # Unit Pricing
//!
//! A line's unit price is either a fixed dollar amount or a formula string
//! referencing a market index (e.g. `"COMEX * 0.6 + 12"`). The two are
//! mutually exclusive, so the price is a tagged enum rather than a pair of
//! fields that could drift apart.
//!
//! Formulas are **opaque** to this engine. Market-index tokens such as
//! `COMEX` and `LME` are external inputs the hosting application must
//! resolve; until it does, a formula-priced line contributes `0` to totals.
//! That is a documented limitation, not an error.

use serde::{Deserialize, Serialize};

/// Default formula template applied when a line switches to formula pricing
pub const DEFAULT_FORMULA: &str = "COMEX * 0.6";

/// Market-index tokens recognized for display purposes
pub const MARKET_INDICES: [&str; 4] = ["COMEX", "LME", "AMM", "PLATTS"];

/// Per-unit price for a material line.
///
/// ## JSON Serialization
///
/// Prices serialize with a "type" discriminator:
///
/// ```json
/// { "type": "Fixed", "amount": 2.85 }
/// { "type": "Formula", "expression": "COMEX * 0.6" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UnitPrice {
    /// Fixed dollar amount per pricing unit
    Fixed { amount: f64 },
    /// Market-index formula, never evaluated by this engine
    Formula { expression: String },
}

impl UnitPrice {
    /// Create a fixed price
    pub fn fixed(amount: f64) -> Self {
        UnitPrice::Fixed { amount }
    }

    /// Create a formula price
    pub fn formula(expression: impl Into<String>) -> Self {
        UnitPrice::Formula {
            expression: expression.into(),
        }
    }

    /// Whether this is a formula price
    pub fn is_formula(&self) -> bool {
        matches!(self, UnitPrice::Formula { .. })
    }

    /// Resolve to the numeric price used for total computation.
    ///
    /// - Fixed: the amount, with negative or non-finite values treated as
    ///   `0` (a bad number in an editable field silently reads as $0.00,
    ///   never an error).
    /// - Formula: always `0` — index tokens are unresolved external inputs.
    pub fn numeric_value(&self) -> f64 {
        match self {
            UnitPrice::Fixed { amount } => {
                if amount.is_finite() && *amount > 0.0 {
                    *amount
                } else {
                    0.0
                }
            }
            UnitPrice::Formula { .. } => 0.0,
        }
    }

    /// The leading market-index token of a formula, for display only.
    ///
    /// Returns `None` for fixed prices or formulas that do not start with
    /// a known index.
    pub fn index_token(&self) -> Option<&'static str> {
        match self {
            UnitPrice::Fixed { .. } => None,
            UnitPrice::Formula { expression } => {
                let head = expression.trim();
                MARKET_INDICES
                    .iter()
                    .find(|idx| head.starts_with(**idx))
                    .copied()
            }
        }
    }
}

impl Default for UnitPrice {
    fn default() -> Self {
        UnitPrice::Fixed { amount: 0.0 }
    }
}

impl std::fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitPrice::Fixed { amount } => write!(f, "${amount:.2}"),
            UnitPrice::Formula { expression } => write!(f, "{expression}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_numeric_value() {
        assert_eq!(UnitPrice::fixed(2.85).numeric_value(), 2.85);
        assert_eq!(UnitPrice::fixed(0.0).numeric_value(), 0.0);
        assert_eq!(UnitPrice::fixed(-4.0).numeric_value(), 0.0);
        assert_eq!(UnitPrice::fixed(f64::NAN).numeric_value(), 0.0);
        assert_eq!(UnitPrice::fixed(f64::INFINITY).numeric_value(), 0.0);
    }

    #[test]
    fn test_formula_never_resolves() {
        // Formula pricing is unresolved until the host supplies market data
        let price = UnitPrice::formula("COMEX * 0.6 + 12");
        assert_eq!(price.numeric_value(), 0.0);
    }

    #[test]
    fn test_index_token() {
        assert_eq!(UnitPrice::formula("COMEX * 0.6").index_token(), Some("COMEX"));
        assert_eq!(UnitPrice::formula("  LME - 50").index_token(), Some("LME"));
        assert_eq!(UnitPrice::formula("0.6 * COMEX").index_token(), None);
        assert_eq!(UnitPrice::fixed(1.0).index_token(), None);
    }

    #[test]
    fn test_serialization() {
        let fixed = UnitPrice::fixed(2.85);
        let json = serde_json::to_string(&fixed).unwrap();
        assert!(json.contains("\"type\":\"Fixed\""));
        let roundtrip: UnitPrice = serde_json::from_str(&json).unwrap();
        assert_eq!(fixed, roundtrip);

        let formula = UnitPrice::formula(DEFAULT_FORMULA);
        let json = serde_json::to_string(&formula).unwrap();
        assert!(json.contains("\"type\":\"Formula\""));
        let roundtrip: UnitPrice = serde_json::from_str(&json).unwrap();
        assert_eq!(formula, roundtrip);
    }

    #[test]
    fn test_display() {
        assert_eq!(UnitPrice::fixed(2.5).to_string(), "$2.50");
        assert_eq!(UnitPrice::formula("COMEX * 0.6").to_string(), "COMEX * 0.6");
    }
}
