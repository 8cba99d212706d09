//! # Material Line Engine
//!
//! Per-line derivation and sheet-wide aggregation. Every user edit flows
//! through one of the `apply_*` operations here, which reconcile the
//! countable/pricing-unit invariant and re-derive the line's estimated
//! total synchronously.
//!
//! All operations are total functions over well-formed input: malformed
//! business input (unknown material, non-numeric price) degrades to
//! "leave field as-is / total reads as zero" rather than failing, because
//! this is UI-facing editable state that must never crash the form.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::catalog::MaterialCatalog;
//! use tally_core::engine::{self, FieldEdit};
//! use tally_core::line::MaterialLine;
//! use tally_core::units::{Unit, WeightMode};
//!
//! let catalog = MaterialCatalog::builtin();
//! let mode = WeightMode::Scale;
//!
//! let mut line = MaterialLine::new();
//! engine::apply_field_edit(&mut line, FieldEdit::Material("Shred Steel".into()), &catalog, mode);
//! engine::apply_field_edit(&mut line, FieldEdit::PricingUnit(Unit::NetTon), &catalog, mode);
//! engine::apply_field_edit(&mut line, FieldEdit::NetWeight(2000.0), &catalog, mode);
//! engine::apply_field_edit(&mut line, FieldEdit::FixedPrice(10.0), &catalog, mode);
//!
//! // 2000 lb on the scale is 1 NT at $10/NT
//! assert_eq!(line.estimated_total, 10.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::MaterialCatalog;
use crate::line::MaterialLine;
use crate::pricing::{UnitPrice, DEFAULT_FORMULA};
use crate::units::{convert, Unit, WeightMode};

/// Round a dollar amount to 2 decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute a line's estimated total without mutating it.
///
/// - `0` when the weight or the resolved numeric price is absent/zero.
/// - Countable lines: `count × price`, no unit conversion.
/// - Mass lines: the weight is taken to the line's pricing unit (a
///   conversion from pounds in `Scale` mode; already there in `Price`
///   mode) and multiplied by the price.
///
/// Formula-priced lines resolve to a `0` price (see
/// [`UnitPrice::numeric_value`]), so their total is not authoritative
/// until the host resolves market data.
pub fn compute_estimated_total(line: &MaterialLine, mode: WeightMode) -> f64 {
    let weight = line.net_weight;
    if !weight.is_finite() || weight <= 0.0 {
        return 0.0;
    }
    let price = line.unit_price.numeric_value();
    if price == 0.0 {
        return 0.0;
    }

    if line.is_each_material {
        return round2(weight * price);
    }

    let weight_in_pricing_unit = match mode {
        WeightMode::Scale => convert(weight, Unit::Pound, line.pricing_unit),
        WeightMode::Price => weight,
    };
    round2(weight_in_pricing_unit * price)
}

/// Re-derive a line's stored `estimated_total`
pub fn recompute_total(line: &mut MaterialLine, mode: WeightMode) {
    line.estimated_total = compute_estimated_total(line, mode);
}

/// Apply a material selection to a line.
///
/// A countable match pins the line to `Each` pricing. Switching away from
/// a material-derived countable releases the pin back to `Pound`. A name
/// the catalog does not know (including a cleared selection) applies no
/// constraint — the pricing unit and countable flag are left untouched.
pub fn apply_material_selection(
    line: &mut MaterialLine,
    material_name: impl Into<String>,
    catalog: &MaterialCatalog,
    mode: WeightMode,
) {
    line.material_name = material_name.into();

    if let Some(def) = catalog.get(&line.material_name) {
        if def.is_countable {
            line.is_each_material = true;
            line.pricing_unit = Unit::Each;
        } else if line.is_each_material {
            // Leaving a countable material: release the intrinsic pin.
            // A user-chosen Each on a non-countable line is not
            // material-derived and is left alone.
            line.is_each_material = false;
            line.pricing_unit = Unit::Pound;
        }
    }

    recompute_total(line, mode);
}

/// Apply a pricing-unit change to a line.
///
/// Ignored while the resolved material is countable — the unit stays
/// `Each` regardless of what was requested. The lock is material-derived
/// only: a user-chosen `Each` on a non-countable material remains freely
/// reversible.
pub fn apply_pricing_unit_change(
    line: &mut MaterialLine,
    new_unit: Unit,
    catalog: &MaterialCatalog,
    mode: WeightMode,
) {
    let countable = catalog
        .get(&line.material_name)
        .map(|def| def.is_countable)
        .unwrap_or(line.is_each_material);

    if !countable {
        line.pricing_unit = new_unit;
    }

    recompute_total(line, mode);
}

/// Toggle a line between fixed and formula pricing.
///
/// Enabling formula mode installs the default template; disabling it
/// resets to a fixed price of zero. Either way the previous price is
/// discarded and the total reads `0` until the operator fills it in.
pub fn apply_formula_mode_toggle(line: &mut MaterialLine, enabled: bool, mode: WeightMode) {
    line.unit_price = if enabled {
        UnitPrice::formula(DEFAULT_FORMULA)
    } else {
        UnitPrice::fixed(0.0)
    };
    recompute_total(line, mode);
}

/// Reinterpret every line's stored weight for a new weight mode.
///
/// `Scale → Price` converts each non-countable line's pounds into that
/// line's pricing unit; `Price → Scale` converts back to pounds.
/// Countable lines hold unit-less counts and are never touched.
///
/// The pass is eager and covers the whole collection before any line's
/// derived fields are consistent again — exactly once per flip, so
/// repeated toggling cannot double-convert. Totals are re-derived for
/// every line afterwards.
pub fn apply_weight_mode_change(lines: &mut [MaterialLine], from: WeightMode, to: WeightMode) {
    if from == to {
        return;
    }

    for line in lines.iter_mut() {
        if line.is_each_material {
            continue;
        }
        line.net_weight = match to {
            WeightMode::Price => convert(line.net_weight, Unit::Pound, line.pricing_unit),
            WeightMode::Scale => convert(line.net_weight, line.pricing_unit, Unit::Pound),
        };
    }

    for line in lines.iter_mut() {
        recompute_total(line, to);
    }
}

/// A discrete user edit to one line field.
///
/// This is the engine's event surface: the hosting UI delivers each form
/// interaction as one of these and the engine takes care of invariant
/// reconciliation and re-derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value")]
pub enum FieldEdit {
    /// Select (or clear) the line's material
    Material(String),
    /// Set the net weight / count
    NetWeight(f64),
    /// Set a fixed dollar price (switches the line to fixed pricing)
    FixedPrice(f64),
    /// Set the formula text (switches the line to formula pricing)
    FormulaText(String),
    /// Request a pricing unit
    PricingUnit(Unit),
    /// Toggle formula pricing on or off
    FormulaMode(bool),
}

/// Apply one field edit to a line.
///
/// Total over all inputs: a non-finite weight is stored as zero, and
/// price edits replace the tagged price wholesale so a line can never
/// hold a fixed amount and a formula at once.
pub fn apply_field_edit(
    line: &mut MaterialLine,
    edit: FieldEdit,
    catalog: &MaterialCatalog,
    mode: WeightMode,
) {
    match edit {
        FieldEdit::Material(name) => {
            apply_material_selection(line, name, catalog, mode);
        }
        FieldEdit::NetWeight(weight) => {
            line.net_weight = if weight.is_finite() { weight } else { 0.0 };
            recompute_total(line, mode);
        }
        FieldEdit::FixedPrice(amount) => {
            line.unit_price = UnitPrice::fixed(amount);
            recompute_total(line, mode);
        }
        FieldEdit::FormulaText(expression) => {
            line.unit_price = UnitPrice::formula(expression);
            recompute_total(line, mode);
        }
        FieldEdit::PricingUnit(unit) => {
            apply_pricing_unit_change(line, unit, catalog, mode);
        }
        FieldEdit::FormulaMode(enabled) => {
            apply_formula_mode_toggle(line, enabled, mode);
        }
    }
}

/// Sheet-wide totals, produced by [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TallySummary {
    /// Sum of non-countable line weights.
    ///
    /// Pound-denominated when the sheet is in `Scale` mode; the caller
    /// must ensure a consistent mode before aggregating (the sheet
    /// container does).
    pub total_weight_lb: f64,

    /// Sum of countable line counts
    pub total_each_count: f64,

    /// Sum of line estimated totals (each already rounded per line;
    /// no additional rounding here)
    pub total_estimated_value: f64,
}

/// Full reduction over a line collection.
///
/// Recomputed on every call rather than incrementally maintained —
/// sheets hold tens of lines, not thousands.
pub fn aggregate(lines: &[MaterialLine]) -> TallySummary {
    let mut summary = TallySummary::default();
    for line in lines {
        if line.is_each_material {
            summary.total_each_count += line.net_weight;
        } else {
            summary.total_weight_lb += line.net_weight;
        }
        summary.total_estimated_value += line.estimated_total;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MaterialDefinition;

    const REL_TOL: f64 = 1e-6;

    fn catalog() -> MaterialCatalog {
        MaterialCatalog::builtin()
    }

    fn assert_close(actual: f64, expected: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() / scale < REL_TOL,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_net_ton_pricing_from_scale_weight() {
        // 2000 lb on the scale, priced $10 per net ton -> exactly $10.00
        let mut line = MaterialLine::new();
        line.net_weight = 2000.0;
        line.pricing_unit = Unit::NetTon;
        line.unit_price = UnitPrice::fixed(10.0);

        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 10.0);
    }

    #[test]
    fn test_price_mode_uses_weight_as_is() {
        // In Price mode the stored weight is already in the pricing unit
        let mut line = MaterialLine::new();
        line.net_weight = 1.5;
        line.pricing_unit = Unit::NetTon;
        line.unit_price = UnitPrice::fixed(10.0);

        assert_eq!(compute_estimated_total(&line, WeightMode::Price), 15.0);
    }

    #[test]
    fn test_total_is_zero_when_inputs_absent() {
        let mut line = MaterialLine::new();
        line.pricing_unit = Unit::Pound;

        // no weight, no price
        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 0.0);

        // weight but no price
        line.net_weight = 500.0;
        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 0.0);

        // price but no weight
        line.net_weight = 0.0;
        line.unit_price = UnitPrice::fixed(2.85);
        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 0.0);
        assert_eq!(compute_estimated_total(&line, WeightMode::Price), 0.0);

        // degenerate weight degrades to zero, never panics
        line.net_weight = f64::NAN;
        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 0.0);
    }

    #[test]
    fn test_negative_weight_reads_as_zero() {
        // a backed-out digit or scale glitch can leave a negative entry;
        // the line reads as $0.00 rather than subtracting from the sheet
        let mut line = MaterialLine::new();
        line.material_name = "Copper #1".to_string();
        line.net_weight = -250.0;
        line.pricing_unit = Unit::Pound;
        line.unit_price = UnitPrice::fixed(2.85);

        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 0.0);
        assert_eq!(compute_estimated_total(&line, WeightMode::Price), 0.0);

        // same clamp for counted lines
        line.is_each_material = true;
        line.pricing_unit = Unit::Each;
        line.net_weight = -4.0;
        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 0.0);
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let mut line = MaterialLine::new();
        line.net_weight = 3.0;
        line.pricing_unit = Unit::Pound;
        line.unit_price = UnitPrice::fixed(0.333);

        // 3 * 0.333 = 0.999 -> $1.00
        assert_eq!(compute_estimated_total(&line, WeightMode::Scale), 1.0);
    }

    #[test]
    fn test_countable_material_locks_pricing_unit() {
        let catalog = catalog();
        let mut line = MaterialLine::new();

        apply_material_selection(&mut line, "Car Battery", &catalog, WeightMode::Scale);
        assert!(line.is_each_material);
        assert_eq!(line.pricing_unit, Unit::Each);

        // any requested unit is ignored while the material is countable
        for unit in Unit::ALL {
            apply_pricing_unit_change(&mut line, unit, &catalog, WeightMode::Scale);
            assert_eq!(line.pricing_unit, Unit::Each);
        }
    }

    #[test]
    fn test_countable_scenario_total() {
        // 5 batteries at $3 each -> $15.00, and pound-change is rejected
        let catalog = catalog();
        let mut line = MaterialLine::new();

        apply_material_selection(&mut line, "Car Battery", &catalog, WeightMode::Scale);
        apply_field_edit(
            &mut line,
            FieldEdit::NetWeight(5.0),
            &catalog,
            WeightMode::Scale,
        );
        apply_field_edit(
            &mut line,
            FieldEdit::FixedPrice(3.0),
            &catalog,
            WeightMode::Scale,
        );
        assert_eq!(line.estimated_total, 15.0);

        apply_pricing_unit_change(&mut line, Unit::Pound, &catalog, WeightMode::Scale);
        assert_eq!(line.pricing_unit, Unit::Each);
        assert_eq!(line.estimated_total, 15.0);
    }

    #[test]
    fn test_switching_away_from_countable_releases_pin() {
        let catalog = catalog();
        let mut line = MaterialLine::new();

        apply_material_selection(&mut line, "Catalytic Converter", &catalog, WeightMode::Scale);
        assert!(line.is_each_material);

        apply_material_selection(&mut line, "Copper #1", &catalog, WeightMode::Scale);
        assert!(!line.is_each_material);
        assert_eq!(line.pricing_unit, Unit::Pound);
    }

    #[test]
    fn test_user_chosen_each_stays_reversible() {
        // The two source variants disagreed here; the material-intrinsic
        // lock is the stricter interpretation: a hand-picked Each on a
        // weighed material is not a lock at all.
        let catalog = catalog();
        let mut line = MaterialLine::new();

        apply_material_selection(&mut line, "Copper #1", &catalog, WeightMode::Scale);
        apply_pricing_unit_change(&mut line, Unit::Each, &catalog, WeightMode::Scale);
        assert_eq!(line.pricing_unit, Unit::Each);
        assert!(!line.is_each_material);

        // freely reversible
        apply_pricing_unit_change(&mut line, Unit::Kilogram, &catalog, WeightMode::Scale);
        assert_eq!(line.pricing_unit, Unit::Kilogram);
    }

    #[test]
    fn test_unknown_material_applies_no_constraint() {
        let catalog = catalog();
        let mut line = MaterialLine::new();
        line.pricing_unit = Unit::MetricTon;

        apply_material_selection(&mut line, "Unobtainium", &catalog, WeightMode::Scale);
        assert_eq!(line.material_name, "Unobtainium");
        assert_eq!(line.pricing_unit, Unit::MetricTon);
        assert!(!line.is_each_material);

        // clearing the selection keeps the pricing unit too
        apply_material_selection(&mut line, "", &catalog, WeightMode::Scale);
        assert_eq!(line.pricing_unit, Unit::MetricTon);
    }

    #[test]
    fn test_formula_mode_toggle_resets_price() {
        let mut line = MaterialLine::new();
        line.net_weight = 100.0;
        line.unit_price = UnitPrice::fixed(2.85);
        recompute_total(&mut line, WeightMode::Scale);
        assert!(line.estimated_total > 0.0);

        apply_formula_mode_toggle(&mut line, true, WeightMode::Scale);
        assert!(line.is_formula_mode());
        assert_eq!(line.unit_price, UnitPrice::formula(DEFAULT_FORMULA));
        // formula prices are unresolved, total immediately reads zero
        assert_eq!(line.estimated_total, 0.0);

        apply_formula_mode_toggle(&mut line, false, WeightMode::Scale);
        assert!(!line.is_formula_mode());
        assert_eq!(line.unit_price, UnitPrice::fixed(0.0));
        assert_eq!(line.estimated_total, 0.0);
    }

    #[test]
    fn test_weight_mode_round_trip_preserves_pounds() {
        let catalog = catalog();
        let mut lines = Vec::new();

        let mut copper = MaterialLine::new();
        apply_material_selection(&mut copper, "Copper #1", &catalog, WeightMode::Scale);
        copper.net_weight = 250.0;
        copper.unit_price = UnitPrice::fixed(2.85);
        recompute_total(&mut copper, WeightMode::Scale);
        lines.push(copper);

        let mut shred = MaterialLine::new();
        apply_material_selection(&mut shred, "Shred Steel", &catalog, WeightMode::Scale);
        apply_pricing_unit_change(&mut shred, Unit::NetTon, &catalog, WeightMode::Scale);
        shred.net_weight = 4500.0;
        shred.unit_price = UnitPrice::fixed(180.0);
        recompute_total(&mut shred, WeightMode::Scale);
        lines.push(shred);

        let mut batteries = MaterialLine::new();
        apply_material_selection(&mut batteries, "Car Battery", &catalog, WeightMode::Scale);
        batteries.net_weight = 12.0;
        batteries.unit_price = UnitPrice::fixed(3.0);
        recompute_total(&mut batteries, WeightMode::Scale);
        lines.push(batteries);

        let original: Vec<f64> = lines.iter().map(|l| l.net_weight).collect();

        apply_weight_mode_change(&mut lines, WeightMode::Scale, WeightMode::Price);
        // shred now reads in net tons, copper unchanged (priced per pound),
        // batteries untouched (unit-less count)
        assert_close(lines[1].net_weight, 2.25);
        assert_eq!(lines[0].net_weight, 250.0);
        assert_eq!(lines[2].net_weight, 12.0);

        apply_weight_mode_change(&mut lines, WeightMode::Price, WeightMode::Scale);
        for (line, want) in lines.iter().zip(&original) {
            assert_close(line.net_weight, *want);
        }
    }

    #[test]
    fn test_weight_mode_flip_keeps_totals_stable() {
        // The dollar value of a line must not depend on the display mode
        let catalog = catalog();
        let mut line = MaterialLine::new();
        apply_material_selection(&mut line, "Shred Steel", &catalog, WeightMode::Scale);
        apply_pricing_unit_change(&mut line, Unit::NetTon, &catalog, WeightMode::Scale);
        line.net_weight = 2000.0;
        line.unit_price = UnitPrice::fixed(10.0);
        recompute_total(&mut line, WeightMode::Scale);
        assert_eq!(line.estimated_total, 10.0);

        let mut lines = vec![line];
        apply_weight_mode_change(&mut lines, WeightMode::Scale, WeightMode::Price);
        assert_eq!(lines[0].estimated_total, 10.0);
    }

    #[test]
    fn test_same_mode_change_is_noop() {
        let mut lines = vec![MaterialLine::new()];
        lines[0].net_weight = 123.0;
        apply_weight_mode_change(&mut lines, WeightMode::Scale, WeightMode::Scale);
        assert_eq!(lines[0].net_weight, 123.0);
    }

    #[test]
    fn test_aggregate() {
        let catalog = catalog();
        let mode = WeightMode::Scale;

        let mut copper = MaterialLine::new();
        apply_material_selection(&mut copper, "Copper #1", &catalog, mode);
        apply_field_edit(&mut copper, FieldEdit::NetWeight(250.0), &catalog, mode);
        apply_field_edit(&mut copper, FieldEdit::FixedPrice(2.85), &catalog, mode);

        let mut batteries = MaterialLine::new();
        apply_material_selection(&mut batteries, "Car Battery", &catalog, mode);
        apply_field_edit(&mut batteries, FieldEdit::NetWeight(4.0), &catalog, mode);
        apply_field_edit(&mut batteries, FieldEdit::FixedPrice(3.0), &catalog, mode);

        let mut pending = MaterialLine::new();
        apply_material_selection(&mut pending, "Insulated Wire", &catalog, mode);
        apply_field_edit(&mut pending, FieldEdit::NetWeight(100.0), &catalog, mode);
        apply_field_edit(&mut pending, FieldEdit::FormulaMode(true), &catalog, mode);

        let lines = vec![copper, batteries, pending];
        let summary = aggregate(&lines);

        assert_eq!(summary.total_weight_lb, 350.0);
        assert_eq!(summary.total_each_count, 4.0);
        // 712.50 + 12.00 + 0 (formula unresolved)
        assert_eq!(summary.total_estimated_value, 724.5);
    }

    #[test]
    fn test_field_edit_events_cover_the_form() {
        let catalog = catalog();
        let mode = WeightMode::Scale;
        let mut line = MaterialLine::new();

        apply_field_edit(
            &mut line,
            FieldEdit::Material("Copper #2".into()),
            &catalog,
            mode,
        );
        apply_field_edit(&mut line, FieldEdit::NetWeight(80.0), &catalog, mode);
        apply_field_edit(&mut line, FieldEdit::FixedPrice(2.5), &catalog, mode);
        assert_eq!(line.estimated_total, 200.0);

        // switching to an explicit formula text clears the fixed price
        apply_field_edit(
            &mut line,
            FieldEdit::FormulaText("COMEX * 0.55".into()),
            &catalog,
            mode,
        );
        assert!(line.is_formula_mode());
        assert_eq!(line.estimated_total, 0.0);

        // a non-finite weight edit is stored as zero
        apply_field_edit(&mut line, FieldEdit::NetWeight(f64::INFINITY), &catalog, mode);
        assert_eq!(line.net_weight, 0.0);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = MaterialCatalog::from_definitions([
            MaterialDefinition::by_weight("Zorba", Unit::MetricTon),
            MaterialDefinition::by_count("Transmission Core"),
        ]);

        let mut line = MaterialLine::new();
        apply_material_selection(&mut line, "Transmission Core", &catalog, WeightMode::Scale);
        assert!(line.is_each_material);
        assert_eq!(line.pricing_unit, Unit::Each);
    }
}
