//! # Tally CLI Application
//!
//! Terminal front end for the tally engine: enter material lines at the
//! prompt, watch derived totals, flip the weight display mode, and
//! optionally save the sheet into a store directory given as the first
//! argument.
//!
//! This plays the "hosting application" role: it feeds field edits into
//! `tally_core` and renders whatever comes back.

use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tally_core::catalog::MaterialCatalog;
use tally_core::engine::FieldEdit;
use tally_core::sheet::TallySheet;
use tally_core::store::SheetStore;
use tally_core::units::{Unit, WeightMode};

fn prompt_string(prompt: &str) -> String {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return String::new();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_string()
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    let input = prompt_string(prompt);
    input.parse().unwrap_or(default)
}

fn main() {
    println!("Tally CLI - Scrap Material Tally");
    println!("================================");
    println!();

    let catalog = MaterialCatalog::builtin();
    let mut sheet = TallySheet::new("CLI-Demo", "Demo Yard");

    println!("Known materials:");
    for name in catalog.names() {
        let def = catalog.get(name).unwrap();
        let tag = if def.is_countable {
            "each".to_string()
        } else {
            format!("per {}", def.native_unit.abbreviation())
        };
        println!("  {:<24} ({})", name, tag);
    }
    println!();
    println!("Enter lines; blank material name finishes the sheet.");
    println!();

    loop {
        let material = prompt_string("Material: ");
        if material.is_empty() {
            break;
        }

        let id = sheet.add_line();
        sheet.edit_line(&id, FieldEdit::Material(material.clone()), &catalog);

        let countable = sheet.line(&id).map(|l| l.is_each_material).unwrap_or(false);
        if countable {
            let count = prompt_f64("Count [0]: ", 0.0);
            sheet.edit_line(&id, FieldEdit::NetWeight(count), &catalog);
            let price = prompt_f64("Price per each ($) [0]: ", 0.0);
            sheet.edit_line(&id, FieldEdit::FixedPrice(price), &catalog);
        } else {
            let weight = prompt_f64("Scale weight (lb) [0]: ", 0.0);
            sheet.edit_line(&id, FieldEdit::NetWeight(weight), &catalog);

            let unit_input = prompt_string("Pricing unit (lb/NT/kg/MT/ea) [lb]: ");
            if !unit_input.is_empty() {
                match Unit::from_str(&unit_input) {
                    Ok(unit) => {
                        sheet.edit_line(&id, FieldEdit::PricingUnit(unit), &catalog);
                    }
                    Err(e) => {
                        eprintln!("  {} - keeping pounds", e);
                    }
                }
            }

            let price_input = prompt_string("Unit price ($ or formula, e.g. COMEX * 0.6) [0]: ");
            match price_input.parse::<f64>() {
                Ok(amount) => {
                    sheet.edit_line(&id, FieldEdit::FixedPrice(amount), &catalog);
                }
                Err(_) if !price_input.is_empty() => {
                    sheet.edit_line(&id, FieldEdit::FormulaText(price_input), &catalog);
                }
                Err(_) => {}
            }
        }

        let line = sheet.line(&id).unwrap();
        println!(
            "  -> {} @ {} = ${:.2}",
            line.material_name, line.unit_price, line.estimated_total
        );
        println!();
    }

    if sheet.line_count() == 0 {
        println!("Nothing tallied.");
        return;
    }

    print_sheet(&sheet);

    let mode_input = prompt_string("Show weights in pricing units? (y/N): ");
    if mode_input.eq_ignore_ascii_case("y") {
        sheet.set_weight_mode(WeightMode::Price);
        print_sheet(&sheet);
        sheet.set_weight_mode(WeightMode::Scale);
    }

    println!();
    println!("JSON Output (for host integration):");
    if let Ok(json) = serde_json::to_string_pretty(&sheet) {
        println!("{}", json);
    }

    if let Some(dir) = env::args().nth(1) {
        match SheetStore::open(&dir).and_then(|store| store.save(&sheet)) {
            Ok(path) => println!("Sheet saved to {}", path.display()),
            Err(e) => {
                eprintln!("Error saving sheet: {}", e);
                if let Ok(json) = serde_json::to_string_pretty(&e) {
                    eprintln!("{}", json);
                }
            }
        }
    }
}

fn print_sheet(sheet: &TallySheet) {
    println!();
    println!("═══════════════════════════════════════════════════════════");
    println!("  TALLY ({} mode)", sheet.weight_mode);
    println!("═══════════════════════════════════════════════════════════");
    for line in &sheet.lines {
        let unit = if line.is_each_material {
            "ea".to_string()
        } else {
            match sheet.weight_mode {
                WeightMode::Scale => "lb".to_string(),
                WeightMode::Price => line.pricing_unit.abbreviation().to_string(),
            }
        };
        println!(
            "  {:<24} {:>12.2} {:<3} @ {:<14} = {:>10.2}",
            line.material_name,
            line.net_weight,
            unit,
            line.unit_price.to_string(),
            line.estimated_total
        );
    }
    let summary = sheet.summary();
    println!("───────────────────────────────────────────────────────────");
    if sheet.weight_mode == WeightMode::Scale {
        // the pound total only means pounds while the sheet is in scale mode
        println!("  Total weight:   {:>12.2} lb", summary.total_weight_lb);
    }
    println!("  Total count:    {:>12.0} ea", summary.total_each_count);
    println!("  Estimated value: ${:>11.2}", summary.total_estimated_value);
    println!("═══════════════════════════════════════════════════════════");
}
