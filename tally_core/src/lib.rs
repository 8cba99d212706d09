//! # tally_core - Scrap Material Tally Engine
//!
//! `tally_core` is the computational heart of Tally: weight unit conversion,
//! per-line price derivation, and sheet-wide totals for scrap/recycling
//! material tallies. All inputs and outputs are JSON-serializable so the
//! hosting application can persist sheets wherever it likes.
//!
//! ## Design Philosophy
//!
//! - **Synchronous**: every edit re-derives the affected line before returning
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Never crash the form**: malformed business input degrades to
//!   zero/unchanged; errors are reserved for programmer and I/O faults
//! - **Opaque formulas**: market-index pricing strings are carried, never
//!   evaluated
//!
//! ## Quick Start
//!
//! ```rust
//! use tally_core::catalog::MaterialCatalog;
//! use tally_core::engine::FieldEdit;
//! use tally_core::sheet::TallySheet;
//!
//! let catalog = MaterialCatalog::builtin();
//! let mut sheet = TallySheet::new("SO-1042", "Gate 3 Yard");
//!
//! let id = sheet.add_line();
//! sheet.edit_line(&id, FieldEdit::Material("Copper #1".into()), &catalog);
//! sheet.edit_line(&id, FieldEdit::NetWeight(250.0), &catalog);
//! sheet.edit_line(&id, FieldEdit::FixedPrice(2.85), &catalog);
//!
//! assert_eq!(sheet.summary().total_estimated_value, 712.5);
//! ```
//!
//! ## Modules
//!
//! - [`units`] - The five weight units and the pound-canonical converter
//! - [`pricing`] - Fixed vs. formula unit prices
//! - [`catalog`] - Material reference definitions
//! - [`line`] - The editable material line entity
//! - [`engine`] - Per-line derivation and aggregation
//! - [`sheet`] - Sheet container and weight-mode handling
//! - [`store`] - Directory-backed sheet persistence with atomic saves
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod engine;
pub mod errors;
pub mod line;
pub mod pricing;
pub mod sheet;
pub mod store;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use catalog::{MaterialCatalog, MaterialDefinition};
pub use engine::{FieldEdit, TallySummary};
pub use errors::{TallyError, TallyResult};
pub use line::MaterialLine;
pub use pricing::UnitPrice;
pub use sheet::{SheetMetadata, TallySheet};
pub use store::{CheckedOutSheet, SheetStore};
pub use units::{convert, Unit, WeightMode};
