//! # Tally Sheet
//!
//! The `TallySheet` struct is the root container for one editing session:
//! the line collection, the sheet-wide weight display mode, and metadata.
//! Sheets serialize to `.tly` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! TallySheet
//! ├── meta: SheetMetadata (version, reference, facility, timestamps)
//! ├── weight_mode: WeightMode (shared by every line)
//! └── lines: Vec<MaterialLine> (ordered as displayed)
//! ```
//!
//! ## Example
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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::MaterialCatalog;
use crate::engine::{self, FieldEdit, TallySummary};
use crate::line::MaterialLine;
use crate::units::WeightMode;

/// Current schema version for .tly files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root sheet container.
///
/// This is the top-level struct that gets serialized to `.tly` files.
/// Lines are kept in a `Vec` in display order — the editor is a table and
/// row order is part of what the operator sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallySheet {
    /// Sheet metadata (version, reference, facility, timestamps)
    pub meta: SheetMetadata,

    /// Weight display mode shared by every line on the sheet
    pub weight_mode: WeightMode,

    /// All material lines, in display order
    pub lines: Vec<MaterialLine>,
}

impl TallySheet {
    /// Create a new empty sheet.
    ///
    /// # Arguments
    ///
    /// * `reference` - The order/booking/load this sheet belongs to
    /// * `facility` - The yard or facility name
    pub fn new(reference: impl Into<String>, facility: impl Into<String>) -> Self {
        let now = Utc::now();
        TallySheet {
            meta: SheetMetadata {
                version: SCHEMA_VERSION.to_string(),
                reference: reference.into(),
                facility: facility.into(),
                created: now,
                modified: now,
            },
            weight_mode: WeightMode::default(),
            lines: Vec::new(),
        }
    }

    /// Add an empty line at the bottom of the sheet.
    ///
    /// Returns the id assigned to the line.
    pub fn add_line(&mut self) -> Uuid {
        let line = MaterialLine::new();
        let id = line.id;
        self.lines.push(line);
        self.touch();
        id
    }

    /// Remove a line by id.
    ///
    /// Returns the removed line if it existed. No soft-delete, no history.
    pub fn remove_line(&mut self, id: &Uuid) -> Option<MaterialLine> {
        let pos = self.lines.iter().position(|l| &l.id == id)?;
        let line = self.lines.remove(pos);
        self.touch();
        Some(line)
    }

    /// Get a line by id
    pub fn line(&self, id: &Uuid) -> Option<&MaterialLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Apply one field edit to the line with the given id.
    ///
    /// This is the sheet-level form of the engine's `(line, field, value)`
    /// event surface. Returns `false` when no line has that id (a stale
    /// event from the host is dropped, not an error).
    pub fn edit_line(&mut self, id: &Uuid, edit: FieldEdit, catalog: &MaterialCatalog) -> bool {
        let mode = self.weight_mode;
        let Some(line) = self.lines.iter_mut().find(|l| &l.id == id) else {
            return false;
        };
        engine::apply_field_edit(line, edit, catalog, mode);
        self.touch();
        true
    }

    /// Switch the sheet-wide weight display mode.
    ///
    /// A no-op when the mode is unchanged. Otherwise every line's stored
    /// weight is reinterpreted and every total re-derived before this
    /// returns — callers never observe a half-converted sheet.
    pub fn set_weight_mode(&mut self, new_mode: WeightMode) {
        if self.weight_mode == new_mode {
            return;
        }
        engine::apply_weight_mode_change(&mut self.lines, self.weight_mode, new_mode);
        self.weight_mode = new_mode;
        self.touch();
    }

    /// Sheet-wide totals (full reduction over the lines)
    pub fn summary(&self) -> TallySummary {
        engine::aggregate(&self.lines)
    }

    /// Number of lines on the sheet
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for TallySheet {
    fn default() -> Self {
        TallySheet::new("", "")
    }
}

/// Sheet metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Order/booking/load reference this sheet belongs to
    pub reference: String,

    /// Yard or facility name
    pub facility: String,

    /// When the sheet was created
    pub created: DateTime<Utc>,

    /// When the sheet was last modified
    pub modified: DateTime<Utc>,
}
