//! # Sheet Store
//!
//! Directory-backed persistence for tally sheets. The engine has no opinion
//! on storage beyond lossless round-tripping; this module is the file
//! realization the CLI and tests use: one directory per yard, one `.tly`
//! JSON file per sheet, addressed by the sheet's reference.
//!
//! Saves go through a sibling `.tmp` file, fsync, and rename, so an
//! interrupted process never leaves a torn sheet behind. Concurrent editing
//! is kept out by [`SheetStore::checkout`], which holds an advisory OS lock
//! on a sidecar guard file for the life of the session — the lock dies with
//! the process that held it, so there is no stale-lock bookkeeping.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tally_core::sheet::TallySheet;
//! use tally_core::store::SheetStore;
//!
//! let store = SheetStore::open("sheets")?;
//! store.save(&TallySheet::new("SO-1042", "Gate 3 Yard"))?;
//!
//! // exclusive editing session; a second checkout fails with SheetInUse
//! let mut session = store.checkout("SO-1042")?;
//! session.sheet_mut().touch();
//! session.commit()?;
//! # Ok::<(), tally_core::errors::TallyError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::errors::{TallyError, TallyResult};
use crate::sheet::{TallySheet, SCHEMA_VERSION};

/// File extension for stored sheets
pub const SHEET_EXTENSION: &str = "tly";

/// A directory of tally sheets, one `.tly` file per sheet.
///
/// Sheets are addressed by their reference (`meta.reference`); the store
/// derives a filesystem-safe file name from it, so references may contain
/// spaces or slashes.
#[derive(Debug, Clone)]
pub struct SheetStore {
    root: PathBuf,
}

impl SheetStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> TallyResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| TallyError::io(&root, e))?;
        Ok(SheetStore { root })
    }

    /// The store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a sheet with this reference is stored at
    pub fn path_for(&self, reference: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", file_stem_for(reference), SHEET_EXTENSION))
    }

    /// Save a sheet under its own reference, atomically.
    ///
    /// Returns the path written. An existing file for the same reference
    /// is replaced in one rename, never partially overwritten.
    pub fn save(&self, sheet: &TallySheet) -> TallyResult<PathBuf> {
        let path = self.path_for(&sheet.meta.reference);
        let json =
            serde_json::to_string_pretty(sheet).map_err(|e| TallyError::Serialization {
                detail: e.to_string(),
            })?;
        write_atomic(&path, json.as_bytes())?;
        Ok(path)
    }

    /// Load a sheet by reference.
    ///
    /// # Returns
    ///
    /// * `Err(TallyError::Io)` - No such sheet, or the read failed
    /// * `Err(TallyError::MalformedSheet)` - The file is not a sheet
    /// * `Err(TallyError::VersionMismatch)` - Written by an incompatible schema
    pub fn load(&self, reference: &str) -> TallyResult<TallySheet> {
        read_sheet(&self.path_for(reference))
    }

    /// References of every sheet in the store, sorted.
    ///
    /// Read out of each file's header rather than guessed back from the
    /// slugged file names.
    pub fn references(&self) -> TallyResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| TallyError::io(&self.root, e))?;
        let mut refs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TallyError::io(&self.root, e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == SHEET_EXTENSION) {
                refs.push(read_sheet(&path)?.meta.reference);
            }
        }
        refs.sort();
        Ok(refs)
    }

    /// Open a sheet for exclusive editing.
    ///
    /// Takes an advisory OS lock on the sheet's guard file; while the
    /// returned session is alive, any other checkout of the same sheet —
    /// from this process or another — fails with
    /// [`TallyError::SheetInUse`]. Readers ([`SheetStore::load`]) are not
    /// blocked; atomic saves mean they always see a complete sheet.
    pub fn checkout(&self, reference: &str) -> TallyResult<CheckedOutSheet> {
        let path = self.path_for(reference);
        let guard_path = path.with_extension(format!("{SHEET_EXTENSION}.guard"));

        let guard = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&guard_path)
            .map_err(|e| TallyError::io(&guard_path, e))?;
        guard
            .try_lock_exclusive()
            .map_err(|_| TallyError::sheet_in_use(reference))?;

        let sheet = match read_sheet(&path) {
            Ok(sheet) => sheet,
            Err(e) => {
                // release before reporting; an empty guard file never blocks
                drop(guard);
                let _ = fs::remove_file(&guard_path);
                return Err(e);
            }
        };

        Ok(CheckedOutSheet {
            sheet,
            path,
            guard_path,
            _guard: guard,
        })
    }
}

/// An exclusive editing session on one stored sheet.
///
/// Holds the advisory lock for its lifetime. [`commit`](Self::commit)
/// writes the edited sheet back atomically; dropping without committing
/// discards the edits and releases the lock either way.
#[derive(Debug)]
pub struct CheckedOutSheet {
    sheet: TallySheet,
    path: PathBuf,
    guard_path: PathBuf,
    _guard: File,
}

impl CheckedOutSheet {
    /// The sheet under edit
    pub fn sheet(&self) -> &TallySheet {
        &self.sheet
    }

    /// Mutable access to the sheet under edit
    pub fn sheet_mut(&mut self) -> &mut TallySheet {
        &mut self.sheet
    }

    /// The path the sheet was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the edited sheet back atomically and end the session
    pub fn commit(self) -> TallyResult<()> {
        let json = serde_json::to_string_pretty(&self.sheet).map_err(|e| {
            TallyError::Serialization {
                detail: e.to_string(),
            }
        })?;
        write_atomic(&self.path, json.as_bytes())
        // drop releases the lock and removes the guard file
    }
}

impl Drop for CheckedOutSheet {
    fn drop(&mut self) {
        // OS lock is released when _guard closes
        let _ = fs::remove_file(&self.guard_path);
    }
}

/// Filesystem-safe stem derived from a sheet reference.
///
/// Lowercases and collapses every run of non-alphanumeric characters to a
/// single dash, so "SO 1042/B" stores as `so-1042-b.tly`.
fn file_stem_for(reference: &str) -> String {
    let mut stem = String::with_capacity(reference.len());
    let mut gap = false;
    for ch in reference.chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !stem.is_empty() {
                stem.push('-');
            }
            gap = false;
            stem.push(ch.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    if stem.is_empty() {
        stem.push_str("sheet");
    }
    stem
}

/// Write file contents via a sibling temp file and a rename, so a crash
/// mid-write cannot tear a sheet that was already on disk.
fn write_atomic(path: &Path, contents: &[u8]) -> TallyResult<()> {
    let tmp = path.with_extension(format!("{SHEET_EXTENSION}.tmp"));
    let written = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    written.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        TallyError::io(path, e)
    })
}

/// Read and version-gate one sheet file
fn read_sheet(path: &Path) -> TallyResult<TallySheet> {
    let contents = fs::read_to_string(path).map_err(|e| TallyError::io(path, e))?;
    let sheet: TallySheet =
        serde_json::from_str(&contents).map_err(|e| TallyError::malformed_sheet(path, e))?;

    match schema_rev(&sheet.meta.version) {
        Some(rev) if readable(rev) => Ok(sheet),
        _ => Err(TallyError::VersionMismatch {
            found: sheet.meta.version.clone(),
            supported: SCHEMA_VERSION.to_string(),
        }),
    }
}

/// Parse the major.minor pair out of a schema version string
fn schema_rev(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Whether a sheet written at `rev` is readable by this build.
///
/// Major revisions are incompatible across the board; while the schema is
/// still 0.x each minor bump may break too, so files from a newer minor
/// are refused (older minors of the same major are fine).
fn readable((major, minor): (u32, u32)) -> bool {
    match schema_rev(SCHEMA_VERSION) {
        Some((cur_major, cur_minor)) => {
            major == cur_major && (cur_major > 0 || minor <= cur_minor)
        }
        None => false,
    }
}
