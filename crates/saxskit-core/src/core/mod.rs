//! # Core Module
//!
//! The data models and file codecs everything else in the library builds on.
//!
//! - **Record Models** ([`models`]) - PDB records, the ordered record table, and
//!   role-keyed SAXS curves
//! - **File I/O** ([`io`]) - Fixed-column PDB reading and writing, DAT/FIT/OUT
//!   curve tables, and autorg reports
//! - **Element Data** ([`elements`]) - Atomic and residue masses behind the
//!   [`elements::MassLookup`] collaborator interface
//! - **Utilities** ([`utils`]) - Best-effort field parsing and rotation geometry

pub mod elements;
pub mod io;
pub mod models;
pub mod utils;
