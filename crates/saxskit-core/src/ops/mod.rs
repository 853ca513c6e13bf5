//! Operations on a parsed [`RecordTable`](crate::core::models::table::RecordTable).
//!
//! Transforms mutate the table in place and touch only the coordinates (or
//! chain identifiers) of ATOM/HETATM records. Mass and sequence calculations
//! read the table without modifying it.

pub mod mass;
pub mod residues;
pub mod transform;
