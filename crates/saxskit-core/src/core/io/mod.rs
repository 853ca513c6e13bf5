//! Provides input/output functionality for the flat-text formats.
//!
//! The PDB codec maps fixed-column coordinate files to a
//! [`RecordTable`](crate::core::models::table::RecordTable); the curve codecs
//! map whitespace-delimited DAT, FIT, OUT and Crysol INT tables to a
//! [`Curve`](crate::core::models::curve::Curve). All of them share the
//! [`traits::RecordFile`] interface, which owns the path and extension checks.
//! [`gnom`] assembles GNOM-style output from separate P(R) and fit tables.

pub mod autorg;
pub mod curve;
pub mod gnom;
pub mod pdb;
pub mod traits;
