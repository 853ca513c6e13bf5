//! In-memory record models.
//!
//! A PDB file becomes a [`table::RecordTable`]: an ordered sequence of
//! [`record::Record`]s whose position is the source line index. Curve files
//! become a [`curve::Curve`]: equal-length numeric columns keyed by role.

pub mod atom;
pub mod curve;
pub mod field;
pub mod record;
pub mod table;
pub mod template;
