//! # saxskit Core Library
//!
//! A record engine for the flat-text formats that surround small-angle X-ray
//! scattering (SAXS) structural biology: PDB coordinate files and the DAT, FIT
//! and OUT curve tables written by SAXS analysis programs.
//!
//! ## Architectural Philosophy
//!
//! The library is split into three layers:
//!
//! - **[`core`]: The Foundation.** Record models (`RecordTable`, `Curve`), the
//!   fixed-column PDB codec, the whitespace-delimited curve codecs, and the
//!   element-mass collaborator.
//!
//! - **[`ops`]: Structure Operations.** In-place geometric transforms on a
//!   `RecordTable` (translate, rotate, scale, centre) and the mass and
//!   sequence calculations that read it.
//!
//! - **[`workflows`]: Curve Processing.** Configured, validated procedures
//!   over parsed curves: averaging with outlier rejection, buffer
//!   subtraction, combination, logarithmic binning and Guinier analysis.
//!
//! The library never installs a logging subscriber. Events are emitted through
//! `tracing` and observed by whatever subscriber the host process provides.

pub mod core;
pub mod ops;
pub mod workflows;
