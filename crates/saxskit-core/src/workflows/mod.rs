//! Curve processing procedures built on parsed [`Curve`](crate::core::models::curve::Curve)s.
//!
//! Each procedure takes a validated configuration from [`config`] and returns
//! a new curve (or statistics) without modifying its inputs.

pub mod average;
pub mod box_car;
pub mod combine;
pub mod config;
pub mod error;
pub mod fit;
pub mod guinier;
pub mod log_bin;
pub mod normalize;
pub mod progress;
pub mod subtract;
pub mod trim;
