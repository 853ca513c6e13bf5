use super::error::WorkflowError;
use crate::core::io::autorg::AutorgReport;
use crate::core::models::curve::Curve;
use tracing::{info, warn};

/// Drops every point before `first_index` (0-based).
pub fn trim_leading(curve: &Curve, first_index: usize) -> Result<Curve, WorkflowError> {
    if first_index >= curve.len() {
        return Err(WorkflowError::TooFewPoints {
            required: first_index + 1,
            found: curve.len(),
        });
    }
    let mut trimmed = Curve::new(curve.kind());
    for (axis, value, third) in curve.rows().skip(first_index) {
        trimmed.push(axis, value, third);
    }
    info!("Removed the first {} points", first_index);
    Ok(trimmed)
}

/// Drops the low-Q points that autorg left out of its Guinier range.
///
/// A report without a point range leaves the curve unchanged.
pub fn trim_to_autorg(curve: &Curve, report: &AutorgReport) -> Result<Curve, WorkflowError> {
    match report.first_good_index() {
        Some(first) => trim_leading(curve, first),
        None => {
            warn!("autorg gave no point range; keeping every point");
            Ok(curve.clone())
        }
    }
}
