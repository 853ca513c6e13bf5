use super::average::require_intensity;
use super::config::{Multiplier, SubtractConfig};
use super::error::WorkflowError;
use crate::core::models::curve::{Curve, CurveKind};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct SubtractOutcome {
    pub curve: Curve,
    /// The multiplier the buffer was scaled by.
    pub multiplier: f64,
}

fn tail_mean(values: &[f64], count: usize) -> f64 {
    let tail = &values[values.len() - count..];
    tail.iter().sum::<f64>() / count as f64
}

/// Ratio of mean sample to mean buffer intensity over the last `fraction` of points.
///
/// The tail length is `round(len * fraction)` of the sample. When that rounds
/// to zero, as it does for short curves, the whole curve is used.
pub fn auto_multiplier(sample: &Curve, buffer: &Curve, fraction: f64) -> Result<f64, WorkflowError> {
    let len = sample.len().min(buffer.len());
    if len == 0 {
        return Err(WorkflowError::TooFewPoints {
            required: 1,
            found: 0,
        });
    }
    let count = match (sample.len() as f64 * fraction).round() as usize {
        0 => len,
        count => count.min(len),
    };
    let buffer_mean = tail_mean(buffer.values(), count);
    if buffer_mean == 0.0 {
        return Err(WorkflowError::ZeroBufferSignal);
    }
    Ok(tail_mean(sample.values(), count) / buffer_mean)
}

/// Subtracts `multiplier * buffer` from `sample` point by point.
///
/// Errors combine as `sqrt(Es^2 + (m * Eb)^2)`. The sample's Q values are kept.
#[instrument(skip_all, name = "subtract")]
pub fn subtract(
    sample: &Curve,
    buffer: &Curve,
    config: &SubtractConfig,
) -> Result<SubtractOutcome, WorkflowError> {
    require_intensity(sample)?;
    require_intensity(buffer)?;
    if sample.len() != buffer.len() {
        return Err(WorkflowError::PointCountMismatch {
            sample: sample.len(),
            buffer: buffer.len(),
        });
    }

    let multiplier = match config.multiplier {
        Multiplier::Fixed(m) => m,
        Multiplier::Auto { fraction } => {
            info!("Determining a multiplier to correct blanking errors");
            auto_multiplier(sample, buffer, fraction)?
        }
    };
    if multiplier != 1.0 {
        info!("Will multiply buffer by {:.4} before subtracting from sample", multiplier);
    }

    let mut curve = Curve::new(CurveKind::Intensity);
    for ((q, is, es), (_, ib, eb)) in sample.rows().zip(buffer.rows()) {
        let error = (es.powi(2) + (multiplier * eb).powi(2)).sqrt();
        curve.push(q, is - multiplier * ib, error);
    }
    Ok(SubtractOutcome { curve, multiplier })
}
