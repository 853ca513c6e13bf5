use super::average::require_intensity;
use super::config::CombineConfig;
use super::error::WorkflowError;
use crate::core::models::curve::{Curve, CurveKind};
use tracing::{debug, info, instrument};

/// Weighted sum of two curves at the Q values they share.
///
/// Each curve's intensities and errors are first scaled by its multiplier;
/// errors then combine in quadrature. Points are emitted in the order of the
/// first curve.
#[instrument(skip_all, name = "combine")]
pub fn combine(first: &Curve, second: &Curve, config: &CombineConfig) -> Result<Curve, WorkflowError> {
    require_intensity(first)?;
    require_intensity(second)?;
    let (m1, m2) = (config.first_multiplier, config.second_multiplier);
    info!(
        first_multiplier = m1,
        second_multiplier = m2,
        "Combining curves"
    );

    let mut combined = Curve::new(CurveKind::Intensity);
    for (q, i1, e1) in first.rows() {
        let Some((i2, e2)) = second.point_at(q) else {
            debug!(q, "Q value missing from the second curve; skipped");
            continue;
        };
        let error = ((m1 * e1).powi(2) + (m2 * e2).powi(2)).sqrt();
        combined.push(q, m1 * i1 + m2 * i2, error);
    }

    if combined.is_empty() {
        return Err(WorkflowError::NoCommonPoints);
    }
    info!(points = combined.len(), "Combined curve built");
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::curve::DatFile;
    use crate::workflows::config::CombineConfigBuilder;

    #[test]
    fn combine_sums_scaled_curves_at_shared_q_values() {
        let first = DatFile::parse("0.1 10.0 1.0\n0.2 20.0 2.0\n0.3 30.0 3.0\n");
        let second = DatFile::parse("0.2 40.0 4.0\n0.3 50.0 5.0\n0.4 60.0 6.0\n");
        let config = CombineConfigBuilder::new().build().unwrap();

        let combined = combine(&first, &second, &config).unwrap();

        assert_eq!(combined.axis(), &[0.2, 0.3]);
        assert_eq!(combined.values(), &[30.0, 40.0]);
        let expected = (1.0f64 + 4.0).sqrt();
        assert!((combined.third()[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn combine_honours_explicit_multipliers() {
        let first = DatFile::parse("0.1 10.0 1.0\n");
        let second = DatFile::parse("0.1 20.0 1.0\n");
        let config = CombineConfigBuilder::new()
            .first_multiplier(1.0)
            .second_multiplier(-1.0)
            .build()
            .unwrap();

        let combined = combine(&first, &second, &config).unwrap();

        assert_eq!(combined.values(), &[-10.0]);
        assert!((combined.third()[0] - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn combine_without_shared_q_values_fails() {
        let first = DatFile::parse("0.1 10.0 1.0\n");
        let second = DatFile::parse("0.2 20.0 1.0\n");
        let config = CombineConfigBuilder::new().build().unwrap();
        assert_eq!(
            combine(&first, &second, &config),
            Err(WorkflowError::NoCommonPoints)
        );
    }
}
