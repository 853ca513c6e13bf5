use super::config::{AverageConfig, OutlierRejection};
use super::error::WorkflowError;
use crate::core::models::curve::{Curve, CurveKind};
use tracing::{info, instrument};

/// Result of averaging a set of scattering curves.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageOutcome {
    pub curve: Curve,
    /// Indices of curves rejected as air shots.
    pub air_shots: Vec<usize>,
    /// Indices of curves rejected as aggregated or radiation damaged.
    pub aggregated: Vec<usize>,
}

impl AverageOutcome {
    pub fn rejected(&self) -> impl Iterator<Item = usize> + '_ {
        self.air_shots.iter().chain(&self.aggregated).copied()
    }
}

pub(crate) fn require_intensity(curve: &Curve) -> Result<(), WorkflowError> {
    if curve.kind() != CurveKind::Intensity {
        return Err(WorkflowError::WrongKind {
            expected: CurveKind::Intensity,
            found: curve.kind(),
        });
    }
    Ok(())
}

/// Summed intensities in the low-Q and high-Q windows of one curve.
fn window_sums(curve: &Curve, rejection: &OutlierRejection) -> (f64, f64) {
    let len = curve.len();
    let mut low = 0.0;
    let mut high = 0.0;
    for (index, intensity) in curve.values().iter().enumerate() {
        if rejection.high_q_window.contains(index, len) {
            high += intensity;
        } else if rejection.low_q_window.contains(index, len) {
            low += intensity;
        }
    }
    (low, high)
}

/// Flags air shots, then aggregated curves among the survivors.
///
/// Cutoffs are offsets from the extreme sum scaled by its magnitude, so they
/// stay on the correct side of it when buffer-subtracted sums are negative.
fn reject_outliers(curves: &[Curve], rejection: &OutlierRejection) -> (Vec<usize>, Vec<usize>) {
    let sums: Vec<(f64, f64)> = curves.iter().map(|c| window_sums(c, rejection)).collect();

    let highest = sums.iter().map(|&(_, high)| high).fold(f64::NEG_INFINITY, f64::max);
    let air_cutoff = highest - highest.abs() * (1.0 - rejection.air_threshold);
    let air_shots: Vec<usize> = (0..curves.len())
        .filter(|&i| sums[i].1 < air_cutoff)
        .collect();
    info!(
        "{} of {} rejected because of air",
        air_shots.len(),
        curves.len()
    );

    let survivors: Vec<usize> = (0..curves.len()).filter(|i| !air_shots.contains(i)).collect();
    let lowest = survivors
        .iter()
        .map(|&i| sums[i].0)
        .fold(f64::INFINITY, f64::min);
    let aggregation_cutoff = lowest + lowest.abs() * (rejection.aggregation_threshold - 1.0);
    let aggregated: Vec<usize> = survivors
        .into_iter()
        .filter(|&i| sums[i].0 > aggregation_cutoff)
        .collect();
    info!(
        "{} of {} rejected for air and radiation damage",
        air_shots.len() + aggregated.len(),
        curves.len()
    );

    (air_shots, aggregated)
}

/// Averages curves measured on identical Q values.
///
/// Output intensity is the mean over retained curves and the output error is
/// `sqrt(sum(E^2) / n)`.
#[instrument(skip_all, name = "average")]
pub fn average(curves: &[Curve], config: &AverageConfig) -> Result<AverageOutcome, WorkflowError> {
    if curves.len() < 2 {
        return Err(WorkflowError::TooFewCurves {
            required: 2,
            found: curves.len(),
        });
    }
    for curve in curves {
        require_intensity(curve)?;
    }
    let reference = curves[0].axis();
    if let Some(index) = curves.iter().position(|c| c.axis() != reference) {
        return Err(WorkflowError::AxisMismatch { index });
    }

    let (air_shots, aggregated) = match &config.rejection {
        Some(rejection) => reject_outliers(curves, rejection),
        None => (Vec::new(), Vec::new()),
    };
    let kept: Vec<&Curve> = curves
        .iter()
        .enumerate()
        .filter(|(i, _)| !air_shots.contains(i) && !aggregated.contains(i))
        .map(|(_, c)| c)
        .collect();
    info!("n = {}", kept.len());

    Ok(AverageOutcome {
        curve: mean_curve(reference, &kept)?,
        air_shots,
        aggregated,
    })
}

/// Point-wise mean of curves sharing `axis`; fails when `kept` is empty.
fn mean_curve(axis: &[f64], kept: &[&Curve]) -> Result<Curve, WorkflowError> {
    if kept.is_empty() {
        return Err(WorkflowError::TooFewCurves {
            required: 1,
            found: 0,
        });
    }
    let n = kept.len() as f64;
    let mut result = Curve::new(CurveKind::Intensity);
    for (index, &q) in axis.iter().enumerate() {
        let intensity = kept.iter().map(|c| c.values()[index]).sum::<f64>() / n;
        let error = (kept.iter().map(|c| c.third()[index].powi(2)).sum::<f64>() / n).sqrt();
        result.push(q, intensity, error);
    }
    info!("Averaged {} points", result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::curve::DatFile;
    use crate::workflows::config::AverageConfigBuilder;

    fn flat_curve(points: usize, intensity: impl Fn(usize) -> f64) -> Curve {
        let mut curve = Curve::new(CurveKind::Intensity);
        for i in 0..points {
            curve.push(0.01 * (i + 1) as f64, intensity(i), 0.1);
        }
        curve
    }

    #[test]
    fn averaging_two_dat_files_takes_mean_and_root_mean_square_error() {
        let first = DatFile::parse("1.0 10.0 0.1\n2.0 10.0 0.1\n");
        let second = DatFile::parse("1.0 20.0 0.2\n2.0 20.0 0.2\n");
        let config = AverageConfigBuilder::new().build().unwrap();

        let outcome = average(&[first, second], &config).unwrap();

        let expected_error = ((0.1f64.powi(2) + 0.2f64.powi(2)) / 2.0).sqrt();
        assert_eq!(outcome.curve.axis(), &[1.0, 2.0]);
        for (_, intensity, error) in outcome.curve.rows() {
            assert!((intensity - 15.0).abs() < 1e-12);
            assert!((error - expected_error).abs() < 1e-12);
        }
        assert_eq!(outcome.rejected().count(), 0);
    }

    #[test]
    fn outlier_rejection_drops_air_shots_and_aggregated_curves() {
        let curves = vec![
            flat_curve(100, |_| 1.0),
            flat_curve(100, |_| 1.0),
            flat_curve(100, |_| 0.5),
            flat_curve(100, |i| if (2..=4).contains(&i) { 2.0 } else { 1.0 }),
        ];
        let config = AverageConfigBuilder::new().build().unwrap();

        let outcome = average(&curves, &config).unwrap();

        assert_eq!(outcome.air_shots, vec![2]);
        assert_eq!(outcome.aggregated, vec![3]);
        assert!(outcome.curve.values().iter().all(|&i| (i - 1.0).abs() < 1e-12));
    }

    #[test]
    fn rejection_keeps_the_strongest_curve_when_high_q_sums_are_negative() {
        let curves: Vec<Curve> = (0..3)
            .map(|k| {
                let tail = -0.01 * (k + 1) as f64;
                flat_curve(100, move |i| if i >= 90 { tail } else { 5.0 })
            })
            .collect();
        let config = AverageConfigBuilder::new().build().unwrap();

        let outcome = average(&curves, &config).unwrap();

        assert_eq!(outcome.air_shots, vec![1, 2]);
        assert!(outcome.aggregated.is_empty());
        assert!(outcome.curve.values().iter().all(|v| v.is_finite()));
        assert_eq!(outcome.curve.values()[0], 5.0);
        assert_eq!(outcome.curve.values()[99], -0.01);
    }

    #[test]
    fn aggregation_cutoff_holds_for_negative_low_q_sums() {
        let curves = vec![
            flat_curve(100, |_| -1.0),
            flat_curve(100, |_| -1.0),
            flat_curve(100, |i| if (2..=4).contains(&i) { -0.5 } else { -1.0 }),
        ];
        let config = AverageConfigBuilder::new().build().unwrap();

        let outcome = average(&curves, &config).unwrap();

        assert!(outcome.air_shots.is_empty());
        assert_eq!(outcome.aggregated, vec![2]);
        assert!(outcome.curve.values().iter().all(|&v| v == -1.0));
    }

    #[test]
    fn mean_of_no_curves_is_an_error() {
        assert_eq!(
            mean_curve(&[0.1, 0.2], &[]),
            Err(WorkflowError::TooFewCurves {
                required: 1,
                found: 0
            })
        );
    }

    #[test]
    fn rejection_can_be_disabled() {
        let curves = vec![flat_curve(100, |_| 1.0), flat_curve(100, |_| 0.5)];
        let config = AverageConfigBuilder::new().reject_outliers(false).build().unwrap();
        let outcome = average(&curves, &config).unwrap();
        assert!(outcome.air_shots.is_empty());
        assert!((outcome.curve.values()[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn average_requires_two_curves_on_the_same_q_values() {
        let config = AverageConfigBuilder::new().build().unwrap();
        assert_eq!(
            average(&[flat_curve(3, |_| 1.0)], &config),
            Err(WorkflowError::TooFewCurves {
                required: 2,
                found: 1
            })
        );

        let shifted = DatFile::parse("0.5 1.0 0.1\n0.6 1.0 0.1\n0.7 1.0 0.1\n");
        assert_eq!(
            average(&[flat_curve(3, |_| 1.0), shifted], &config),
            Err(WorkflowError::AxisMismatch { index: 1 })
        );
    }
}
