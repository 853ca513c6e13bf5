use super::error::WorkflowError;
use tracing::info;

/// Agreement between an observed curve and a model computed on the same Q values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    /// Least-squares factor the model is multiplied by.
    pub scale: f64,
    /// Mean squared error-weighted residual after scaling.
    pub chi_squared: f64,
}

impl FitStatistics {
    pub fn chi(&self) -> f64 {
        self.chi_squared.sqrt()
    }
}

/// Scales `model` onto `observed` and scores the agreement.
///
/// The scale is `sum(obs * mod / err^2) / sum(mod^2 / err^2)` and chi squared
/// is the mean of `((obs - scale * mod) / err)^2`.
pub fn fit_statistics(
    observed: &[f64],
    errors: &[f64],
    model: &[f64],
) -> Result<FitStatistics, WorkflowError> {
    let len = observed.len();
    if errors.len() != len || model.len() != len {
        return Err(WorkflowError::PointCountMismatch {
            sample: len,
            buffer: errors.len().min(model.len()),
        });
    }
    if len == 0 {
        return Err(WorkflowError::TooFewPoints {
            required: 1,
            found: 0,
        });
    }
    if let Some(index) = errors.iter().position(|&e| e <= 0.0) {
        return Err(WorkflowError::NonPositiveError { index });
    }

    let (mut cross, mut model_power) = (0.0, 0.0);
    for ((obs, err), m) in observed.iter().zip(errors).zip(model) {
        let weight = err.powi(2);
        cross += obs * m / weight;
        model_power += m * m / weight;
    }
    if model_power == 0.0 {
        return Err(WorkflowError::ZeroModel);
    }
    let scale = cross / model_power;

    let chi_squared = observed
        .iter()
        .zip(errors)
        .zip(model)
        .map(|((obs, err), m)| ((obs - scale * m) / err).powi(2))
        .sum::<f64>()
        / len as f64;
    info!(scale, chi_squared, "Model fit scored");
    Ok(FitStatistics { scale, chi_squared })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_model_fits_exactly() {
        let observed = [2.0, 4.0, 6.0];
        let errors = [0.1, 0.2, 0.3];
        let model = [1.0, 2.0, 3.0];

        let stats = fit_statistics(&observed, &errors, &model).unwrap();

        assert!((stats.scale - 2.0).abs() < 1e-12);
        assert!(stats.chi_squared.abs() < 1e-12);
    }

    #[test]
    fn chi_squared_is_the_mean_weighted_residual() {
        let observed = [1.0, 3.0];
        let errors = [1.0, 1.0];
        let model = [1.0, 1.0];

        let stats = fit_statistics(&observed, &errors, &model).unwrap();

        assert!((stats.scale - 2.0).abs() < 1e-12);
        assert!((stats.chi_squared - 1.0).abs() < 1e-12);
        assert!((stats.chi() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert_eq!(
            fit_statistics(&[1.0, 2.0], &[1.0, 0.0], &[1.0, 1.0]),
            Err(WorkflowError::NonPositiveError { index: 1 })
        );
        assert_eq!(
            fit_statistics(&[1.0], &[1.0], &[0.0]),
            Err(WorkflowError::ZeroModel)
        );
        assert!(fit_statistics(&[1.0], &[1.0, 1.0], &[1.0]).is_err());
    }
}
