use super::average::require_intensity;
use super::config::GuinierConfig;
use super::error::WorkflowError;
use crate::core::models::curve::Curve;
use tracing::{info, instrument};

/// Result of a Guinier fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuinierFit {
    /// Radius of gyration (Å).
    pub rg: f64,
    /// Forward scattering I(0).
    pub i0: f64,
    /// Largest `Q * Rg` inside the fitted window.
    pub max_q_rg: f64,
    pub slope: f64,
    pub intercept: f64,
    /// Index of the first and last points used.
    pub points: (usize, usize),
}

/// Ordinary least-squares line through `(x, y)` pairs: `(slope, intercept)`.
fn least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x).powi(2);
    }
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}

/// Fits `ln I = ln I(0) - (Rg^2 / 3) Q^2` over the configured point window.
#[instrument(skip_all, name = "guinier")]
pub fn guinier_fit(curve: &Curve, config: &GuinierConfig) -> Result<GuinierFit, WorkflowError> {
    require_intensity(curve)?;
    let start = config.first_point;
    let end = start + config.window;
    if end > curve.len() {
        return Err(WorkflowError::TooFewPoints {
            required: end,
            found: curve.len(),
        });
    }

    let mut q_squared = Vec::with_capacity(config.window);
    let mut ln_i = Vec::with_capacity(config.window);
    for index in start..end {
        let intensity = curve.values()[index];
        if intensity <= 0.0 {
            return Err(WorkflowError::NonPositiveIntensity { index });
        }
        q_squared.push(curve.axis()[index].powi(2));
        ln_i.push(intensity.ln());
    }

    let (slope, intercept) = least_squares(&q_squared, &ln_i);
    if !(slope < 0.0) {
        return Err(WorkflowError::NonNegativeSlope { slope });
    }
    let rg = (-3.0 * slope).sqrt();
    let q_max = curve.axis()[start..end]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let fit = GuinierFit {
        rg,
        i0: intercept.exp(),
        max_q_rg: q_max * rg,
        slope,
        intercept,
        points: (start, end - 1),
    };
    info!(
        rg = fit.rg,
        i0 = fit.i0,
        max_q_rg = fit.max_q_rg,
        "Guinier fit complete"
    );
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::curve::CurveKind;
    use crate::workflows::config::GuinierConfigBuilder;

    fn guinier_curve(rg: f64, i0: f64, points: usize) -> Curve {
        let mut curve = Curve::new(CurveKind::Intensity);
        for k in 1..=points {
            let q = 0.005 * k as f64;
            curve.push(q, i0 * (-(q * rg).powi(2) / 3.0).exp(), 1.0);
        }
        curve
    }

    #[test]
    fn exact_guinier_data_recovers_rg_and_forward_scattering() {
        let curve = guinier_curve(20.0, 1000.0, 30);
        let config = GuinierConfigBuilder::new().first_point(2).window(10).build().unwrap();

        let fit = guinier_fit(&curve, &config).unwrap();

        assert!((fit.rg - 20.0).abs() < 1e-6);
        assert!((fit.i0 - 1000.0).abs() < 1e-6);
        assert_eq!(fit.points, (2, 11));
        assert!((fit.max_q_rg - 0.06 * 20.0).abs() < 1e-6);
    }

    #[test]
    fn window_past_the_end_is_rejected() {
        let curve = guinier_curve(20.0, 1000.0, 5);
        let config = GuinierConfigBuilder::new().build().unwrap();
        assert_eq!(
            guinier_fit(&curve, &config),
            Err(WorkflowError::TooFewPoints {
                required: 15,
                found: 5
            })
        );
    }

    #[test]
    fn non_positive_intensity_and_rising_curves_have_no_fit() {
        let config = GuinierConfigBuilder::new().window(3).build().unwrap();

        let mut negative = Curve::new(CurveKind::Intensity);
        negative.push(0.01, 10.0, 1.0);
        negative.push(0.02, -1.0, 1.0);
        negative.push(0.03, 8.0, 1.0);
        assert_eq!(
            guinier_fit(&negative, &config),
            Err(WorkflowError::NonPositiveIntensity { index: 1 })
        );

        let mut rising = Curve::new(CurveKind::Intensity);
        rising.push(0.01, 1.0, 1.0);
        rising.push(0.02, 2.0, 1.0);
        rising.push(0.03, 3.0, 1.0);
        assert!(matches!(
            guinier_fit(&rising, &config),
            Err(WorkflowError::NonNegativeSlope { .. })
        ));
    }
}
