use crate::core::models::curve::Curve;
use tracing::{info, warn};

fn peak(curve: &Curve) -> f64 {
    curve.values().iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Scales each curve's intensities so that every curve peaks at the highest
/// maximum in the set.
///
/// Returns the factor applied to each curve. A curve whose maximum is not
/// positive cannot be matched and is left unscaled (factor 1). Errors are
/// not touched.
pub fn scale_to_common_maximum(curves: &mut [Curve]) -> Vec<f64> {
    let highest = curves.iter().map(peak).fold(0.0, f64::max);
    curves
        .iter_mut()
        .enumerate()
        .map(|(index, curve)| {
            let own = peak(curve);
            if own <= 0.0 {
                warn!(index, "Curve has no positive intensity; left unscaled");
                return 1.0;
            }
            let factor = highest / own;
            info!(index, factor, "Scaling intensities");
            curve.values_mut().iter_mut().for_each(|i| *i *= factor);
            factor
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::curve::DatFile;

    #[test]
    fn every_curve_ends_up_with_the_highest_maximum() {
        let mut curves = vec![
            DatFile::parse("0.1 10.0 1.0\n0.2 5.0 1.0\n"),
            DatFile::parse("0.1 2.0 1.0\n0.2 4.0 1.0\n"),
        ];

        let factors = scale_to_common_maximum(&mut curves);

        assert_eq!(factors, vec![1.0, 2.5]);
        assert_eq!(curves[1].values(), &[5.0, 10.0]);
        assert_eq!(curves[1].third(), &[1.0, 1.0]);
    }

    #[test]
    fn non_positive_curves_are_left_alone() {
        let mut curves = vec![
            DatFile::parse("0.1 10.0 1.0\n"),
            DatFile::parse("0.1 -3.0 1.0\n"),
        ];
        assert_eq!(scale_to_common_maximum(&mut curves), vec![1.0, 1.0]);
        assert_eq!(curves[1].values(), &[-3.0]);
        assert!(scale_to_common_maximum(&mut []).is_empty());
    }
}
