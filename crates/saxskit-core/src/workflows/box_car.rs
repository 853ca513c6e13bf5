use super::average::require_intensity;
use super::config::BoxCarConfig;
use super::error::WorkflowError;
use crate::core::models::curve::{Curve, CurveKind};
use std::path::Path;
use tracing::{info, instrument};

/// One averaged frame of a box-car pass over a curve series.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCarFrame {
    /// `<first stem>-<last suffix>`, e.g. `run_003-007`.
    pub name: String,
    /// Positions in the name-sorted series of the first and last curve averaged.
    pub members: (usize, usize),
    pub curve: Curve,
}

fn stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Names a frame after the first member and the trailing token of the last.
pub fn frame_name(first: &str, last: &str) -> String {
    let last = stem(last);
    let suffix = last.rsplit(['_', '.']).next().unwrap_or(&last);
    format!("{}-{}", stem(first), suffix)
}

/// Sliding-window average over a series of curves ordered by name.
///
/// Each curve is averaged with up to `(window - 1) / 2` neighbours on either
/// side; the window shrinks symmetrically near the ends of the series. Q values
/// come from the first curve in the window and each point averages the curves
/// that contain that exact Q. The error is `mean(E) / sqrt(n)`.
#[instrument(skip_all, name = "box_car")]
pub fn box_car(
    curves: &[(String, Curve)],
    config: &BoxCarConfig,
) -> Result<Vec<BoxCarFrame>, WorkflowError> {
    if curves.is_empty() {
        return Err(WorkflowError::TooFewCurves {
            required: 1,
            found: 0,
        });
    }
    for (_, curve) in curves {
        require_intensity(curve)?;
    }

    let mut series: Vec<&(String, Curve)> = curves.iter().collect();
    series.sort_by(|a, b| a.0.cmp(&b.0));
    info!("A window of {} will be used for box-car averaging", config.window);

    let last_index = series.len() - 1;
    let mut frames = Vec::with_capacity(series.len());
    for index in 0..series.len() {
        let half = ((config.window - 1) / 2).min(index).min(last_index - index);
        let window = &series[index - half..=index + half];

        let reference = &window[0].1;
        let mut curve = Curve::new(CurveKind::Intensity);
        for &q in reference.axis() {
            let points: Vec<(f64, f64)> = window.iter().filter_map(|(_, c)| c.point_at(q)).collect();
            let n = points.len() as f64;
            let intensity = points.iter().map(|(i, _)| i).sum::<f64>() / n;
            let error = points.iter().map(|(_, e)| e).sum::<f64>() / (n * n.sqrt());
            curve.push(q, intensity, error);
        }

        frames.push(BoxCarFrame {
            name: frame_name(&window[0].0, &window[window.len() - 1].0),
            members: (index - half, index + half),
            curve,
        });
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::curve::DatFile;
    use crate::workflows::config::BoxCarConfigBuilder;

    fn series() -> Vec<(String, Curve)> {
        vec![
            ("c_3.dat".to_string(), DatFile::parse("0.1 3.0 0.3\n")),
            ("c_1.dat".to_string(), DatFile::parse("0.1 1.0 0.3\n0.2 1.0 0.3\n")),
            ("c_2.dat".to_string(), DatFile::parse("0.1 2.0 0.3\n0.2 2.0 0.3\n")),
        ]
    }

    #[test]
    fn window_shrinks_at_the_ends_of_the_series() {
        let config = BoxCarConfigBuilder::new().window(3).build().unwrap();

        let frames = box_car(&series(), &config).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].name, "c_1-1");
        assert_eq!(frames[0].members, (0, 0));
        assert_eq!(frames[0].curve.values(), &[1.0, 1.0]);
        assert!((frames[0].curve.third()[0] - 0.3).abs() < 1e-12);

        assert_eq!(frames[1].name, "c_1-3");
        assert_eq!(frames[1].members, (0, 2));
        assert_eq!(frames[2].name, "c_3-3");
        assert_eq!(frames[2].curve.axis(), &[0.1]);
    }

    #[test]
    fn each_point_averages_only_curves_with_that_q() {
        let config = BoxCarConfigBuilder::new().window(3).build().unwrap();

        let middle = &box_car(&series(), &config).unwrap()[1].curve;

        assert_eq!(middle.axis(), &[0.1, 0.2]);
        assert!((middle.values()[0] - 2.0).abs() < 1e-12);
        assert!((middle.third()[0] - 0.3 / 3f64.sqrt()).abs() < 1e-12);
        assert!((middle.values()[1] - 1.5).abs() < 1e-12);
        assert!((middle.third()[1] - 0.3 / 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn frame_names_join_first_stem_and_last_suffix() {
        assert_eq!(frame_name("data/run_003.dat", "data/run_007.dat"), "run_003-007");
        assert_eq!(frame_name("single.dat", "single.dat"), "single-single");
    }

    #[test]
    fn empty_series_is_an_error() {
        let config = BoxCarConfigBuilder::new().build().unwrap();
        assert_eq!(
            box_car(&[], &config),
            Err(WorkflowError::TooFewCurves {
                required: 1,
                found: 0
            })
        );
    }
}
