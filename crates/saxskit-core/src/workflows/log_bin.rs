use super::average::require_intensity;
use super::config::LogBinConfig;
use super::error::WorkflowError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::curve::{Curve, CurveKind};
use tracing::{debug, info, instrument, warn};

/// `count` logarithmically spaced edges from `min` to `max`.
///
/// The end points are set exactly so that the extreme Q values always fall
/// inside the first and last bins.
fn log_edges(min: f64, max: f64, count: usize) -> Vec<f64> {
    let (low, high) = (min.log10(), max.log10());
    let step = (high - low) / (count - 1) as f64;
    (0..count)
        .map(|k| match k {
            0 => min,
            k if k == count - 1 => max,
            k => 10f64.powf(low + step * k as f64),
        })
        .collect()
}

/// Bin of `q` among `edges`: half-open bins, the last one closed.
fn bin_index(edges: &[f64], q: f64) -> usize {
    let last_bin = edges.len() - 2;
    edges
        .partition_point(|&edge| edge <= q)
        .saturating_sub(1)
        .min(last_bin)
}

fn populations(axis: &[f64], edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; edges.len() - 1];
    for &q in axis {
        counts[bin_index(edges, q)] += 1;
    }
    counts
}

/// Rebins an intensity curve onto logarithmically spaced Q bins.
///
/// The edge count starts at `initial_edges` and drops by `edge_step` until
/// every bin holds at least one point. Each output point sits at the
/// arithmetic midpoint of its bin with the mean intensity and an error of
/// `sum(E) / n^2`.
#[instrument(skip_all, name = "log_bin")]
pub fn log_bin(curve: &Curve, config: &LogBinConfig) -> Result<Curve, WorkflowError> {
    require_intensity(curve)?;
    if curve.len() < 2 {
        return Err(WorkflowError::TooFewPoints {
            required: 2,
            found: curve.len(),
        });
    }
    let axis = curve.axis();
    let min = axis.iter().copied().fold(f64::INFINITY, f64::min);
    let max = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(min > 0.0 && min < max) {
        return Err(WorkflowError::DegenerateRange { min, max });
    }

    let mut edge_count = config.initial_edges;
    let (edges, counts) = loop {
        if edge_count < 2 {
            return Err(WorkflowError::NoPopulatedBinning);
        }
        let edges = log_edges(min, max, edge_count);
        let counts = populations(axis, &edges);
        if counts.iter().all(|&n| n > 0) {
            break (edges, counts);
        }
        debug!(edge_count, "Empty logarithmic bin; retrying with fewer edges");
        edge_count = edge_count.saturating_sub(config.edge_step);
    };

    let bins = counts.len();
    let mut intensity_sums = vec![0.0; bins];
    let mut error_sums = vec![0.0; bins];
    for (q, intensity, error) in curve.rows() {
        let bin = bin_index(&edges, q);
        intensity_sums[bin] += intensity;
        error_sums[bin] += error;
    }

    let mut binned = Curve::new(CurveKind::Intensity);
    for bin in 0..bins {
        let n = counts[bin] as f64;
        let midpoint = (edges[bin] + edges[bin + 1]) / 2.0;
        binned.push(midpoint, intensity_sums[bin] / n, error_sums[bin] / n / n);
    }
    info!(
        points = curve.len(),
        bins,
        "Log binned curve"
    );
    Ok(binned)
}

/// Log-bins every named curve, reporting progress per item.
///
/// A curve that cannot be binned is reported as failed and left out of the
/// result; the rest of the batch carries on.
pub fn log_bin_batch(
    curves: &[(String, Curve)],
    config: &LogBinConfig,
    reporter: &ProgressReporter,
) -> Vec<(String, Curve)> {
    reporter.report(Progress::BatchStart {
        total: curves.len() as u64,
    });
    let mut binned = Vec::with_capacity(curves.len());
    for (name, curve) in curves {
        info!("Log binning {}", name);
        match log_bin(curve, config) {
            Ok(result) => {
                binned.push((name.clone(), result));
                reporter.report(Progress::ItemDone { name: name.clone() });
            }
            Err(e) => {
                warn!("Could not log bin {}: {}", name, e);
                reporter.report(Progress::ItemFailed {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    reporter.report(Progress::BatchFinish);
    binned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::config::LogBinConfigBuilder;
    use std::sync::Mutex;

    fn linear_curve(points: usize) -> Curve {
        let mut curve = Curve::new(CurveKind::Intensity);
        for i in 1..=points {
            curve.push(i as f64, i as f64, 1.0);
        }
        curve
    }

    #[test]
    fn bins_are_half_open_with_a_closed_last_bin() {
        let edges = [1.0, 2.0, 4.0];
        assert_eq!(bin_index(&edges, 1.0), 0);
        assert_eq!(bin_index(&edges, 1.999), 0);
        assert_eq!(bin_index(&edges, 2.0), 1);
        assert_eq!(bin_index(&edges, 4.0), 1);
    }

    #[test]
    fn log_bin_averages_intensity_and_divides_error_sum_by_n_squared() {
        let config = LogBinConfigBuilder::new().initial_edges(3).build().unwrap();
        let binned = log_bin(&linear_curve(10), &config).unwrap();

        assert_eq!(binned.len(), 2);
        let middle = 10f64.sqrt();
        assert!((binned.axis()[0] - (1.0 + middle) / 2.0).abs() < 1e-12);
        assert!((binned.axis()[1] - (middle + 10.0) / 2.0).abs() < 1e-12);
        assert_eq!(binned.values(), &[2.0, 7.0]);
        assert!((binned.third()[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((binned.third()[1] - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn log_bin_drops_edges_until_no_bin_is_empty() {
        let mut curve = Curve::new(CurveKind::Intensity);
        curve.push(1.0, 4.0, 1.0);
        curve.push(1.1, 2.0, 1.0);
        curve.push(100.0, 1.0, 1.0);
        let config = LogBinConfigBuilder::new()
            .initial_edges(4)
            .edge_step(1)
            .build()
            .unwrap();

        let binned = log_bin(&curve, &config).unwrap();

        assert_eq!(binned.len(), 2);
        assert_eq!(binned.values(), &[3.0, 1.0]);
    }

    #[test]
    fn log_bin_rejects_degenerate_ranges() {
        let mut curve = Curve::new(CurveKind::Intensity);
        curve.push(0.5, 1.0, 1.0);
        curve.push(0.5, 2.0, 1.0);
        let config = LogBinConfigBuilder::new().build().unwrap();
        assert_eq!(
            log_bin(&curve, &config),
            Err(WorkflowError::DegenerateRange { min: 0.5, max: 0.5 })
        );
        assert_eq!(
            log_bin(&linear_curve(1), &config),
            Err(WorkflowError::TooFewPoints {
                required: 2,
                found: 1
            })
        );
    }

    #[test]
    fn log_bin_fails_when_no_edge_count_populates_every_bin() {
        let mut curve = Curve::new(CurveKind::Intensity);
        curve.push(1.0, 1.0, 1.0);
        curve.push(1000.0, 1.0, 1.0);
        let config = LogBinConfigBuilder::new()
            .initial_edges(4)
            .edge_step(3)
            .build()
            .unwrap();
        assert_eq!(log_bin(&curve, &config), Err(WorkflowError::NoPopulatedBinning));
    }

    #[test]
    fn batch_reports_each_item_and_skips_failures() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let config = LogBinConfigBuilder::new().initial_edges(3).build().unwrap();
        let curves = vec![
            ("good.dat".to_string(), linear_curve(10)),
            ("short.dat".to_string(), linear_curve(1)),
        ];

        let binned = log_bin_batch(&curves, &config, &reporter);

        assert_eq!(binned.len(), 1);
        assert_eq!(binned[0].0, "good.dat");
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Progress::BatchStart { total: 2 });
        assert_eq!(
            events[1],
            Progress::ItemDone {
                name: "good.dat".to_string()
            }
        );
        assert!(matches!(&events[2], Progress::ItemFailed { name, .. } if name == "short.dat"));
        assert_eq!(events[3], Progress::BatchFinish);
    }
}
