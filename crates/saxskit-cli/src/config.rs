use crate::cli::{
    AverageArgs, BoxCarArgs, CombineArgs, ConfigArgs, GuinierArgs, LogBinArgs, SubtractArgs,
};
use crate::error::{CliError, Result};
use saxskit::workflows::config as core_config;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialAverageConfig {
    reject_outliers: Option<bool>,
    low_q_window: Option<[f64; 2]>,
    high_q_window: Option<[f64; 2]>,
    air_threshold: Option<f64>,
    aggregation_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSubtractConfig {
    multiplier: Option<f64>,
    auto: Option<bool>,
    auto_fraction: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialCombineConfig {
    first_multiplier: Option<f64>,
    second_multiplier: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialLogBinConfig {
    initial_edges: Option<usize>,
    edge_step: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGuinierConfig {
    first_point: Option<usize>,
    window: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialBoxCarConfig {
    window: Option<usize>,
}

/// Curve settings as read from a TOML file; every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialCurveConfig {
    average: Option<PartialAverageConfig>,
    subtract: Option<PartialSubtractConfig>,
    combine: Option<PartialCombineConfig>,
    log_bin: Option<PartialLogBinConfig>,
    guinier: Option<PartialGuinierConfig>,
    box_car: Option<PartialBoxCarConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

fn build_error(e: core_config::ConfigError) -> CliError {
    CliError::Config(e.to_string())
}

impl PartialCurveConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::parsing(path, e))
    }

    /// Loads the file named by `--config` (if any) and applies `--set` overrides.
    pub fn resolve(args: &ConfigArgs) -> Result<Self> {
        let mut partial = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.apply_set_values(&args.set_values)?;
        Ok(partial)
    }

    pub fn merge_average(self, args: &AverageArgs) -> Result<core_config::AverageConfig> {
        let file = self.average.unwrap_or_default();
        let reject = if args.no_reject {
            false
        } else {
            file.reject_outliers.unwrap_or(true)
        };

        let mut builder = core_config::AverageConfigBuilder::new().reject_outliers(reject);
        if let Some(t) = args.air_threshold.or(file.air_threshold) {
            builder = builder.air_threshold(t);
        }
        if let Some(t) = args.aggregation_threshold.or(file.aggregation_threshold) {
            builder = builder.aggregation_threshold(t);
        }
        if let Some([start, end]) = file.low_q_window {
            builder = builder.low_q_window(core_config::FractionWindow::new(start, end));
        }
        if let Some([start, end]) = file.high_q_window {
            builder = builder.high_q_window(core_config::FractionWindow::new(start, end));
        }
        builder.build().map_err(build_error)
    }

    pub fn merge_subtract(self, args: &SubtractArgs) -> Result<core_config::SubtractConfig> {
        let file = self.subtract.unwrap_or_default();
        let (auto, multiplier) = match (args.auto, args.multiplier) {
            (true, _) => (true, None),
            (false, Some(m)) => (false, Some(m)),
            (false, None) => (file.auto.unwrap_or(false), file.multiplier),
        };

        let mut builder = core_config::SubtractConfigBuilder::new().auto(auto);
        if let Some(m) = multiplier {
            builder = builder.multiplier(m);
        }
        if let Some(f) = args.auto_fraction.or(file.auto_fraction) {
            builder = builder.auto_fraction(f);
        }
        builder.build().map_err(build_error)
    }

    pub fn merge_combine(self, args: &CombineArgs) -> Result<core_config::CombineConfig> {
        let file = self.combine.unwrap_or_default();
        let mut builder = core_config::CombineConfigBuilder::new();
        if let Some(m) = args.first_multiplier.or(file.first_multiplier) {
            builder = builder.first_multiplier(m);
        }
        if let Some(m) = args.second_multiplier.or(file.second_multiplier) {
            builder = builder.second_multiplier(m);
        }
        builder.build().map_err(build_error)
    }

    pub fn merge_log_bin(self, args: &LogBinArgs) -> Result<core_config::LogBinConfig> {
        let file = self.log_bin.unwrap_or_default();
        let mut builder = core_config::LogBinConfigBuilder::new();
        if let Some(n) = args.initial_edges.or(file.initial_edges) {
            builder = builder.initial_edges(n);
        }
        if let Some(n) = args.edge_step.or(file.edge_step) {
            builder = builder.edge_step(n);
        }
        builder.build().map_err(build_error)
    }

    pub fn merge_box_car(self, args: &BoxCarArgs) -> Result<core_config::BoxCarConfig> {
        let file = self.box_car.unwrap_or_default();
        let mut builder = core_config::BoxCarConfigBuilder::new();
        if let Some(n) = args.window.or(file.window) {
            builder = builder.window(n);
        }
        builder.build().map_err(build_error)
    }

    /// `window` here comes from an autorg report when one was given.
    pub fn merge_guinier(
        self,
        args: &GuinierArgs,
        window: Option<(usize, usize)>,
    ) -> Result<core_config::GuinierConfig> {
        let file = self.guinier.unwrap_or_default();
        let (first_point, points) = match window {
            Some((first, points)) => (Some(first), Some(points)),
            None => (
                args.first_point.or(file.first_point),
                args.window.or(file.window),
            ),
        };
        let mut builder = core_config::GuinierConfigBuilder::new();
        if let Some(index) = first_point {
            builder = builder.first_point(index);
        }
        if let Some(n) = points {
            builder = builder.window(n);
        }
        builder.build().map_err(build_error)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "average.reject-outliers" => {
                    self.average.get_or_insert_with(Default::default).reject_outliers =
                        Some(parse_value(key, value)?);
                }
                "average.air-threshold" => {
                    self.average.get_or_insert_with(Default::default).air_threshold =
                        Some(parse_value(key, value)?);
                }
                "average.aggregation-threshold" => {
                    self.average
                        .get_or_insert_with(Default::default)
                        .aggregation_threshold = Some(parse_value(key, value)?);
                }
                "subtract.multiplier" => {
                    self.subtract.get_or_insert_with(Default::default).multiplier =
                        Some(parse_value(key, value)?);
                }
                "subtract.auto" => {
                    self.subtract.get_or_insert_with(Default::default).auto =
                        Some(parse_value(key, value)?);
                }
                "subtract.auto-fraction" => {
                    self.subtract.get_or_insert_with(Default::default).auto_fraction =
                        Some(parse_value(key, value)?);
                }
                "combine.first-multiplier" => {
                    self.combine.get_or_insert_with(Default::default).first_multiplier =
                        Some(parse_value(key, value)?);
                }
                "combine.second-multiplier" => {
                    self.combine.get_or_insert_with(Default::default).second_multiplier =
                        Some(parse_value(key, value)?);
                }
                "log-bin.initial-edges" => {
                    self.log_bin.get_or_insert_with(Default::default).initial_edges =
                        Some(parse_value(key, value)?);
                }
                "log-bin.edge-step" => {
                    self.log_bin.get_or_insert_with(Default::default).edge_step =
                        Some(parse_value(key, value)?);
                }
                "guinier.first-point" => {
                    self.guinier.get_or_insert_with(Default::default).first_point =
                        Some(parse_value(key, value)?);
                }
                "guinier.window" => {
                    self.guinier.get_or_insert_with(Default::default).window =
                        Some(parse_value(key, value)?);
                }
                "box-car.window" => {
                    self.box_car.get_or_insert_with(Default::default).window =
                        Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, CurveCommands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("saxskit.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn curve_command(args: &[&str]) -> CurveCommands {
        let mut argv = vec!["saxskit", "curve"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Curve(curve) => curve.command,
            other => panic!("Expected 'curve' subcommand, got {:?}", other),
        }
    }

    #[test]
    fn file_values_fill_in_unset_cli_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
            [log-bin]
            initial-edges = 40
            edge-step = 2
            "#,
        );
        let path_str = path.to_str().unwrap();
        let CurveCommands::Logbin(args) = curve_command(&["logbin", "a.dat", "-c", path_str])
        else {
            panic!("Expected 'logbin'");
        };

        let config = PartialCurveConfig::resolve(&args.config)
            .unwrap()
            .merge_log_bin(&args)
            .unwrap();

        assert_eq!(config.initial_edges, 40);
        assert_eq!(config.edge_step, 2);
    }

    #[test]
    fn cli_options_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
            [subtract]
            auto = true
            auto-fraction = 0.05
            "#,
        );
        let path_str = path.to_str().unwrap();
        let CurveCommands::Subtract(args) = curve_command(&[
            "subtract", "--sample", "s.dat", "--buffer", "b.dat", "-o", "out.dat", "-m", "0.9",
            "-c", path_str,
        ]) else {
            panic!("Expected 'subtract'");
        };

        let config = PartialCurveConfig::resolve(&args.config)
            .unwrap()
            .merge_subtract(&args)
            .unwrap();

        assert_eq!(config.multiplier, core_config::Multiplier::Fixed(0.9));
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
            [average]
            air-threshold = 0.9
            low-q-window = [0.02, 0.06]
            "#,
        );
        let path_str = path.to_str().unwrap();
        let CurveCommands::Average(args) = curve_command(&[
            "average", "a.dat", "b.dat", "-o", "avg.dat", "-c", path_str, "-S",
            "average.air-threshold=0.95",
        ]) else {
            panic!("Expected 'average'");
        };

        let config = PartialCurveConfig::resolve(&args.config)
            .unwrap()
            .merge_average(&args)
            .unwrap();

        let rejection = config.rejection.unwrap();
        assert_eq!(rejection.air_threshold, 0.95);
        assert_eq!(rejection.low_q_window, core_config::FractionWindow::new(0.02, 0.06));
        assert_eq!(rejection.aggregation_threshold, 1.03);
    }

    #[test]
    fn unknown_keys_and_bad_values_are_configuration_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[log-bin]\nbins = 3\n");
        assert!(matches!(
            PartialCurveConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let unknown = ConfigArgs {
            config: None,
            set_values: vec!["log-bin.bins=3".to_string()],
        };
        assert!(matches!(
            PartialCurveConfig::resolve(&unknown),
            Err(CliError::Config(_))
        ));

        let malformed = ConfigArgs {
            config: None,
            set_values: vec!["guinier.window=many".to_string()],
        };
        assert!(matches!(
            PartialCurveConfig::resolve(&malformed),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_merged_values_fail_the_core_builder() {
        let CurveCommands::Guinier(args) =
            curve_command(&["guinier", "-i", "a.dat", "--window", "1"])
        else {
            panic!("Expected 'guinier'");
        };
        let result = PartialCurveConfig::default().merge_guinier(&args, None);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("window")));
    }

    #[test]
    fn box_car_window_comes_from_set_values_unless_given_on_the_command_line() {
        let CurveCommands::Boxcar(args) =
            curve_command(&["boxcar", "a.dat", "b.dat", "-S", "box-car.window=4"])
        else {
            panic!("Expected 'boxcar'");
        };
        let config = PartialCurveConfig::resolve(&args.config)
            .unwrap()
            .merge_box_car(&args)
            .unwrap();
        assert_eq!(config.window, 5);

        let CurveCommands::Boxcar(args) =
            curve_command(&["boxcar", "a.dat", "-w", "3", "-S", "box-car.window=7"])
        else {
            panic!("Expected 'boxcar'");
        };
        let config = PartialCurveConfig::resolve(&args.config)
            .unwrap()
            .merge_box_car(&args)
            .unwrap();
        assert_eq!(config.window, 3);
    }
}
