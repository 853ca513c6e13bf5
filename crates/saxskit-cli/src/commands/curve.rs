use crate::cli::{
    AverageArgs, BoxCarArgs, CombineArgs, CurveArgs, CurveCommands, Dat2OutArgs, GuinierArgs,
    Int2DatArgs, LogBinArgs, PrArgs, SubtractArgs, TrimArgs,
};
use crate::config::PartialCurveConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use saxskit::core::io::autorg::{self, AutorgReport};
use saxskit::core::io::curve::{DatFile, IntColumn, IntFile, OutFile};
use saxskit::core::io::gnom::GnomOutput;
use saxskit::core::io::traits::RecordFile;
use saxskit::core::models::curve::Curve;
use saxskit::workflows::progress::ProgressReporter;
use saxskit::workflows::{average, box_car, combine, guinier, log_bin, subtract, trim};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: CurveArgs) -> Result<()> {
    match args.command {
        CurveCommands::Average(args) => {
            info!("Dispatching to 'curve average' command.");
            run_average(&args)
        }
        CurveCommands::Subtract(args) => {
            info!("Dispatching to 'curve subtract' command.");
            run_subtract(&args)
        }
        CurveCommands::Combine(args) => {
            info!("Dispatching to 'curve combine' command.");
            run_combine(&args)
        }
        CurveCommands::Logbin(args) => {
            info!("Dispatching to 'curve logbin' command.");
            run_log_bin(&args)
        }
        CurveCommands::Guinier(args) => {
            info!("Dispatching to 'curve guinier' command.");
            run_guinier(&args)
        }
        CurveCommands::Pr(args) => {
            info!("Dispatching to 'curve pr' command.");
            run_pr(&args)
        }
        CurveCommands::Boxcar(args) => {
            info!("Dispatching to 'curve boxcar' command.");
            run_box_car(&args)
        }
        CurveCommands::Trim(args) => {
            info!("Dispatching to 'curve trim' command.");
            run_trim(&args)
        }
        CurveCommands::Dat2out(args) => {
            info!("Dispatching to 'curve dat2out' command.");
            run_dat2out(&args)
        }
        CurveCommands::Int2dat(args) => {
            info!("Dispatching to 'curve int2dat' command.");
            run_int2dat(&args)
        }
    }
}

fn read_dat(path: &Path) -> Result<Curve> {
    info!("Reading scattering curve from {:?}", path);
    DatFile::read_from_path(path).map_err(|e| CliError::parsing(path, e))
}

fn write_dat(curve: &Curve, path: &Path) -> Result<()> {
    DatFile::write_to_path(curve, path).map_err(|e| CliError::writing(path, e))?;
    println!("✓ {} points written to: {}", curve.len(), path.display());
    Ok(())
}

fn run_average(args: &AverageArgs) -> Result<()> {
    let config = PartialCurveConfig::resolve(&args.config)?.merge_average(args)?;
    let curves = args
        .inputs
        .iter()
        .map(|path| read_dat(path))
        .collect::<Result<Vec<_>>>()?;

    let outcome = average::average(&curves, &config)?;
    for index in &outcome.air_shots {
        println!("  Rejected (air): {}", args.inputs[*index].display());
    }
    for index in &outcome.aggregated {
        println!("  Rejected (aggregated): {}", args.inputs[*index].display());
    }
    println!(
        "Averaged {} of {} curves.",
        curves.len() - outcome.rejected().count(),
        curves.len()
    );
    write_dat(&outcome.curve, &args.output)
}

fn run_subtract(args: &SubtractArgs) -> Result<()> {
    let config = PartialCurveConfig::resolve(&args.config)?.merge_subtract(args)?;
    let sample = read_dat(&args.sample)?;
    let buffer = read_dat(&args.buffer)?;

    let outcome = subtract::subtract(&sample, &buffer, &config)?;
    println!("Buffer multiplier: {:.4}", outcome.multiplier);
    write_dat(&outcome.curve, &args.output)
}

fn run_combine(args: &CombineArgs) -> Result<()> {
    let config = PartialCurveConfig::resolve(&args.config)?.merge_combine(args)?;
    let first = read_dat(&args.first)?;
    let second = read_dat(&args.second)?;

    let combined = combine::combine(&first, &second, &config)?;
    write_dat(&combined, &args.output)
}

/// `<dir>/<stem>_log.dat`, where `dir` defaults to the input's own directory.
pub fn log_bin_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "curve".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}_log.dat", stem))
}

fn run_log_bin(args: &LogBinArgs) -> Result<()> {
    let config = PartialCurveConfig::resolve(&args.config)?.merge_log_bin(args)?;
    let named = args
        .inputs
        .iter()
        .map(|path| Ok((path.to_string_lossy().into_owned(), read_dat(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let binned = log_bin::log_bin_batch(&named, &config, &reporter);

    for (name, curve) in &binned {
        let output = log_bin_output_path(Path::new(name), args.output_dir.as_deref());
        write_dat(curve, &output)?;
    }

    let failures = progress_handler.failures();
    if binned.is_empty() {
        return Err(CliError::Other(anyhow::anyhow!(
            "None of the {} input curves could be log binned",
            named.len()
        )));
    }
    if failures > 0 {
        warn!("{} of {} curves could not be log binned", failures, named.len());
    }
    Ok(())
}

/// Reads a Guinier window from an autorg report: `(first index, point count)`.
pub fn autorg_window(path: &Path) -> Result<(usize, usize)> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let points = if is_csv {
        let rows = autorg::read_autorg_csv_path(path).map_err(|e| CliError::parsing(path, e))?;
        rows.first().map(|row| (row.first_point, row.last_point))
    } else {
        let text = std::fs::read_to_string(path)?;
        let report = AutorgReport::parse(&text).map_err(|e| CliError::parsing(path, e))?;
        info!(rg = report.rg.value, "autorg estimate loaded");
        report.points
    };

    match points {
        Some((first, last)) if last >= first => {
            Ok((first.saturating_sub(1), last - first + 1))
        }
        _ => Err(CliError::Config(format!(
            "autorg output '{}' does not give a usable point range",
            path.display()
        ))),
    }
}

fn run_guinier(args: &GuinierArgs) -> Result<()> {
    let window = args.from_autorg.as_deref().map(autorg_window).transpose()?;
    let config = PartialCurveConfig::resolve(&args.config)?.merge_guinier(args, window)?;
    let curve = read_dat(&args.input)?;

    let fit = guinier::guinier_fit(&curve, &config)?;
    println!("Rg    = {:.2}", fit.rg);
    println!("I(0)  = {:.4e}", fit.i0);
    println!("Points {} to {}", fit.points.0 + 1, fit.points.1 + 1);
    println!("qRg   = {:.2}", fit.max_q_rg);
    if fit.max_q_rg > 1.3 {
        warn!(
            max_q_rg = fit.max_q_rg,
            "Fit window extends past the Guinier region (qRg > 1.3)"
        );
    }
    Ok(())
}

fn run_pr(args: &PrArgs) -> Result<()> {
    let curve = OutFile::read_from_path(&args.input).map_err(|e| CliError::parsing(&args.input, e))?;
    println!("Dmax  = {}", curve.dmax().unwrap_or(0.0));
    println!("Bins  = {}", curve.number_of_bins().unwrap_or(0));
    if let Some(output) = &args.output {
        OutFile::write_to_path(&curve, output).map_err(|e| CliError::writing(output, e))?;
        println!("✓ P(r) written to: {}", output.display());
    }
    Ok(())
}

fn run_box_car(args: &BoxCarArgs) -> Result<()> {
    let config = PartialCurveConfig::resolve(&args.config)?.merge_box_car(args)?;
    let named = args
        .inputs
        .iter()
        .map(|path| Ok((path.to_string_lossy().into_owned(), read_dat(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let frames = box_car::box_car(&named, &config)?;
    let dir = args
        .output_dir
        .clone()
        .or_else(|| args.inputs[0].parent().map(Path::to_path_buf))
        .unwrap_or_default();
    for frame in &frames {
        write_dat(&frame.curve, &dir.join(format!("{}.dat", frame.name)))?;
    }
    Ok(())
}

fn run_trim(args: &TrimArgs) -> Result<()> {
    let (first, _) = autorg_window(&args.autorg)?;
    let curve = read_dat(&args.input)?;

    let trimmed = trim::trim_leading(&curve, first)?;
    write_dat(&trimmed, &args.output)
}

fn run_dat2out(args: &Dat2OutArgs) -> Result<()> {
    let output = GnomOutput::from_dat_paths(&args.pr, &args.fit)
        .map_err(|e| CliError::parsing(&args.pr, e))?;
    if let Some((rg, i0)) = output.real_space_estimates() {
        println!("Real-space Rg = {:.2}, I(0) = {:.4e}", rg, i0);
    }
    output
        .write_to_path(&args.output)
        .map_err(|e| CliError::writing(&args.output, e))?;
    println!("✓ GNOM output written to: {}", args.output.display());
    Ok(())
}

fn run_int2dat(args: &Int2DatArgs) -> Result<()> {
    if args.q_min >= args.q_max {
        return Err(CliError::Argument(format!(
            "--q-min ({}) must be below --q-max ({})",
            args.q_min, args.q_max
        )));
    }
    let profile =
        IntFile::read_from_path(&args.input).map_err(|e| CliError::parsing(&args.input, e))?;
    let column = if args.vacuum {
        IntColumn::Vacuum
    } else {
        IntColumn::Solution
    };
    if let Some(i0) = profile.i_zero(column) {
        println!("I(0)  = {:.4e}", i0 + args.background);
    }

    let curve = profile.to_curve(column, args.background, args.q_min, args.q_max);
    write_dat(&curve, &args.output)
}
