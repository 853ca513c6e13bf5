use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "saxskit contributors",
    version,
    about = "saxskit - Fixed-column PDB and SAXS curve toolkit: transform structures, inspect their mass and sequence, and process scattering curves.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform or inspect PDB coordinate files.
    Pdb(PdbArgs),
    /// Process SAXS scattering curves (DAT) and GNOM output (OUT).
    Curve(CurveArgs),
}

#[derive(Args, Debug)]
pub struct PdbArgs {
    #[command(subcommand)]
    pub command: PdbCommands,
}

#[derive(Subcommand, Debug)]
pub enum PdbCommands {
    /// Apply geometric transforms and write the result.
    ///
    /// Transforms run in a fixed order: centre, translate, rotate, scale,
    /// invert, rename chain.
    Transform(TransformArgs),
    /// Print centre of mass, molecular weight, sequence and extinction coefficient.
    Info(InfoArgs),
    /// Orient a symmetric assembly so its symmetry axis lies along Z.
    ///
    /// The axis is fitted through the per-residue centroids of the CA or P
    /// atoms shared by the selected chains.
    SymmToZ(SymmToZArgs),
}

/// Arguments for `pdb transform`.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Path to the input PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the transformed PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Move the centre of mass to the origin before any other transform.
    #[arg(long)]
    pub center: bool,

    /// Translate by a vector, e.g. '1,2,3' or '1x2x3'.
    #[arg(short, long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    pub translate: Option<String>,

    /// Rotate about an axis by degrees, e.g. 'x90' or 'Z-2.5'.
    #[arg(short, long, value_name = "AXIS_DEGREES", allow_hyphen_values = true)]
    pub rotate: Option<String>,

    /// Rotate by an explicit 3x3 matrix given as nine row-major numbers.
    #[arg(long, value_name = "A,B,C,D,E,F,G,H,I", conflicts_with = "rotate", allow_hyphen_values = true)]
    pub matrix: Option<String>,

    /// Rotate about this point instead of the coordinate origin.
    #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    pub origin: Option<String>,

    /// Multiply every coordinate by a factor.
    #[arg(short, long, value_name = "FACTOR", allow_hyphen_values = true)]
    pub scale: Option<String>,

    /// Negate every z coordinate (mirror image).
    #[arg(long)]
    pub invert: bool,

    /// Rename a chain, e.g. 'A:B'.
    #[arg(long, value_name = "OLD:NEW")]
    pub rename_chain: Option<String>,

    /// Write only ATOM and HETATM records.
    #[arg(long)]
    pub atoms_only: bool,

    /// TOML file with element mass overrides, used by --center.
    #[arg(long, value_name = "PATH")]
    pub masses: Option<PathBuf>,
}

/// Arguments for `pdb info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the input PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// TOML file with element mass overrides.
    #[arg(long, value_name = "PATH")]
    pub masses: Option<PathBuf>,
}

/// Arguments for `pdb symm-to-z`.
#[derive(Args, Debug)]
pub struct SymmToZArgs {
    /// Path to the input PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the reoriented PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Comma-separated chains that trace the axis, e.g. 'A,B,C'. Defaults to all.
    #[arg(short, long, value_name = "A,B,...")]
    pub chains: Option<String>,

    /// Use only residues numbered strictly between FROM and TO, e.g. '1-213'.
    #[arg(short = 'n', long, value_name = "FROM-TO")]
    pub residues: Option<String>,

    /// Reverse the atom order of every second chain.
    #[arg(short, long)]
    pub reverse: bool,

    /// Write only ATOM and HETATM records.
    #[arg(long)]
    pub atoms_only: bool,
}

#[derive(Args, Debug)]
pub struct CurveArgs {
    #[command(subcommand)]
    pub command: CurveCommands,
}

#[derive(Subcommand, Debug)]
pub enum CurveCommands {
    /// Average repeated exposures, optionally rejecting air shots and aggregated frames.
    Average(AverageArgs),
    /// Subtract a buffer curve from a sample curve.
    Subtract(SubtractArgs),
    /// Add two scaled curves at their shared Q values.
    Combine(CombineArgs),
    /// Rebin curves onto logarithmically spaced Q values.
    Logbin(LogBinArgs),
    /// Estimate Rg and I(0) from a Guinier fit.
    Guinier(GuinierArgs),
    /// Summarise the pair-distance distribution in a GNOM OUT file.
    Pr(PrArgs),
    /// Sliding-window average over a series of curves sorted by file name.
    Boxcar(BoxCarArgs),
    /// Drop the low-Q points that autorg excluded from its Guinier range.
    Trim(TrimArgs),
    /// Join a P(R) DAT file and its fitted-data DAT file into a GNOM OUT file.
    Dat2out(Dat2OutArgs),
    /// Convert a Crysol INT profile into a DAT curve.
    Int2dat(Int2DatArgs),
}

/// Configuration sources shared by the curve commands.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S log-bin.edge-step=2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for `curve average`.
#[derive(Args, Debug)]
pub struct AverageArgs {
    /// DAT files to average; they must share their Q values.
    #[arg(required = true, num_args = 2.., value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Path for the averaged DAT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Average every input without outlier rejection.
    #[arg(long)]
    pub no_reject: bool,

    /// Override the fraction of the highest high-Q signal below which a curve is an air shot.
    #[arg(long, value_name = "FLOAT")]
    pub air_threshold: Option<f64>,

    /// Override the multiple of the lowest low-Q signal above which a curve is aggregated.
    #[arg(long, value_name = "FLOAT")]
    pub aggregation_threshold: Option<f64>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `curve subtract`.
#[derive(Args, Debug)]
pub struct SubtractArgs {
    /// Sample DAT file.
    #[arg(long, required = true, value_name = "PATH")]
    pub sample: PathBuf,

    /// Buffer DAT file.
    #[arg(long, required = true, value_name = "PATH")]
    pub buffer: PathBuf,

    /// Path for the subtracted DAT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Scale the buffer by a fixed factor before subtracting.
    #[arg(short, long, value_name = "FLOAT", conflicts_with = "auto")]
    pub multiplier: Option<f64>,

    /// Derive the buffer factor from the high-Q tails of both curves.
    #[arg(long)]
    pub auto: bool,

    /// Fraction of points at the high-Q end used by --auto.
    #[arg(long, value_name = "FLOAT")]
    pub auto_fraction: Option<f64>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `curve combine`.
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// First DAT file.
    #[arg(long, required = true, value_name = "PATH")]
    pub first: PathBuf,

    /// Second DAT file.
    #[arg(long, required = true, value_name = "PATH")]
    pub second: PathBuf,

    /// Path for the combined DAT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Multiplier for the first curve.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub first_multiplier: Option<f64>,

    /// Multiplier for the second curve; 0 or unset derives 1 - first.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub second_multiplier: Option<f64>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `curve logbin`.
#[derive(Args, Debug)]
pub struct LogBinArgs {
    /// DAT files to rebin.
    #[arg(required = true, num_args = 1.., value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Directory for the `<name>_log.dat` outputs; defaults to each input's directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the number of bin edges tried first.
    #[arg(long, value_name = "INT")]
    pub initial_edges: Option<usize>,

    /// Override the number of edges dropped after each attempt with an empty bin.
    #[arg(long, value_name = "INT")]
    pub edge_step: Option<usize>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `curve guinier`.
#[derive(Args, Debug)]
pub struct GuinierArgs {
    /// DAT file to fit.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Index of the first point of the fit window (0-based).
    #[arg(long, value_name = "INT")]
    pub first_point: Option<usize>,

    /// Number of points in the fit window.
    #[arg(long, value_name = "INT")]
    pub window: Option<usize>,

    /// Take the fit window from an autorg report (text or CSV).
    #[arg(long, value_name = "PATH", conflicts_with_all = ["first_point", "window"])]
    pub from_autorg: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `curve pr`.
#[derive(Args, Debug)]
pub struct PrArgs {
    /// GNOM OUT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Also write the P(r) section as a three-column table.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for `curve boxcar`.
#[derive(Args, Debug)]
pub struct BoxCarArgs {
    /// DAT files forming the series; they are ordered by name.
    #[arg(required = true, num_args = 1.., value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Directory for the averaged frames; defaults to the first input's directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of curves per window; an even number is widened by one.
    #[arg(short, long, value_name = "INT")]
    pub window: Option<usize>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `curve trim`.
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// DAT file to trim.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// autorg report (text or CSV) giving the first good point.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub autorg: PathBuf,

    /// Path for the trimmed DAT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for `curve dat2out`.
#[derive(Args, Debug)]
pub struct Dat2OutArgs {
    /// Three-column P(R) DAT file (R, P(R), error).
    #[arg(long, required = true, value_name = "PATH")]
    pub pr: PathBuf,

    /// Four-column fitted-data DAT file (Q, I observed, error, I calculated).
    #[arg(long, required = true, value_name = "PATH")]
    pub fit: PathBuf,

    /// Path for the GNOM OUT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for `curve int2dat`.
#[derive(Args, Debug)]
pub struct Int2DatArgs {
    /// Crysol INT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the DAT file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Use the in-vacuum intensities instead of the in-solution ones.
    #[arg(long)]
    pub vacuum: bool,

    /// Constant background added to every intensity.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.0, allow_hyphen_values = true)]
    pub background: f64,

    /// Keep only points with Q above this value.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.0)]
    pub q_min: f64,

    /// Keep only points with Q below this value.
    #[arg(long, value_name = "FLOAT", default_value_t = f64::INFINITY)]
    pub q_max: f64,
}
