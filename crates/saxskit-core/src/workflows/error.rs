use super::config::ConfigError;
use crate::core::models::curve::CurveKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Need at least {required} curves, got {found}")]
    TooFewCurves { required: usize, found: usize },

    #[error("Need at least {required} data points, got {found}")]
    TooFewPoints { required: usize, found: usize },

    #[error("Expected a {expected} curve, got a {found} curve")]
    WrongKind { expected: CurveKind, found: CurveKind },

    #[error("Curve {index} does not share the Q values of the first curve")]
    AxisMismatch { index: usize },

    #[error("Sample has {sample} points but buffer has {buffer}")]
    PointCountMismatch { sample: usize, buffer: usize },

    #[error("The two curves have no Q values in common")]
    NoCommonPoints,

    #[error("Buffer intensity over the scaling window is zero; cannot derive a multiplier")]
    ZeroBufferSignal,

    #[error("Q range [{min}, {max}] cannot be split into logarithmic bins")]
    DegenerateRange { min: f64, max: f64 },

    #[error("No bin count leaves every logarithmic bin populated")]
    NoPopulatedBinning,

    #[error("Intensity at point {index} is not positive; ln(I) is undefined")]
    NonPositiveIntensity { index: usize },

    #[error("Error at point {index} is not positive")]
    NonPositiveError { index: usize },

    #[error("Guinier slope {slope} is not negative; no real Rg")]
    NonNegativeSlope { slope: f64 },

    #[error("Model intensities are all zero; no scale factor exists")]
    ZeroModel,
}
