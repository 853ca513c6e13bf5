use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.into(),
    }
}

/// A `[start, end)` window expressed as fractions of the point count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionWindow {
    pub start: f64,
    pub end: f64,
}

impl FractionWindow {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    fn validate(self, parameter: &'static str) -> Result<Self, ConfigError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(self.start) && in_unit(self.end) && self.start < self.end) {
            return Err(invalid(
                parameter,
                format!(
                    "window {}..{} must satisfy 0 <= start < end <= 1",
                    self.start, self.end
                ),
            ));
        }
        Ok(self)
    }

    /// Whether point `index` of `len` lies strictly inside the window.
    pub fn contains(&self, index: usize, len: usize) -> bool {
        let position = index as f64;
        let n = len as f64;
        n * self.start < position && position < n * self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierRejection {
    pub low_q_window: FractionWindow,
    pub high_q_window: FractionWindow,
    /// Curves whose high-Q sum falls more than `1 - air_threshold` of the
    /// maximum's magnitude below the maximum are air shots.
    pub air_threshold: f64,
    /// Curves whose low-Q sum exceeds the minimum by more than
    /// `aggregation_threshold - 1` of its magnitude are aggregated.
    pub aggregation_threshold: f64,
}

impl Default for OutlierRejection {
    fn default() -> Self {
        Self {
            low_q_window: FractionWindow::new(0.015, 0.05),
            high_q_window: FractionWindow::new(0.90, 0.95),
            air_threshold: 0.98,
            aggregation_threshold: 1.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AverageConfig {
    /// `None` averages every curve.
    pub rejection: Option<OutlierRejection>,
}

#[derive(Default)]
pub struct AverageConfigBuilder {
    reject_outliers: Option<bool>,
    low_q_window: Option<FractionWindow>,
    high_q_window: Option<FractionWindow>,
    air_threshold: Option<f64>,
    aggregation_threshold: Option<f64>,
}

impl AverageConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_outliers(mut self, enabled: bool) -> Self {
        self.reject_outliers = Some(enabled);
        self
    }
    pub fn low_q_window(mut self, window: FractionWindow) -> Self {
        self.low_q_window = Some(window);
        self
    }
    pub fn high_q_window(mut self, window: FractionWindow) -> Self {
        self.high_q_window = Some(window);
        self
    }
    pub fn air_threshold(mut self, threshold: f64) -> Self {
        self.air_threshold = Some(threshold);
        self
    }
    pub fn aggregation_threshold(mut self, threshold: f64) -> Self {
        self.aggregation_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<AverageConfig, ConfigError> {
        if !self.reject_outliers.unwrap_or(true) {
            return Ok(AverageConfig { rejection: None });
        }
        let defaults = OutlierRejection::default();
        let air_threshold = self.air_threshold.unwrap_or(defaults.air_threshold);
        if !(air_threshold > 0.0 && air_threshold <= 1.0) {
            return Err(invalid("air_threshold", "must be in (0, 1]"));
        }
        let aggregation_threshold = self
            .aggregation_threshold
            .unwrap_or(defaults.aggregation_threshold);
        if !(aggregation_threshold >= 1.0 && aggregation_threshold.is_finite()) {
            return Err(invalid("aggregation_threshold", "must be a finite value >= 1"));
        }
        Ok(AverageConfig {
            rejection: Some(OutlierRejection {
                low_q_window: self
                    .low_q_window
                    .unwrap_or(defaults.low_q_window)
                    .validate("low_q_window")?,
                high_q_window: self
                    .high_q_window
                    .unwrap_or(defaults.high_q_window)
                    .validate("high_q_window")?,
                air_threshold,
                aggregation_threshold,
            }),
        })
    }
}

/// How the buffer is scaled before subtraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Multiplier {
    Fixed(f64),
    /// Ratio of mean sample to mean buffer intensity over the last `fraction` of points.
    Auto { fraction: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtractConfig {
    pub multiplier: Multiplier,
}

#[derive(Default)]
pub struct SubtractConfigBuilder {
    multiplier: Option<f64>,
    auto: Option<bool>,
    auto_fraction: Option<f64>,
}

impl SubtractConfigBuilder {
    pub const DEFAULT_AUTO_FRACTION: f64 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }
    pub fn auto(mut self, enabled: bool) -> Self {
        self.auto = Some(enabled);
        self
    }
    pub fn auto_fraction(mut self, fraction: f64) -> Self {
        self.auto_fraction = Some(fraction);
        self
    }

    pub fn build(self) -> Result<SubtractConfig, ConfigError> {
        let multiplier = if self.auto.unwrap_or(false) {
            if self.multiplier.is_some() {
                return Err(invalid(
                    "multiplier",
                    "a fixed multiplier cannot be combined with automatic scaling",
                ));
            }
            let fraction = self.auto_fraction.unwrap_or(Self::DEFAULT_AUTO_FRACTION);
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(invalid("auto_fraction", "must be in (0, 1]"));
            }
            Multiplier::Auto { fraction }
        } else {
            let value = self.multiplier.unwrap_or(1.0);
            if !value.is_finite() {
                return Err(invalid("multiplier", "must be a finite number"));
            }
            Multiplier::Fixed(value)
        };
        Ok(SubtractConfig { multiplier })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombineConfig {
    pub first_multiplier: f64,
    pub second_multiplier: f64,
}

#[derive(Default)]
pub struct CombineConfigBuilder {
    first_multiplier: Option<f64>,
    second_multiplier: Option<f64>,
}

impl CombineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_multiplier(mut self, multiplier: f64) -> Self {
        self.first_multiplier = Some(multiplier);
        self
    }
    /// A value of zero is treated as unset and derived as `1 - first`.
    pub fn second_multiplier(mut self, multiplier: f64) -> Self {
        self.second_multiplier = Some(multiplier);
        self
    }

    pub fn build(self) -> Result<CombineConfig, ConfigError> {
        let first = self.first_multiplier.unwrap_or(0.5);
        if !first.is_finite() {
            return Err(invalid("first_multiplier", "must be a finite number"));
        }
        let second = match self.second_multiplier {
            Some(m) if m != 0.0 => m,
            _ => 1.0 - first,
        };
        if !second.is_finite() {
            return Err(invalid("second_multiplier", "must be a finite number"));
        }
        Ok(CombineConfig {
            first_multiplier: first,
            second_multiplier: second,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogBinConfig {
    /// Number of bin edges tried first.
    pub initial_edges: usize,
    /// Edges removed after each attempt that leaves a bin empty.
    pub edge_step: usize,
}

#[derive(Default)]
pub struct LogBinConfigBuilder {
    initial_edges: Option<usize>,
    edge_step: Option<usize>,
}

impl LogBinConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_edges(mut self, edges: usize) -> Self {
        self.initial_edges = Some(edges);
        self
    }
    pub fn edge_step(mut self, step: usize) -> Self {
        self.edge_step = Some(step);
        self
    }

    pub fn build(self) -> Result<LogBinConfig, ConfigError> {
        let initial_edges = self.initial_edges.unwrap_or(100);
        if initial_edges < 2 {
            return Err(invalid("initial_edges", "at least two edges are needed"));
        }
        let edge_step = self.edge_step.unwrap_or(5);
        if edge_step == 0 {
            return Err(invalid("edge_step", "must be positive"));
        }
        Ok(LogBinConfig {
            initial_edges,
            edge_step,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuinierConfig {
    /// Index of the first point of the fit window.
    pub first_point: usize,
    /// Number of points in the fit window.
    pub window: usize,
}

#[derive(Default)]
pub struct GuinierConfigBuilder {
    first_point: Option<usize>,
    window: Option<usize>,
}

impl GuinierConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_point(mut self, index: usize) -> Self {
        self.first_point = Some(index);
        self
    }
    pub fn window(mut self, points: usize) -> Self {
        self.window = Some(points);
        self
    }

    pub fn build(self) -> Result<GuinierConfig, ConfigError> {
        let window = self.window.unwrap_or(15);
        if window < 2 {
            return Err(invalid("window", "a line needs at least two points"));
        }
        Ok(GuinierConfig {
            first_point: self.first_point.unwrap_or(0),
            window,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxCarConfig {
    /// Number of consecutive curves averaged around each curve; always odd.
    pub window: usize,
}

#[derive(Default)]
pub struct BoxCarConfigBuilder {
    window: Option<usize>,
}

impl BoxCarConfigBuilder {
    pub const DEFAULT_WINDOW: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(mut self, curves: usize) -> Self {
        self.window = Some(curves);
        self
    }

    /// An even window is widened by one so it stays centred on its curve.
    pub fn build(self) -> Result<BoxCarConfig, ConfigError> {
        let window = self.window.unwrap_or(Self::DEFAULT_WINDOW);
        if window == 0 {
            return Err(invalid("window", "must be positive"));
        }
        let window = if window % 2 == 0 {
            warn!("Box-car window {} is even; using {}", window, window + 1);
            window + 1
        } else {
            window
        };
        Ok(BoxCarConfig { window })
    }
}
