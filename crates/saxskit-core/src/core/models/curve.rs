use std::fmt;
use thiserror::Error;

/// The role a column plays within a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Momentum transfer (Å⁻¹).
    Q,
    /// Scattered intensity.
    I,
    /// Experimental error.
    E,
    /// Pair distance (Å).
    R,
    /// Pair-distance distribution P(r).
    PR,
    /// Observed intensity in a model fit.
    Obs,
    /// Model intensity in a model fit.
    Mod,
}

impl Role {
    pub const fn name(self) -> &'static str {
        match self {
            Role::Q => "Q",
            Role::I => "I",
            Role::E => "E",
            Role::R => "R",
            Role::PR => "PR",
            Role::Obs => "obs",
            Role::Mod => "mod",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the three curve file families a curve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// Scattering curve (DAT): Q, I, E.
    Intensity,
    /// Pair-distance distribution (OUT): R, P(R), E.
    PairDistance,
    /// Model fit comparison (FIT): Q, observed, model.
    Fit,
}

impl CurveKind {
    /// The roles of the three columns, in file order.
    pub const fn roles(self) -> [Role; 3] {
        match self {
            CurveKind::Intensity => [Role::Q, Role::I, Role::E],
            CurveKind::PairDistance => [Role::R, Role::PR, Role::E],
            CurveKind::Fit => [Role::Q, Role::Obs, Role::Mod],
        }
    }

    /// Column titles written in the header row.
    pub const fn titles(self) -> [&'static str; 3] {
        match self {
            CurveKind::Intensity => ["Q(A-1)", "I(au)", "Error"],
            CurveKind::PairDistance => ["R(A)", "P(R)", "ERROR"],
            CurveKind::Fit => ["Q(A-1)", "Observed", "Model"],
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CurveKind::Intensity => "intensity",
            CurveKind::PairDistance => "pair-distance",
            CurveKind::Fit => "fit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Curve columns must have equal lengths (got {0}, {1} and {2})")]
    LengthMismatch(usize, usize, usize),
}

/// Three equal-length numeric columns keyed by role.
///
/// Index `i` of every column refers to the same data point. The columns are
/// private so the equal-length invariant cannot be broken from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    kind: CurveKind,
    columns: [Vec<f64>; 3],
}

impl Curve {
    pub fn new(kind: CurveKind) -> Self {
        Self {
            kind,
            columns: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    pub fn from_columns(
        kind: CurveKind,
        axis: Vec<f64>,
        values: Vec<f64>,
        third: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        if axis.len() != values.len() || axis.len() != third.len() {
            return Err(ShapeError::LengthMismatch(
                axis.len(),
                values.len(),
                third.len(),
            ));
        }
        Ok(Self {
            kind,
            columns: [axis, values, third],
        })
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns[0].is_empty()
    }

    pub fn push(&mut self, axis: f64, value: f64, third: f64) {
        self.columns[0].push(axis);
        self.columns[1].push(value);
        self.columns[2].push(third);
    }

    /// Looks a column up by role; `None` if the role does not belong to this kind.
    pub fn column(&self, role: Role) -> Option<&[f64]> {
        self.kind
            .roles()
            .iter()
            .position(|r| *r == role)
            .map(|i| self.columns[i].as_slice())
    }

    /// The primary axis: Q, or R for pair-distance curves.
    pub fn axis(&self) -> &[f64] {
        &self.columns[0]
    }

    /// The second column: I, P(R) or observed intensity.
    pub fn values(&self) -> &[f64] {
        &self.columns[1]
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.columns[1]
    }

    /// The third column: errors, or model intensity for fit curves.
    pub fn third(&self) -> &[f64] {
        &self.columns[2]
    }

    pub fn third_mut(&mut self) -> &mut [f64] {
        &mut self.columns[2]
    }

    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        (0..self.len()).map(|i| (self.columns[0][i], self.columns[1][i], self.columns[2][i]))
    }

    /// Index of the first point whose axis value equals `axis_value` exactly.
    pub fn position_of(&self, axis_value: f64) -> Option<usize> {
        self.columns[0].iter().position(|&a| a == axis_value)
    }

    /// The value and third-column entries at an exact axis value.
    pub fn point_at(&self, axis_value: f64) -> Option<(f64, f64)> {
        self.position_of(axis_value)
            .map(|i| (self.columns[1][i], self.columns[2][i]))
    }

    /// The maximum dimension of a pair-distance curve: its last R value.
    pub fn dmax(&self) -> Option<f64> {
        match self.kind {
            CurveKind::PairDistance => self.columns[0].last().copied(),
            _ => None,
        }
    }

    /// Number of R bins in a pair-distance curve.
    pub fn number_of_bins(&self) -> Option<usize> {
        match self.kind {
            CurveKind::PairDistance => Some(self.len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_rejects_unequal_lengths() {
        let result = Curve::from_columns(
            CurveKind::Intensity,
            vec![0.1, 0.2],
            vec![10.0],
            vec![1.0, 1.0],
        );
        assert_eq!(result, Err(ShapeError::LengthMismatch(2, 1, 2)));
    }

    #[test]
    fn column_lookup_is_keyed_by_role() {
        let mut curve = Curve::new(CurveKind::Fit);
        curve.push(0.1, 5.0, 4.5);
        assert_eq!(curve.column(Role::Q), Some(&[0.1][..]));
        assert_eq!(curve.column(Role::Obs), Some(&[5.0][..]));
        assert_eq!(curve.column(Role::Mod), Some(&[4.5][..]));
        assert_eq!(curve.column(Role::E), None);
        assert_eq!(curve.column(Role::R), None);
    }

    #[test]
    fn point_at_finds_exact_axis_value() {
        let mut curve = Curve::new(CurveKind::Intensity);
        curve.push(0.01, 100.0, 2.0);
        curve.push(0.02, 90.0, 1.5);
        assert_eq!(curve.point_at(0.02), Some((90.0, 1.5)));
        assert_eq!(curve.point_at(0.03), None);
    }

    #[test]
    fn dmax_and_bins_only_apply_to_pair_distance_curves() {
        let mut pr = Curve::new(CurveKind::PairDistance);
        pr.push(1.0, 0.1, 0.01);
        pr.push(2.0, 0.2, 0.01);
        pr.push(64.5, 0.0, 0.01);
        assert_eq!(pr.dmax(), Some(64.5));
        assert_eq!(pr.number_of_bins(), Some(3));

        let dat = Curve::new(CurveKind::Intensity);
        assert_eq!(dat.dmax(), None);
        assert_eq!(dat.number_of_bins(), None);
    }
}
