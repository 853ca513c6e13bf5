use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Standard atomic weights (g/mol), keyed by canonical symbol.
static ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    "H" => 1.00794, "D" => 2.014102, "T" => 3.0160492, "He" => 4.002602,
    "Li" => 6.941, "Be" => 9.012182, "B" => 10.811, "C" => 12.0107, "N" => 14.0067,
    "O" => 15.9994, "F" => 18.9984032, "Ne" => 20.1797,
    "Na" => 22.98977, "Mg" => 24.305, "Al" => 26.981538, "Si" => 28.0855,
    "P" => 30.973761, "S" => 32.065, "Cl" => 35.453, "Ar" => 39.948,
    "K" => 39.0983, "Ca" => 40.078, "Sc" => 44.95591, "Ti" => 47.867, "V" => 50.9415,
    "Cr" => 51.9961, "Mn" => 54.938049, "Fe" => 55.845, "Co" => 58.9332, "Ni" => 58.6934,
    "Cu" => 63.546, "Zn" => 65.409, "Ga" => 69.723, "Ge" => 72.64, "As" => 74.9216,
    "Se" => 78.96, "Br" => 79.904, "Kr" => 83.798,
    "Rb" => 85.4678, "Sr" => 87.62, "Y" => 88.90585, "Zr" => 91.224, "Nb" => 92.90638,
    "Mo" => 95.94, "Tc" => 98.0, "Ru" => 101.07, "Rh" => 102.9055, "Pd" => 106.42,
    "Ag" => 107.8682, "Cd" => 112.411, "In" => 114.818, "Sn" => 118.71, "Sb" => 121.76,
    "Te" => 127.6, "I" => 126.90447, "Xe" => 131.293,
    "Cs" => 132.90545, "Ba" => 137.327,
    "La" => 138.9055, "Ce" => 140.116, "Pr" => 140.90765, "Nd" => 144.24, "Pm" => 145.0,
    "Sm" => 150.36, "Eu" => 151.964, "Gd" => 157.25, "Tb" => 158.92534, "Dy" => 162.5,
    "Ho" => 164.93032, "Er" => 167.259, "Tm" => 168.93421, "Yb" => 173.04, "Lu" => 174.967,
    "Hf" => 178.49, "Ta" => 180.9479, "W" => 183.84, "Re" => 186.207, "Os" => 190.23,
    "Ir" => 192.217, "Pt" => 195.078, "Au" => 196.96655, "Hg" => 200.59,
    "Tl" => 204.3833, "Pb" => 207.2, "Bi" => 208.98038, "Po" => 209.0, "At" => 210.0,
    "Rn" => 222.0,
    "Fr" => 223.0, "Ra" => 226.0,
    "Ac" => 227.0, "Th" => 232.0381, "Pa" => 231.03588, "U" => 238.02891, "Np" => 237.0,
    "Pu" => 244.0, "Am" => 243.0, "Cm" => 247.0, "Bk" => 247.0, "Cf" => 251.0,
};

/// Properties of a standard amino-acid residue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueInfo {
    pub name: &'static str,
    pub code: char,
    /// Residue mass in Daltons, as incorporated in a chain.
    pub mass: f64,
}

pub static RESIDUES: Map<&'static str, ResidueInfo> = phf_map! {
    "GLY" => ResidueInfo { name: "Glycine", code: 'G', mass: 57.05 },
    "PRO" => ResidueInfo { name: "Proline", code: 'P', mass: 97.12 },
    "ALA" => ResidueInfo { name: "Alanine", code: 'A', mass: 71.09 },
    "VAL" => ResidueInfo { name: "Valine", code: 'V', mass: 99.14 },
    "LEU" => ResidueInfo { name: "Leucine", code: 'L', mass: 113.16 },
    "ILE" => ResidueInfo { name: "Isoleucine", code: 'I', mass: 113.16 },
    "MET" => ResidueInfo { name: "Methionine", code: 'M', mass: 131.19 },
    "CYS" => ResidueInfo { name: "Cysteine", code: 'C', mass: 103.15 },
    "PHE" => ResidueInfo { name: "Phenylalanine", code: 'F', mass: 147.18 },
    "TYR" => ResidueInfo { name: "Tyrosine", code: 'Y', mass: 163.18 },
    "TRP" => ResidueInfo { name: "Tryptophan", code: 'W', mass: 186.12 },
    "HIS" => ResidueInfo { name: "Histidine", code: 'H', mass: 137.14 },
    "LYS" => ResidueInfo { name: "Lysine", code: 'K', mass: 128.17 },
    "ARG" => ResidueInfo { name: "Arginine", code: 'R', mass: 156.19 },
    "GLN" => ResidueInfo { name: "Glutamine", code: 'Q', mass: 128.14 },
    "ASN" => ResidueInfo { name: "Asparagine", code: 'N', mass: 115.09 },
    "GLU" => ResidueInfo { name: "Glutamic Acid", code: 'E', mass: 129.12 },
    "ASP" => ResidueInfo { name: "Aspartic Acid", code: 'D', mass: 114.11 },
    "SER" => ResidueInfo { name: "Serine", code: 'S', mass: 87.08 },
    "THR" => ResidueInfo { name: "Threonine", code: 'T', mass: 101.11 },
};

pub fn residue_info(residue: &str) -> Option<&'static ResidueInfo> {
    RESIDUES.get(residue.trim())
}

/// Source of atomic masses for mass-weighted calculations.
pub trait MassLookup {
    /// Mass in Daltons of the element with the given symbol, if known.
    fn mass_of(&self, symbol: &str) -> Option<f64>;
}

#[derive(Debug, Error)]
pub enum ElementTableError {
    #[error("Failed to read mass table '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid mass table TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Mass for '{symbol}' must be a positive number (got {mass})")]
    InvalidMass { symbol: String, mass: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MassTableFile {
    #[serde(default)]
    masses: HashMap<String, f64>,
}

/// Built-in periodic table with optional per-symbol overrides.
#[derive(Debug, Clone, Default)]
pub struct PeriodicTable {
    overrides: HashMap<String, f64>,
}

impl PeriodicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table whose `[masses]` entries take precedence over the built-in values.
    pub fn from_toml_str(content: &str) -> Result<Self, ElementTableError> {
        let file: MassTableFile = toml::from_str(content)?;
        let mut table = Self::new();
        for (symbol, mass) in file.masses {
            table.set_mass(&symbol, mass)?;
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, ElementTableError> {
        let content = std::fs::read_to_string(path).map_err(|e| ElementTableError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let table = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} mass overrides from {}",
            table.overrides.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn set_mass(&mut self, symbol: &str, mass: f64) -> Result<(), ElementTableError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ElementTableError::InvalidMass {
                symbol: symbol.to_string(),
                mass,
            });
        }
        self.overrides.insert(canonical_symbol(symbol), mass);
        Ok(())
    }
}

impl MassLookup for PeriodicTable {
    fn mass_of(&self, symbol: &str) -> Option<f64> {
        let symbol = canonical_symbol(symbol);
        self.overrides
            .get(&symbol)
            .copied()
            .or_else(|| ATOMIC_MASSES.get(symbol.as_str()).copied())
    }
}

/// Capitalises a symbol the way the table stores it: "FE" and "fe" become "Fe".
///
/// Lookups are therefore case-insensitive. Upper-case element columns such as
/// `FE` or `SE` resolve to iron and selenium rather than going unresolved, so
/// masses differ from a case-sensitive lookup for files written that way.
pub fn canonical_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
