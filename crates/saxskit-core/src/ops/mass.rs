use crate::core::elements::MassLookup;
use crate::core::models::atom::AtomRecord;
use crate::core::models::table::RecordTable;
use crate::core::utils::geometry::weighted_centroid;
use nalgebra::Point3;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MassError {
    #[error("No atom with a resolvable element and complete coordinates")]
    NoResolvableAtoms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MassUnit {
    Dalton,
    #[default]
    KiloDalton,
}

impl MassUnit {
    pub fn convert(self, daltons: f64) -> f64 {
        match self {
            MassUnit::Dalton => daltons,
            MassUnit::KiloDalton => daltons / 1000.0,
        }
    }
}

/// Mass of one atom, resolved from its element column or atom-name fallback.
pub fn atom_mass(atom: &AtomRecord, masses: &impl MassLookup) -> Option<f64> {
    atom.element_symbol().and_then(|symbol| masses.mass_of(symbol))
}

/// Tallies symbols that could not be resolved so each is reported once.
#[derive(Default)]
struct Unresolved(BTreeMap<String, usize>);

impl Unresolved {
    fn record(&mut self, atom: &AtomRecord) {
        let symbol = atom.element_symbol().unwrap_or("").to_string();
        *self.0.entry(symbol).or_default() += 1;
    }

    fn report(&self) {
        for (symbol, count) in &self.0 {
            warn!(
                symbol = symbol.as_str(),
                atoms = count,
                "Failed to find mass for element; atoms excluded"
            );
        }
    }
}

/// Mass-weighted centroid of every ATOM/HETATM record.
///
/// Atoms whose element cannot be resolved, or which lack a coordinate, are
/// left out of both the weighted sum and the total mass. The table is not
/// modified.
#[instrument(skip_all, name = "center_of_mass")]
pub fn center_of_mass(
    table: &RecordTable,
    masses: &impl MassLookup,
) -> Result<Point3<f64>, MassError> {
    let mut unresolved = Unresolved::default();
    let mut weighted = Vec::with_capacity(table.atom_count());

    for atom in table.atoms() {
        match (atom_mass(atom, masses), atom.position()) {
            (Some(mass), Some(position)) => weighted.push((position, mass)),
            (None, _) => unresolved.record(atom),
            (Some(_), None) => {}
        }
    }
    unresolved.report();

    let unresolved_count: usize = unresolved.0.values().sum();
    let skipped_positions = table.atom_count() - weighted.len() - unresolved_count;
    if skipped_positions > 0 {
        warn!(
            atoms = skipped_positions,
            "Atoms without complete coordinates excluded from centre of mass"
        );
    }

    let centre = weighted_centroid(&weighted).ok_or(MassError::NoResolvableAtoms)?;
    let total_mass: f64 = weighted.iter().map(|(_, m)| m).sum();
    info!(
        total_mass_kda = total_mass / 1000.0,
        "Centre of mass is {:.3},{:.3},{:.3}",
        centre.x,
        centre.y,
        centre.z
    );
    Ok(centre)
}

/// Sum of atomic masses over every ATOM/HETATM record.
///
/// Unresolvable elements are skipped with a warning. Coordinates are not
/// required.
pub fn molecular_weight(table: &RecordTable, masses: &impl MassLookup, unit: MassUnit) -> f64 {
    let mut unresolved = Unresolved::default();
    let mut total = 0.0;
    for atom in table.atoms() {
        match atom_mass(atom, masses) {
            Some(mass) => total += mass,
            None => unresolved.record(atom),
        }
    }
    unresolved.report();
    unit.convert(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elements::PeriodicTable;
    use crate::core::models::atom::AtomKind;

    fn atom(name: &str, element: &str, position: [f64; 3]) -> AtomRecord {
        let mut atom = AtomRecord::new(AtomKind::Atom);
        atom.atom_name = name.to_string();
        atom.element = element.to_string();
        atom.set_position(Point3::from(position));
        atom
    }

    struct FixedMasses;

    impl MassLookup for FixedMasses {
        fn mass_of(&self, symbol: &str) -> Option<f64> {
            match symbol {
                "C" => Some(12.0),
                "O" => Some(16.0),
                _ => None,
            }
        }
    }

    #[test]
    fn center_of_mass_weights_by_element() {
        let mut table = RecordTable::new();
        table.push(atom("C1", "C", [0.0, 0.0, 0.0]));
        table.push(atom("O1", "O", [7.0, 0.0, 0.0]));

        let centre = center_of_mass(&table, &FixedMasses).unwrap();
        assert!((centre.x - 4.0).abs() < 1e-12);
        assert_eq!(centre.y, 0.0);
    }

    #[test]
    fn center_of_mass_excludes_unresolved_elements_from_numerator_and_denominator() {
        let mut table = RecordTable::new();
        table.push(atom("C1", "C", [2.0, 2.0, 2.0]));
        table.push(atom("QQ", "Qq", [100.0, 100.0, 100.0]));

        let centre = center_of_mass(&table, &FixedMasses).unwrap();
        assert_eq!(centre, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn center_of_mass_fails_when_nothing_resolves() {
        let mut table = RecordTable::new();
        table.push(atom("QQ", "", [1.0, 1.0, 1.0]));
        assert_eq!(
            center_of_mass(&table, &FixedMasses),
            Err(MassError::NoResolvableAtoms)
        );
        assert_eq!(
            center_of_mass(&RecordTable::new(), &FixedMasses),
            Err(MassError::NoResolvableAtoms)
        );
    }

    #[test]
    fn atom_name_fallback_treats_ca_as_carbon() {
        let table = PeriodicTable::new();
        let alpha_carbon = atom("CA", "", [0.0; 3]);
        assert_eq!(atom_mass(&alpha_carbon, &table), Some(12.0107));
    }

    #[test]
    fn molecular_weight_sums_resolvable_atoms_in_requested_unit() {
        let mut table = RecordTable::new();
        table.push(atom("C1", "C", [0.0; 3]));
        table.push(atom("O1", "O", [0.0; 3]));
        table.push(atom("XX", "Xx", [0.0; 3]));

        assert_eq!(molecular_weight(&table, &FixedMasses, MassUnit::Dalton), 28.0);
        let kda = molecular_weight(&table, &FixedMasses, MassUnit::KiloDalton);
        assert!((kda - 0.028).abs() < 1e-15);
    }
}
