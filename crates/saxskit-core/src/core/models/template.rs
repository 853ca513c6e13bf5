use super::atom::{AtomKind, AtomRecord};
use super::field::{AtomField, FieldKind};
use nalgebra::Point3;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("New atoms have no property '{0}'")]
    UnknownProperty(String),
    #[error("Could not set '{field}' to '{value}'")]
    InvalidValue { field: AtomField, value: String },
}

/// The blueprint used when atoms are added to a table programmatically.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomTemplate {
    atom: AtomRecord,
}

impl Default for AtomTemplate {
    fn default() -> Self {
        Self {
            atom: AtomRecord {
                kind: AtomKind::Atom,
                serial_no: Some(1),
                atom_name: "CA".to_string(),
                alternate: String::new(),
                residue: "ALA".to_string(),
                chain: "A".to_string(),
                residue_no: Some(1),
                icode: String::new(),
                x: Some(0.0),
                y: Some(0.0),
                z: Some(0.0),
                occupancy: Some(1.0),
                bfactor: Some(20.0),
                element: "C".to_string(),
                charge: String::new(),
                line_width: None,
            },
        }
    }
}

impl AtomTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self) -> &AtomRecord {
        &self.atom
    }

    /// Sets one template field from text, converting it by the field's kind.
    ///
    /// `property` is a field name such as `"residue_no"` or `"bfactor"`.
    pub fn set_property(&mut self, property: &str, value: &str) -> Result<(), TemplateError> {
        let field: AtomField = property
            .parse()
            .map_err(|_| TemplateError::UnknownProperty(property.to_string()))?;
        let invalid = || TemplateError::InvalidValue {
            field,
            value: value.to_string(),
        };
        let trimmed = value.trim();

        match field.kind() {
            FieldKind::Integer => {
                let parsed: i64 = trimmed.parse().map_err(|_| invalid())?;
                match field {
                    AtomField::SerialNo => self.atom.serial_no = Some(parsed),
                    _ => self.atom.residue_no = Some(parsed),
                }
            }
            FieldKind::Float { .. } => {
                let parsed: f64 = trimmed.parse().map_err(|_| invalid())?;
                let slot = match field {
                    AtomField::X => &mut self.atom.x,
                    AtomField::Y => &mut self.atom.y,
                    AtomField::Z => &mut self.atom.z,
                    AtomField::Occupancy => &mut self.atom.occupancy,
                    _ => &mut self.atom.bfactor,
                };
                *slot = Some(parsed);
            }
            FieldKind::Text => match field {
                AtomField::RecordType => {
                    self.atom.kind = AtomKind::from_record_type(trimmed).ok_or_else(invalid)?;
                }
                AtomField::AtomName => self.atom.atom_name = trimmed.to_string(),
                AtomField::Alternate => self.atom.alternate = trimmed.to_string(),
                AtomField::Residue => self.atom.residue = trimmed.to_string(),
                AtomField::Chain => self.atom.chain = trimmed.to_string(),
                AtomField::Icode => self.atom.icode = trimmed.to_string(),
                AtomField::Element => self.atom.element = trimmed.to_string(),
                _ => self.atom.charge = trimmed.to_string(),
            },
        }
        info!("Set new-atom property {} to {}", field, trimmed);
        Ok(())
    }

    /// Builds a record from the template, overriding position and b-factor if given.
    pub fn instantiate(&self, position: Option<Point3<f64>>, bfactor: Option<f64>) -> AtomRecord {
        let mut atom = self.atom.clone();
        if let Some(position) = position {
            atom.set_position(position);
        }
        if let Some(bfactor) = bfactor {
            atom.bfactor = Some(bfactor);
        }
        atom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_an_alanine_alpha_carbon() {
        let atom = AtomTemplate::default().instantiate(None, None);
        assert_eq!(atom.kind, AtomKind::Atom);
        assert_eq!(atom.atom_name, "CA");
        assert_eq!(atom.residue, "ALA");
        assert_eq!(atom.chain, "A");
        assert_eq!(atom.occupancy, Some(1.0));
        assert_eq!(atom.bfactor, Some(20.0));
        assert_eq!(atom.element, "C");
    }

    #[test]
    fn set_property_converts_by_field_kind() {
        let mut template = AtomTemplate::new();
        template.set_property("residue_no", "42").unwrap();
        template.set_property("bfactor", " 55.5 ").unwrap();
        template.set_property("residue", "GLY").unwrap();
        template.set_property("record_type", "HETATM").unwrap();

        let atom = template.atom();
        assert_eq!(atom.residue_no, Some(42));
        assert_eq!(atom.bfactor, Some(55.5));
        assert_eq!(atom.residue, "GLY");
        assert_eq!(atom.kind, AtomKind::Hetatm);
    }

    #[test]
    fn set_property_rejects_unknown_names_and_bad_values() {
        let mut template = AtomTemplate::new();
        assert_eq!(
            template.set_property("mass", "12"),
            Err(TemplateError::UnknownProperty("mass".to_string()))
        );
        assert!(matches!(
            template.set_property("serial_no", "one"),
            Err(TemplateError::InvalidValue {
                field: AtomField::SerialNo,
                ..
            })
        ));
        assert!(template.set_property("record_type", "REMARK").is_err());
        assert_eq!(template, AtomTemplate::default());
    }

    #[test]
    fn instantiate_does_not_modify_the_template() {
        let template = AtomTemplate::new();
        let atom = template.instantiate(Some(Point3::new(5.0, 6.0, 7.0)), Some(99.0));
        assert_eq!(atom.x, Some(5.0));
        assert_eq!(atom.bfactor, Some(99.0));
        assert_eq!(template.atom().x, Some(0.0));
        assert_eq!(template.atom().bfactor, Some(20.0));
    }
}
