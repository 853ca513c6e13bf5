use crate::cli::{InfoArgs, PdbArgs, PdbCommands, SymmToZArgs, TransformArgs};
use crate::error::{CliError, Result};
use saxskit::core::elements::PeriodicTable;
use saxskit::core::io::pdb::{PdbFile, PdbWriteOptions};
use saxskit::core::io::traits::RecordFile;
use saxskit::core::models::table::RecordTable;
use saxskit::ops::mass::{self, MassUnit};
use saxskit::ops::residues::{self, ExtinctionUnit};
use saxskit::ops::transform::{self, Rotation, SymmetryAxisOptions};
use std::path::Path;
use tracing::info;

pub fn run(args: PdbArgs) -> Result<()> {
    match args.command {
        PdbCommands::Transform(args) => {
            info!("Dispatching to 'pdb transform' command.");
            run_transform(&args)
        }
        PdbCommands::Info(args) => {
            info!("Dispatching to 'pdb info' command.");
            run_info(&args)
        }
        PdbCommands::SymmToZ(args) => {
            info!("Dispatching to 'pdb symm-to-z' command.");
            run_symm_to_z(&args)
        }
    }
}

fn load_structure(path: &Path) -> Result<RecordTable> {
    info!("Loading input structure from {:?}", path);
    PdbFile::read_from_path(path).map_err(|e| CliError::parsing(path, e))
}

fn load_masses(path: Option<&Path>) -> Result<PeriodicTable> {
    match path {
        Some(path) => {
            info!("Loading element mass overrides from {:?}", path);
            Ok(PeriodicTable::load(path)?)
        }
        None => Ok(PeriodicTable::new()),
    }
}

/// Applies the requested transforms in order: centre, translate, rotate,
/// scale, invert, rename chain.
pub fn apply_transforms(table: &mut RecordTable, args: &TransformArgs) -> Result<()> {
    if args.center {
        let masses = load_masses(args.masses.as_deref())?;
        let offset = transform::center_on_origin(table, &masses)?;
        info!(
            "Centred structure by ({:.3}, {:.3}, {:.3})",
            offset.x, offset.y, offset.z
        );
    }

    if let Some(text) = &args.translate {
        let offset = transform::parse_translation(text)?;
        transform::translate(table, &offset);
    }

    let origin = args
        .origin
        .as_deref()
        .map(transform::parse_point)
        .transpose()?;
    let rotation = match (&args.rotate, &args.matrix) {
        (Some(text), _) => Some(text.parse::<Rotation>()?),
        (None, Some(text)) => Some(Rotation::Matrix(transform::parse_matrix(text)?)),
        (None, None) => None,
    };
    if let Some(rotation) = rotation {
        transform::rotate(table, &rotation, origin.as_ref());
    } else if origin.is_some() {
        return Err(CliError::Argument(
            "--origin only applies together with --rotate or --matrix".to_string(),
        ));
    }

    if let Some(text) = &args.scale {
        let factor = transform::parse_scale_factor(text)?;
        transform::scale(table, factor)?;
    }

    if args.invert {
        transform::invert(table);
    }

    if let Some(pair) = &args.rename_chain {
        let (old, new) = pair.split_once(':').ok_or_else(|| {
            CliError::Argument(format!(
                "Invalid --rename-chain value '{}'. Expected OLD:NEW.",
                pair
            ))
        })?;
        let renamed = transform::rename_chain(table, old, new)?;
        info!("Renamed chain {} to {} on {} atoms", old, new, renamed);
    }

    Ok(())
}

fn run_transform(args: &TransformArgs) -> Result<()> {
    let mut table = load_structure(&args.input)?;
    apply_transforms(&mut table, args)?;

    let options = PdbWriteOptions {
        atoms_only: args.atoms_only,
    };
    PdbFile::write_with_to_path(&table, options, &args.output)
        .map_err(|e| CliError::writing(&args.output, e))?;
    println!(
        "✓ {} atoms written to: {}",
        table.atom_count(),
        args.output.display()
    );
    Ok(())
}

/// Summary lines printed by `pdb info`.
pub fn describe(table: &RecordTable, masses: &PeriodicTable) -> Result<Vec<String>> {
    let centre = mass::center_of_mass(table, masses)?;
    let daltons = mass::molecular_weight(table, masses, MassUnit::Dalton);
    let sequence = residues::sequence_string(table);

    let mut lines = vec![
        format!("Atoms:                   {}", table.atom_count()),
        format!(
            "Centre of mass:          {:.3} {:.3} {:.3}",
            centre.x, centre.y, centre.z
        ),
        format!(
            "Molecular weight:        {:.2} Da ({:.2} kDa)",
            daltons,
            MassUnit::KiloDalton.convert(daltons)
        ),
    ];
    if sequence.is_empty() {
        return Ok(lines);
    }
    lines.push(format!("Residues:                {}", sequence.len()));
    lines.push(format!("Sequence:                {}", sequence));
    lines.push(format!(
        "Estimated weight:        {:.1} kDa",
        residues::estimated_weight(table, MassUnit::KiloDalton)
    ));
    lines.push(format!(
        "Extinction coefficient:  {:.0} M^-1 cm^-1 ({:.3} per g/l)",
        residues::extinction_coefficient(table, ExtinctionUnit::Molar)?,
        residues::extinction_coefficient(table, ExtinctionUnit::Absorbance)?
    ));
    Ok(lines)
}

fn run_info(args: &InfoArgs) -> Result<()> {
    let table = load_structure(&args.input)?;
    let masses = load_masses(args.masses.as_deref())?;
    for line in describe(&table, &masses)? {
        println!("{}", line);
    }
    Ok(())
}

/// Builds the axis selection from `--chains A,B` and `--residues FROM-TO`.
pub fn symmetry_options(args: &SymmToZArgs) -> Result<SymmetryAxisOptions> {
    let chains = args.chains.as_deref().map(|text| {
        text.split(',')
            .map(str::trim)
            .filter(|chain| !chain.is_empty())
            .map(str::to_string)
            .collect()
    });
    let residue_range = args
        .residues
        .as_deref()
        .map(|text| {
            let bounds = text
                .split_once('-')
                .and_then(|(from, to)| Some((from.trim().parse::<i64>().ok()?, to.trim().parse::<i64>().ok()?)));
            bounds.ok_or_else(|| {
                CliError::Argument(format!(
                    "Invalid --residues value '{}'. Expected FROM-TO.",
                    text
                ))
            })
        })
        .transpose()?;
    Ok(SymmetryAxisOptions {
        chains,
        residue_range,
        reverse_alternate: args.reverse,
    })
}

fn run_symm_to_z(args: &SymmToZArgs) -> Result<()> {
    let options = symmetry_options(args)?;
    let mut table = load_structure(&args.input)?;

    let alignment = transform::align_symmetry_axis(&mut table, &options)?;
    println!(
        "Axis through chains {} over {} residues",
        alignment.chains.join(","),
        alignment.residues
    );
    println!(
        "Moved centre ({:.3}, {:.3}, {:.3}) to the origin",
        alignment.centre.x, alignment.centre.y, alignment.centre.z
    );

    let options = PdbWriteOptions {
        atoms_only: args.atoms_only,
    };
    PdbFile::write_with_to_path(&table, options, &args.output)
        .map_err(|e| CliError::writing(&args.output, e))?;
    println!(
        "✓ {} atoms written to: {}",
        table.atom_count(),
        args.output.display()
    );
    Ok(())
}
