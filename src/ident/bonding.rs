//! Bond perception: builds the list of bonds from atom positions, elements,
//! and the periodic cell.
//!
//! The default policy bonds a pair when the distance to some periodic image
//! is strictly below the covalent radius sum plus the tolerance; exact-cutoff
//! distances never bond, keeping perception deterministic. A structure that
//! carries an explicit bond list bypasses the distance search entirely.

use super::config::BondingPolicy;
use super::error::Error;
use super::graph::BondSpec;
use super::tables::ChemTable;
use crate::model::record::Diagnostic;
use crate::model::structure::Structure;
use crate::model::types::{BondOrder, CellShift, Element};

pub fn perceive_bonds(
    structure: &Structure,
    chem: &ChemTable,
    policy: &BondingPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<BondSpec>, Error> {
    if structure.atoms.is_empty() {
        return Err(Error::EmptyStructure);
    }
    for (idx, atom) in structure.atoms.iter().enumerate() {
        if !atom.position.iter().all(|c| c.is_finite()) {
            return Err(Error::NonFiniteCoordinate { atom: idx });
        }
    }

    match &structure.bonds {
        Some(bonds) => from_explicit(structure, bonds),
        None => Ok(from_distances(structure, chem, policy, diagnostics)),
    }
}

fn from_explicit(
    structure: &Structure,
    bonds: &[crate::model::structure::ExplicitBond],
) -> Result<Vec<BondSpec>, Error> {
    let n = structure.atoms.len();
    let mut specs = Vec::with_capacity(bonds.len());

    for bond in bonds {
        if bond.i >= n || bond.j >= n {
            return Err(Error::invalid_bond(
                bond.i,
                bond.j,
                format!("atom index out of bounds (atom count = {})", n),
            ));
        }
        if bond.i == bond.j && bond.shift.map_or(true, |s| s.is_zero()) {
            return Err(Error::invalid_bond(
                bond.i,
                bond.j,
                "bonds an atom to itself within the same cell",
            ));
        }
        specs.push(BondSpec {
            i: bond.i,
            j: bond.j,
            order: bond.order,
            shift: bond.shift,
        });
    }

    Ok(specs)
}

fn from_distances(
    structure: &Structure,
    chem: &ChemTable,
    policy: &BondingPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<BondSpec> {
    let atoms = &structure.atoms;
    let cell = &structure.cell;

    let search_cutoff = max_cutoff(atoms.iter().map(|a| a.element), chem, policy);
    let widths = cell.perpendicular_widths();
    let range: Vec<i32> = widths
        .iter()
        .map(|w| (search_cutoff / w).ceil() as i32)
        .collect();

    let min_sq = policy.min_distance * policy.min_distance;
    let mut specs = Vec::new();

    for i in 0..atoms.len() {
        for j in i..atoms.len() {
            let cutoff = pair_cutoff(chem, policy, atoms[i].element, atoms[j].element);
            let cutoff_sq = cutoff * cutoff;

            for du in -range[0]..=range[0] {
                for dv in -range[1]..=range[1] {
                    for dw in -range[2]..=range[2] {
                        let shift = CellShift::new(du, dv, dw);
                        // A self-pair sees each image twice; keep only the
                        // lexicographically positive representative.
                        if i == j && shift <= CellShift::ZERO {
                            continue;
                        }

                        let d_sq = image_distance_sq(structure, i, j, shift);
                        if d_sq < min_sq {
                            diagnostics.push(Diagnostic::OverlappingAtoms {
                                i,
                                j,
                                distance: d_sq.sqrt(),
                            });
                            continue;
                        }
                        if d_sq < cutoff_sq {
                            specs.push(BondSpec {
                                i,
                                j,
                                order: BondOrder::Single,
                                shift: Some(shift),
                            });
                        }
                    }
                }
            }
        }
    }

    specs
}

pub fn pair_cutoff(chem: &ChemTable, policy: &BondingPolicy, a: Element, b: Element) -> f64 {
    chem.cutoff_override(a, b)
        .unwrap_or(a.covalent_radius() + b.covalent_radius() + policy.tolerance)
}

fn max_cutoff(
    elements: impl Iterator<Item = Element>,
    chem: &ChemTable,
    policy: &BondingPolicy,
) -> f64 {
    let max_radius = elements
        .map(|e| e.covalent_radius())
        .fold(0.0_f64, f64::max);
    let radius_based = 2.0 * max_radius + policy.tolerance;
    chem.max_cutoff_override()
        .map_or(radius_based, |o| o.max(radius_based))
}

pub fn image_distance_sq(structure: &Structure, i: usize, j: usize, shift: CellShift) -> f64 {
    let pi = structure.atoms[i].position;
    let pj = structure.atoms[j].position;
    let t = structure.cell.shift_vector(shift);
    let dx = pj[0] + t[0] - pi[0];
    let dy = pj[1] + t[1] - pi[1];
    let dz = pj[2] + t[2] - pi[2];
    dx * dx + dy * dy + dz * dz
}
