//! Periodic image resolution and cycle bookkeeping.
//!
//! Every edge carries an integer image shift; the shift of `a → b` is the
//! negation of `b → a`. For bonds supplied without a shift, the resolver
//! picks the minimum-distance image, breaking distance ties by the
//! lexicographically smallest shift so repeated runs agree.

use std::collections::{HashMap, HashSet, VecDeque};

use super::bonding::image_distance_sq;
use super::error::Error;
use super::graph::{BondSpec, ConnectivityGraph, Edge};
use crate::model::structure::Structure;
use crate::model::types::CellShift;

const DISTANCE_TIE_EPS: f64 = 1e-10;

pub fn resolve(structure: &Structure, specs: Vec<BondSpec>) -> Result<ConnectivityGraph, Error> {
    let mut graph = ConnectivityGraph::new(structure.atoms.len());
    let mut seen: HashSet<(usize, usize, CellShift)> = HashSet::new();

    for spec in specs {
        let shift = match spec.shift {
            Some(shift) => shift,
            None => minimum_image(structure, spec.i, spec.j).0,
        };

        let (i, j, shift) = normalize(spec.i, spec.j, shift);
        if i == j && shift.is_zero() {
            return Err(Error::invalid_bond(
                i,
                j,
                "bonds an atom to itself within the same cell",
            ));
        }

        if seen.insert((i, j, shift)) {
            graph.push_edge(Edge {
                i,
                j,
                shift,
                order: spec.order,
            });
        }
    }

    Ok(graph)
}

/// Canonical storage orientation: `i <= j`, loops lexicographically positive.
fn normalize(i: usize, j: usize, shift: CellShift) -> (usize, usize, CellShift) {
    if i > j {
        (j, i, -shift)
    } else if i == j && shift < CellShift::ZERO {
        (i, j, -shift)
    } else {
        (i, j, shift)
    }
}

/// Minimum-image shift and distance from atom `i` to atom `j`.
///
/// Starts from the rounded fractional separation and scans the surrounding
/// 3×3×3 block of images, which also covers strongly skewed cells. Distance
/// ties resolve to the lexicographically smallest shift.
pub fn minimum_image(structure: &Structure, i: usize, j: usize) -> (CellShift, f64) {
    let cell = &structure.cell;
    let fi = cell.to_fractional(structure.atoms[i].position);
    let fj = cell.to_fractional(structure.atoms[j].position);
    let base = [
        -(fj[0] - fi[0]).round() as i32,
        -(fj[1] - fi[1]).round() as i32,
        -(fj[2] - fi[2]).round() as i32,
    ];

    let mut best: Option<(CellShift, f64)> = None;
    for du in -1..=1 {
        for dv in -1..=1 {
            for dw in -1..=1 {
                let shift = CellShift::new(base[0] + du, base[1] + dv, base[2] + dw);
                let d_sq = image_distance_sq(structure, i, j, shift);
                best = Some(match best {
                    None => (shift, d_sq),
                    Some((s, d)) => {
                        if d_sq < d - DISTANCE_TIE_EPS
                            || ((d_sq - d).abs() <= DISTANCE_TIE_EPS && shift < s)
                        {
                            (shift, d_sq)
                        } else {
                            (s, d)
                        }
                    }
                });
            }
        }
    }

    let (shift, d_sq) = best.expect("image scan is never empty");
    (shift, d_sq.sqrt())
}

/// Unwraps a connected atom set: assigns each atom the cumulative image
/// shift of the traversal that reached it, and collects the nonzero cycle
/// defects found on back edges. A nonzero defect means a cycle's shifts sum
/// to a lattice translation instead of zero.
pub fn unwrap_component(
    graph: &ConnectivityGraph,
    atoms: &[usize],
) -> (Vec<CellShift>, Vec<CellShift>) {
    let positions: HashMap<usize, usize> = atoms
        .iter()
        .enumerate()
        .map(|(local, &atom)| (atom, local))
        .collect();

    let mut shifts = vec![CellShift::ZERO; atoms.len()];
    let mut visited = vec![false; atoms.len()];
    let mut defects: Vec<CellShift> = Vec::new();

    // Fragments are connected, but walk every root so stray input still
    // terminates.
    for root in 0..atoms.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut queue = VecDeque::from([root]);

        while let Some(local) = queue.pop_front() {
            for neighbor in graph.neighbors(atoms[local]) {
                let Some(&other) = positions.get(&neighbor.atom) else {
                    continue;
                };
                let reached = shifts[local] + neighbor.shift;
                if !visited[other] {
                    visited[other] = true;
                    shifts[other] = reached;
                    queue.push_back(other);
                } else {
                    let defect = reached - shifts[other];
                    if !defect.is_zero() {
                        let canonical = if defect < CellShift::ZERO { -defect } else { defect };
                        if !defects.contains(&canonical) {
                            defects.push(canonical);
                        }
                    }
                }
            }
        }
    }

    (shifts, defects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::cell::UnitCell;
    use crate::model::types::BondOrder;

    fn cubic_structure(a: f64) -> Structure {
        let cell =
            UnitCell::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]).unwrap();
        Structure::new(cell)
    }

    fn spec(i: usize, j: usize, shift: Option<CellShift>) -> BondSpec {
        BondSpec {
            i,
            j,
            order: BondOrder::Single,
            shift,
        }
    }

    #[test]
    fn resolves_missing_shift_to_minimum_image() {
        let mut s = cubic_structure(10.0);
        s.atoms.push(Atom::new(crate::Element::Zn, [0.5, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::O, [9.5, 0.0, 0.0]));

        let graph = resolve(&s, vec![spec(0, 1, None)]).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].shift, CellShift::new(-1, 0, 0));

        let (_, distance) = minimum_image(&s, 0, 1);
        assert!((distance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn minimum_image_tie_breaks_lexicographically() {
        // Two atoms half a cell apart: the +x and -x images are equidistant.
        let mut s = cubic_structure(10.0);
        s.atoms.push(Atom::new(crate::Element::C, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [5.0, 0.0, 0.0]));

        let (shift, distance) = minimum_image(&s, 0, 1);
        assert_eq!(shift, CellShift::new(-1, 0, 0));
        assert!((distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn normalizes_edge_direction() {
        let mut s = cubic_structure(10.0);
        s.atoms.push(Atom::new(crate::Element::C, [0.5, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [9.5, 0.0, 0.0]));

        let graph = resolve(
            &s,
            vec![spec(1, 0, Some(CellShift::new(1, 0, 0)))],
        )
        .unwrap();
        let edge = &graph.edges[0];
        assert_eq!((edge.i, edge.j), (0, 1));
        assert_eq!(edge.shift, CellShift::new(-1, 0, 0));
    }

    #[test]
    fn duplicate_bonds_collapse() {
        let mut s = cubic_structure(10.0);
        s.atoms.push(Atom::new(crate::Element::C, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [1.5, 0.0, 0.0]));

        let graph = resolve(
            &s,
            vec![
                spec(0, 1, Some(CellShift::ZERO)),
                spec(1, 0, Some(CellShift::ZERO)),
            ],
        )
        .unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn parallel_images_remain_distinct_edges() {
        let mut s = cubic_structure(10.0);
        s.atoms.push(Atom::new(crate::Element::C, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [5.0, 0.0, 0.0]));

        let graph = resolve(
            &s,
            vec![
                spec(0, 1, Some(CellShift::ZERO)),
                spec(0, 1, Some(CellShift::new(-1, 0, 0))),
            ],
        )
        .unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn unwrap_assigns_cumulative_shifts() {
        // 0 —(0)— 1 —(+x)— 2: atom 2 is reached in the next cell over.
        let mut s = cubic_structure(10.0);
        s.atoms.push(Atom::new(crate::Element::C, [7.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [8.5, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [0.0, 0.0, 0.0]));

        let graph = resolve(
            &s,
            vec![
                spec(0, 1, Some(CellShift::ZERO)),
                spec(1, 2, Some(CellShift::new(1, 0, 0))),
            ],
        )
        .unwrap();

        let (shifts, defects) = unwrap_component(&graph, &[0, 1, 2]);
        assert_eq!(shifts, vec![
            CellShift::ZERO,
            CellShift::ZERO,
            CellShift::new(1, 0, 0),
        ]);
        assert!(defects.is_empty());
    }

    #[test]
    fn unwrap_reports_cycle_defect() {
        // A loop edge: the atom bonds its own +x image, so the one-edge
        // cycle sums to a lattice vector.
        let mut s = cubic_structure(2.0);
        s.atoms.push(Atom::new(crate::Element::C, [0.0, 0.0, 0.0]));

        let graph = resolve(&s, vec![spec(0, 0, Some(CellShift::new(1, 0, 0)))]).unwrap();
        let (_, defects) = unwrap_component(&graph, &[0]);
        assert_eq!(defects, vec![CellShift::new(1, 0, 0)]);
    }

    #[test]
    fn consistent_ring_has_no_defect() {
        // Triangle fully inside one cell.
        let mut s = cubic_structure(20.0);
        s.atoms.push(Atom::new(crate::Element::C, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [1.5, 0.0, 0.0]));
        s.atoms.push(Atom::new(crate::Element::C, [0.75, 1.3, 0.0]));

        let graph = resolve(
            &s,
            vec![
                spec(0, 1, Some(CellShift::ZERO)),
                spec(1, 2, Some(CellShift::ZERO)),
                spec(0, 2, Some(CellShift::ZERO)),
            ],
        )
        .unwrap();
        let (_, defects) = unwrap_component(&graph, &[0, 1, 2]);
        assert!(defects.is_empty());
    }
}
