//! Node/linker partitioning.
//!
//! Bonds between metal and nonmetal atoms are the cut set. Before cutting,
//! the attachment rule claims nonmetal atoms for the node side: atoms of the
//! configured attach elements (oxygen by default) that bond a metal
//! directly, together with their hydrogens, plus detached bridging species
//! (single atoms, hydroxyls, water, O3 by default) that coordinate a metal.
//! Node fragments are then the connected components of the node-side atoms
//! under the full, uncut bond set, so metal–oxo bonds stay inside the node.

use std::collections::VecDeque;

use super::error::Error;
use super::graph::ConnectivityGraph;
use super::periodic::unwrap_component;
use super::tables::{ChemTable, Composition};
use crate::model::fragment::{Fragment, FragmentKind};
use crate::model::record::Diagnostic;
use crate::model::structure::Structure;
use crate::model::types::{CellShift, Element};

/// A fragment plus the per-atom unwrap shifts (aligned with
/// `fragment.atoms`) the later stages need for centroids and net offsets.
#[derive(Debug, Clone)]
pub struct FragmentData {
    pub fragment: Fragment,
    pub shifts: Vec<CellShift>,
}

impl FragmentData {
    /// Unwrap shift of a structure atom within this fragment.
    pub fn shift_of(&self, atom: usize) -> Option<CellShift> {
        self.fragment
            .atoms
            .binary_search(&atom)
            .ok()
            .map(|pos| self.shifts[pos])
    }
}

/// Result of the partitioning stage.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Fragments ordered by their lowest atom index.
    pub fragments: Vec<FragmentData>,
    /// Fragment index per atom; `None` for dropped junk atoms.
    pub atom_fragment: Vec<Option<usize>>,
    /// Edges whose endpoints lie in different fragments (the surviving cut
    /// bonds).
    pub inter_edges: Vec<usize>,
}

pub fn decompose(
    structure: &Structure,
    graph: &ConnectivityGraph,
    chem: &ChemTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Partition, Error> {
    let n = structure.atoms.len();
    let metal: Vec<bool> = structure
        .atoms
        .iter()
        .map(|a| chem.is_metal(a.element))
        .collect();

    if !metal.iter().any(|&m| m) {
        return Err(Error::NoMetalAtoms);
    }

    let node_side = mark_node_side(structure, graph, chem, &metal);

    // Components of the remaining atoms, ignoring every bond that touches
    // the node side.
    let mut groups: Vec<(FragmentKind, Vec<usize>, bool)> = Vec::new();
    let mut junk: Vec<usize> = Vec::new();
    let mut claimed = node_side.clone();

    for start in 0..n {
        if claimed[start] {
            continue;
        }
        let component = collect_component(graph, &claimed, start);
        for &atom in &component {
            claimed[atom] = true;
        }

        let touches_node = component.iter().any(|&a| {
            graph
                .neighbors(a)
                .iter()
                .any(|nb| node_side[nb.atom])
        });

        if touches_node && chem.is_bridging(&composition(structure, &component)) {
            // Node material; merged below through the full bond set.
            continue;
        }

        if component.len() == 1 && graph.incident_edges(component[0]).is_empty() {
            junk.push(component[0]);
            continue;
        }

        groups.push((FragmentKind::Linker, component, !touches_node));
    }

    // Everything that is neither a linker component nor junk is node
    // material: metals, attached atoms, and the bridging species skipped
    // above.
    let mut full_node_side = vec![true; n];
    for (_, component, _) in &groups {
        for &atom in component {
            full_node_side[atom] = false;
        }
    }
    for &atom in &junk {
        full_node_side[atom] = false;
    }

    // Node fragments: components of node-side atoms under all bonds.
    let mut visited: Vec<bool> = (0..n)
        .map(|a| !full_node_side[a])
        .collect();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let component = collect_component(graph, &visited, start);
        for &atom in &component {
            visited[atom] = true;
        }
        groups.push((FragmentKind::Node, component, false));
    }

    groups.sort_by_key(|(_, atoms, _)| atoms[0]);

    let mut fragments = Vec::with_capacity(groups.len());
    let mut atom_fragment = vec![None; n];
    for (idx, (kind, atoms, unbound)) in groups.into_iter().enumerate() {
        for &atom in &atoms {
            atom_fragment[atom] = Some(idx);
        }

        let (shifts, defects) = unwrap_component(graph, &atoms);
        for defect in defects {
            diagnostics.push(Diagnostic::TopologyInconsistency {
                fragment: idx,
                defect,
            });
        }

        let centroid = fragment_centroid(structure, &atoms, &shifts);
        if unbound {
            diagnostics.push(Diagnostic::UnboundLinker { fragment: idx });
        }

        fragments.push(FragmentData {
            fragment: Fragment {
                kind,
                atoms,
                unbound,
                centroid,
            },
            shifts,
        });
    }

    if !junk.is_empty() {
        junk.sort_unstable();
        diagnostics.push(Diagnostic::IsolatedAtoms { atoms: junk });
    }

    let inter_edges = graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            match (atom_fragment[e.i], atom_fragment[e.j]) {
                (Some(u), Some(v)) => u != v,
                _ => false,
            }
        })
        .map(|(idx, _)| idx)
        .collect();

    Ok(Partition {
        fragments,
        atom_fragment,
        inter_edges,
    })
}

/// Metal atoms plus directly attached atoms claimed by the attachment rule.
fn mark_node_side(
    structure: &Structure,
    graph: &ConnectivityGraph,
    chem: &ChemTable,
    metal: &[bool],
) -> Vec<bool> {
    let mut node_side = metal.to_vec();
    let mut attached: Vec<usize> = Vec::new();

    for atom in 0..structure.atoms.len() {
        if metal[atom] || !chem.is_attach_element(structure.atoms[atom].element) {
            continue;
        }
        if graph.neighbors(atom).iter().any(|nb| metal[nb.atom]) {
            node_side[atom] = true;
            attached.push(atom);
        }
    }

    // Hydroxyls: hydrogens riding on an attached atom follow it.
    for &atom in &attached {
        for nb in graph.neighbors(atom) {
            if structure.atoms[nb.atom].element == Element::H {
                node_side[nb.atom] = true;
            }
        }
    }

    node_side
}

/// Connected component containing `start`, walking only unclaimed atoms.
fn collect_component(
    graph: &ConnectivityGraph,
    claimed: &[bool],
    start: usize,
) -> Vec<usize> {
    let mut component = vec![start];
    let mut seen = vec![false; graph.atom_count()];
    seen[start] = true;
    let mut queue = VecDeque::from([start]);

    while let Some(atom) = queue.pop_front() {
        for nb in graph.neighbors(atom) {
            if !seen[nb.atom] && !claimed[nb.atom] {
                seen[nb.atom] = true;
                component.push(nb.atom);
                queue.push_back(nb.atom);
            }
        }
    }

    component.sort_unstable();
    component
}

fn composition(structure: &Structure, atoms: &[usize]) -> Composition {
    let mut out = Composition::new();
    for &atom in atoms {
        *out.entry(structure.atoms[atom].element).or_insert(0) += 1;
    }
    out
}

fn fragment_centroid(
    structure: &Structure,
    atoms: &[usize],
    shifts: &[CellShift],
) -> [f64; 3] {
    let mut sum = [0.0_f64; 3];
    for (&atom, &shift) in atoms.iter().zip(shifts) {
        let p = structure.atoms[atom].position;
        let t = structure.cell.shift_vector(shift);
        sum[0] += p[0] + t[0];
        sum[1] += p[1] + t[1];
        sum[2] += p[2] + t[2];
    }
    let count = atoms.len() as f64;
    structure
        .cell
        .wrap([sum[0] / count, sum[1] / count, sum[2] / count])
}
