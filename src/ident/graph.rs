//! Intermediate connectivity graph passed between pipeline stages.
//!
//! Periodicity is represented with explicit per-edge image shifts rather
//! than duplicated atoms, so an atom bonding to its own periodic image is a
//! loop edge with a nonzero shift. These structures are not part of the
//! public API.

use crate::model::types::{BondOrder, CellShift};

/// A perceived bond before its image shift is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BondSpec {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
    pub shift: Option<CellShift>,
}

/// A resolved graph edge. `shift` is the image of atom `j` relative to atom
/// `i`; traversing the edge backwards negates it. Stored with `i <= j`, and
/// loops (`i == j`) with a lexicographically positive shift.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub shift: CellShift,
    pub order: BondOrder,
}

/// An edge endpoint as seen from one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub atom: usize,
    pub shift: CellShift,
}

/// Atomic connectivity of one structure, with adjacency lists.
#[derive(Debug, Clone)]
pub struct ConnectivityGraph {
    pub edges: Vec<Edge>,
    adjacency: Vec<Vec<usize>>,
}

impl ConnectivityGraph {
    pub fn new(atom_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); atom_count],
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn push_edge(&mut self, edge: Edge) {
        let idx = self.edges.len();
        self.adjacency[edge.i].push(idx);
        if edge.j != edge.i {
            self.adjacency[edge.j].push(idx);
        }
        self.edges.push(edge);
    }

    /// Incident edge count; loops count once here (they appear twice in
    /// [`neighbors`](Self::neighbors)).
    pub fn incident_edges(&self, atom: usize) -> &[usize] {
        &self.adjacency[atom]
    }

    /// All neighbors of an atom with the shift oriented away from it. A loop
    /// edge yields the atom itself twice, once per direction.
    pub fn neighbors(&self, atom: usize) -> Vec<Neighbor> {
        let mut out = Vec::with_capacity(self.adjacency[atom].len());
        for &idx in &self.adjacency[atom] {
            let edge = &self.edges[idx];
            if edge.i == edge.j {
                out.push(Neighbor {
                    atom,
                    shift: edge.shift,
                });
                out.push(Neighbor {
                    atom,
                    shift: -edge.shift,
                });
            } else if edge.i == atom {
                out.push(Neighbor {
                    atom: edge.j,
                    shift: edge.shift,
                });
            } else {
                out.push(Neighbor {
                    atom: edge.i,
                    shift: -edge.shift,
                });
            }
        }
        out
    }
}
