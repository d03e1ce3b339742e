use super::fragment::FragmentKind;
use super::types::CellShift;

/// One vertex of the simplified net: a fragment contracted to a point.
#[derive(Debug, Clone, PartialEq)]
pub struct NetVertex {
    /// Index of the originating fragment, where applicable. Vertices created
    /// by net simplification keep the fragment index of the vertex they
    /// replaced.
    pub fragment: usize,
    pub kind: FragmentKind,
    /// Cartesian position (the fragment centroid), Å.
    pub position: [f64; 3],
}

/// One edge of the simplified net. `shift` is the image of `v` relative to
/// `u`; loops (`u == v`) carry a nonzero shift by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetEdge {
    pub u: usize,
    pub v: usize,
    pub shift: CellShift,
}

/// The framework contracted to a periodic graph: fragments as vertices, cut
/// bonds as edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Net {
    pub vertices: Vec<NetVertex>,
    pub edges: Vec<NetEdge>,
}

impl Net {
    /// Coordination number of a vertex; loops count twice.
    pub fn degree(&self, vertex: usize) -> usize {
        self.edges
            .iter()
            .map(|e| {
                (e.u == vertex) as usize + (e.v == vertex) as usize
            })
            .sum()
    }

    /// Sorted degrees of all vertices.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = (0..self.vertices.len()).map(|v| self.degree(v)).collect();
        degrees.sort_unstable();
        degrees
    }
}
