use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use super::types::{BondOrder, Element};

/// Whether a fragment carries metal atoms (node) or is purely organic
/// (linker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Node,
    Linker,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Node => write!(f, "node"),
            FragmentKind::Linker => write!(f, "linker"),
        }
    }
}

/// One building block of a decomposed framework.
///
/// Fragments partition the structure's atom set: every atom belongs to
/// exactly one fragment (dropped junk atoms excepted, which are reported as
/// diagnostics). Atom indices refer to the input structure and are sorted
/// ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub atoms: Vec<usize>,
    /// Linker with no cut bond to any node (a free, uncoordinated molecule).
    pub unbound: bool,
    /// Periodically unwrapped centroid, wrapped back into the home cell (Å).
    pub centroid: [f64; 3],
}

impl Fragment {
    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Lowest structure atom index in this fragment; fragments are ordered by
    /// this value, which fixes the traversal order of the whole pipeline.
    pub fn first_atom(&self) -> usize {
        self.atoms[0]
    }
}

/// A chemically self-contained molecular graph: an isolated fragment with its
/// cut bonds already capped. This is the unit handed to a
/// [`Canonicalizer`](crate::Canonicalizer).
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentGraph {
    pub elements: Vec<Element>,
    pub bonds: Vec<(usize, usize, BondOrder)>,
}

impl FragmentGraph {
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.elements.len()
    }

    /// True when every atom is reachable from the first through the bond
    /// list. Graphs with at most one atom count as connected.
    pub fn is_connected(&self) -> bool {
        let n = self.elements.len();
        if n <= 1 {
            return true;
        }

        let mut adjacency = vec![Vec::new(); n];
        for &(i, j, _) in &self.bonds {
            if i >= n || j >= n {
                return false;
            }
            adjacency[i].push(j);
            adjacency[j].push(i);
        }

        let mut seen = vec![false; n];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut count = 1;
        while let Some(a) = queue.pop_front() {
            for &b in &adjacency[a] {
                if !seen[b] {
                    seen[b] = true;
                    count += 1;
                    queue.push_back(b);
                }
            }
        }
        count == n
    }

    /// Hill-order chemical formula: C first, then H, then the remaining
    /// elements alphabetically.
    pub fn hill_formula(&self) -> String {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for el in &self.elements {
            *counts.entry(el.symbol()).or_insert(0) += 1;
        }

        let mut out = String::new();
        let mut push = |symbol: &str, count: usize| {
            out.push_str(symbol);
            if count > 1 {
                out.push_str(&count.to_string());
            }
        };

        if let Some(&c) = counts.get("C") {
            push("C", c);
            counts.remove("C");
            if let Some(&h) = counts.get("H") {
                push("H", h);
                counts.remove("H");
            }
        }
        for (symbol, count) in counts {
            push(symbol, count);
        }
        out
    }
}
