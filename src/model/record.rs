use thiserror::Error;

use super::fragment::FragmentKind;
use super::types::CellShift;

/// A canonical identifier with its multiplicity: how many structurally
/// equivalent fragment instances occurred in the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentIdentity {
    pub identifier: String,
    pub kind: FragmentKind,
    pub multiplicity: usize,
}

/// Classification of the simplified net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyLabel {
    /// Short net code from the reference table, or `"unknown"`.
    pub code: String,
    /// The computed net signature the code was looked up by.
    pub signature: String,
    /// Sorted coordination numbers of the simplified net's vertices.
    pub coordination: Vec<usize>,
}

impl TopologyLabel {
    pub fn is_known(&self) -> bool {
        self.code != "unknown"
    }
}

/// Recoverable findings accumulated while a structure is processed. None of
/// these abort the pipeline; they are attached to the final record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    /// Image shifts around a cycle inside one fragment sum to a lattice
    /// vector instead of zero, hinting at an inter-fragment bond classified
    /// as intra-fragment.
    #[error("cycle image shifts in fragment {fragment} sum to {defect} instead of zero")]
    TopologyInconsistency { fragment: usize, defect: CellShift },

    /// A fragment the canonicalization capability rejected; it is omitted
    /// from the identifier list and the record is marked partial.
    #[error("fragment {fragment} ({kind}) could not be canonicalized: {detail}")]
    Canonicalization {
        fragment: usize,
        kind: FragmentKind,
        detail: String,
    },

    /// Atoms with no bonds at all, dropped from the partition.
    #[error("dropped {} isolated atom(s) with no bonds", .atoms.len())]
    IsolatedAtoms { atoms: Vec<usize> },

    /// A metal-free fragment with no cut bond to any node; kept as a linker.
    #[error("linker fragment {fragment} is not coordinated to any node")]
    UnboundLinker { fragment: usize },

    /// Two sites closer than the minimum bonding distance; no bond created.
    #[error("atoms {i} and {j} overlap (distance {distance:.2} Å); no bond created")]
    OverlappingAtoms { i: usize, j: usize, distance: f64 },
}

/// Final output of the pipeline for one input structure. Immutable once
/// assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationRecord {
    /// Unique fragment identifiers in first-seen order.
    pub fragments: Vec<FragmentIdentity>,
    pub topology: TopologyLabel,
    pub diagnostics: Vec<Diagnostic>,
    /// True when at least one fragment is missing from `fragments` because
    /// canonicalization rejected it.
    pub partial: bool,
}

impl IdentificationRecord {
    pub fn nodes(&self) -> impl Iterator<Item = &FragmentIdentity> {
        self.fragments
            .iter()
            .filter(|f| f.kind == FragmentKind::Node)
    }

    pub fn linkers(&self) -> impl Iterator<Item = &FragmentIdentity> {
        self.fragments
            .iter()
            .filter(|f| f.kind == FragmentKind::Linker)
    }

    #[inline]
    pub fn is_partial(&self) -> bool {
        self.partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> IdentificationRecord {
        IdentificationRecord {
            fragments: vec![
                FragmentIdentity {
                    identifier: "H6O6Zn/1-8,2-9,3-10,4-11,5-12,6-13,7-8,7-9,7-10,7-11,7-12,7-13"
                        .into(),
                    kind: FragmentKind::Node,
                    multiplicity: 1,
                },
                FragmentIdentity {
                    identifier: "C3H2/1-3,1-4,2-3,2-5".into(),
                    kind: FragmentKind::Linker,
                    multiplicity: 3,
                },
            ],
            topology: TopologyLabel {
                code: "pcu".into(),
                signature: "3;v=1;deg=[6]".into(),
                coordination: vec![6],
            },
            diagnostics: vec![],
            partial: false,
        }
    }

    #[test]
    fn kind_filters() {
        let record = make_record();
        assert_eq!(record.nodes().count(), 1);
        assert_eq!(record.linkers().count(), 1);
        assert_eq!(record.linkers().next().unwrap().multiplicity, 3);
    }

    #[test]
    fn topology_known_flag() {
        let record = make_record();
        assert!(record.topology.is_known());

        let unknown = TopologyLabel {
            code: "unknown".into(),
            signature: "3;v=3;deg=[3,3,4]".into(),
            coordination: vec![3, 3, 4],
        };
        assert!(!unknown.is_known());
    }

    #[test]
    fn diagnostic_messages() {
        let d = Diagnostic::TopologyInconsistency {
            fragment: 2,
            defect: CellShift::new(1, 0, 0),
        };
        assert_eq!(
            d.to_string(),
            "cycle image shifts in fragment 2 sum to (1, 0, 0) instead of zero"
        );

        let d = Diagnostic::IsolatedAtoms { atoms: vec![4, 9] };
        assert_eq!(d.to_string(), "dropped 2 isolated atom(s) with no bonds");
    }
}
