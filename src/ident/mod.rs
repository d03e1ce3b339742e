mod bonding;
mod canon;
mod config;
mod error;
mod graph;
mod net;
mod partition;
mod periodic;
mod tables;

pub use canon::{CanonError, Canonicalizer, MorganCanonicalizer};
pub use config::{BondingPolicy, CappingRule, IdentConfig};
pub use error::Error;
pub use net::simplify_net;

use crate::model::fragment::Fragment;
use crate::model::net::Net;
use crate::model::record::{Diagnostic, IdentificationRecord};
use crate::model::structure::Structure;

/// The decomposed framework before canonicalization: fragments, the
/// contracted net, and any recoverable findings.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub fragments: Vec<Fragment>,
    pub net: Net,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the full identification pipeline with the built-in canonicalizer.
pub fn identify(
    structure: &Structure,
    config: &IdentConfig,
) -> Result<IdentificationRecord, Error> {
    identify_with(structure, config, &MorganCanonicalizer::new())
}

/// Runs the full identification pipeline with a caller-supplied
/// canonicalization capability.
pub fn identify_with(
    structure: &Structure,
    config: &IdentConfig,
    canonicalizer: &dyn Canonicalizer,
) -> Result<IdentificationRecord, Error> {
    let nets = tables::load_nets(config.nets.as_deref())?;
    let (graph, partition, mut diagnostics) = decompose_graph(structure, config)?;

    let (fragments, partial) = canon::canonicalize_fragments(
        structure,
        &graph,
        &partition,
        config.capping,
        canonicalizer,
        &mut diagnostics,
    );

    let net = net::build_net(&graph, &partition);
    let topology = net::assign_topology(&net, &nets);

    Ok(IdentificationRecord {
        fragments,
        topology,
        diagnostics,
        partial,
    })
}

/// Decomposes a structure into fragments and the contracted net without
/// canonicalizing, for callers that only need the building blocks (net
/// export, fragment inspection).
pub fn decompose(structure: &Structure, config: &IdentConfig) -> Result<Decomposition, Error> {
    let (graph, partition, diagnostics) = decompose_graph(structure, config)?;
    let net = net::build_net(&graph, &partition);
    let fragments = partition
        .fragments
        .into_iter()
        .map(|data| data.fragment)
        .collect();

    Ok(Decomposition {
        fragments,
        net,
        diagnostics,
    })
}

fn decompose_graph(
    structure: &Structure,
    config: &IdentConfig,
) -> Result<(graph::ConnectivityGraph, partition::Partition, Vec<Diagnostic>), Error> {
    let chem = tables::load_chem(config.chem.as_deref())?;
    let mut diagnostics = Vec::new();

    let specs = bonding::perceive_bonds(structure, &chem, &config.bonding, &mut diagnostics)?;
    let graph = periodic::resolve(structure, specs)?;
    let partition = partition::decompose(structure, &graph, &chem, &mut diagnostics)?;

    Ok((graph, partition, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::cell::UnitCell;
    use crate::model::fragment::{FragmentGraph, FragmentKind};
    use crate::model::structure::ExplicitBond;
    use crate::model::types::{BondOrder, CellShift, Element};

    /// The reference scenario: one metal at the origin octahedrally bonded
    /// to six oxygens, each oxygen continuing into a three-carbon strut that
    /// reaches the oxygen of the next cell over.
    fn primitive_cubic_mof() -> Structure {
        let cell =
            UnitCell::from_vectors([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
                .unwrap();
        let mut structure = Structure::new(cell);
        structure.name = Some("toy-pcu".into());
        structure.atoms.push(Atom::new(Element::Zn, [0.0, 0.0, 0.0]));
        for axis in 0..3 {
            for sign in [1.0, -1.0] {
                let mut p = [0.0; 3];
                p[axis] = 2.0 * sign;
                structure.atoms.push(Atom::new(Element::O, p));
            }
            for step in 0..3 {
                let mut p = [0.0; 3];
                p[axis] = 3.5 + 1.5 * step as f64;
                structure.atoms.push(Atom::new(Element::C, p));
            }
        }
        structure
    }

    #[test]
    fn identifies_the_primitive_cubic_example() {
        let record = identify(&primitive_cubic_mof(), &IdentConfig::default()).unwrap();

        assert_eq!(record.nodes().count(), 1);
        assert_eq!(record.linkers().count(), 1);

        let node = record.nodes().next().unwrap();
        assert_eq!(node.multiplicity, 1);
        assert!(node.identifier.starts_with("H6O6Zn/"));

        let linker = record.linkers().next().unwrap();
        assert_eq!(linker.multiplicity, 3);
        assert!(linker.identifier.starts_with("C3H2/"));

        assert_eq!(record.topology.code, "pcu");
        assert_eq!(record.topology.coordination, vec![6]);
        assert!(record.diagnostics.is_empty());
        assert!(!record.is_partial());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let structure = primitive_cubic_mof();
        let config = IdentConfig::default();
        let first = identify(&structure, &config).unwrap();
        let second = identify(&structure, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn metal_free_structure_is_rejected() {
        let cell =
            UnitCell::from_vectors([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
                .unwrap();
        let mut structure = Structure::new(cell);
        structure.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        structure.atoms.push(Atom::new(Element::O, [1.2, 0.0, 0.0]));

        let result = identify(&structure, &IdentConfig::default());
        assert!(matches!(result, Err(Error::NoMetalAtoms)));
    }

    #[test]
    fn decompose_exposes_fragments_and_net() {
        let decomposition =
            decompose(&primitive_cubic_mof(), &IdentConfig::default()).unwrap();

        assert_eq!(decomposition.fragments.len(), 4);
        assert_eq!(decomposition.fragments[0].kind, FragmentKind::Node);
        assert_eq!(decomposition.fragments[0].len(), 7);
        assert_eq!(decomposition.net.vertices.len(), 4);
        assert_eq!(decomposition.net.edges.len(), 6);
        assert_eq!(decomposition.net.degree(0), 6);
    }

    #[test]
    fn cycle_offset_mismatch_is_a_warning_not_an_error() {
        // An explicit bond list wiring a carbon to its own periodic image:
        // the one-edge cycle sums to a lattice vector.
        let cell =
            UnitCell::from_vectors([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
                .unwrap();
        let mut structure = Structure::new(cell);
        structure.atoms.push(Atom::new(Element::Zn, [0.0, 0.0, 0.0]));
        structure.atoms.push(Atom::new(Element::C, [2.0, 0.0, 0.0]));
        structure.bonds = Some(vec![
            ExplicitBond::new(0, 1, BondOrder::Single),
            ExplicitBond::with_shift(1, 1, BondOrder::Single, CellShift::new(1, 0, 0)),
        ]);

        let record = identify(&structure, &IdentConfig::default()).unwrap();
        assert!(record
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::TopologyInconsistency { .. })));
    }

    #[test]
    fn rejected_fragment_yields_partial_record() {
        struct Picky;
        impl Canonicalizer for Picky {
            fn canonicalize(&self, fragment: &FragmentGraph) -> Result<String, CanonError> {
                if fragment.elements.contains(&Element::Zn) {
                    Err(CanonError::new("backend does not support zinc"))
                } else {
                    MorganCanonicalizer::new().canonicalize(fragment)
                }
            }
        }

        let record = identify_with(
            &primitive_cubic_mof(),
            &IdentConfig::default(),
            &Picky,
        )
        .unwrap();

        assert!(record.is_partial());
        assert_eq!(record.nodes().count(), 0);
        assert_eq!(record.linkers().count(), 1);
        assert!(record.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::Canonicalization {
                fragment: 0,
                kind: FragmentKind::Node,
                ..
            }
        )));
    }

    #[test]
    fn capping_rule_changes_the_identifier() {
        let config_h = IdentConfig::default();
        let config_bare = IdentConfig {
            capping: CappingRule::Bare,
            ..Default::default()
        };

        let capped = identify(&primitive_cubic_mof(), &config_h).unwrap();
        let bare = identify(&primitive_cubic_mof(), &config_bare).unwrap();

        let capped_linker = capped.linkers().next().unwrap();
        let bare_linker = bare.linkers().next().unwrap();
        assert!(capped_linker.identifier.starts_with("C3H2/"));
        assert!(bare_linker.identifier.starts_with("C3/"));
        assert_eq!(bare_linker.multiplicity, 3);
    }

    #[test]
    fn custom_metal_table_changes_the_partition() {
        // Declare zinc a nonmetal: the structure no longer has any node.
        let custom = r#"
            [classification]
            nonmetals = [
                "H", "He", "B", "C", "N", "O", "F", "Ne",
                "Si", "P", "S", "Cl", "Ar",
                "Ge", "As", "Se", "Br", "Kr",
                "Te", "I", "Xe", "At", "Rn", "Zn",
            ]
        "#;
        let config = IdentConfig {
            chem: Some(custom.into()),
            ..Default::default()
        };
        let result = identify(&primitive_cubic_mof(), &config);
        assert!(matches!(result, Err(Error::NoMetalAtoms)));
    }

    #[test]
    fn invalid_custom_table_is_a_parse_error() {
        let config = IdentConfig {
            chem: Some("not [[[ valid toml".into()),
            ..Default::default()
        };
        let result = identify(&primitive_cubic_mof(), &config);
        assert!(matches!(result, Err(Error::TableParse(_))));
    }
}
