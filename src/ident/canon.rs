//! Fragment canonicalization.
//!
//! The canonicalization capability is a narrow trait (molecular graph in,
//! identifier string out) so the pipeline stays toolkit-agnostic: any
//! external cheminformatics backend can be plugged in through
//! [`identify_with`](super::identify_with). The built-in
//! [`MorganCanonicalizer`] derives canonical atom labels by iterative
//! neighborhood refinement with trial individualization on ties, and renders
//! the identifier as `<Hill formula>/<canonical edge list>`.

use std::collections::HashMap;

use thiserror::Error;

use super::config::CappingRule;
use super::graph::ConnectivityGraph;
use super::partition::Partition;
use crate::model::fragment::{FragmentGraph, FragmentKind};
use crate::model::record::{Diagnostic, FragmentIdentity};
use crate::model::structure::Structure;
use crate::model::types::{BondOrder, Element};

/// A fragment the canonicalization capability cannot represent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct CanonError {
    pub detail: String,
}

impl CanonError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Converts a capped fragment graph into a canonical identifier string.
///
/// Two graphs must map to the same string exactly when they are isomorphic
/// (respecting elements and bond orders).
pub trait Canonicalizer {
    fn canonicalize(&self, fragment: &FragmentGraph) -> Result<String, CanonError>;
}

/// Built-in canonicalizer based on iterative neighborhood refinement.
#[derive(Debug, Clone, Copy, Default)]
pub struct MorganCanonicalizer;

impl MorganCanonicalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Canonicalizer for MorganCanonicalizer {
    fn canonicalize(&self, fragment: &FragmentGraph) -> Result<String, CanonError> {
        let n = fragment.atom_count();
        if n == 0 {
            return Err(CanonError::new("fragment graph has no atoms"));
        }
        for &(i, j, _) in &fragment.bonds {
            if i >= n || j >= n {
                return Err(CanonError::new(format!(
                    "bond references atom {} beyond atom count {}",
                    i.max(j),
                    n
                )));
            }
            if i == j {
                return Err(CanonError::new("fragment graph contains a self-bond"));
            }
        }
        if !fragment.is_connected() {
            return Err(CanonError::new(
                "fragment graph is disconnected after capping",
            ));
        }

        let formula = fragment.hill_formula();
        if fragment.bonds.is_empty() {
            return Ok(formula);
        }

        let adjacency = adjacency(fragment);
        let ranks = refine(&adjacency, initial_ranks(fragment, &adjacency));
        let code = best_code(fragment, &adjacency, ranks);
        Ok(format!("{}/{}", formula, code))
    }
}

type Adjacency = Vec<Vec<(usize, BondOrder)>>;

fn adjacency(fragment: &FragmentGraph) -> Adjacency {
    let mut adjacency = vec![Vec::new(); fragment.atom_count()];
    for &(i, j, order) in &fragment.bonds {
        adjacency[i].push((j, order));
        adjacency[j].push((i, order));
    }
    adjacency
}

fn order_key(order: BondOrder) -> u8 {
    (order.value() * 2.0) as u8
}

/// Starting ranks from local atom invariants: element, degree, bond order
/// sum.
fn initial_ranks(fragment: &FragmentGraph, adjacency: &Adjacency) -> Vec<usize> {
    let keys: Vec<(u8, usize, u32)> = (0..fragment.atom_count())
        .map(|a| {
            let order_sum = adjacency[a]
                .iter()
                .map(|&(_, o)| order_key(o) as u32)
                .sum();
            (
                fragment.elements[a].atomic_number(),
                adjacency[a].len(),
                order_sum,
            )
        })
        .collect();
    ranks_from_keys(&keys)
}

/// Refines ranks until the partition stops splitting: each round a rank is
/// extended by the sorted multiset of (bond order, neighbor rank) pairs.
fn refine(adjacency: &Adjacency, mut ranks: Vec<usize>) -> Vec<usize> {
    loop {
        let keys: Vec<(usize, Vec<(u8, usize)>)> = (0..ranks.len())
            .map(|a| {
                let mut neighborhood: Vec<(u8, usize)> = adjacency[a]
                    .iter()
                    .map(|&(b, o)| (order_key(o), ranks[b]))
                    .collect();
                neighborhood.sort_unstable();
                (ranks[a], neighborhood)
            })
            .collect();

        let next = ranks_from_keys(&keys);
        let classes = |r: &[usize]| r.iter().max().map_or(0, |&m| m + 1);
        if classes(&next) == classes(&ranks) {
            return next;
        }
        ranks = next;
    }
}

fn ranks_from_keys<K: Ord + Clone>(keys: &[K]) -> Vec<usize> {
    let mut sorted: Vec<K> = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    keys.iter()
        .map(|k| sorted.binary_search(k).expect("key vanished during ranking"))
        .collect()
}

fn is_discrete(ranks: &[usize]) -> bool {
    ranks.iter().max().map_or(true, |&m| m + 1 == ranks.len())
}

/// Resolves remaining symmetry by trial individualization: every member of
/// the first tied class is promoted in turn, and the lexicographically
/// smallest resulting edge code wins. Automorphic choices collapse to the
/// same string.
fn best_code(fragment: &FragmentGraph, adjacency: &Adjacency, ranks: Vec<usize>) -> String {
    if is_discrete(&ranks) {
        return edge_code(fragment, &ranks);
    }

    let tied_rank = (0..ranks.len())
        .map(|a| ranks[a])
        .filter(|&r| ranks.iter().filter(|&&x| x == r).count() > 1)
        .min()
        .expect("non-discrete partition has a tied class");

    let mut best: Option<String> = None;
    for a in 0..ranks.len() {
        if ranks[a] != tied_rank {
            continue;
        }
        let keys: Vec<(usize, usize)> = (0..ranks.len())
            .map(|b| (ranks[b], usize::from(b != a)))
            .collect();
        let refined = refine(adjacency, ranks_from_keys(&keys));
        let code = best_code(fragment, adjacency, refined);
        best = Some(match best {
            None => code,
            Some(current) => {
                if code < current {
                    code
                } else {
                    current
                }
            }
        });
    }
    best.expect("tied class is never empty")
}

/// Renders edges in canonical numbering: `1-2,1=3,…` sorted, with bond
/// order symbols `-`, `=`, `#`, `:`.
fn edge_code(fragment: &FragmentGraph, labels: &[usize]) -> String {
    let mut edges: Vec<(usize, usize, BondOrder)> = fragment
        .bonds
        .iter()
        .map(|&(i, j, order)| {
            let (a, b) = (labels[i] + 1, labels[j] + 1);
            if a <= b { (a, b, order) } else { (b, a, order) }
        })
        .collect();
    edges.sort_unstable_by_key(|&(a, b, o)| (a, b, order_key(o)));

    let mut out = String::new();
    for (idx, (a, b, order)) in edges.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        let symbol = match order {
            BondOrder::Single => '-',
            BondOrder::Double => '=',
            BondOrder::Triple => '#',
            BondOrder::Aromatic => ':',
        };
        out.push_str(&a.to_string());
        out.push(symbol);
        out.push_str(&b.to_string());
    }
    out
}

/// Extracts one fragment as a self-contained molecular graph, terminating
/// each cut bond per the capping rule.
pub fn build_fragment_graph(
    structure: &Structure,
    graph: &ConnectivityGraph,
    partition: &Partition,
    fragment_idx: usize,
    capping: CappingRule,
) -> FragmentGraph {
    let data = &partition.fragments[fragment_idx];
    let local: HashMap<usize, usize> = data
        .fragment
        .atoms
        .iter()
        .enumerate()
        .map(|(pos, &atom)| (atom, pos))
        .collect();

    let mut elements: Vec<Element> = data
        .fragment
        .atoms
        .iter()
        .map(|&atom| structure.atoms[atom].element)
        .collect();

    // Intra-fragment bonds; periodic multi-edges between the same atom pair
    // collapse to one chemical bond, and image loops are dropped (they are
    // already reported as cycle inconsistencies).
    let mut bonds: Vec<(usize, usize, BondOrder)> = Vec::new();
    let mut seen_pairs: Vec<(usize, usize)> = Vec::new();
    for edge in &graph.edges {
        let (Some(&li), Some(&lj)) = (local.get(&edge.i), local.get(&edge.j)) else {
            continue;
        };
        if li == lj {
            continue;
        }
        let pair = if li < lj { (li, lj) } else { (lj, li) };
        if !seen_pairs.contains(&pair) {
            seen_pairs.push(pair);
            bonds.push((pair.0, pair.1, edge.order));
        }
    }

    if capping == CappingRule::Hydrogen {
        for &edge_idx in &partition.inter_edges {
            let edge = &graph.edges[edge_idx];
            for endpoint in [edge.i, edge.j] {
                if let Some(&attachment) = local.get(&endpoint) {
                    let cap = elements.len();
                    elements.push(Element::H);
                    bonds.push((attachment, cap, BondOrder::Single));
                }
            }
        }
    }

    FragmentGraph { elements, bonds }
}

/// Canonicalizes every fragment in traversal order, merging identical
/// identifiers into multiplicities. Rejected fragments are reported and the
/// record is marked partial instead of aborting.
pub fn canonicalize_fragments(
    structure: &Structure,
    graph: &ConnectivityGraph,
    partition: &Partition,
    capping: CappingRule,
    canonicalizer: &dyn Canonicalizer,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Vec<FragmentIdentity>, bool) {
    let mut identities: Vec<FragmentIdentity> = Vec::new();
    let mut index: HashMap<(FragmentKind, String), usize> = HashMap::new();
    let mut partial = false;

    for fragment_idx in 0..partition.fragments.len() {
        let kind = partition.fragments[fragment_idx].fragment.kind;
        let fragment_graph =
            build_fragment_graph(structure, graph, partition, fragment_idx, capping);

        match canonicalizer.canonicalize(&fragment_graph) {
            Ok(identifier) => match index.get(&(kind, identifier.clone())) {
                Some(&pos) => identities[pos].multiplicity += 1,
                None => {
                    index.insert((kind, identifier.clone()), identities.len());
                    identities.push(FragmentIdentity {
                        identifier,
                        kind,
                        multiplicity: 1,
                    });
                }
            },
            Err(err) => {
                partial = true;
                diagnostics.push(Diagnostic::Canonicalization {
                    fragment: fragment_idx,
                    kind,
                    detail: err.detail,
                });
            }
        }
    }

    (identities, partial)
}
