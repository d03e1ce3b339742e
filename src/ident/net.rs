//! Topology assignment over the simplified net.
//!
//! The decomposed framework is contracted to a periodic quotient graph:
//! fragments become vertices, surviving cut bonds become edges whose image
//! shifts are recomputed from the fragments' unwrapped atom shifts. The net
//! is then simplified by folding two-coordinated vertices (the typical
//! linker) into edges, and classified by signature lookup. Unknown
//! signatures are labeled, never an error. This stage is read-only over the
//! fragments.

use std::collections::VecDeque;

use super::graph::ConnectivityGraph;
use super::partition::Partition;
use super::tables::NetTable;
use crate::model::net::{Net, NetEdge, NetVertex};
use crate::model::record::TopologyLabel;
use crate::model::types::CellShift;

/// Contracts the partitioned structure into its quotient net.
pub fn build_net(graph: &ConnectivityGraph, partition: &Partition) -> Net {
    let vertices = partition
        .fragments
        .iter()
        .enumerate()
        .map(|(idx, data)| NetVertex {
            fragment: idx,
            kind: data.fragment.kind,
            position: data.fragment.centroid,
        })
        .collect();

    let mut edges = Vec::with_capacity(partition.inter_edges.len());
    for &edge_idx in &partition.inter_edges {
        let edge = &graph.edges[edge_idx];
        let (Some(u), Some(v)) = (
            partition.atom_fragment[edge.i],
            partition.atom_fragment[edge.j],
        ) else {
            continue;
        };
        let shift_i = partition.fragments[u]
            .shift_of(edge.i)
            .unwrap_or(CellShift::ZERO);
        let shift_j = partition.fragments[v]
            .shift_of(edge.j)
            .unwrap_or(CellShift::ZERO);

        // Offset between the fragments' unwrap origins.
        let shift = shift_i + edge.shift - shift_j;
        edges.push(normalize_edge(NetEdge { u, v, shift }));
    }

    Net { vertices, edges }
}

/// Iteratively folds two-coordinated, loop-free vertices into edges,
/// the usual contraction that turns linkers into net edges.
pub fn simplify_net(net: &Net) -> Net {
    let mut net = net.clone();

    loop {
        let candidate = (0..net.vertices.len()).find(|&v| {
            net.vertices.len() > 1
                && net.degree(v) == 2
                && net.edges.iter().all(|e| !(e.u == v && e.v == v))
        });
        let Some(v) = candidate else {
            return net;
        };

        let incident: Vec<usize> = net
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.u == v || e.v == v)
            .map(|(idx, _)| idx)
            .collect();
        // Degree two without loops means exactly two incident edges.
        let (e1, e2) = (incident[0], incident[1]);

        let (a, shift_av) = oriented_towards(&net.edges[e1], v);
        let (b, shift_vb) = oriented_away(&net.edges[e2], v);
        let merged = NetEdge {
            u: a,
            v: b,
            shift: shift_av + shift_vb,
        };

        let mut edges: Vec<NetEdge> = net
            .edges
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != e1 && idx != e2)
            .map(|(_, e)| e.clone())
            .collect();
        // A collapsed pair of parallel edges in the same image would be a
        // zero loop; drop it rather than keep a degenerate edge.
        if !(merged.u == merged.v && merged.shift.is_zero()) {
            edges.push(normalize_edge(merged));
        }

        net.vertices.remove(v);
        for edge in &mut edges {
            if edge.u > v {
                edge.u -= 1;
            }
            if edge.v > v {
                edge.v -= 1;
            }
            *edge = normalize_edge(edge.clone());
        }
        net.edges = edges;
    }
}

/// Labels the net by signature lookup against the reference table.
pub fn assign_topology(net: &Net, table: &NetTable) -> TopologyLabel {
    let simplified = simplify_net(net);
    let coordination = simplified.degree_sequence();
    let rank = lattice_rank(&simplified);

    let degrees = coordination
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let signature = format!(
        "{};v={};deg=[{}]",
        rank,
        simplified.vertices.len(),
        degrees
    );

    let code = table.lookup(&signature).unwrap_or("unknown").to_string();
    TopologyLabel {
        code,
        signature,
        coordination,
    }
}

fn normalize_edge(edge: NetEdge) -> NetEdge {
    if edge.u > edge.v {
        NetEdge {
            u: edge.v,
            v: edge.u,
            shift: -edge.shift,
        }
    } else if edge.u == edge.v && edge.shift < CellShift::ZERO {
        NetEdge {
            shift: -edge.shift,
            ..edge
        }
    } else {
        edge
    }
}

/// Endpoint of `edge` other than `v`, with the shift oriented from that
/// endpoint towards `v`.
fn oriented_towards(edge: &NetEdge, v: usize) -> (usize, CellShift) {
    if edge.v == v {
        (edge.u, edge.shift)
    } else {
        (edge.v, -edge.shift)
    }
}

/// Endpoint of `edge` other than `v`, with the shift oriented from `v`
/// towards that endpoint.
fn oriented_away(edge: &NetEdge, v: usize) -> (usize, CellShift) {
    if edge.u == v {
        (edge.v, edge.shift)
    } else {
        (edge.u, -edge.shift)
    }
}

/// Rank over ℤ of the net's cycle shift vectors: the dimensionality of the
/// periodic framework (3 for a MOF, 2 for a layer, 0 for a molecular
/// complex).
fn lattice_rank(net: &Net) -> usize {
    let n = net.vertices.len();
    let mut vertex_shift = vec![CellShift::ZERO; n];
    let mut visited = vec![false; n];
    let mut in_tree = vec![false; net.edges.len()];

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(u) = queue.pop_front() {
            for (idx, edge) in net.edges.iter().enumerate() {
                if in_tree[idx] || edge.u == edge.v {
                    continue;
                }
                let (other, shift) = if edge.u == u {
                    (edge.v, edge.shift)
                } else if edge.v == u {
                    (edge.u, -edge.shift)
                } else {
                    continue;
                };
                if !visited[other] {
                    visited[other] = true;
                    in_tree[idx] = true;
                    vertex_shift[other] = vertex_shift[u] + shift;
                    queue.push_back(other);
                }
            }
        }
    }

    let defects: Vec<[i64; 3]> = net
        .edges
        .iter()
        .enumerate()
        .filter(|&(idx, _)| !in_tree[idx])
        .map(|(_, edge)| {
            let d = vertex_shift[edge.u] + edge.shift - vertex_shift[edge.v];
            [d.0[0] as i64, d.0[1] as i64, d.0[2] as i64]
        })
        .collect();

    integer_rank(defects)
}

fn integer_rank(mut rows: Vec<[i64; 3]>) -> usize {
    let mut rank = 0;
    for col in 0..3 {
        let Some(pivot) = (rank..rows.len()).find(|&r| rows[r][col] != 0) else {
            continue;
        };
        rows.swap(rank, pivot);
        let lead = rows[rank][col];
        for r in 0..rows.len() {
            if r != rank && rows[r][col] != 0 {
                let factor = rows[r][col];
                for c in 0..3 {
                    rows[r][c] = rows[r][c] * lead - rows[rank][c] * factor;
                }
            }
        }
        rank += 1;
        if rank == rows.len() {
            break;
        }
    }
    rank.min(3)
}
