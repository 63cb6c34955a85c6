//! Dependency ordering over node insertion indices.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Compute a topological order of `node_count` nodes under `edges`
/// (`(from, to)` pairs of insertion indices).
///
/// Among ready nodes the one with the smallest insertion index runs first.
/// On a cycle, returns the sorted indices of every node that sits on one.
pub(crate) fn execution_order(
    node_count: usize,
    edges: &[(usize, usize)],
) -> Result<Vec<usize>, Vec<usize>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(node_count, edges.len());
    for index in 0..node_count {
        graph.add_node(index);
    }
    for &(from, to) in edges {
        graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
    }

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.edges_directed(idx, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(node_count);
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for edge in graph.edges_directed(NodeIndex::new(index), Direction::Outgoing) {
            let target = edge.target().index();
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ready.push(Reverse(target));
            }
        }
    }

    if order.len() == node_count {
        return Ok(order);
    }

    let mut cyclic: Vec<usize> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .flatten()
        .map(NodeIndex::index)
        .collect();
    cyclic.sort_unstable();
    Err(cyclic)
}
