use fnv::FnvHashSet;
use log::info;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};

use crate::graph::{Direction, PathGraph};

/// The inferred edges to remove at one branch vertex. If every edge
/// in `incident` is inferred and exactly one of them has the highest
/// support, that one is kept. Otherwise, when the support is tied or
/// a consensus edge is involved, every inferred edge goes. Consensus
/// edges are never removed.
fn branch_removals(graph: &PathGraph, incident: &[EdgeIndex]) -> Vec<EdgeIndex> {
    let edges: Vec<_> = incident
        .iter()
        .filter_map(|&e| graph.edge(e).map(|attrs| (e, attrs)))
        .collect();

    let mut keep = None;
    if edges.iter().all(|(_, attrs)| attrs.is_inferred()) {
        let max_weight = edges.iter().map(|(_, attrs)| attrs.support()).max();
        let heaviest: Vec<_> = edges
            .iter()
            .filter(|(_, attrs)| Some(attrs.support()) == max_weight)
            .collect();
        if heaviest.len() == 1 {
            keep = Some(heaviest[0].0);
        }
    }

    edges
        .iter()
        .filter(|(e, attrs)| Some(*e) != keep && attrs.is_inferred())
        .map(|(e, _)| *e)
        .collect()
}

/// Resolve branches so that no vertex has more than one incoming or
/// outgoing edge, where that can be done by dropping inferred edges.
/// The input graph is left untouched; the filtered copy is returned.
pub fn linearize_graph(graph: &PathGraph) -> PathGraph {
    let mut to_remove: FnvHashSet<EdgeIndex> = FnvHashSet::default();

    for dir in &[Direction::Incoming, Direction::Outgoing] {
        let branch_nodes: Vec<NodeIndex> = graph
            .vertices()
            .filter(|&v| graph.degree(v, *dir) > 1)
            .collect();
        for node in branch_nodes {
            let incident = graph.incident(node, *dir);
            to_remove.extend(branch_removals(graph, &incident));
        }
    }

    info!("Linearizing path graph: removing {} inferred edges", to_remove.len());

    let mut result = graph.clone();
    let mut removals: Vec<_> = to_remove.into_iter().collect();
    removals.sort();
    result.delete_edges(removals);
    result
}

/// True if every vertex of every weakly connected component has at
/// most one incoming and one outgoing edge
pub fn is_graph_linear(graph: &PathGraph) -> bool {
    graph.weak_components().iter().all(|component| {
        component
            .iter()
            .all(|&v| graph.in_degree(v) < 2 && graph.out_degree(v) < 2)
    })
}
