use log::{debug, info};
use petgraph::stable_graph::EdgeIndex;

use crate::graph::{Direction, PathGraph, ScaffoldGraph};

/// Returns true if the inferred edge `edge` is corroborated by the
/// scaffold graph through some other pair of contigs.
///
/// Candidate pairs take their source from the vertices that can reach
/// the edge's source and their target from the vertices reachable
/// from the edge's target, both inclusive. A connected pair sharing
/// neither endpoint with the edge is enough on its own. Pairs sharing
/// one endpoint only count once both a pair with the same source and
/// a pair with the same target have been found.
pub fn has_transitive_support(
    edge: EdgeIndex,
    path_graph: &PathGraph,
    scaffold_graph: &ScaffoldGraph,
) -> bool {
    let (source, target) = match path_graph.endpoints(edge) {
        Some(ends) => ends,
        None => return false,
    };
    let order = path_graph.vertex_count();

    let source_in_neighbourhood = path_graph.neighborhood(source, order, Direction::Incoming);
    let target_out_neighbourhood = path_graph.neighborhood(target, order, Direction::Outgoing);

    let (mut source_pass, mut target_pass) = (false, false);
    for &test_source in source_in_neighbourhood.iter() {
        for &test_target in target_out_neighbourhood.iter() {
            if test_source == source && test_target == target {
                continue;
            }
            let connected = scaffold_graph.are_connected(
                path_graph.vertex_name(test_source),
                path_graph.vertex_name(test_target),
            );
            if !connected {
                continue;
            }
            if test_source != source && test_target != target {
                return true;
            }
            if test_source == source {
                source_pass = true;
            }
            if test_target == target {
                target_pass = true;
            }
            if source_pass && target_pass {
                return true;
            }
        }
    }
    false
}

/// Remove every inferred edge without transitive support. Consensus
/// edges are left alone. The input graph is not modified.
pub fn transitive_filter(path_graph: &PathGraph, scaffold_graph: &ScaffoldGraph) -> PathGraph {
    let to_remove: Vec<EdgeIndex> = path_graph
        .edges()
        .filter(|(_, _, _, attrs)| attrs.is_inferred())
        .filter(|(e, s, t, _)| {
            let supported = has_transitive_support(*e, path_graph, scaffold_graph);
            if !supported {
                debug!(
                    "No transitive support for {} -> {}",
                    path_graph.vertex_name(*s),
                    path_graph.vertex_name(*t)
                );
            }
            !supported
        })
        .map(|(e, _, _, _)| e)
        .collect();

    info!("Transitive filter: removing {} unsupported edges", to_remove.len());

    let mut result = path_graph.clone();
    result.delete_edges(to_remove);
    result
}
