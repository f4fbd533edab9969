use std::fmt;

use anyhow::{bail, Context, Result};
use fnv::FnvHashSet;
use log::info;
use petgraph::stable_graph::NodeIndex;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::graph::PathGraph;
use crate::oriented::{Orientation, OrientedContig};

/// One contig of an output path, with the estimated gap to the next
/// contig. The last node of a path has no gap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct PathNode {
    pub contig: String,
    pub ori: Orientation,
    pub gap_size: Option<i64>,
}

impl PathNode {
    pub fn new(contig: OrientedContig, gap_size: Option<i64>) -> Self {
        PathNode {
            contig: contig.contig,
            ori: contig.orient,
            gap_size,
        }
    }

    /// The gap token written between this node and the next one
    pub fn gap_token(&self) -> Option<String> {
        self.gap_size.map(|gap| format!("{}N", gap))
    }
}

/// Writes the oriented contig, e.g. `188266+`
impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.contig, self.ori)
    }
}

/// Convert a vertex path into path nodes, taking each gap from the
/// `d` of the edge to the following vertex.
pub fn format_path_contigs(path: &[NodeIndex], graph: &PathGraph) -> Result<Vec<PathNode>> {
    let mut nodes = Vec::with_capacity(path.len());
    for (i, &v) in path.iter().enumerate() {
        let name = graph.vertex_name(v);
        let contig = OrientedContig::parse(name)
            .with_context(|| format!("Vertex {} has no orientation", name))?;
        let gap = match path.get(i + 1) {
            Some(&next) => {
                let next_name = graph.vertex_name(next);
                let edge = graph
                    .edge_between(name, next_name)
                    .and_then(|e| graph.edge(e))
                    .with_context(|| format!("No edge {} -> {}", name, next_name))?;
                Some(edge.d)
            }
            None => None,
        };
        nodes.push(PathNode::new(contig, gap));
    }
    Ok(nodes)
}

/// Find the path through one weakly connected component, if the
/// component is a simple chain: a single source, a single sink, and a
/// shortest path between them that uses every vertex and every edge
/// of the component exactly once.
pub fn find_component_path(graph: &PathGraph, component: &[NodeIndex]) -> Result<Option<Vec<PathNode>>> {
    let sources: Vec<_> = component
        .iter()
        .copied()
        .filter(|&v| graph.in_degree(v) == 0)
        .collect();
    if sources.len() != 1 {
        return Ok(None);
    }
    let sinks: Vec<_> = component
        .iter()
        .copied()
        .filter(|&v| graph.out_degree(v) == 0)
        .collect();
    if sinks.len() != 1 {
        bail!(
            "Component starting at {} has one source but {} sinks",
            graph.vertex_name(sources[0]),
            sinks.len()
        );
    }

    let (source, target) = (sources[0], sinks[0]);
    let path = match graph.shortest_path(source, target) {
        Some(path) => path,
        None => return Ok(None),
    };

    let num_edges: usize = component.iter().map(|&v| graph.out_degree(v)).sum();
    let distinct: FnvHashSet<_> = path.iter().collect();
    if path.len() == component.len()
        && path.len() - 1 == num_edges
        && distinct.len() == path.len()
    {
        format_path_contigs(&path, graph).map(Some)
    } else {
        Ok(None)
    }
}

/// Drop paths that reuse a contig of an earlier path. This removes
/// the reverse-complement copy of every path as well as overlapping
/// paths. Contigs of dropped paths are still marked as seen.
pub fn remove_duplicate_paths(paths: Vec<Vec<PathNode>>) -> Vec<Vec<PathNode>> {
    let mut visited: FnvHashSet<String> = FnvHashSet::default();
    let mut result = Vec::new();
    for path in paths {
        let duplicate = path.iter().any(|node| visited.contains(&node.contig));
        for node in path.iter() {
            visited.insert(node.contig.clone());
        }
        if !duplicate {
            result.push(path);
        }
    }
    result
}

/// Find the paths through the graph, one per simple-chain component,
/// with duplicates removed.
pub fn find_paths(graph: &PathGraph) -> Result<Vec<Vec<PathNode>>> {
    info!("Finding paths");
    let components = graph.weak_components();
    info!("Total number of components in graph: {}", components.len());

    let mut paths = Vec::new();
    for component in components.iter() {
        if let Some(path) = find_component_path(graph, component)? {
            paths.push(path);
        }
    }

    let paths = remove_duplicate_paths(paths);
    info!("Found {} paths", paths.len());
    Ok(paths)
}
