use std::path::Path;

use fnv::FnvHashSet;
use log::info;

use crate::graph::{GapEdge, PathGraph};
use crate::oriented::OrientedContig;
use crate::parser::{parse_path_file, ParseError, PathRecord, StitchParseResult};

/// Builds the path graph from the consensus paths of the best
/// abyss-scaffold run.
///
/// Every gapped adjacency `a -> b` adds the edge and its
/// reverse-complement mirror `rev(b) -> rev(a)`, both carrying the gap
/// estimate and the id of the path it came from. Both orientations of
/// every contig in an adjacency become vertices. A contig may be the
/// source of at most one adjacency across the whole input (in either
/// orientation of the mirror), anything else is reported as
/// `ParseError::DuplicateAdjacency`.
pub fn build_path_graph(records: &[PathRecord]) -> StitchParseResult<PathGraph> {
    let mut graph = PathGraph::new();
    let mut sources: FnvHashSet<OrientedContig> = FnvHashSet::default();

    for record in records {
        for (a, d, b) in record.gapped_adjacencies() {
            let (rev_a, rev_b) = (a.reverse(), b.reverse());
            // `A+ -> A-` is its own mirror
            let palindromic = rev_b == *a;
            let mut declared = vec![(a, b)];
            if !palindromic {
                declared.push((&rev_b, &rev_a));
            }

            for (s, t) in declared {
                if !sources.insert(s.clone()) {
                    return Err(ParseError::DuplicateAdjacency {
                        source: s.to_string(),
                        target: t.to_string(),
                        path_id: record.id.clone(),
                    });
                }
            }

            graph.add_vertices(&[
                a.to_string(),
                b.to_string(),
                rev_a.to_string(),
                rev_b.to_string(),
            ]);

            graph.add_edge(
                &a.to_string(),
                &b.to_string(),
                GapEdge::consensus(d, record.id.as_str()),
            );
            if !palindromic {
                graph.add_edge(
                    &rev_b.to_string(),
                    &rev_a.to_string(),
                    GapEdge::consensus(d, record.id.as_str()),
                );
            }
        }
    }

    Ok(graph)
}

pub fn read_path_graph<P: AsRef<Path>>(path: P) -> StitchParseResult<PathGraph> {
    info!("Building path graph from {}", path.as_ref().display());
    let records = parse_path_file(path)?;
    let graph = build_path_graph(&records)?;
    info!(
        "Path graph has {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}
