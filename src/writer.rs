use std::io::{self, Write};

use crate::graph::{PathGraph, ScaffoldGraph};
use crate::paths::PathNode;

// Graphs are written in the same dot dialect abyss-scaffold reads,
// minus the header and the vertex length attribute.

/// Write the path graph. Inferred edges also carry their support
/// count `n`.
pub fn write_path_graph<W: Write>(graph: &PathGraph, stream: &mut W) -> io::Result<()> {
    writeln!(stream, "digraph G {{")?;
    for v in graph.vertices() {
        writeln!(stream, "\"{}\"", graph.vertex_name(v))?;
    }
    for (_, s, t, edge) in graph.edges() {
        let (source, target) = (graph.vertex_name(s), graph.vertex_name(t));
        match edge.n {
            Some(n) => writeln!(
                stream,
                "\"{}\" -> \"{}\" [d={} n={} path={}]",
                source, target, edge.d, n, edge.path_id
            )?,
            None => writeln!(
                stream,
                "\"{}\" -> \"{}\" [d={} path={}]",
                source, target, edge.d, edge.path_id
            )?,
        }
    }
    writeln!(stream, "}}")
}

/// Write the scaffold graph with bare edges
pub fn write_scaffold_graph<W: Write>(graph: &ScaffoldGraph, stream: &mut W) -> io::Result<()> {
    writeln!(stream, "digraph G {{")?;
    for v in graph.vertices() {
        writeln!(stream, "\"{}\"", graph.vertex_name(v))?;
    }
    for (_, s, t, _) in graph.edges() {
        writeln!(stream, "\"{}\" -> \"{}\"", graph.vertex_name(s), graph.vertex_name(t))?;
    }
    writeln!(stream, "}}")
}

/// The tokens of a path: oriented contigs alternating with gaps
pub fn path_tokens(path: &[PathNode]) -> Vec<String> {
    let mut tokens = Vec::with_capacity(path.len() * 2);
    for node in path {
        tokens.push(node.to_string());
        if let Some(gap) = node.gap_token() {
            tokens.push(gap);
        }
    }
    tokens
}

pub fn path_string(path: &[PathNode]) -> String {
    path_tokens(path).join(" ")
}

/// Write the final paths as `ntLink_<index>\t<tokens>`. Paths with
/// fewer than two tokens are skipped and do not use up an index.
/// Returns the number of paths written.
pub fn write_paths<W: Write>(paths: &[Vec<PathNode>], stream: &mut W) -> io::Result<usize> {
    let mut path_id = 0;
    for path in paths {
        let tokens = path_tokens(path);
        if tokens.len() < 2 {
            continue;
        }
        writeln!(stream, "ntLink_{}\t{}", path_id, tokens.join(" "))?;
        path_id += 1;
    }
    Ok(path_id)
}
