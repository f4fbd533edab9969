use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info, warn};

use crate::graph::{GapEdge, PathGraph, ScaffoldEdge, ScaffoldGraph};
use crate::oriented::{reverse_name, OrientedContig};
use crate::parser::{parse_path_file, PathRecord, StitchParseResult};

/// How many positions before and after an unsupported adjacency of an
/// alternate path are searched for transitive support.
pub const DEFAULT_NEIGHBOURHOOD: usize = 4;

/// Integer median of the samples. An even number of samples averages
/// the two middle values, truncating toward zero.
pub fn median(samples: &[i64]) -> Option<i64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        // the mean of two i64 always fits back into an i64
        let sum = i128::from(sorted[mid - 1]) + i128::from(sorted[mid]);
        Some((sum / 2) as i64)
    }
}

/// Gap distance samples for each candidate inferred edge, kept in the
/// order the pairs were first seen.
#[derive(Debug, Default, Clone)]
pub struct AdjacencyAccumulator {
    index: FnvHashMap<(String, String), usize>,
    pairs: Vec<(String, String, Vec<i64>)>,
}

impl AdjacencyAccumulator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn add_sample(&mut self, source: &str, target: &str, d: i64) {
        let key = (source.to_string(), target.to_string());
        match self.index.get(&key) {
            Some(&ix) => self.pairs[ix].2.push(d),
            None => {
                self.index.insert(key, self.pairs.len());
                self.pairs.push((source.to_string(), target.to_string(), vec![d]));
            }
        }
    }

    /// Record a sample for `source -> target` and for its
    /// reverse-complement mirror.
    pub fn add_mirrored(&mut self, source: &OrientedContig, target: &OrientedContig, d: i64) {
        self.add_sample(&source.to_string(), &target.to_string(), d);
        self.add_sample(&target.reverse().to_string(), &source.reverse().to_string(), d);
    }

    pub fn samples(&self, source: &str, target: &str) -> Option<&[i64]> {
        let key = (source.to_string(), target.to_string());
        self.index.get(&key).map(|&ix| self.pairs[ix].2.as_slice())
    }

    /// Collapse the samples of every pair into a single inferred edge
    /// with the median gap and the number of observations.
    pub fn finalize(self) -> Vec<(String, String, GapEdge)> {
        self.pairs
            .into_iter()
            .filter_map(|(s, t, samples)| {
                let d = median(&samples)?;
                Some((s, t, GapEdge::inferred(d, samples.len())))
            })
            .collect()
    }
}

/// Tally the transitive edges of one neighbourhood of an alternate
/// path. `split` is the position of `s` in `neighbourhood`; every
/// contig up to and including it is paired with every contig after
/// it, skipping `(s, t)` itself and pairs the scaffold graph already
/// connects. Each pair is recorded together with its mirror.
pub fn find_new_transitive_edges(
    edges: &mut BTreeSet<(String, String)>,
    neighbourhood: &[&OrientedContig],
    split: usize,
    scaffold_graph: &ScaffoldGraph,
    s: &OrientedContig,
    t: &OrientedContig,
) {
    let (sources, targets) = neighbourhood.split_at(split + 1);
    for &source in sources {
        for &target in targets {
            if source == s && target == t {
                continue;
            }
            let (src_name, tgt_name) = (source.to_string(), target.to_string());
            if scaffold_graph.are_connected(&src_name, &tgt_name) {
                continue;
            }
            edges.insert((target.reverse().to_string(), source.reverse().to_string()));
            edges.insert((src_name, tgt_name));
        }
    }
}

/// For each consecutive pair of contigs of `path` that the path graph
/// does not already connect, collect the scaffold graph edges that
/// the surrounding `neighbourhood` of the alternate path supports.
pub fn add_transitive_support(
    scaffold_graph: &ScaffoldGraph,
    path: &PathRecord,
    path_graph: &PathGraph,
    neighbourhood: usize,
) -> BTreeSet<(String, String)> {
    let mut edges = BTreeSet::new();
    let contigs: Vec<&OrientedContig> = path.contigs().collect();

    for (idx, pair) in contigs.windows(2).enumerate() {
        let (s, t) = (pair[0], pair[1]);
        if path_graph.are_connected(&s.to_string(), &t.to_string()) {
            continue;
        }
        let start = idx.saturating_sub(neighbourhood);
        let end = contigs.len().min(idx + neighbourhood + 2);
        find_new_transitive_edges(
            &mut edges,
            &contigs[start..end],
            idx - start,
            scaffold_graph,
            s,
            t,
        );
    }

    edges
}

/// Counts of what merging the alternate windows added
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeSummary {
    pub windows_read: usize,
    pub windows_missing: usize,
    pub new_vertices: usize,
    pub new_edges: usize,
    pub transitive_edges: usize,
}

/// Collects evidence from the alternate windows against a fixed view
/// of the path and scaffold graphs. Neither graph changes until
/// `finish` is called, so the windows are independent of each other.
#[derive(Debug, Clone)]
pub struct AlternateWindowMerger {
    neighbourhood: usize,
    new_vertices: Vec<String>,
    seen_vertices: FnvHashSet<String>,
    new_edges: AdjacencyAccumulator,
    transitive_edges: BTreeSet<(String, String)>,
    windows_read: usize,
    windows_missing: usize,
}

impl Default for AlternateWindowMerger {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBOURHOOD)
    }
}

impl AlternateWindowMerger {
    pub fn new(neighbourhood: usize) -> Self {
        AlternateWindowMerger {
            neighbourhood,
            new_vertices: Vec::new(),
            seen_vertices: FnvHashSet::default(),
            new_edges: AdjacencyAccumulator::new(),
            transitive_edges: BTreeSet::new(),
            windows_read: 0,
            windows_missing: 0,
        }
    }

    pub fn new_edges(&self) -> &AdjacencyAccumulator {
        &self.new_edges
    }

    pub fn new_vertices(&self) -> &[String] {
        &self.new_vertices
    }

    pub fn transitive_edges(&self) -> &BTreeSet<(String, String)> {
        &self.transitive_edges
    }

    fn add_vertex_pair(&mut self, contig: &OrientedContig) {
        for name in [contig.to_string(), contig.reverse().to_string()] {
            if self.seen_vertices.insert(name.clone()) {
                self.new_vertices.push(name);
            }
        }
    }

    pub fn skip_window(&mut self) {
        self.windows_missing += 1;
    }

    /// Add the evidence of one alternate window's paths
    pub fn add_window(
        &mut self,
        records: &[PathRecord],
        path_graph: &PathGraph,
        scaffold_graph: &ScaffoldGraph,
    ) {
        self.windows_read += 1;
        for record in records {
            let support =
                add_transitive_support(scaffold_graph, record, path_graph, self.neighbourhood);
            self.transitive_edges.extend(support);

            for (source, d, target) in record.gapped_adjacencies() {
                self.add_adjacency(path_graph, source, d, target);
            }
        }
    }

    fn add_adjacency(
        &mut self,
        path_graph: &PathGraph,
        source: &OrientedContig,
        d: i64,
        target: &OrientedContig,
    ) {
        let (s_name, t_name) = (source.to_string(), target.to_string());
        let s_ix = path_graph.vertex_index(&s_name);
        let t_ix = path_graph.vertex_index(&t_name);

        match (s_ix, t_ix) {
            (Some(s), Some(t)) => {
                if path_graph.are_connected(&s_name, &t_name) {
                    return;
                }
                if path_graph.out_degree(s) == 0 && path_graph.in_degree(t) == 0 {
                    self.new_edges.add_mirrored(source, target, d);
                }
            }
            (Some(s), None) => {
                if path_graph.out_degree(s) == 0 {
                    self.add_vertex_pair(target);
                    self.new_edges.add_mirrored(source, target, d);
                }
            }
            (None, Some(t)) => {
                if path_graph.in_degree(t) == 0 {
                    self.add_vertex_pair(source);
                    self.new_edges.add_mirrored(source, target, d);
                }
            }
            (None, None) => {
                self.add_vertex_pair(source);
                self.add_vertex_pair(target);
                self.new_edges.add_mirrored(source, target, d);
            }
        }
    }

    /// Splice the collected vertices and edges into the path graph,
    /// one inferred edge per candidate pair, and add the transitive
    /// support edges to the scaffold graph.
    pub fn finish(
        self,
        path_graph: &mut PathGraph,
        scaffold_graph: &mut ScaffoldGraph,
    ) -> MergeSummary {
        let new_vertices = self.new_vertices.len();
        path_graph.add_vertices(&self.new_vertices);

        let new_edges = self.new_edges.finalize();
        for (source, target, edge) in new_edges.iter() {
            path_graph.add_edge(source, target, edge.clone());
        }

        let mut transitive_edges = 0;
        for (source, target) in self.transitive_edges.iter() {
            for name in &[source, target] {
                if let Some(rev) = reverse_name(name) {
                    scaffold_graph.add_vertex(&rev);
                }
            }
            if !scaffold_graph.are_connected(source, target) {
                scaffold_graph.add_edge(source, target, ScaffoldEdge::default());
                transitive_edges += 1;
            }
        }

        MergeSummary {
            windows_read: self.windows_read,
            windows_missing: self.windows_missing,
            new_vertices,
            new_edges: new_edges.len(),
            transitive_edges,
        }
    }
}

/// Read one alternate window's path file. A missing file is not an
/// error, the window is just skipped.
pub fn read_alternate_pathfile<P: AsRef<Path>>(
    path: P,
) -> StitchParseResult<Option<Vec<PathRecord>>> {
    let path = path.as_ref();
    info!("Reading {}", path.display());
    if !path.exists() {
        warn!("{} does not exist, skipping.", path.display());
        return Ok(None);
    }
    parse_path_file(path).map(Some)
}

/// Merge every window in `windows` into the path and scaffold graphs.
/// `load` produces the paths of a window, or `None` if the window is
/// absent.
pub fn merge_alternate_windows<F>(
    path_graph: &mut PathGraph,
    scaffold_graph: &mut ScaffoldGraph,
    windows: RangeInclusive<u32>,
    neighbourhood: usize,
    mut load: F,
) -> Result<MergeSummary>
where
    F: FnMut(u32) -> StitchParseResult<Option<Vec<PathRecord>>>,
{
    let mut merger = AlternateWindowMerger::new(neighbourhood);

    for n in windows {
        let records = load(n).with_context(|| format!("Failed to read alternate window n={}", n))?;
        match records {
            Some(records) => {
                debug!("Window n={} has {} paths", n, records.len());
                merger.add_window(&records, path_graph, scaffold_graph);
            }
            None => merger.skip_window(),
        }
    }

    let summary = merger.finish(path_graph, scaffold_graph);
    info!(
        "Merged {} alternate windows ({} missing): {} new vertices, {} new edges, {} transitive scaffold edges",
        summary.windows_read,
        summary.windows_missing,
        summary.new_vertices,
        summary.new_edges,
        summary.transitive_edges
    );
    Ok(summary)
}
