use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use log::info;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::config::StitchConfig;
use crate::graph::{PathGraph, ScaffoldGraph};
use crate::linearize::{is_graph_linear, linearize_graph};
use crate::merge::{merge_alternate_windows, read_alternate_pathfile, MergeSummary};
use crate::parser::ScaffoldGraphParser;
use crate::path_graph::read_path_graph;
use crate::paths::{find_paths, PathNode};
use crate::transitive::transitive_filter;
use crate::writer::{write_path_graph, write_paths, write_scaffold_graph};

/// Vertex and edge counts through the stages of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct StitchReport {
    pub merge: MergeSummary,
    pub path_graph_vertices: usize,
    pub edges_after_merge: usize,
    pub edges_after_linearization: usize,
    pub edges_after_transitive_filter: usize,
    pub scaffold_graph_edges: usize,
    pub paths_found: usize,
    pub paths_written: usize,
}

impl StitchReport {
    #[cfg(feature = "serde1")]
    pub fn write_json<W: Write>(&self, stream: W) -> Result<()> {
        serde_json::to_writer_pretty(stream, self)?;
        Ok(())
    }
}

fn write_output<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let path = path.as_ref();
    info!("Printing graph {}", path.display());
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut stream = BufWriter::new(file);
    write(&mut stream).with_context(|| format!("Failed to write {}", path.display()))?;
    stream.flush()?;
    Ok(())
}

/// Runs the stitching stages over already loaded graphs, and over the
/// files named by a `StitchConfig`.
pub struct Stitcher {
    config: StitchConfig,
}

impl Stitcher {
    pub fn new(config: StitchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Stitcher { config })
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Read the primary inputs, stitch, and write the final paths to
    /// `out`
    pub fn run<W: Write>(&self, out: &mut W) -> Result<StitchReport> {
        info!("Running ntLink stitch paths stage");

        let path_graph = read_path_graph(&self.config.path_file).with_context(|| {
            format!("Failed to read path file {}", self.config.path_file.display())
        })?;

        info!("Reading scaffold graph {}", self.config.scaffold_graph.display());
        let scaffold_graph = ScaffoldGraphParser::new()
            .parse_file(&self.config.scaffold_graph)
            .with_context(|| {
                format!(
                    "Failed to read scaffold graph {}",
                    self.config.scaffold_graph.display()
                )
            })?;

        let (paths, mut report) = self.stitch(path_graph, scaffold_graph)?;

        report.paths_written = write_paths(&paths, out)?;
        out.flush()?;
        info!(
            "Path graph: {} vertices, {} edges merged, {} linear, {} after transitive filter",
            report.path_graph_vertices,
            report.edges_after_merge,
            report.edges_after_linearization,
            report.edges_after_transitive_filter
        );
        info!("Wrote {} paths", report.paths_written);
        Ok(report)
    }

    /// Merge the alternate windows, linearize, optionally filter, and
    /// extract the paths. Intermediate graphs are written next to the
    /// output prefix.
    pub fn stitch(
        &self,
        mut path_graph: PathGraph,
        mut scaffold_graph: ScaffoldGraph,
    ) -> Result<(Vec<Vec<PathNode>>, StitchReport)> {
        let config = &self.config;
        let mut report = StitchReport::default();

        report.merge = merge_alternate_windows(
            &mut path_graph,
            &mut scaffold_graph,
            config.windows(),
            config.neighbourhood,
            |n| read_alternate_pathfile(config.alternate_path_file(n)),
        )?;
        report.path_graph_vertices = path_graph.vertex_count();
        report.edges_after_merge = path_graph.edge_count();
        report.scaffold_graph_edges = scaffold_graph.edge_count();

        write_output(config.path_graph_output(".out"), |s| write_path_graph(&path_graph, s))?;

        let path_graph = linearize_graph(&path_graph);
        ensure!(
            is_graph_linear(&path_graph),
            "Path graph is not linear after branch resolution"
        );
        report.edges_after_linearization = path_graph.edge_count();

        write_output(config.path_graph_output(".out-pre-trans"), |s| {
            write_path_graph(&path_graph, s)
        })?;
        write_output(config.scaffold_graph_output(), |s| {
            write_scaffold_graph(&scaffold_graph, s)
        })?;

        let path_graph = if config.transitive {
            info!("Checking for transitive support");
            transitive_filter(&path_graph, &scaffold_graph)
        } else {
            path_graph
        };
        report.edges_after_transitive_filter = path_graph.edge_count();

        write_output(config.path_graph_output(".out-post-trans"), |s| {
            write_path_graph(&path_graph, s)
        })?;

        let paths = find_paths(&path_graph)?;
        report.paths_found = paths.len();
        Ok((paths, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn file(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, contents).unwrap();
            path
        }

        fn config(&self, paths: &str, graph: &str) -> StitchConfig {
            let path_file = self.file("best.path", paths);
            let graph_file = self.file("graph.dot", graph);
            let mut config = StitchConfig::new(path_file, graph_file);
            config.prefix = self.dir.path().join("test").to_string_lossy().into_owned();
            config
        }

        fn window(&self, n: u32, contents: &str) {
            self.file(&format!("test.n{}.abyss-scaffold.path", n), contents);
        }
    }

    const EMPTY_GRAPH: &str = "digraph adj {\n}\n";

    fn run(config: StitchConfig) -> (String, StitchReport) {
        let stitcher = Stitcher::new(config).unwrap();
        let mut out = Vec::new();
        let report = stitcher.run(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn single_path_without_windows() {
        let fx = Fixture::new();
        let config = fx.config("1\tA+ 100N B-\n", EMPTY_GRAPH);
        let (out, report) = run(config.clone());
        assert_eq!(out, "ntLink_0\tA+ 100N B-\n");
        assert_eq!(report.merge.windows_missing, 1);
        assert_eq!(report.paths_written, 1);

        for stage in &[".out", ".out-pre-trans", ".out-post-trans"] {
            assert!(config.path_graph_output(stage).exists());
        }
        assert!(config.scaffold_graph_output().exists());
    }

    #[test]
    fn disjoint_paths_are_kept_apart() {
        let fx = Fixture::new();
        let config = fx.config("1\tA+ 100N B-\n2\tC+ 20N D-\n", EMPTY_GRAPH);
        let (out, _) = run(config);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, vec!["ntLink_0\tA+ 100N B-", "ntLink_1\tC+ 20N D-"]);
    }

    #[test]
    fn conflicting_windows_keep_the_better_supported_edge() {
        let fx = Fixture::new();
        let mut config = fx.config("1\tA+ 100N B-\n", EMPTY_GRAPH);
        config.min_n = 1;
        config.max_n = 3;
        fx.window(1, "5\tA+ 100N B- 40N E+\n");
        fx.window(2, "5\tA+ 100N B- 10N F+\n");
        fx.window(3, "5\tA+ 100N B- 20N F+\n");

        let (out, report) = run(config);
        assert_eq!(report.merge.windows_read, 3);
        assert_eq!(out, "ntLink_0\tA+ 100N B- 15N F+\n");
    }

    #[test]
    fn tied_windows_keep_neither_edge() {
        let fx = Fixture::new();
        let mut config = fx.config("1\tA+ 100N B-\n", EMPTY_GRAPH);
        config.max_n = 2;
        fx.window(1, "5\tA+ 100N B- 40N E+\n");
        fx.window(2, "5\tA+ 100N B- 10N F+\n");

        let (out, _) = run(config);
        assert_eq!(out, "ntLink_0\tA+ 100N B-\n");
    }

    #[test]
    fn transitive_filter_needs_scaffold_support() {
        let fx = Fixture::new();
        let mut config = fx.config("1\tA+ 100N B-\n", EMPTY_GRAPH);
        config.transitive = true;
        fx.window(1, "5\tB- 40N E+\n");
        let (out, report) = run(config);
        assert_eq!(report.edges_after_linearization, 4);
        assert_eq!(report.edges_after_transitive_filter, 2);
        assert_eq!(out, "ntLink_0\tA+ 100N B-\n");

        // with A+ before and G+ after, B- -> E+ is supported by A+ -> E+
        // and B- -> G+. E+ -> G+ has nothing past G+ to support it.
        let fx = Fixture::new();
        let mut config = fx.config("1\tA+ 100N B-\n", EMPTY_GRAPH);
        config.transitive = true;
        fx.window(1, "5\tA+ 100N B- 40N E+ 10N G+\n");
        let (out, report) = run(config);
        assert_eq!(report.edges_after_linearization, 6);
        assert_eq!(report.edges_after_transitive_filter, 4);
        assert_eq!(out, "ntLink_0\tA+ 100N B- 40N E+\n");
    }

    fn assert_mirrored(graph: &PathGraph) {
        use crate::oriented::reverse_name;
        for (_, s, t, attrs) in graph.edges() {
            let (source, target) = (graph.vertex_name(s), graph.vertex_name(t));
            let mirror = reverse_name(target)
                .zip(reverse_name(source))
                .and_then(|(rt, rs)| graph.edge_between(&rt, &rs))
                .and_then(|e| graph.edge(e));
            match mirror {
                Some(m) => {
                    assert_eq!(m.d, attrs.d, "{} -> {}", source, target);
                    assert_eq!(m.n, attrs.n, "{} -> {}", source, target);
                }
                None => panic!("{} -> {} has no mirror edge", source, target),
            }
        }
    }

    #[test]
    fn reverse_complement_symmetry_holds_after_every_stage() {
        use crate::merge::DEFAULT_NEIGHBOURHOOD;
        use crate::parser::parse_path_lines;
        use crate::path_graph::build_path_graph;

        let primary = parse_path_lines(&["1\tA+ 100N B-", "2\tC+ 20N D-"]).unwrap();
        let mut path_graph = build_path_graph(&primary).unwrap();
        let mut scaffold_graph = ScaffoldGraphParser::new()
            .parse_lines(vec![
                "digraph adj {",
                "\"A+\" -> \"E+\" [d=50 e=1 n=3]",
                "\"E-\" -> \"A-\" [d=50 e=1 n=3]",
                "\"B-\" -> \"G+\" [d=60 e=1 n=3]",
                "\"G-\" -> \"B+\" [d=60 e=1 n=3]",
                "}",
            ])
            .unwrap();
        assert_mirrored(&path_graph);

        let windows = vec![
            vec!["5\tA+ 100N B- 40N E+ 10N G+"],
            vec!["5\tA+ 100N B- 10N F+"],
            vec!["5\tA+ 100N B- 30N E+", "6\tX+ 5N C+ 20N D-"],
        ];
        merge_alternate_windows(
            &mut path_graph,
            &mut scaffold_graph,
            1..=3,
            DEFAULT_NEIGHBOURHOOD,
            |n| parse_path_lines(&windows[n as usize - 1]).map(Some),
        )
        .unwrap();
        assert!(path_graph.edge_count() > 4);
        assert_mirrored(&path_graph);

        let linear = linearize_graph(&path_graph);
        assert!(is_graph_linear(&linear));
        assert!(linear.are_connected("B-", "E+"));
        assert!(!linear.are_connected("B-", "F+"));
        assert_mirrored(&linear);

        let filtered = transitive_filter(&linear, &scaffold_graph);
        assert!(filtered.are_connected("A+", "B-"));
        assert!(filtered.are_connected("C+", "D-"));
        assert_mirrored(&filtered);
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn report_as_json() {
        let fx = Fixture::new();
        let config = fx.config("1\tA+ 100N B-\n", EMPTY_GRAPH);
        let (_, report) = run(config);
        let mut buf = Vec::new();
        report.write_json(&mut buf).unwrap();
        let parsed: StitchReport = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn malformed_scaffold_graph_is_fatal() {
        let fx = Fixture::new();
        let config = fx.config("1\tA+ 100N B-\n", "digraph adj {\nnonsense\n}\n");
        let stitcher = Stitcher::new(config).unwrap();
        let mut out = Vec::new();
        assert!(stitcher.run(&mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn duplicate_primary_adjacency_is_fatal() {
        let fx = Fixture::new();
        let config = fx.config("1\tA+ 100N B-\n2\tA+ 10N C+\n", EMPTY_GRAPH);
        let stitcher = Stitcher::new(config).unwrap();
        assert!(stitcher.run(&mut Vec::new()).is_err());
    }

    #[test]
    fn windows_join_primary_paths() {
        let fx = Fixture::new();
        let mut config = fx.config("1\tA+ 100N B-\n2\tC+ 20N D-\n", EMPTY_GRAPH);
        config.max_n = 2;
        fx.window(1, "5\tB- 10N C+ 20N D- 30N G+\n");
        fx.window(2, "5\tX+ 10N Y-\n");
        let stitcher = Stitcher::new(config).unwrap();

        let path_graph = read_path_graph(&stitcher.config().path_file).unwrap();
        let scaffold_graph = ScaffoldGraphParser::new()
            .parse_file(&stitcher.config().scaffold_graph)
            .unwrap();
        let (paths, _) = stitcher.stitch(path_graph, scaffold_graph).unwrap();

        let mut seen = std::collections::HashSet::new();
        for path in paths.iter() {
            for node in path {
                assert!(seen.insert(node.contig.clone()));
            }
        }
        let strings: Vec<_> = paths.iter().map(|p| crate::writer::path_string(p)).collect();
        assert!(strings.contains(&"A+ 100N B- 10N C+ 20N D- 30N G+".to_string()));
        assert!(strings.contains(&"X+ 10N Y-".to_string()));
    }
}
