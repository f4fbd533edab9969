pub mod error;

pub use self::error::*;

use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

use bstr::io::BufReadExt;
use bstr::ByteSlice;
use lazy_static::lazy_static;
use regex::Regex;

use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::sequence::{pair, terminated};
use nom::IResult;

use crate::graph::{ScaffoldEdge, ScaffoldGraph};
use crate::oriented::{reverse_name, OrientedContig};

/// A single token of a path line: an oriented contig, or the gap
/// estimate between two contigs, written as `<int>N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Contig(OrientedContig),
    Gap(i64),
}

impl PathStep {
    pub fn contig(&self) -> Option<&OrientedContig> {
        match self {
            PathStep::Contig(c) => Some(c),
            PathStep::Gap(_) => None,
        }
    }
}

/// One line of an abyss-scaffold path file,
/// `<path_id>\t<token> <token> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    pub id: String,
    pub steps: Vec<PathStep>,
}

impl PathRecord {
    /// The oriented contigs of the path, with gap tokens stripped
    pub fn contigs(&self) -> impl Iterator<Item = &'_ OrientedContig> {
        self.steps.iter().filter_map(PathStep::contig)
    }

    /// Every (contig, gap, contig) triple of consecutive tokens.
    /// Adjacent contigs without a gap between them are not reported.
    pub fn gapped_adjacencies(
        &self,
    ) -> impl Iterator<Item = (&'_ OrientedContig, i64, &'_ OrientedContig)> {
        self.steps.windows(3).filter_map(|w| match w {
            [PathStep::Contig(a), PathStep::Gap(d), PathStep::Contig(b)] => {
                Some((a, *d, b))
            }
            _ => None,
        })
    }
}

fn gap_token(input: &str) -> IResult<&str, i64> {
    let digits = recognize(pair(opt(char('-')), digit1));
    let gap = map_res(digits, |s: &str| s.parse::<i64>());
    all_consuming(terminated(gap, char('N')))(input)
}

/// Parse a gap token such as `100N` into its length
pub fn parse_gap(token: &str) -> Option<i64> {
    gap_token(token).ok().map(|(_, d)| d)
}

pub fn parse_step(token: &str) -> StitchFieldResult<PathStep> {
    if let Some(d) = parse_gap(token) {
        return Ok(PathStep::Gap(d));
    }
    OrientedContig::parse(token)
        .map(PathStep::Contig)
        .map_err(|_| ParseFieldError::InvalidToken(token.to_string()))
}

fn parse_path_fields(line: &str) -> StitchFieldResult<PathRecord> {
    let mut fields = line.trim().split('\t');
    let id = fields.next().ok_or(ParseFieldError::MissingFields)?;
    let sequence = fields.next().ok_or(ParseFieldError::MissingFields)?;
    if id.is_empty() {
        return Err(ParseFieldError::InvalidField("path_id"));
    }

    let steps = sequence
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(parse_step)
        .collect::<StitchFieldResult<Vec<_>>>()?;

    Ok(PathRecord {
        id: id.to_string(),
        steps,
    })
}

/// Parse a single path line. Returns `Ok(None)` for blank lines.
pub fn parse_path_line(line: &[u8]) -> StitchParseResult<Option<PathRecord>> {
    if line.trim_with(|c| c.is_whitespace()).is_empty() {
        return Ok(None);
    }
    let text = line
        .to_str()
        .map_err(|e| ParseError::invalid_line(e.into(), line))?;
    parse_path_fields(text)
        .map(Some)
        .map_err(|e| ParseError::invalid_line(e, line))
}

pub fn parse_path_lines<I>(lines: I) -> StitchParseResult<Vec<PathRecord>>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut records = Vec::new();
    for line in lines {
        if let Some(record) = parse_path_line(line.as_ref())? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn parse_path_reader<R: BufRead>(reader: R) -> StitchParseResult<Vec<PathRecord>> {
    let mut records = Vec::new();
    for line in reader.byte_lines() {
        if let Some(record) = parse_path_line(&line?)? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn parse_path_file<P: AsRef<Path>>(path: P) -> StitchParseResult<Vec<PathRecord>> {
    let file = File::open(path.as_ref())?;
    parse_path_reader(BufReader::new(file))
}

/// The kinds of line found in an abyss-scaffold dot file, after the
/// header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotLine {
    Vertex(String),
    /// The `e` attribute is parsed but not kept.
    Edge {
        source: String,
        target: String,
        d: i64,
        n: usize,
    },
    Close,
    Blank,
}

pub fn parse_dot_line(line: &str) -> Option<DotLine> {
    lazy_static! {
        static ref NODE_RE: Regex =
            Regex::new(r#""(\S+[+-])"\s+\[l=\d+\]"#).unwrap();
        static ref EDGE_RE: Regex = Regex::new(
            r#""(\S+[+-])"\s+->\s+"(\S+[+-])"\s+\[d=(-?\d+)\s+e=\d+\s+n=(\d+)\]"#
        )
        .unwrap();
    }

    let line = line.trim();
    if line.is_empty() {
        return Some(DotLine::Blank);
    }
    if let Some(caps) = NODE_RE.captures(line) {
        return Some(DotLine::Vertex(caps[1].to_string()));
    }
    if let Some(caps) = EDGE_RE.captures(line) {
        let d = caps[3].parse().ok()?;
        let n = caps[4].parse().ok()?;
        return Some(DotLine::Edge {
            source: caps[1].to_string(),
            target: caps[2].to_string(),
            d,
            n,
        });
    }
    if line == "}" {
        return Some(DotLine::Close);
    }
    None
}

/// Reads the unfiltered scaffold graph written by abyss-scaffold.
/// The first line is always treated as the header.
#[derive(Debug, Default, Clone)]
pub struct ScaffoldGraphParser {}

impl ScaffoldGraphParser {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn parse_lines<I>(&self, lines: I) -> StitchParseResult<ScaffoldGraph>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut graph = ScaffoldGraph::new();
        for line in lines.into_iter().skip(1) {
            self.insert_line(&mut graph, line.as_ref())?;
        }
        Ok(graph)
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> StitchParseResult<ScaffoldGraph> {
        let mut graph = ScaffoldGraph::new();
        for line in reader.byte_lines().skip(1) {
            self.insert_line(&mut graph, &line?)?;
        }
        Ok(graph)
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> StitchParseResult<ScaffoldGraph> {
        let file = File::open(path.as_ref())?;
        self.parse_reader(BufReader::new(file))
    }

    fn insert_line(&self, graph: &mut ScaffoldGraph, line: &[u8]) -> StitchParseResult<()> {
        let text = line
            .to_str()
            .map_err(|e| ParseError::invalid_line(e.into(), line))?;
        match parse_dot_line(text) {
            Some(DotLine::Vertex(name)) => {
                graph.add_vertex(&name);
                if let Some(rev) = reverse_name(&name) {
                    graph.add_vertex(&rev);
                }
            }
            Some(DotLine::Edge {
                source,
                target,
                d,
                n,
            }) => {
                // a repeated edge line replaces the earlier attributes
                match graph.edge_between(&source, &target) {
                    Some(e) => {
                        if let Some(attrs) = graph.edge_mut(e) {
                            *attrs = ScaffoldEdge::new(d, n);
                        }
                    }
                    None => {
                        graph.add_edge(&source, &target, ScaffoldEdge::new(d, n));
                    }
                }
            }
            Some(DotLine::Close) | Some(DotLine::Blank) => (),
            None => return Err(ParseError::unexpected_graph_line(line)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oriented::Orientation;

    #[test]
    fn can_parse_gap_tokens() {
        assert_eq!(parse_gap("100N"), Some(100));
        assert_eq!(parse_gap("-25N"), Some(-25));
        assert_eq!(parse_gap("100"), None);
        assert_eq!(parse_gap("N"), None);
        assert_eq!(parse_gap("10N+"), None);
        assert_eq!(parse_gap("A+"), None);
    }

    #[test]
    fn can_parse_path_line() {
        let line = b"191361\t188729-5+ 21N 40000+ 30N 12-";
        let record = parse_path_line(line).unwrap().unwrap();
        assert_eq!(record.id, "191361");
        assert_eq!(record.steps.len(), 5);
        assert_eq!(
            record.steps[0],
            PathStep::Contig(OrientedContig::new("188729-5", Orientation::Forward))
        );
        assert_eq!(record.steps[1], PathStep::Gap(21));

        let adjacencies: Vec<_> = record
            .gapped_adjacencies()
            .map(|(a, d, b)| (a.to_string(), d, b.to_string()))
            .collect();
        assert_eq!(
            adjacencies,
            vec![
                ("188729-5+".to_string(), 21, "40000+".to_string()),
                ("40000+".to_string(), 30, "12-".to_string()),
            ]
        );
        assert_eq!(record.contigs().count(), 3);
    }

    #[test]
    fn ungapped_neighbours_are_not_adjacencies() {
        let record = parse_path_line(b"7\tA+ B- 5N C+").unwrap().unwrap();
        let adjacencies: Vec<_> = record.gapped_adjacencies().collect();
        assert_eq!(adjacencies.len(), 1);
        assert_eq!(adjacencies[0].0.to_string(), "B-");
    }

    #[test]
    fn bad_path_lines() {
        assert!(parse_path_line(b"").unwrap().is_none());
        assert!(matches!(
            parse_path_line(b"12 A+ 10N B-"),
            Err(ParseError::InvalidLine(ParseFieldError::MissingFields, _))
        ));
        assert!(matches!(
            parse_path_line(b"12\tA+ 10Q B-"),
            Err(ParseError::InvalidLine(ParseFieldError::InvalidToken(_), _))
        ));
        assert!(matches!(
            parse_path_line("1\tAé 10N B+".as_bytes()),
            Err(ParseError::InvalidLine(ParseFieldError::InvalidToken(t), _)) if t == "Aé"
        ));
    }

    #[test]
    fn can_parse_dot_lines() {
        assert_eq!(
            parse_dot_line("\"188266+\" [l=5012]"),
            Some(DotLine::Vertex("188266+".to_string()))
        );
        assert_eq!(
            parse_dot_line("\"188266+\" -> \"189231-\" [d=-41 e=12 n=7]"),
            Some(DotLine::Edge {
                source: "188266+".to_string(),
                target: "189231-".to_string(),
                d: -41,
                n: 7,
            })
        );
        assert_eq!(parse_dot_line("}"), Some(DotLine::Close));
        assert_eq!(parse_dot_line("node [shape=box]"), None);
    }

    #[test]
    fn can_parse_scaffold_graph() {
        let input = "digraph adj {\n\
                     \"A+\" [l=100]\n\
                     \"A-\" [l=100]\n\
                     \"B+\" [l=200]\n\
                     \"B-\" [l=200]\n\
                     \"A+\" -> \"B+\" [d=10 e=3 n=5]\n\
                     \"B-\" -> \"A-\" [d=10 e=3 n=5]\n\
                     }\n";
        let parser = ScaffoldGraphParser::new();
        let graph = parser.parse_lines(input.lines()).unwrap();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        let e = graph.edge_between("A+", "B+").unwrap();
        assert_eq!(graph.edge(e), Some(&ScaffoldEdge::new(10, 5)));
        assert!(graph.are_connected("B-", "A-"));
    }

    #[test]
    fn unexpected_scaffold_line_is_fatal() {
        let input = vec!["digraph adj {", "\"A+\" [l=100]", "garbage", "}"];
        let parser = ScaffoldGraphParser::new();
        match parser.parse_lines(input) {
            Err(ParseError::UnexpectedGraphLine(line)) => assert_eq!(line, "garbage"),
            other => panic!("expected an unexpected-line error, got {:?}", other),
        }
    }
}
