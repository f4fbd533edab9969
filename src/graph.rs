//! The directed multigraph used for both the scaffold graph and the
//! path graph, along with the edge attribute types attached to each of
//! them.

use std::collections::VecDeque;
use std::fmt;

use fnv::{FnvHashMap, FnvHashSet};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};

pub use petgraph::Direction;

/// Provenance of a path graph edge: either the name of the consensus
/// path it was read from, or `New` if it was inferred from an
/// alternate window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathId {
    Consensus(String),
    New,
}

impl PathId {
    #[inline]
    pub fn is_new(&self) -> bool {
        matches!(self, PathId::New)
    }
}

/// `New` is written as `new`, consensus paths by their name
impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathId::Consensus(id) => write!(f, "{}", id),
            PathId::New => write!(f, "new"),
        }
    }
}

/// Path graph edge attributes. `n` is only tracked for inferred
/// edges, where it counts the alternate-window observations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GapEdge {
    pub d: i64,
    pub n: Option<usize>,
    pub path_id: PathId,
}

impl GapEdge {
    pub fn consensus<S: Into<String>>(d: i64, path_id: S) -> Self {
        GapEdge {
            d,
            n: None,
            path_id: PathId::Consensus(path_id.into()),
        }
    }

    pub fn inferred(d: i64, n: usize) -> Self {
        GapEdge {
            d,
            n: Some(n),
            path_id: PathId::New,
        }
    }

    #[inline]
    pub fn is_inferred(&self) -> bool {
        self.path_id.is_new()
    }

    /// Support count, treating untracked counts as zero
    #[inline]
    pub fn support(&self) -> usize {
        self.n.unwrap_or(0)
    }
}

/// Scaffold graph edge attributes. Edges spliced in from transitive
/// support carry no attributes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaffoldEdge {
    pub d: Option<i64>,
    pub n: Option<usize>,
}

impl ScaffoldEdge {
    pub fn new(d: i64, n: usize) -> Self {
        ScaffoldEdge {
            d: Some(d),
            n: Some(n),
        }
    }
}

pub type PathGraph = GraphStore<GapEdge>;
pub type ScaffoldGraph = GraphStore<ScaffoldEdge>;

/// Directed multigraph with string-named vertices. Vertex and edge
/// indices stay stable across edge deletions; vertices are never
/// removed.
#[derive(Debug, Clone)]
pub struct GraphStore<E> {
    graph: StableDiGraph<String, E>,
    names: FnvHashMap<String, NodeIndex>,
}

impl<E> Default for GraphStore<E> {
    fn default() -> Self {
        GraphStore {
            graph: StableDiGraph::default(),
            names: FnvHashMap::default(),
        }
    }
}

impl<E> GraphStore<E> {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a vertex by name, returning the index of the existing
    /// vertex if the name is already present.
    pub fn add_vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(ix) = self.names.get(name) {
            return *ix;
        }
        let ix = self.graph.add_node(name.to_string());
        self.names.insert(name.to_string(), ix);
        ix
    }

    pub fn add_vertices<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            self.add_vertex(name.as_ref());
        }
    }

    #[inline]
    pub fn has_vertex(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    #[inline]
    pub fn vertex_index(&self, name: &str) -> Option<NodeIndex> {
        self.names.get(name).copied()
    }

    /// Panics if `ix` is not a vertex of this graph
    #[inline]
    pub fn vertex_name(&self, ix: NodeIndex) -> &str {
        &self.graph[ix]
    }

    pub fn vertices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Add an edge between two named vertices, creating either
    /// endpoint if it does not exist yet. Parallel edges are allowed.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: E) -> EdgeIndex {
        let s = self.add_vertex(source);
        let t = self.add_vertex(target);
        self.graph.add_edge(s, t, weight)
    }

    pub fn edge_between(&self, source: &str, target: &str) -> Option<EdgeIndex> {
        let s = self.vertex_index(source)?;
        let t = self.vertex_index(target)?;
        self.graph.find_edge(s, t)
    }

    /// True if both vertices exist and there is an edge from `source`
    /// to `target`.
    #[inline]
    pub fn are_connected(&self, source: &str, target: &str) -> bool {
        self.edge_between(source, target).is_some()
    }

    #[inline]
    pub fn edge(&self, ix: EdgeIndex) -> Option<&E> {
        self.graph.edge_weight(ix)
    }

    #[inline]
    pub fn edge_mut(&mut self, ix: EdgeIndex) -> Option<&mut E> {
        self.graph.edge_weight_mut(ix)
    }

    #[inline]
    pub fn endpoints(&self, ix: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(ix)
    }

    /// Iterate over all edges as (index, source, target, attributes),
    /// in index order.
    pub fn edges(
        &self,
    ) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &E)> + '_ {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (e.id(), e.source(), e.target(), e.weight()))
            .collect();
        edges.sort_by_key(|e| e.0);
        edges.into_iter()
    }

    #[inline]
    pub fn degree(&self, ix: NodeIndex, dir: Direction) -> usize {
        self.graph.edges_directed(ix, dir).count()
    }

    #[inline]
    pub fn in_degree(&self, ix: NodeIndex) -> usize {
        self.degree(ix, Direction::Incoming)
    }

    #[inline]
    pub fn out_degree(&self, ix: NodeIndex) -> usize {
        self.degree(ix, Direction::Outgoing)
    }

    /// Indices of the edges entering (`Incoming`) or leaving
    /// (`Outgoing`) a vertex, sorted by edge index.
    pub fn incident(&self, ix: NodeIndex, dir: Direction) -> Vec<EdgeIndex> {
        let mut edges: Vec<_> =
            self.graph.edges_directed(ix, dir).map(|e| e.id()).collect();
        edges.sort();
        edges
    }

    /// Weakly connected components. Components are ordered by their
    /// lowest vertex index and each holds its vertices in index order.
    pub fn weak_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_bound());
        for e in self.graph.edge_references() {
            sets.union(e.source().index(), e.target().index());
        }

        let mut component_of: FnvHashMap<usize, usize> = FnvHashMap::default();
        let mut components: Vec<Vec<NodeIndex>> = Vec::new();
        for ix in self.graph.node_indices() {
            let root = sets.find(ix.index());
            let next = components.len();
            let comp = *component_of.entry(root).or_insert(next);
            if comp == components.len() {
                components.push(Vec::new());
            }
            components[comp].push(ix);
        }
        components
    }

    /// Breadth-first shortest path following edge direction. Returns
    /// the vertex sequence from `source` to `target` inclusive, or
    /// `None` if `target` is unreachable. Ties are broken arbitrarily.
    pub fn shortest_path(
        &self,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<Vec<NodeIndex>> {
        let mut parent: FnvHashMap<NodeIndex, NodeIndex> = FnvHashMap::default();
        let mut seen: FnvHashSet<NodeIndex> = FnvHashSet::default();
        let mut queue = VecDeque::new();

        seen.insert(source);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            if v == target {
                let mut path = vec![target];
                let mut cur = target;
                while let Some(&p) = parent.get(&cur) {
                    path.push(p);
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            for w in self.graph.neighbors_directed(v, Direction::Outgoing) {
                if seen.insert(w) {
                    parent.insert(w, v);
                    queue.push_back(w);
                }
            }
        }
        None
    }

    /// All vertices within `order` steps of `ix` in the given
    /// direction, `ix` itself included, in breadth-first order.
    pub fn neighborhood(
        &self,
        ix: NodeIndex,
        order: usize,
        dir: Direction,
    ) -> Vec<NodeIndex> {
        let mut seen: FnvHashSet<NodeIndex> = FnvHashSet::default();
        let mut result = vec![ix];
        let mut frontier = vec![ix];
        seen.insert(ix);

        for _ in 0..order {
            let mut next = Vec::new();
            for &v in frontier.iter() {
                for w in self.graph.neighbors_directed(v, dir) {
                    if seen.insert(w) {
                        result.push(w);
                        next.push(w);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        result
    }

    /// Remove the given edges. Indices that are not (or no longer)
    /// in the graph are ignored.
    pub fn delete_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = EdgeIndex>,
    {
        for e in edges {
            self.graph.remove_edge(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> GraphStore<()> {
        let mut g = GraphStore::new();
        g.add_edge("A+", "B+", ());
        g.add_edge("B+", "C+", ());
        g.add_edge("C+", "D+", ());
        g.add_edge("X+", "Y+", ());
        g
    }

    #[test]
    fn add_vertices_is_idempotent() {
        let mut g: GraphStore<()> = GraphStore::new();
        g.add_vertices(vec!["A+", "A-", "A+"]);
        let ix = g.add_vertex("A-");
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.vertex_name(ix), "A-");
        assert_eq!(g.vertex_index("A+"), Some(NodeIndex::new(0)));
        assert!(!g.has_vertex("B+"));
    }

    #[test]
    fn degrees_and_connectivity() {
        let g = chain();
        let b = g.vertex_index("B+").unwrap();
        assert_eq!(g.in_degree(b), 1);
        assert_eq!(g.out_degree(b), 1);
        assert!(g.are_connected("A+", "B+"));
        assert!(!g.are_connected("B+", "A+"));
        assert!(!g.are_connected("A+", "Q+"));
        assert_eq!(g.incident(b, Direction::Outgoing).len(), 1);
    }

    #[test]
    fn weak_components_in_index_order() {
        let g = chain();
        let comps = g.weak_components();
        assert_eq!(comps.len(), 2);
        let names: Vec<Vec<&str>> = comps
            .iter()
            .map(|c| c.iter().map(|&v| g.vertex_name(v)).collect())
            .collect();
        assert_eq!(names[0], vec!["A+", "B+", "C+", "D+"]);
        assert_eq!(names[1], vec!["X+", "Y+"]);
    }

    #[test]
    fn shortest_path_follows_direction() {
        let mut g = chain();
        g.add_edge("A+", "C+", ());
        let a = g.vertex_index("A+").unwrap();
        let d = g.vertex_index("D+").unwrap();
        let path = g.shortest_path(a, d).unwrap();
        let names: Vec<_> = path.iter().map(|&v| g.vertex_name(v)).collect();
        assert_eq!(names, vec!["A+", "C+", "D+"]);
        assert_eq!(g.shortest_path(d, a), None);
        assert_eq!(g.shortest_path(a, a), Some(vec![a]));
    }

    #[test]
    fn bounded_neighborhood() {
        let g = chain();
        let a = g.vertex_index("A+").unwrap();
        let d = g.vertex_index("D+").unwrap();
        assert_eq!(g.neighborhood(a, 0, Direction::Outgoing), vec![a]);
        assert_eq!(g.neighborhood(a, 2, Direction::Outgoing).len(), 3);
        assert_eq!(g.neighborhood(a, 10, Direction::Outgoing).len(), 4);
        assert_eq!(g.neighborhood(a, 10, Direction::Incoming), vec![a]);
        assert_eq!(g.neighborhood(d, 10, Direction::Incoming).len(), 4);
    }

    #[test]
    fn delete_edges_keeps_indices_stable() {
        let mut g = chain();
        let ab = g.edge_between("A+", "B+").unwrap();
        let cd = g.edge_between("C+", "D+").unwrap();
        g.delete_edges(vec![ab]);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_between("C+", "D+"), Some(cd));
        assert_eq!(g.vertex_count(), 6);
        assert_eq!(g.weak_components().len(), 3);
        g.delete_edges(vec![ab]);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn path_id_display() {
        assert_eq!(PathId::New.to_string(), "new");
        assert_eq!(PathId::Consensus("191361".into()).to_string(), "191361");
        assert!(GapEdge::inferred(10, 2).is_inferred());
        assert!(!GapEdge::consensus(10, "1").is_inferred());
    }
}
