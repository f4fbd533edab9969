//! Stitch the scaffold paths of an abyss-scaffold run together with
//! the evidence found in alternate runs over a range of minimum
//! support values (`n`).
//!
//! The primary paths become a path graph. Gapped adjacencies from the
//! alternate windows extend it, branches are resolved in favour of
//! the best supported edge, and the remaining simple chains are
//! written out as the new paths.

pub mod config;
pub mod graph;
pub mod linearize;
pub mod merge;
pub mod oriented;
pub mod parser;
pub mod path_graph;
pub mod paths;
pub mod pipeline;
pub mod transitive;
pub mod writer;

pub use self::config::StitchConfig;
pub use self::graph::{GapEdge, GraphStore, PathGraph, PathId, ScaffoldEdge, ScaffoldGraph};
pub use self::oriented::{Orientation, OrientedContig};
pub use self::paths::PathNode;
pub use self::pipeline::{StitchReport, Stitcher};
