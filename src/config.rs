use std::path::PathBuf;

use anyhow::{ensure, Result};

/// Settings for a stitching run, along with the naming conventions
/// for the alternate windows and the intermediate outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchConfig {
    /// Path file of the best abyss-scaffold run
    pub path_file: PathBuf,
    /// Unfiltered scaffold graph (dot) of the same run
    pub scaffold_graph: PathBuf,
    pub min_n: u32,
    pub max_n: u32,
    pub prefix: String,
    /// Require transitive support for inferred edges
    pub transitive: bool,
    /// Ratio of best to second best edge. Accepted but currently unused.
    pub ratio: f64,
    pub neighbourhood: usize,
}

impl StitchConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(path_file: P, scaffold_graph: Q) -> Self {
        StitchConfig {
            path_file: path_file.into(),
            scaffold_graph: scaffold_graph.into(),
            min_n: 1,
            max_n: 1,
            prefix: "out".to_string(),
            transitive: false,
            ratio: 0.3,
            neighbourhood: crate::merge::DEFAULT_NEIGHBOURHOOD,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_n <= self.max_n,
            "--min_n ({}) must not be larger than --max_n ({})",
            self.min_n,
            self.max_n
        );
        ensure!(
            self.ratio.is_finite() && self.ratio > 0.0,
            "-a must be a positive number, got {}",
            self.ratio
        );
        Ok(())
    }

    pub fn windows(&self) -> std::ops::RangeInclusive<u32> {
        self.min_n..=self.max_n
    }

    /// `<prefix>.n<n>.abyss-scaffold.path`
    pub fn alternate_path_file(&self, n: u32) -> PathBuf {
        PathBuf::from(format!("{}.n{}.abyss-scaffold.path", self.prefix, n))
    }

    /// `<prefix><stage>.scaffold-paths.dot`
    pub fn path_graph_output(&self, stage: &str) -> PathBuf {
        PathBuf::from(format!("{}{}.scaffold-paths.dot", self.prefix, stage))
    }

    /// `<prefix>.out-scaffold_graph.scaffold-post-trans-add.dot`
    pub fn scaffold_graph_output(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}.out-scaffold_graph.scaffold-post-trans-add.dot",
            self.prefix
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        let mut config = StitchConfig::new("best.path", "graph.dot");
        config.prefix = "test1".to_string();
        assert_eq!(
            config.alternate_path_file(5),
            PathBuf::from("test1.n5.abyss-scaffold.path")
        );
        assert_eq!(
            config.path_graph_output(".out-pre-trans"),
            PathBuf::from("test1.out-pre-trans.scaffold-paths.dot")
        );
        assert_eq!(
            config.scaffold_graph_output(),
            PathBuf::from("test1.out-scaffold_graph.scaffold-post-trans-add.dot")
        );
    }

    #[test]
    fn validation() {
        let mut config = StitchConfig::new("best.path", "graph.dot");
        assert!(config.validate().is_ok());
        config.min_n = 5;
        config.max_n = 3;
        assert!(config.validate().is_err());
        config.max_n = 5;
        config.ratio = 0.0;
        assert!(config.validate().is_err());
        config.ratio = f64::NAN;
        assert!(config.validate().is_err());
        config.ratio = 2.5;
        assert!(config.validate().is_ok());
        assert_eq!(config.windows().count(), 1);
    }
}
