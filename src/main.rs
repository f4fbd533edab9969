use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, LevelFilter};

use ntstitch::{StitchConfig, Stitcher};

/// Find paths through the scaffold graph using the alternate
/// abyss-scaffold windows
#[derive(Parser, Debug)]
#[command(name = "ntstitch", version)]
struct Args {
    /// Path file of the best abyss-scaffold run
    #[arg(value_name = "PATH")]
    path_file: PathBuf,

    /// Start of the n window
    #[arg(long = "min_n", default_value_t = 1)]
    min_n: u32,

    /// End of the n window, inclusive
    #[arg(long = "max_n", default_value_t = 1)]
    max_n: u32,

    /// Unfiltered scaffold graph in dot format
    #[arg(short = 'g', value_name = "GRAPH")]
    scaffold_graph: PathBuf,

    /// Ratio of best to second best edge to create a new connection
    #[arg(short = 'a', default_value_t = 0.3)]
    ratio: f64,

    /// Prefix of the alternate path files and the output graphs
    #[arg(short = 'p', default_value = "out")]
    prefix: String,

    /// Require transitive support for inferred edges
    #[arg(long)]
    transitive: bool,

    /// Write the final paths here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(long)]
    quiet: bool,

    /// Also write the run report as JSON
    #[cfg(feature = "serde1")]
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> StitchConfig {
        let mut config = StitchConfig::new(&self.path_file, &self.scaffold_graph);
        config.min_n = self.min_n;
        config.max_n = self.max_n;
        config.prefix = self.prefix.clone();
        config.transitive = self.transitive;
        config.ratio = self.ratio;
        config
    }

    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let stitcher = Stitcher::new(args.config())?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let report = stitcher.run(&mut out)?;
    log::debug!("{:?}", report);

    #[cfg(feature = "serde1")]
    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        report.write_json(BufWriter::new(file))?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    if let Err(err) = run(&args) {
        error!("{:#}", err);
        process::exit(1);
    }
}
