//! neurograph CLI
//!
//! Refine, summarize and rasterize directories of SWC skeleton graphs.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use neurograph_core::{DegreeSummary, Graph, RefineConfig};

/// neurograph - skeleton graph topology refinement
#[derive(Parser, Debug)]
#[command(name = "neurograph")]
#[command(about = "Refine skeleton graphs stored as SWC files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run refinement passes and write one SWC per surviving component
    Refine(RefineArgs),
    /// Print branch-length statistics and degree summaries as JSON
    Stats(StatsArgs),
    /// Rasterize the graphs and print voxel counts per label as JSON
    Rasterize(InputArgs),
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Directory of SWC files (every file whose name contains "swc")
    #[arg(short, long)]
    input: PathBuf,

    /// Volume shape used to quantize node positions
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
    shape: Vec<usize>,

    /// Per-axis scaling between voxel and file coordinates
    #[arg(long, num_args = 3, value_names = ["SX", "SY", "SZ"], default_values_t = [1.0, 1.0, 1.0])]
    scale: Vec<f64>,
}

#[derive(Args, Debug)]
struct RefineArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory, created if missing
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file overriding refinement thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which passes to run
    #[arg(long, value_enum, default_value_t = Pass::All)]
    pass: Pass,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// JSON file overriding `min_branch_length`
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Crossovers,
    Pruning,
    All,
}

impl InputArgs {
    fn shape(&self) -> [usize; 3] {
        [self.shape[0], self.shape[1], self.shape[2]]
    }

    fn scale(&self) -> [f64; 3] {
        [self.scale[0], self.scale[1], self.scale[2]]
    }

    fn load(&self) -> Result<Vec<Graph>> {
        let graphs = neurograph_core::read_swc_dir(&self.input, self.shape(), self.scale())
            .with_context(|| format!("loading graphs from {}", self.input.display()))?;
        info!("loaded {} graph(s) from {}", graphs.len(), self.input.display());
        Ok(graphs)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Refine(args) => {
            let written = run_refine(&args)?;
            println!("wrote {} file(s) to {}", written.len(), args.output.display());
        }
        Command::Stats(args) => {
            let report = run_stats(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Rasterize(args) => {
            let report = run_rasterize(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RefineConfig> {
    match path {
        Some(path) => RefineConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(RefineConfig::default()),
    }
}

/// Returns the paths written, one per surviving component.
fn run_refine(args: &RefineArgs) -> Result<Vec<PathBuf>> {
    let config = load_config(args.config.as_deref())?;
    let graphs = args.input.load()?;

    let refined = match args.pass {
        Pass::Crossovers => neurograph_core::refine_crossovers(graphs, config.crossover_depth),
        Pass::Pruning => neurograph_core::refine_pruning_with(
            graphs,
            config.spurious_branch_length,
            config.min_connector_length,
        ),
        Pass::All => neurograph_core::refine(graphs, &config),
    };

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut written = Vec::with_capacity(refined.len());
    for (i, graph) in refined.iter().enumerate() {
        let Some(root) = graph.node_ids().min() else {
            continue;
        };
        let path = args.output.join(format!("component_{:04}.swc", i));
        neurograph_core::write_swc_file(&path, graph, root, args.input.scale())
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[derive(Debug, Serialize)]
struct GraphSummary {
    nodes: usize,
    edges: usize,
    degrees: DegreeSummary,
}

#[derive(Debug, Serialize)]
struct StatsReport {
    graphs: Vec<GraphSummary>,
    branch_lengths: Vec<usize>,
}

fn run_stats(args: &StatsArgs) -> Result<StatsReport> {
    let config = load_config(args.config.as_deref())?;
    let graphs = args.input.load()?;
    let summaries = graphs
        .iter()
        .map(|g| GraphSummary {
            nodes: g.node_count(),
            edges: g.edge_count(),
            degrees: g.degree_summary(),
        })
        .collect();
    Ok(StatsReport {
        graphs: summaries,
        branch_lengths: neurograph_core::branch_length_statistics_with(
            &graphs,
            config.min_branch_length,
        ),
    })
}

#[derive(Debug, Serialize)]
struct RasterReport {
    shape: [usize; 3],
    nonzero: usize,
    labels: BTreeMap<u32, usize>,
}

fn run_rasterize(args: &InputArgs) -> Result<RasterReport> {
    let graphs = args.load()?;
    let volume = neurograph_core::rasterize(&graphs, args.shape()).context("rasterizing graphs")?;

    let mut labels = BTreeMap::new();
    for &label in volume.data() {
        if label != 0 {
            *labels.entry(label).or_insert(0) += 1;
        }
    }
    Ok(RasterReport {
        shape: volume.shape(),
        nonzero: volume.count_nonzero(),
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    /// SWC text for a straight line of `len` nodes along x starting at `y`.
    fn line_swc(len: u64, y: u64) -> String {
        let mut out = String::new();
        for i in 1..=len {
            let parent = if i == 1 { -1 } else { i as i64 - 1 };
            writeln!(out, "{} 0 1 {} {} 1 {}", i, y, i, parent).unwrap();
        }
        out
    }

    fn input_dir(files: &[(&str, String)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            fs::write(dir.path().join(name), text).unwrap();
        }
        dir
    }

    fn input_args(dir: &Path) -> InputArgs {
        InputArgs {
            input: dir.to_path_buf(),
            shape: vec![64, 64, 8],
            scale: vec![1.0, 1.0, 1.0],
        }
    }

    fn stats_args(dir: &Path, config: Option<PathBuf>) -> StatsArgs {
        StatsArgs {
            input: input_args(dir),
            config,
        }
    }

    /// Two junctions joined by a 9-edge run, each carrying two 12-node arms,
    /// with a 3-node spur off the run 5 edges from the first junction.
    fn spurred_dumbbell_swc() -> String {
        fn path(g: &mut Graph, anchor: u64, first: u64, len: u64) {
            let mut prev = anchor;
            for id in first..first + len {
                g.add_edge(prev, id);
                prev = id;
            }
        }

        let mut g = Graph::new();
        path(&mut g, 0, 1, 9);
        for (anchor, first) in [(0, 100), (0, 200), (9, 300), (9, 400)] {
            path(&mut g, anchor, first, 12);
        }
        path(&mut g, 5, 500, 3);

        let entries = neurograph_core::swc_entries(&g, 0, [1.0, 1.0, 1.0]).unwrap();
        let mut buf = Vec::new();
        neurograph_core::write_swc(&mut buf, &entries).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_cli_parses_refine() {
        let cli = Cli::try_parse_from([
            "neurograph", "refine", "--input", "in", "--output", "out", "--shape", "10", "20",
            "30", "--pass", "pruning",
        ])
        .unwrap();
        let Command::Refine(args) = cli.command else {
            panic!("expected refine");
        };
        assert_eq!(args.input.shape(), [10, 20, 30]);
        assert_eq!(args.input.scale(), [1.0, 1.0, 1.0]);
        assert_eq!(args.pass, Pass::Pruning);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_cli_requires_shape() {
        assert!(Cli::try_parse_from(["neurograph", "stats", "--input", "in"]).is_err());
    }

    #[test]
    fn test_refine_writes_large_components_only() {
        let input = input_dir(&[
            ("a.swc", line_swc(20, 5)),
            ("b.swc", line_swc(6, 30)),
            ("notes.txt", String::from("ignored")),
        ]);
        let output = tempfile::tempdir().unwrap();
        let args = RefineArgs {
            input: input_args(input.path()),
            output: output.path().join("refined"),
            config: None,
            pass: Pass::All,
        };

        let written = run_refine(&args).unwrap();
        assert_eq!(written.len(), 1);
        let text = fs::read_to_string(&written[0]).unwrap();
        // header plus one line per node
        assert_eq!(text.lines().count(), 21);
        assert!(text.starts_with("# id"));
    }

    #[test]
    fn test_refine_rejects_bad_config() {
        let input = input_dir(&[("a.swc", line_swc(20, 5))]);
        let config = input.path().join("config.json");
        fs::write(&config, r#"{"crossover_depth": 0}"#).unwrap();
        let output = tempfile::tempdir().unwrap();
        let args = RefineArgs {
            input: input_args(input.path()),
            output: output.path().to_path_buf(),
            config: Some(config),
            pass: Pass::Crossovers,
        };
        assert!(run_refine(&args).is_err());
    }

    #[test]
    fn test_stats_report() {
        let input = input_dir(&[("a.swc", line_swc(20, 5)), ("b.swc", line_swc(6, 30))]);
        let report = run_stats(&stats_args(input.path(), None)).unwrap();
        assert_eq!(report.graphs.len(), 2);
        assert_eq!(report.graphs[0].nodes, 20);
        assert_eq!(report.graphs[0].degrees.leaves, 2);
        // plain paths have no junction-to-junction runs
        assert!(report.branch_lengths.is_empty());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["graphs"][1]["edges"], 5);
    }

    #[test]
    fn test_stats_config_sets_branch_threshold() {
        let input = input_dir(&[("d.swc", spurred_dumbbell_swc())]);

        let default = run_stats(&stats_args(input.path(), None)).unwrap();
        assert_eq!(default.branch_lengths, vec![9]);

        let config = input.path().join("config.json");
        fs::write(&config, r#"{"min_branch_length": 2}"#).unwrap();
        let mut lengths = run_stats(&stats_args(input.path(), Some(config)))
            .unwrap()
            .branch_lengths;
        lengths.sort_unstable();
        assert_eq!(lengths, vec![4, 5]);
    }

    #[test]
    fn test_rasterize_report() {
        let input = input_dir(&[("a.swc", line_swc(20, 5)), ("b.swc", line_swc(6, 30))]);
        let report = run_rasterize(&input_args(input.path())).unwrap();
        assert_eq!(report.shape, [64, 64, 8]);
        assert_eq!(report.labels.len(), 2);
        assert_eq!(report.labels.values().sum::<usize>(), report.nonzero);
    }

    #[test]
    fn test_missing_input_dir_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_stats(&stats_args(&dir.path().join("absent"), None)).unwrap_err();
        assert!(format!("{:#}", err).contains("loading graphs"));
    }
}
