//! wktgraph CLI: build component graphs from WKT, reproject WKT files.
//!
//! Usage:
//!   wktgraph graph --input <path> --output-dir <dir> [--report <json>]
//!   wktgraph reproject --projection <crs> --input <path> --output <path>
//!   wktgraph tables --edges <csv> --vertex <csv> --outdir <dir>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use wktgraph::{Config, GraphPipeline, MultiLineStringPolicy, Reprojector, TablePipeline};

/// Exit code for configuration and report failures
const EXIT_OTHER: i32 = 5;

#[derive(Parser)]
#[command(
    name = "wktgraph",
    version,
    about = "Coordinate-keyed graphs from WKT geometries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML config file (default: <config dir>/wktgraph/config.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and write its connected components
    Graph {
        /// WKT (.wkt, .txt) or CSV (.csv, with a WKT column) input
        #[arg(long)]
        input: PathBuf,
        /// Directory for the component files; must be empty or absent
        #[arg(long, alias = "outputDir")]
        output_dir: PathBuf,
        /// Also write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write nodes without edges as POINT lines
        #[arg(long)]
        isolated_points: bool,
        /// Split MULTILINESTRING records into their member lines
        #[arg(long)]
        split_multilines: bool,
    },
    /// Reproject a WKT file, one geometry per line
    Reproject {
        /// Spatial reference of the input
        #[arg(long, default_value = "epsg:4326")]
        projection: String,
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "./output_reprojected.wkt")]
        output: PathBuf,
        /// Target reference (default from config, else EPSG:3857)
        #[arg(long)]
        target: Option<String>,
        /// Fail on geometry types that cannot be reprojected
        #[arg(long)]
        strict: bool,
    },
    /// Keep the largest component of a vertex/edge CSV table pair
    Tables {
        #[arg(long, default_value = "edges.csv")]
        edges: PathBuf,
        #[arg(long, default_value = "vertex.csv")]
        vertex: PathBuf,
        #[arg(long, default_value = "./")]
        outdir: PathBuf,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn write_report(path: &Path, report: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("Failed to serialize report: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn cmd_graph(
    mut config: Config,
    input: PathBuf,
    output_dir: PathBuf,
    report_path: Option<PathBuf>,
    isolated_points: bool,
    split_multilines: bool,
) -> i32 {
    if isolated_points {
        config.output.isolated_points = true;
    }
    if split_multilines {
        config.graph.multilinestring = MultiLineStringPolicy::Split;
    }

    let report = match GraphPipeline::new(input, output_dir).with_config(config).run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };

    println!(
        "Graph: {} nodes, {} edges, {} components",
        report.nodes,
        report.edges,
        report.components.len()
    );
    if let Some(largest) = report.largest() {
        println!("Largest component: {} nodes, {} edges", largest.nodes, largest.edges);
    }
    if report.skipped_count > 0 {
        println!("Skipped: {} records", report.skipped_count);
    }
    for file in &report.files {
        println!("  {}", file.display());
    }

    if let Some(path) = report_path {
        if let Err(e) = write_report(&path, &report) {
            eprintln!("Error: {}", e);
            return EXIT_OTHER;
        }
    }
    0
}

fn cmd_reproject(
    config: &Config,
    projection: String,
    input: &Path,
    output: &Path,
    target: Option<String>,
    strict: bool,
) -> i32 {
    let target = target.unwrap_or_else(|| config.reproject.target_crs.clone());
    let reprojector = match Reprojector::new(projection).and_then(|r| r.with_target(target)) {
        Ok(r) => r.strict(strict || config.reproject.strict),
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };
    match reprojector.reproject_file(input, output) {
        Ok(summary) => {
            println!(
                "Reprojected {} of {} lines from {} to {} into {}",
                summary.reprojected,
                summary.lines,
                reprojector.source(),
                reprojector.target(),
                output.display()
            );
            if summary.unsupported > 0 {
                println!("Unsupported: {} lines written empty", summary.unsupported);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn cmd_tables(edges: PathBuf, vertex: PathBuf, outdir: PathBuf) -> i32 {
    let pipeline = TablePipeline {
        vertices: vertex,
        edges,
        output_dir: outdir,
    };
    match pipeline.run() {
        Ok(report) => {
            println!(
                "Kept {} of {} nodes in {}",
                report.largest.map(|c| c.nodes).unwrap_or(0),
                report.nodes,
                report.output.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_OTHER);
        }
    };

    let code = match cli.command {
        Commands::Graph {
            input,
            output_dir,
            report,
            isolated_points,
            split_multilines,
        } => cmd_graph(config, input, output_dir, report, isolated_points, split_multilines),
        Commands::Reproject {
            projection,
            input,
            output,
            target,
            strict,
        } => cmd_reproject(&config, projection, &input, &output, target, strict),
        Commands::Tables { edges, vertex, outdir } => cmd_tables(edges, vertex, outdir),
    };
    std::process::exit(code);
}
