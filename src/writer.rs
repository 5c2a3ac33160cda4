//! WKT output: one line per edge

use crate::graph::Graph;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Options for writing a graph
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Also emit nodes without edges as `POINT (x y)` lines, after the edges
    pub isolated_points: bool,
    /// Rewrite `TYPE(...)` as `TYPE (...)`
    pub normalize_spacing: bool,
}

/// Each edge's stored WKT, once, in edge order
pub fn edge_lines(graph: &Graph) -> impl Iterator<Item = &str> {
    graph.edges().map(|e| e.wkt.as_str())
}

/// Write `graph` to `out`; returns the number of lines written
pub fn write_graph<W: Write>(graph: &Graph, mut out: W, options: &WriteOptions) -> io::Result<usize> {
    let mut lines = 0;
    for wkt in edge_lines(graph) {
        if options.normalize_spacing {
            writeln!(out, "{}", normalize_spacing(wkt))?;
        } else {
            writeln!(out, "{}", wkt)?;
        }
        lines += 1;
    }
    if options.isolated_points {
        for node in graph.isolated_nodes() {
            writeln!(out, "POINT ({})", node.coordinate)?;
            lines += 1;
        }
    }
    out.flush()?;
    Ok(lines)
}

/// Create (or truncate) `path` and write `graph` into it
pub fn write_graph_file(graph: &Graph, path: &Path, options: &WriteOptions) -> io::Result<usize> {
    let file = File::create(path)?;
    write_graph(graph, BufWriter::new(file), options)
}

/// Ensure exactly one space between the geometry tag and its first `(`.
///
/// Text without a parenthesis is returned as is.
pub fn normalize_spacing(wkt: &str) -> String {
    match wkt.split_once('(') {
        Some((tag, rest)) => format!("{} ({}", tag.trim_end(), rest),
        None => wkt.to_string(),
    }
}
