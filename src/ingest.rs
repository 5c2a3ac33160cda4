//! Input readers
//!
//! Two ways of getting geometry records (WKT lines, or a CSV file with a
//! `WKT` column) plus the vertex/edge table pair exported by OSM routing
//! graph tools. Undecodable records are reported, never fatal; structural
//! problems (unknown extension, missing column) are errors.

use crate::builder::{SkipReason, SkippedRecord};
use crate::geometry::Geometry;
use crate::graph::{Coordinate, Edge, EdgeAttributes, Graph, Node};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors while reading input files
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported input extension: {0}")]
    UnsupportedExtension(String),

    #[error("{path}: no column named {column}")]
    MissingColumn { path: String, column: String },

    #[error("{table} row {row}: {message}")]
    BadRow {
        table: &'static str,
        row: usize,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Recognized geometry input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One WKT geometry per line
    Wkt,
    /// CSV with a header row and a `WKT` column
    Csv,
}

impl InputFormat {
    /// Pick the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> IngestResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "wkt" | "txt" => Ok(Self::Wkt),
            "csv" => Ok(Self::Csv),
            _ => Err(IngestError::UnsupportedExtension(
                path.display().to_string(),
            )),
        }
    }
}

/// Geometry records read from one input, with the records that failed
#[derive(Debug, Default)]
pub struct Decoded {
    /// Decoded records, numbered by 1-based line (WKT) or data row (CSV)
    pub geometries: Vec<(usize, Geometry)>,
    pub malformed: Vec<SkippedRecord>,
}

impl Decoded {
    fn push(&mut self, record: usize, text: &str) {
        match Geometry::from_wkt(text) {
            Ok(geometry) => self.geometries.push((record, geometry)),
            Err(e) => self.reject(record, e),
        }
    }

    fn reject(&mut self, record: usize, err: impl std::fmt::Display) {
        warn!(record, "cannot decode record: {}", err);
        self.malformed
            .push(SkippedRecord::new(record, SkipReason::Malformed(err.to_string())));
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}

/// Split `reader` on `\n` (dropping a trailing `\r`) and decode each
/// line as UTF-8 on its own, so bad bytes only spoil their own line.
///
/// The outer `Result` is a read failure, the inner one an encoding failure.
pub fn text_lines<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = std::io::Result<Result<String, FromUtf8Error>>> {
    reader.split(b'\n').map(|bytes| {
        bytes.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            String::from_utf8(bytes)
        })
    })
}

/// Read one WKT geometry per line, skipping blank lines
pub fn read_wkt_lines<R: BufRead>(reader: R) -> IngestResult<Decoded> {
    let mut decoded = Decoded::default();
    for (index, line) in text_lines(reader).enumerate() {
        let record = index + 1;
        match line? {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => decoded.push(record, &line),
            Err(e) => decoded.reject(record, e),
        }
    }
    Ok(decoded)
}

/// Read the `WKT` column (matched case-insensitively) of a CSV file
pub fn read_wkt_csv<R: Read>(reader: R, name: &str) -> IngestResult<Decoded> {
    let mut csv = csv::Reader::from_reader(reader);
    let column = csv
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("wkt"))
        .ok_or_else(|| IngestError::MissingColumn {
            path: name.to_string(),
            column: "WKT".to_string(),
        })?;

    let mut decoded = Decoded::default();
    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let text = row.get(column).unwrap_or_default();
        if text.trim().is_empty() {
            continue;
        }
        decoded.push(index + 1, text);
    }
    Ok(decoded)
}

/// Read geometry records from `path`, choosing the reader by extension
pub fn read_geometries(path: &Path) -> IngestResult<Decoded> {
    let format = InputFormat::from_path(path)?;
    let file = std::fs::File::open(path)?;
    let decoded = match format {
        InputFormat::Wkt => read_wkt_lines(BufReader::new(file))?,
        InputFormat::Csv => read_wkt_csv(file, &path.display().to_string())?,
    };
    info!(
        path = %path.display(),
        decoded = decoded.geometries.len(),
        malformed = decoded.malformed.len(),
        "read geometries"
    );
    Ok(decoded)
}

/// A row of a vertex table: `id, lon, lat`
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRow {
    pub id: String,
    pub coordinate: Coordinate,
}

/// A row of an edge table:
/// `id, from, to, length, foot, car_forward, car_backward, bike_forward, bike_backward, wkt`
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub from: String,
    pub to: String,
    pub attributes: EdgeAttributes,
    pub wkt: String,
}

fn table_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

fn field<'r>(
    table: &'static str,
    row: usize,
    record: &'r csv::StringRecord,
    index: usize,
) -> IngestResult<&'r str> {
    record.get(index).map(str::trim).ok_or_else(|| IngestError::BadRow {
        table,
        row,
        message: format!("missing column {}", index + 1),
    })
}

fn number<T: std::str::FromStr>(
    table: &'static str,
    row: usize,
    record: &csv::StringRecord,
    index: usize,
) -> IngestResult<T>
where
    T::Err: std::fmt::Display,
{
    let raw = field(table, row, record, index)?;
    raw.parse().map_err(|e: T::Err| IngestError::BadRow {
        table,
        row,
        message: format!("column {} ({:?}): {}", index + 1, raw, e),
    })
}

/// Read a vertex table; rows whose first column is `id` are headers
pub fn read_vertex_table<R: Read>(reader: R) -> IngestResult<Vec<VertexRow>> {
    const TABLE: &str = "vertex";
    let mut rows = Vec::new();
    for (index, record) in table_reader(reader).records().enumerate() {
        let record = record?;
        let row = index + 1;
        if record.get(0).map(str::trim) == Some("id") {
            continue;
        }
        let lon: f64 = number(TABLE, row, &record, 1)?;
        let lat: f64 = number(TABLE, row, &record, 2)?;
        rows.push(VertexRow {
            id: field(TABLE, row, &record, 0)?.to_string(),
            coordinate: Coordinate::new(lon, lat),
        });
    }
    Ok(rows)
}

/// Read an edge table; rows whose first column is `id` are headers
pub fn read_edge_table<R: Read>(reader: R) -> IngestResult<Vec<EdgeRow>> {
    const TABLE: &str = "edge";
    let mut rows = Vec::new();
    for (index, record) in table_reader(reader).records().enumerate() {
        let record = record?;
        let row = index + 1;
        if record.get(0).map(str::trim) == Some("id") {
            continue;
        }
        rows.push(EdgeRow {
            from: field(TABLE, row, &record, 1)?.to_string(),
            to: field(TABLE, row, &record, 2)?.to_string(),
            attributes: EdgeAttributes {
                id: field(TABLE, row, &record, 0)?.to_string(),
                length: number(TABLE, row, &record, 3)?,
                foot: number(TABLE, row, &record, 4)?,
                car_forward: number(TABLE, row, &record, 5)?,
                car_backward: number(TABLE, row, &record, 6)?,
                bike_forward: number(TABLE, row, &record, 7)?,
                bike_backward: number(TABLE, row, &record, 8)?,
            },
            wkt: field(TABLE, row, &record, 9)?.to_string(),
        });
    }
    Ok(rows)
}

/// A graph assembled from a vertex table and an edge table
#[derive(Debug, Clone)]
pub struct TableGraph {
    pub graph: Graph,
    /// Edge rows whose endpoints could not be resolved, numbered by row
    pub skipped: Vec<SkippedRecord>,
}

impl TableGraph {
    /// Vertices become nodes keyed by their coordinate; each edge row joins
    /// the coordinates of its `from` and `to` vertices and keeps the row's
    /// own WKT.
    pub fn build(vertices: &[VertexRow], edges: &[EdgeRow]) -> Self {
        let mut graph = Graph::new();
        let mut by_id: HashMap<&str, Coordinate> = HashMap::with_capacity(vertices.len());
        for vertex in vertices {
            graph.insert_node(Node::new(vertex.coordinate).with_external_id(vertex.id.clone()));
            by_id.insert(vertex.id.as_str(), vertex.coordinate);
        }

        let mut skipped = Vec::new();
        for (index, row) in edges.iter().enumerate() {
            let endpoints = (by_id.get(row.from.as_str()), by_id.get(row.to.as_str()));
            match endpoints {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(
                        Edge::with_wkt(from, to, row.wkt.clone())
                            .with_attributes(row.attributes.clone()),
                    );
                }
                (None, _) => skipped.push(SkippedRecord::new(
                    index + 1,
                    SkipReason::MissingEndpoint(row.from.clone()),
                )),
                (_, None) => skipped.push(SkippedRecord::new(
                    index + 1,
                    SkipReason::MissingEndpoint(row.to.clone()),
                )),
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped = skipped.len(),
            "table graph built"
        );
        Self { graph, skipped }
    }

    /// Read both tables from disk and build
    pub fn load(vertex_path: &Path, edge_path: &Path) -> IngestResult<Self> {
        let vertices = read_vertex_table(std::fs::File::open(vertex_path)?)?;
        info!("{} vertices read", vertices.len());
        let edges = read_edge_table(std::fs::File::open(edge_path)?)?;
        info!("{} edges read", edges.len());
        Ok(Self::build(&vertices, &edges))
    }
}
