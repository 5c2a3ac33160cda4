//! Reprojection of WKT records into a fixed target reference
//!
//! This pipeline is independent of the graph: each input line is decoded,
//! every coordinate is transformed, and the geometry is rendered again as
//! one output line. Unlike graph building, a failure aborts the run, since
//! a half-reprojected file mixes two coordinate systems.

mod crs;
mod transform;

pub use crs::{resolve as resolve_crs, CrsDefinition};
#[cfg(feature = "proj")]
pub use transform::ProjTransform;
pub use transform::{default_transform, CoordinateTransform, GeodesyTransform};

use crate::geometry::{Geometry, GeometryError, GeometryKind};
use crate::graph::Coordinate;
use crate::ingest::text_lines;
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Target reference when none is configured (spherical web mercator)
pub const DEFAULT_TARGET_CRS: &str = "EPSG:3857";

/// Errors from reprojection
#[derive(Debug, Error)]
pub enum ReprojectError {
    #[error("invalid spatial reference: {0}")]
    InvalidCrs(String),

    #[error("projection failed: {0}")]
    Projection(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("unsupported geometry {0}")]
    Unsupported(GeometryKind),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        source: Box<ReprojectError>,
    },

    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReprojectResult<T> = Result<T, ReprojectError>;

impl ReprojectError {
    /// Process exit code, matching the graph pipeline's codes where they overlap
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound(_) => 1,
            _ => 5,
        }
    }
}

/// Counts from reprojecting a whole input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReprojectSummary {
    /// Input lines read (and output lines written)
    pub lines: usize,
    pub reprojected: usize,
    pub blank: usize,
    /// Lines written empty because their geometry type is not handled
    pub unsupported: usize,
}

enum Outcome {
    Blank,
    Reprojected(String),
    Unsupported(GeometryKind),
}

/// Reprojects WKT records from one spatial reference into another
#[derive(Debug)]
pub struct Reprojector {
    source: String,
    target: String,
    strict: bool,
    transform: Box<dyn CoordinateTransform>,
}

impl Reprojector {
    /// Reproject from `source` into [`DEFAULT_TARGET_CRS`]
    pub fn new(source: impl Into<String>) -> ReprojectResult<Self> {
        let reprojector = Self {
            source: source.into(),
            target: DEFAULT_TARGET_CRS.to_string(),
            strict: false,
            transform: default_transform(),
        };
        reprojector.validate()?;
        Ok(reprojector)
    }

    pub fn with_target(mut self, target: impl Into<String>) -> ReprojectResult<Self> {
        self.target = target.into();
        self.validate()?;
        Ok(self)
    }

    pub fn with_transform(mut self, transform: Box<dyn CoordinateTransform>) -> ReprojectResult<Self> {
        self.transform = transform;
        self.validate()?;
        Ok(self)
    }

    /// In strict mode unsupported geometry types are errors instead of
    /// empty output lines
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn validate(&self) -> ReprojectResult<()> {
        self.transform.validate(&self.source)?;
        self.transform.validate(&self.target)
    }

    /// Reproject one WKT line.
    ///
    /// Blank input gives an empty string. Unsupported geometry types give
    /// an empty string too, or an error in strict mode.
    pub fn reproject_entity(&self, line: &str) -> ReprojectResult<String> {
        match self.reproject_line(line)? {
            Outcome::Reprojected(wkt) => Ok(wkt),
            Outcome::Blank | Outcome::Unsupported(_) => Ok(String::new()),
        }
    }

    /// Reproject and render a decoded geometry; `None` for unsupported types
    pub fn reproject_geometry(&self, geometry: &Geometry) -> ReprojectResult<Option<String>> {
        let wkt = match geometry {
            Geometry::Point(c) => {
                let [p] = self.project([*c])?;
                format!("POINT ({})", p)
            }
            Geometry::LineString(points) => {
                format!("LINESTRING {}", self.render_path(points)?)
            }
            Geometry::MultiLineString(lines) => {
                let parts = lines
                    .iter()
                    .map(|line| self.render_path(line))
                    .collect::<ReprojectResult<Vec<_>>>()?;
                format!("MULTILINESTRING ({})", parts.join(", "))
            }
            Geometry::GeometryCollection(_) | Geometry::Polygon(_) | Geometry::Other(_) => {
                return Ok(None)
            }
        };
        Ok(Some(wkt))
    }

    /// Reproject every line of `input` into `output`, one line each.
    ///
    /// Stops at the first failing line; the error carries its 1-based
    /// line number.
    pub fn reproject_lines<R: BufRead, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> ReprojectResult<ReprojectSummary> {
        let mut summary = ReprojectSummary::default();
        for (index, line) in text_lines(input).enumerate() {
            let outcome = line?
                .map_err(ReprojectError::from)
                .and_then(|line| self.reproject_line(&line))
                .map_err(|e| ReprojectError::Line {
                    line: index + 1,
                    source: Box::new(e),
                })?;
            summary.lines += 1;
            match outcome {
                Outcome::Blank => {
                    summary.blank += 1;
                    writeln!(output)?;
                }
                Outcome::Unsupported(kind) => {
                    warn!(line = index + 1, "cannot reproject {}, writing empty line", kind);
                    summary.unsupported += 1;
                    writeln!(output)?;
                }
                Outcome::Reprojected(wkt) => {
                    summary.reprojected += 1;
                    writeln!(output, "{}", wkt)?;
                }
            }
        }
        output.flush()?;
        Ok(summary)
    }

    /// Reproject the file at `input` into `output`.
    ///
    /// The output file is only created once every line succeeded.
    pub fn reproject_file(&self, input: &Path, output: &Path) -> ReprojectResult<ReprojectSummary> {
        if !input.is_file() {
            return Err(ReprojectError::InputNotFound(input.to_path_buf()));
        }
        let reader = BufReader::new(std::fs::File::open(input)?);
        let mut buffer = Vec::new();
        let summary = self.reproject_lines(reader, &mut buffer)?;
        std::fs::write(output, buffer)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            lines = summary.lines,
            unsupported = summary.unsupported,
            "reprojected {} -> {}",
            self.source,
            self.target
        );
        Ok(summary)
    }

    fn reproject_line(&self, line: &str) -> ReprojectResult<Outcome> {
        if line.trim().is_empty() {
            return Ok(Outcome::Blank);
        }
        let geometry = Geometry::from_wkt(line)?;
        match self.reproject_geometry(&geometry)? {
            Some(wkt) => Ok(Outcome::Reprojected(wkt)),
            None if self.strict => Err(ReprojectError::Unsupported(geometry.kind())),
            None => Ok(Outcome::Unsupported(geometry.kind())),
        }
    }

    fn project<const N: usize>(&self, mut coords: [Coordinate; N]) -> ReprojectResult<[Coordinate; N]> {
        self.transform
            .transform(&self.source, &self.target, &mut coords)?;
        Ok(coords)
    }

    /// `(x1 y1, x2 y2, ...)` in the target reference
    fn render_path(&self, points: &[Coordinate]) -> ReprojectResult<String> {
        let mut projected = points.to_vec();
        self.transform
            .transform(&self.source, &self.target, &mut projected)?;
        let body = projected
            .iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("({})", body))
    }
}

/// Reproject one WKT line from `source` into [`DEFAULT_TARGET_CRS`].
///
/// Blank lines are returned as an empty string without touching the
/// spatial reference.
pub fn reproject_entity(line: &str, source: &str) -> ReprojectResult<String> {
    if line.trim().is_empty() {
        return Ok(String::new());
    }
    Reprojector::new(source)?.reproject_entity(line)
}
