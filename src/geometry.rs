//! Geometry records decoded from WKT
//!
//! The decoder output is a closed enum so the builder and the reprojector
//! must handle every variant, including the ones they refuse.

use crate::graph::Coordinate;
use geozero::wkt::Wkt;
use geozero::ToGeo;
use serde::Serialize;
use thiserror::Error;

/// Errors from decoding a WKT record
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("malformed WKT: {0}")]
    Decode(#[from] geozero::error::GeozeroError),

    #[error("non-finite coordinate in {0} record")]
    NonFinite(GeometryKind),
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Every geometry type name a WKT record can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GeometryKind {
    Point,
    LineString,
    MultiLineString,
    GeometryCollection,
    Polygon,
    MultiPoint,
    MultiPolygon,
    Rect,
    Triangle,
}

impl GeometryKind {
    /// Upper-case WKT tag
    pub fn wkt_tag(&self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::LineString => "LINESTRING",
            Self::MultiLineString => "MULTILINESTRING",
            Self::GeometryCollection => "GEOMETRYCOLLECTION",
            Self::Polygon => "POLYGON",
            Self::MultiPoint => "MULTIPOINT",
            Self::MultiPolygon => "MULTIPOLYGON",
            Self::Rect => "RECT",
            Self::Triangle => "TRIANGLE",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wkt_tag())
    }
}

/// A decoded geometry record
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    GeometryCollection(Vec<Geometry>),
    /// Exterior ring followed by interior rings
    Polygon(Vec<Vec<Coordinate>>),
    /// Any other type the decoder understands; carried only for diagnostics
    Other(GeometryKind),
}

impl Geometry {
    /// Decode one WKT text
    pub fn from_wkt(text: &str) -> GeometryResult<Self> {
        let decoded = Wkt(text.trim()).to_geo()?;
        let geometry = Self::from(decoded);
        if !geometry.is_finite() {
            return Err(GeometryError::NonFinite(geometry.kind()));
        }
        Ok(geometry)
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::LineString(_) => GeometryKind::LineString,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::GeometryCollection(_) => GeometryKind::GeometryCollection,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::Other(kind) => *kind,
        }
    }

    /// Total number of vertices, collections included
    pub fn coordinate_count(&self) -> usize {
        match self {
            Self::Point(_) => 1,
            Self::LineString(points) => points.len(),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter().map(Vec::len).sum()
            }
            Self::GeometryCollection(members) => {
                members.iter().map(Geometry::coordinate_count).sum()
            }
            Self::Other(_) => 0,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::Point(c) => c.is_finite(),
            Self::LineString(points) => points.iter().all(Coordinate::is_finite),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter().flatten().all(Coordinate::is_finite)
            }
            Self::GeometryCollection(members) => members.iter().all(Geometry::is_finite),
            Self::Other(_) => true,
        }
    }
}

fn line_coords(line: &geo_types::LineString<f64>) -> Vec<Coordinate> {
    line.coords().map(|c| Coordinate::from(*c)).collect()
}

impl From<geo_types::Geometry<f64>> for Geometry {
    fn from(geometry: geo_types::Geometry<f64>) -> Self {
        use geo_types::Geometry as G;
        match geometry {
            G::Point(p) => Self::Point(Coordinate::new(p.x(), p.y())),
            G::Line(l) => Self::LineString(vec![l.start.into(), l.end.into()]),
            G::LineString(ls) => Self::LineString(line_coords(&ls)),
            G::MultiLineString(mls) => {
                Self::MultiLineString(mls.0.iter().map(line_coords).collect())
            }
            G::GeometryCollection(gc) => {
                Self::GeometryCollection(gc.0.into_iter().map(Geometry::from).collect())
            }
            G::Polygon(polygon) => {
                let mut rings = vec![line_coords(polygon.exterior())];
                rings.extend(polygon.interiors().iter().map(line_coords));
                Self::Polygon(rings)
            }
            G::MultiPoint(_) => Self::Other(GeometryKind::MultiPoint),
            G::MultiPolygon(_) => Self::Other(GeometryKind::MultiPolygon),
            G::Rect(_) => Self::Other(GeometryKind::Rect),
            G::Triangle(_) => Self::Other(GeometryKind::Triangle),
        }
    }
}
