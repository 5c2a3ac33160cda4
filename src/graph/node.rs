//! Node representation: a coordinate pair is the node identity

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A planar coordinate pair.
///
/// Equality and hashing are exact value comparisons (no tolerance or
/// snapping), so two geometries share a node only when their vertices are
/// bit-for-bit the same number. `0.0` and `-0.0` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: OrderedFloat<f64>,
    y: OrderedFloat<f64>,
}

impl Coordinate {
    /// Create a coordinate from raw values
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: OrderedFloat(x),
            y: OrderedFloat(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x.into_inner()
    }

    pub fn y(&self) -> f64 {
        self.y.into_inner()
    }

    /// True when both components are finite
    pub fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }

    /// Return a copy moved by `(dx, dy)`
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x() + dx, self.y() + dy)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<geo_types::Coord<f64>> for Coordinate {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

/// Renders as `x y`, the WKT coordinate form.
impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.x(), self.y())
    }
}

/// A node in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Position, and the node's identity
    pub coordinate: Coordinate,
    /// Identifier from a vertex table, when the graph was loaded from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl Node {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            external_id: None,
        }
    }

    /// Attach the vertex-table identifier
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}
