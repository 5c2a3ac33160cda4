//! Undirected edge annotated with its WKT fragment

use super::node::Coordinate;
use serde::{Deserialize, Serialize};

/// Canonical key of an undirected edge
///
/// The smaller endpoint (lexicographic on x, then y) is always stored
/// first, so `(a, b)` and `(b, a)` produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(Coordinate, Coordinate);

impl EdgeKey {
    pub fn new(a: Coordinate, b: Coordinate) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Both endpoints, smaller first
    pub fn endpoints(&self) -> (Coordinate, Coordinate) {
        (self.0, self.1)
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})-({})", self.0, self.1)
    }
}

/// Extra columns carried by rows of an edge table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    pub id: String,
    pub length: f64,
    pub foot: i32,
    pub car_forward: i32,
    pub car_backward: i32,
    pub bike_forward: i32,
    pub bike_backward: i32,
}

/// An undirected edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Endpoint the fragment starts at
    pub from: Coordinate,
    /// Endpoint the fragment ends at
    pub to: Coordinate,
    /// WKT text written out for this edge
    pub wkt: String,
    /// Table columns, for edges loaded from an edge table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<EdgeAttributes>,
}

impl Edge {
    /// A straight segment; the annotation is `LINESTRING (x1 y1, x2 y2)`.
    pub fn segment(from: Coordinate, to: Coordinate) -> Self {
        Self {
            from,
            to,
            wkt: segment_wkt(from, to),
            attributes: None,
        }
    }

    /// An edge with a caller-supplied WKT annotation
    pub fn with_wkt(from: Coordinate, to: Coordinate, wkt: impl Into<String>) -> Self {
        Self {
            from,
            to,
            wkt: wkt.into(),
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: EdgeAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }
}

/// Render the two-point LINESTRING for a segment
pub fn segment_wkt(from: Coordinate, to: Coordinate) -> String {
    format!("LINESTRING ({}, {})", from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = Coordinate::new(1.0, 0.0);
        let b = Coordinate::new(0.0, 5.0);
        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        assert_eq!(EdgeKey::new(a, b).endpoints(), (b, a));
    }

    #[test]
    fn segment_keeps_direction_in_wkt() {
        let e = Edge::segment(Coordinate::new(1.0, 0.0), Coordinate::new(0.0, 0.0));
        assert_eq!(e.wkt, "LINESTRING (1 0, 0 0)");
    }
}
