//! Bounding boxes and origin shifting
//!
//! Some network simulators reject negative coordinates, so the largest
//! component is written a second time translated until its minimum corner
//! sits at (0, 0).

use crate::graph::{Coordinate, Edge, Graph, GraphError, GraphResult};
use serde::Serialize;

/// Axis-aligned extent of a graph's nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max.x() - self.min.x()
    }

    pub fn height(&self) -> f64 {
        self.max.y() - self.min.y()
    }

}

/// Scan every node for the min and max corner
pub fn bounding_box(graph: &Graph) -> GraphResult<BoundingBox> {
    let mut coords = graph.coordinates();
    let first = coords.next().ok_or(GraphError::EmptyGraph)?;

    let (mut min_x, mut min_y) = (first.x(), first.y());
    let (mut max_x, mut max_y) = (min_x, min_y);
    for c in coords {
        min_x = min_x.min(c.x());
        min_y = min_y.min(c.y());
        max_x = max_x.max(c.x());
        max_y = max_y.max(c.y());
    }

    Ok(BoundingBox {
        min: Coordinate::new(min_x, min_y),
        max: Coordinate::new(max_x, max_y),
    })
}

/// Translate every node by `(-min.x, -min.y)` into a new graph.
///
/// Node and edge counts and their order are preserved; each edge's WKT is
/// rendered again from its shifted endpoints.
pub fn shift_to_origin(graph: &Graph, bbox: &BoundingBox) -> Graph {
    let (dx, dy) = (bbox.min.x(), bbox.min.y());
    // `+ 0.0` turns -0 into 0
    let shift = |c: &Coordinate| Coordinate::new(c.x() - dx + 0.0, c.y() - dy + 0.0);

    let mut shifted = Graph::new();
    for node in graph.nodes() {
        let mut moved = node.clone();
        moved.coordinate = shift(&node.coordinate);
        shifted.insert_node(moved);
    }
    for edge in graph.edges() {
        let mut moved = Edge::segment(shift(&edge.from), shift(&edge.to));
        moved.attributes = edge.attributes.clone();
        shifted.add_edge(moved);
    }
    shifted
}

/// Bounding box and shifted copy in one step
pub fn anchor_at_origin(graph: &Graph) -> GraphResult<(BoundingBox, Graph)> {
    let bbox = bounding_box(graph)?;
    Ok((bbox, shift_to_origin(graph, &bbox)))
}
