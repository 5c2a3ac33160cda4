//! Core graph data structures

mod edge;
mod network;
mod node;


pub use edge::{segment_wkt, Edge, EdgeAttributes, EdgeKey};
pub use network::{Graph, GraphError, GraphResult};
pub use node::{Coordinate, Node};
