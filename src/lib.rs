//! wktgraph: road networks from WKT geometries
//!
//! Reads a file of WKT points and line strings, stitches the line strings
//! into an undirected graph keyed by exact coordinate equality, splits the
//! graph into connected components, and writes each component back out as
//! WKT segments. The largest component is also written shifted so that its
//! minimum corner sits at the origin.
//!
//! A separate pipeline reprojects WKT records into web mercator.
//!
//! # Core Concepts
//!
//! - **Nodes**: unique coordinates; two vertices are the same node only if
//!   both coordinates are exactly equal
//! - **Edges**: two-point segments between consecutive line string vertices
//! - **Components**: maximal connected subgraphs, largest first
//!
//! # Example
//!
//! ```
//! use wktgraph::{build, partition, Geometry};
//!
//! let records = [
//!     Geometry::from_wkt("LINESTRING (0 0, 1 0)").unwrap(),
//!     Geometry::from_wkt("LINESTRING (1 0, 1 1)").unwrap(),
//!     Geometry::from_wkt("LINESTRING (5 5, 6 6)").unwrap(),
//! ];
//! let built = build(records.iter().enumerate().map(|(i, g)| (i + 1, g)));
//! let components = partition(&built.graph);
//! assert_eq!(components.len(), 2);
//! assert_eq!(components[0].node_count(), 3);
//! ```

pub mod builder;
pub mod config;
pub mod extent;
pub mod geometry;
mod graph;
pub mod ingest;
pub mod partition;
pub mod pipeline;
pub mod reproject;
pub mod writer;

pub use builder::{build, BuildReport, BuiltGraph, GraphBuilder, MultiLineStringPolicy, SkipReason, SkippedRecord};
pub use config::{Config, ConfigError};
pub use extent::{anchor_at_origin, bounding_box, shift_to_origin, BoundingBox};
pub use geometry::{Geometry, GeometryError, GeometryKind};
pub use graph::{
    segment_wkt, Coordinate, Edge, EdgeAttributes, EdgeKey, Graph, GraphError, GraphResult, Node,
};
pub use partition::{largest_component, partition};
pub use pipeline::{GraphPipeline, PipelineError, RunReport, TablePipeline};
pub use reproject::{reproject_entity, ReprojectError, Reprojector};
pub use writer::{write_graph, write_graph_file, WriteOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
