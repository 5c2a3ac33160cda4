//! Graph builder: geometry records in, one coordinate-keyed graph out
//!
//! Points become nodes. Line strings become one node per vertex and one
//! two-point segment edge per consecutive vertex pair. Everything the graph
//! cannot represent is skipped and recorded, never dropped silently.

use crate::geometry::{Geometry, GeometryKind};
use crate::graph::{Coordinate, Edge, Graph};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How MULTILINESTRING records are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiLineStringPolicy {
    /// Record a skip and leave the graph untouched
    #[default]
    Skip,
    /// Treat every member line as a separate line string
    Split,
}

/// Why a record (or part of one) did not reach the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Geometry type the graph cannot represent
    Unsupported(GeometryKind),
    /// A collection nested inside a collection
    NestedCollection,
    /// An `EMPTY` geometry, with nothing to add
    Empty(GeometryKind),
    /// The record text could not be decoded
    Malformed(String),
    /// A table edge referencing an unknown vertex id
    MissingEndpoint(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(kind) => write!(f, "unsupported geometry {}", kind),
            Self::NestedCollection => write!(f, "nested GEOMETRYCOLLECTION"),
            Self::Empty(kind) => write!(f, "empty {}", kind),
            Self::Malformed(msg) => write!(f, "malformed record: {}", msg),
            Self::MissingEndpoint(id) => write!(f, "missing endpoint {}", id),
        }
    }
}

/// A skipped record, numbered by its position in the input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub record: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl SkippedRecord {
    pub fn new(record: usize, reason: SkipReason) -> Self {
        Self { record, reason }
    }
}

/// What happened while building
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    /// Records offered to the builder
    pub records: usize,
    /// Records, or collection members, that were not added
    pub skipped: Vec<SkippedRecord>,
    /// Zero-length segments (repeated consecutive vertices) left out
    pub degenerate_segments: usize,
}

impl BuildReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True if nothing was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A finished graph and the report of its construction
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    pub graph: Graph,
    pub report: BuildReport,
}

/// Accumulates geometry records into a single graph
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    report: BuildReport,
    multilinestring: MultiLineStringPolicy,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_multilinestring_policy(mut self, policy: MultiLineStringPolicy) -> Self {
        self.multilinestring = policy;
        self
    }

    /// Add one record. `record` is the caller's numbering (line or row)
    /// and only appears in diagnostics.
    pub fn add_geometry(&mut self, record: usize, geometry: &Geometry) {
        self.report.records += 1;
        match geometry {
            Geometry::GeometryCollection(members) if members.is_empty() => {
                self.skip(record, SkipReason::Empty(GeometryKind::GeometryCollection))
            }
            Geometry::GeometryCollection(members) => {
                for member in members {
                    if let Geometry::GeometryCollection(_) = member {
                        self.skip(record, SkipReason::NestedCollection);
                    } else {
                        self.add_member(record, member);
                    }
                }
            }
            other => self.add_member(record, other),
        }
    }

    /// Record a skip that happened before the builder saw the geometry
    pub fn record_skip(&mut self, skipped: SkippedRecord) {
        self.report.records += 1;
        warn!(record = skipped.record, "skipping record: {}", skipped.reason);
        self.report.skipped.push(skipped);
    }

    pub fn finish(self) -> BuiltGraph {
        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            skipped = self.report.skipped.len(),
            "graph built"
        );
        BuiltGraph {
            graph: self.graph,
            report: self.report,
        }
    }

    fn add_member(&mut self, record: usize, geometry: &Geometry) {
        match geometry {
            Geometry::Point(c) => {
                self.graph.add_node(*c);
            }
            Geometry::LineString(points) if points.is_empty() => {
                self.skip(record, SkipReason::Empty(GeometryKind::LineString))
            }
            Geometry::LineString(points) => self.add_line(points),
            Geometry::MultiLineString(lines) if lines.iter().all(Vec::is_empty) => {
                self.skip(record, SkipReason::Empty(GeometryKind::MultiLineString))
            }
            Geometry::MultiLineString(lines) => match self.multilinestring {
                MultiLineStringPolicy::Skip => {
                    self.skip(record, SkipReason::Unsupported(GeometryKind::MultiLineString))
                }
                MultiLineStringPolicy::Split => {
                    for line in lines {
                        self.add_line(line);
                    }
                }
            },
            Geometry::GeometryCollection(_) => self.skip(record, SkipReason::NestedCollection),
            Geometry::Polygon(_) | Geometry::Other(_) => {
                self.skip(record, SkipReason::Unsupported(geometry.kind()))
            }
        }
    }

    fn add_line(&mut self, points: &[Coordinate]) {
        let mut previous: Option<Coordinate> = None;
        for &current in points {
            self.graph.add_node(current);
            if let Some(prev) = previous {
                if prev == current {
                    self.report.degenerate_segments += 1;
                } else {
                    self.graph.add_edge(Edge::segment(prev, current));
                }
            }
            previous = Some(current);
        }
    }

    fn skip(&mut self, record: usize, reason: SkipReason) {
        warn!(record, "skipping geometry: {}", reason);
        self.report.skipped.push(SkippedRecord::new(record, reason));
    }
}

/// Build a graph from numbered records with the default policy
pub fn build<'a>(geometries: impl IntoIterator<Item = (usize, &'a Geometry)>) -> BuiltGraph {
    let mut builder = GraphBuilder::new();
    for (record, geometry) in geometries {
        builder.add_geometry(record, geometry);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn wkt(text: &str) -> Geometry {
        Geometry::from_wkt(text).unwrap()
    }

    #[test]
    fn linestring_becomes_chain_of_segments() {
        let g = wkt("LINESTRING (0 0, 1 0, 1 1)");
        let built = build([(1, &g)]);

        assert_eq!(built.graph.node_count(), 3);
        assert_eq!(built.graph.edge_count(), 2);
        assert!(built.graph.get_edge(c(0.0, 0.0), c(1.0, 0.0)).is_some());
        assert!(built.graph.get_edge(c(1.0, 1.0), c(1.0, 0.0)).is_some());
        assert!(built.graph.get_edge(c(0.0, 0.0), c(1.0, 1.0)).is_none());
        assert!(built.report.is_complete());
    }

    #[test]
    fn segment_wkt_is_two_points_not_the_source_line() {
        let g = wkt("LINESTRING (0 0, 1 0, 1 1)");
        let built = build([(1, &g)]);
        let lines: Vec<_> = built.graph.edges().map(|e| e.wkt.as_str()).collect();
        assert_eq!(lines, vec!["LINESTRING (0 0, 1 0)", "LINESTRING (1 0, 1 1)"]);
    }

    #[test]
    fn single_point_linestring_adds_node_only() {
        let built = build([(1, &Geometry::LineString(vec![c(4.0, 4.0)]))]);
        assert_eq!(built.graph.node_count(), 1);
        assert_eq!(built.graph.edge_count(), 0);
    }

    #[test]
    fn shared_vertices_merge_into_one_node() {
        let a = wkt("LINESTRING (0 0, 1 0)");
        let b = wkt("LINESTRING (1 0, 2 0)");
        let p = wkt("POINT (2 0)");
        let built = build([(1, &a), (2, &b), (3, &p)]);
        assert_eq!(built.graph.node_count(), 3);
        assert_eq!(built.graph.edge_count(), 2);
    }

    #[test]
    fn multilinestring_is_skipped_by_default() {
        let g = wkt("MULTILINESTRING ((0 0, 1 1), (2 2, 3 3))");
        let built = build([(7, &g)]);
        assert!(built.graph.is_empty());
        assert_eq!(
            built.report.skipped,
            vec![SkippedRecord::new(
                7,
                SkipReason::Unsupported(GeometryKind::MultiLineString)
            )]
        );
    }

    #[test]
    fn multilinestring_split_policy_adds_each_line() {
        let g = wkt("MULTILINESTRING ((0 0, 1 1), (2 2, 3 3, 4 4))");
        let mut builder =
            GraphBuilder::new().with_multilinestring_policy(MultiLineStringPolicy::Split);
        builder.add_geometry(1, &g);
        let built = builder.finish();
        assert_eq!(built.graph.node_count(), 5);
        assert_eq!(built.graph.edge_count(), 3);
        assert!(built.report.is_complete());
    }

    #[test]
    fn collection_members_are_added_and_polygons_reported() {
        let g = wkt(
            "GEOMETRYCOLLECTION (POINT (9 9), LINESTRING (0 0, 1 0), POLYGON ((0 0, 1 0, 1 1, 0 0)))",
        );
        let built = build([(3, &g)]);
        assert_eq!(built.graph.node_count(), 3);
        assert_eq!(built.graph.edge_count(), 1);
        assert_eq!(built.report.skipped_count(), 1);
        assert_eq!(
            built.report.skipped[0].reason,
            SkipReason::Unsupported(GeometryKind::Polygon)
        );
    }

    #[test]
    fn nested_collection_is_reported() {
        let g = Geometry::GeometryCollection(vec![
            Geometry::Point(c(1.0, 1.0)),
            Geometry::GeometryCollection(vec![Geometry::Point(c(2.0, 2.0))]),
        ]);
        let built = build([(1, &g)]);
        assert_eq!(built.graph.node_count(), 1);
        assert_eq!(built.report.skipped[0].reason, SkipReason::NestedCollection);
    }

    #[test]
    fn empty_geometries_are_reported() {
        let line = Geometry::LineString(vec![]);
        let collection = Geometry::GeometryCollection(vec![]);
        let multi = Geometry::MultiLineString(vec![]);
        let built = build([(1, &line), (2, &collection), (3, &multi)]);

        assert!(built.graph.is_empty());
        assert_eq!(built.report.records, 3);
        assert_eq!(
            built.report.skipped,
            vec![
                SkippedRecord::new(1, SkipReason::Empty(GeometryKind::LineString)),
                SkippedRecord::new(2, SkipReason::Empty(GeometryKind::GeometryCollection)),
                SkippedRecord::new(3, SkipReason::Empty(GeometryKind::MultiLineString)),
            ]
        );
    }

    #[test]
    fn repeated_vertex_is_not_a_self_loop() {
        let g = Geometry::LineString(vec![c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)]);
        let built = build([(1, &g)]);
        assert_eq!(built.graph.node_count(), 2);
        assert_eq!(built.graph.edge_count(), 1);
        assert_eq!(built.report.degenerate_segments, 1);
    }

    #[test]
    fn counts_match_distinct_coordinates_and_segments() {
        let lines = [
            wkt("LINESTRING (0 0, 1 0, 2 0, 3 0)"),
            wkt("LINESTRING (10 10, 11 10)"),
            wkt("POINT (50 50)"),
        ];
        let built = build(lines.iter().enumerate().map(|(i, g)| (i + 1, g)));
        assert_eq!(built.graph.node_count(), 4 + 2 + 1);
        assert_eq!(built.graph.edge_count(), 3 + 1);
        assert_eq!(built.report.records, 3);
    }
}
