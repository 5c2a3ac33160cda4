//! End-to-end runs of the graph pipeline against files on disk

mod common;

use common::{key, output_files, parse_edges, read_lines, Workspace};
use regex_lite::Regex;
use wktgraph::builder::MultiLineStringPolicy;
use wktgraph::pipeline::ComponentSize;
use wktgraph::{Config, GraphPipeline, PipelineError, SkipReason, TablePipeline};

const NETWORK: &str = "\
LINESTRING (0 0, 1 0, 2 0, 3 0, 4 0)
LINESTRING (10 10, 11 10)
POINT (4 0)
LINESTRING (4 0, 4 1)
";

#[test]
fn writes_largest_other_and_shifted_components() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", NETWORK);
    let out = ws.join("out");

    let report = GraphPipeline::new(&input, &out).run().unwrap();

    assert_eq!(report.nodes, 8);
    assert_eq!(report.edges, 6);
    assert_eq!(
        report.components,
        vec![
            ComponentSize { nodes: 6, edges: 5 },
            ComponentSize { nodes: 2, edges: 1 },
        ]
    );
    assert_eq!(
        output_files(&out),
        vec!["component_1.wkt", "largest_component.wkt", "shifted.wkt"]
    );
    assert_eq!(report.files.len(), 3);
    assert_eq!(report.skipped_count, 0);

    let largest = read_lines(&out.join("largest_component.wkt"));
    assert_eq!(largest.len(), 5);
    let other = read_lines(&out.join("component_1.wkt"));
    assert_eq!(other, vec!["LINESTRING (10 10, 11 10)"]);
}

#[test]
fn written_segments_reparse_to_the_same_edges() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", NETWORK);
    let out = ws.join("out");
    GraphPipeline::new(&input, &out).run().unwrap();

    let edges = parse_edges(&read_lines(&out.join("largest_component.wkt")));
    let expected = [
        key((0.0, 0.0), (1.0, 0.0)),
        key((1.0, 0.0), (2.0, 0.0)),
        key((2.0, 0.0), (3.0, 0.0)),
        key((3.0, 0.0), (4.0, 0.0)),
        key((4.0, 0.0), (4.0, 1.0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(edges, expected);
}

#[test]
fn every_output_line_is_a_two_point_segment() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", "LINESTRING (-1.5 2.25, 3 -4, 0.5 0)\n");
    let out = ws.join("out");
    GraphPipeline::new(&input, &out).run().unwrap();

    let segment = Regex::new(r"^LINESTRING \(-?[\d.]+ -?[\d.]+, -?[\d.]+ -?[\d.]+\)$").unwrap();
    for name in output_files(&out) {
        for line in read_lines(&out.join(&name)) {
            assert!(segment.is_match(&line), "{}: {}", name, line);
        }
    }
}

#[test]
fn shifted_component_is_anchored_at_origin() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", "LINESTRING (-3 -2, 2 5, 7 1)\n");
    let out = ws.join("out");

    let report = GraphPipeline::new(&input, &out).run().unwrap();

    let bbox = report.bounding_box.unwrap();
    assert_eq!((bbox.min.x(), bbox.min.y()), (-3.0, -2.0));
    assert_eq!((bbox.max.x(), bbox.max.y()), (7.0, 5.0));

    let shifted = parse_edges(&read_lines(&out.join("shifted.wkt")));
    let expected = [key((0.0, 0.0), (5.0, 7.0)), key((5.0, 7.0), (10.0, 3.0))]
        .into_iter()
        .collect();
    assert_eq!(shifted, expected);
}

#[test]
fn unsupported_and_malformed_records_are_counted() {
    let ws = Workspace::new();
    let input = ws.write(
        "mixed.wkt",
        "LINESTRING (0 0, 1 1)\n\
         POLYGON ((0 0, 1 0, 1 1, 0 0))\n\
         LINESTRING (0 0\n\
         MULTILINESTRING ((5 5, 6 6), (6 6, 7 7))\n",
    );
    let out = ws.join("out");

    let report = GraphPipeline::new(&input, &out).run().unwrap();

    assert_eq!(report.edges, 1);
    assert_eq!(report.skipped_count, 3);
    let records: Vec<usize> = report.skipped.iter().map(|s| s.record).collect();
    assert_eq!(records, vec![2, 3, 4]);
    assert!(matches!(report.skipped[1].reason, SkipReason::Malformed(_)));
}

#[test]
fn invalid_utf8_line_is_skipped_not_fatal() {
    let ws = Workspace::new();
    let input = ws.write_bytes(
        "roads.wkt",
        b"LINESTRING (0 0, 1 0)\nPOINT (\xff 1)\nLINESTRING (1 0, 2 0)\n",
    );
    let out = ws.join("out");

    let report = GraphPipeline::new(&input, &out).run().unwrap();

    assert_eq!(report.nodes, 3);
    assert_eq!(report.edges, 2);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.skipped[0].record, 2);
    assert!(matches!(report.skipped[0].reason, SkipReason::Malformed(_)));
}

#[test]
fn empty_geometry_counts_as_skipped() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", "LINESTRING (0 0, 1 0)\nLINESTRING EMPTY\n");

    let report = GraphPipeline::new(&input, ws.join("out")).run().unwrap();

    assert_eq!(report.edges, 1);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.skipped[0].record, 2);
}

#[test]
fn zero_and_negative_zero_shift_to_non_negative_output() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", "LINESTRING (0 5, -0 6)\n");
    let out = ws.join("out");

    GraphPipeline::new(&input, &out).run().unwrap();

    let shifted = read_lines(&out.join("shifted.wkt"));
    assert_eq!(shifted, vec!["LINESTRING (0 0, 0 1)"]);
    assert!(shifted.iter().all(|line| !line.contains('-')));
}

#[test]
fn split_policy_adds_multilinestring_members() {
    let ws = Workspace::new();
    let input = ws.write("multi.wkt", "MULTILINESTRING ((5 5, 6 6), (6 6, 7 7))\n");
    let out = ws.join("out");

    let mut config = Config::default();
    config.graph.multilinestring = MultiLineStringPolicy::Split;
    let report = GraphPipeline::new(&input, &out)
        .with_config(config)
        .run()
        .unwrap();

    assert_eq!(report.nodes, 3);
    assert_eq!(report.edges, 2);
    assert_eq!(report.components.len(), 1);
}

#[test]
fn csv_input_reads_the_wkt_column() {
    let ws = Workspace::new();
    let input = ws.write(
        "roads.csv",
        "name,wkt\n\
         a,\"LINESTRING (0 0, 1 0)\"\n\
         b,\"LINESTRING (1 0, 2 0)\"\n",
    );
    let out = ws.join("out");

    let report = GraphPipeline::new(&input, &out).run().unwrap();

    assert_eq!(report.geometries, 2);
    assert_eq!(report.components, vec![ComponentSize { nodes: 3, edges: 2 }]);
}

#[test]
fn run_report_serializes_to_json() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", NETWORK);
    let report = GraphPipeline::new(&input, ws.join("out")).run().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["nodes"], 8);
    assert_eq!(json["components"][0]["nodes"], 6);
    assert_eq!(json["bounding_box"]["min"]["x"], 0.0);
}

#[test]
fn empty_input_fails_without_writing() {
    let ws = Workspace::new();
    let input = ws.write("empty.wkt", "\n   \n\n");
    let out = ws.join("out");

    let err = GraphPipeline::new(&input, &out).run().unwrap_err();

    assert!(matches!(err, PipelineError::EmptyInput(_)));
    assert_eq!(err.exit_code(), 4);
    assert!(!out.exists());
}

#[test]
fn missing_input_exits_with_one() {
    let ws = Workspace::new();
    let err = GraphPipeline::new(ws.join("nope.wkt"), ws.join("out"))
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::InputNotFound(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn occupied_output_dir_exits_with_two() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", NETWORK);
    ws.write("out/nested/old.wkt", "LINESTRING (0 0, 1 1)\n");

    let err = GraphPipeline::new(&input, ws.join("out")).run().unwrap_err();
    assert!(matches!(err, PipelineError::OutputConflict(_)));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(output_files(&ws.join("out")), vec!["nested/old.wkt"]);
}

#[test]
fn existing_empty_output_dir_is_accepted() {
    let ws = Workspace::new();
    let input = ws.write("roads.wkt", NETWORK);
    let out = ws.join("out");
    std::fs::create_dir_all(out.join("empty")).unwrap();

    assert!(GraphPipeline::new(&input, &out).run().is_ok());
}

#[test]
fn unknown_extension_exits_with_three() {
    let ws = Workspace::new();
    let input = ws.write("roads.shp", NETWORK);
    let err = GraphPipeline::new(&input, ws.join("out")).run().unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedExtension(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn table_pipeline_keeps_largest_component() {
    let ws = Workspace::new();
    let vertices = ws.write(
        "vertex.csv",
        "id,lon,lat\n\
         1,0.0,0.0\n\
         2,1.0,0.0\n\
         3,2.0,0.0\n\
         4,9.0,9.0\n\
         5,9.5,9.0\n",
    );
    let edges = ws.write(
        "edges.csv",
        "id,from,to,length,foot,car_forward,car_backward,bike_forward,bike_backward,wkt\n\
         a,1,2,1.0,1,1,1,1,1,\"LINESTRING(0 0, 1 0)\"\n\
         b,2,3,1.0,1,0,0,1,1,\"LINESTRING(1 0, 2 0)\"\n\
         c,4,5,0.5,1,1,1,1,1,\"LINESTRING(9 9, 9.5 9)\"\n\
         d,5,77,1.0,1,1,1,1,1,\"LINESTRING(9.5 9, 10 9)\"\n",
    );
    let out = ws.join("cleaned");

    let report = TablePipeline {
        vertices,
        edges,
        output_dir: out.clone(),
    }
    .run()
    .unwrap();

    assert_eq!(report.nodes, 5);
    assert_eq!(report.components, 2);
    assert_eq!(report.largest, Some(ComponentSize { nodes: 3, edges: 2 }));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        read_lines(&out.join(TablePipeline::OUTPUT_FILE)),
        vec!["LINESTRING (0 0, 1 0)", "LINESTRING (1 0, 2 0)"]
    );
}
