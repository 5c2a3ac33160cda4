//! Shared helpers for the integration tests
//!
//! Every test gets its own scratch directory; inputs are written into it
//! and outputs read back from it.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use wktgraph::{Coordinate, EdgeKey, Geometry};

/// A scratch directory holding test inputs and outputs
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the workspace
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write input");
        path
    }

    /// A path inside the workspace that does not exist yet
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// File names (relative to `dir`) of every file under `dir`, sorted
pub fn output_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Re-parse written WKT lines as two-point line strings and collect the
/// undirected endpoint pairs
pub fn parse_edges(lines: &[String]) -> BTreeSet<EdgeKey> {
    lines
        .iter()
        .map(|line| match Geometry::from_wkt(line).expect("written WKT must parse") {
            Geometry::LineString(points) => {
                assert_eq!(points.len(), 2, "not a segment: {}", line);
                EdgeKey::new(points[0], points[1])
            }
            other => panic!("expected LINESTRING, got {:?}", other),
        })
        .collect()
}

pub fn key(a: (f64, f64), b: (f64, f64)) -> EdgeKey {
    EdgeKey::new(Coordinate::from(a), Coordinate::from(b))
}
