//! Pipeline orchestration: input file in, component WKT files out
//!
//! The graph is a value owned by the running pipeline and passed along
//! builder -> partitioner -> shifter -> writer. Structural problems
//! (missing input, occupied output directory, unknown extension) are
//! checked before anything is read.

use crate::builder::{BuildReport, GraphBuilder, SkippedRecord};
use crate::config::Config;
use crate::extent::{anchor_at_origin, BoundingBox};
use crate::graph::Graph;
use crate::ingest::{self, IngestError, InputFormat, TableGraph};
use crate::partition::partition;
use crate::writer::{write_graph_file, WriteOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Errors that end a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} does not exist")]
    InputNotFound(PathBuf),

    #[error("{0} already exists and is not empty")]
    OutputConflict(PathBuf),

    #[error("unsupported input extension: {0}")]
    UnsupportedExtension(String),

    #[error("no geometries could be read from {0}")]
    EmptyInput(PathBuf),

    #[error(transparent)]
    Ingest(IngestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for PipelineError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedExtension(ext) => Self::UnsupportedExtension(ext),
            other => Self::Ingest(other),
        }
    }
}

impl PipelineError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound(_) => 1,
            Self::OutputConflict(_) => 2,
            Self::UnsupportedExtension(_) => 3,
            Self::EmptyInput(_) => 4,
            Self::Ingest(_) | Self::Io(_) => 5,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Size of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentSize {
    pub nodes: usize,
    pub edges: usize,
}

impl From<&Graph> for ComponentSize {
    fn from(g: &Graph) -> Self {
        Self {
            nodes: g.node_count(),
            edges: g.edge_count(),
        }
    }
}

/// Summary of a graph pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Records successfully decoded
    pub geometries: usize,
    pub nodes: usize,
    pub edges: usize,
    /// Components, largest first
    pub components: Vec<ComponentSize>,
    /// Extent of the largest component before shifting
    pub bounding_box: Option<BoundingBox>,
    pub skipped_count: usize,
    /// Malformed and unsupported records, in input order
    pub skipped: Vec<SkippedRecord>,
    pub degenerate_segments: usize,
    pub files: Vec<PathBuf>,
}

impl RunReport {
    pub fn largest(&self) -> Option<ComponentSize> {
        self.components.first().copied()
    }
}

/// True if `dir` contains at least one file, at any depth
fn has_files(dir: &Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .any(|entry| entry.file_type().is_file())
}

/// Builds the graph from one geometry file and writes its components
#[derive(Debug, Clone)]
pub struct GraphPipeline {
    input: PathBuf,
    output_dir: PathBuf,
    config: Config,
}

impl GraphPipeline {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Check paths before any processing
    pub fn validate(&self) -> PipelineResult<InputFormat> {
        if !self.input.is_file() {
            return Err(PipelineError::InputNotFound(self.input.clone()));
        }
        if self.output_dir.exists() && has_files(&self.output_dir) {
            return Err(PipelineError::OutputConflict(self.output_dir.clone()));
        }
        Ok(InputFormat::from_path(&self.input)?)
    }

    pub fn run(&self) -> PipelineResult<RunReport> {
        self.validate()?;

        let decoded = ingest::read_geometries(&self.input)?;
        if decoded.is_empty() {
            return Err(PipelineError::EmptyInput(self.input.clone()));
        }

        let mut builder = GraphBuilder::new()
            .with_multilinestring_policy(self.config.graph.multilinestring);
        // keep skips in input order
        let mut malformed = decoded.malformed.into_iter().peekable();
        for (record, geometry) in &decoded.geometries {
            while let Some(skip) = malformed.next_if(|s| s.record < *record) {
                builder.record_skip(skip);
            }
            builder.add_geometry(*record, geometry);
        }
        malformed.for_each(|skip| builder.record_skip(skip));
        let built = builder.finish();
        let graph = built.graph;
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "the graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let components = partition(&graph);
        info!("there are {} connected components", components.len());

        std::fs::create_dir_all(&self.output_dir)?;
        let files = self.write_components(&components)?;
        let (bounding_box, shifted_file) = self.write_shifted(components.first())?;

        let report = self.report(
            decoded.geometries.len(),
            &graph,
            &components,
            built.report,
            bounding_box,
            files.into_iter().chain(shifted_file).collect(),
        );
        if report.skipped_count > 0 {
            warn!(
                "{} records or collection members were skipped",
                report.skipped_count
            );
        }
        Ok(report)
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            isolated_points: self.config.output.isolated_points,
            normalize_spacing: false,
        }
    }

    fn write_components(&self, components: &[Graph]) -> PipelineResult<Vec<PathBuf>> {
        let output = &self.config.output;
        let options = self.write_options();
        let mut files = Vec::with_capacity(components.len());

        let Some((largest, others)) = components.split_first() else {
            warn!("graph is empty, no component files written");
            return Ok(files);
        };

        info!(
            "the largest connected component has {} nodes and {} edges",
            largest.node_count(),
            largest.edge_count()
        );
        let path = self.output_dir.join(&output.largest_component);
        write_graph_file(largest, &path, &options)?;
        files.push(path);

        for (n, component) in others.iter().enumerate() {
            let path = self.output_dir.join(output.component_file(n + 1));
            write_graph_file(component, &path, &options)?;
            files.push(path);
        }
        Ok(files)
    }

    fn write_shifted(
        &self,
        largest: Option<&Graph>,
    ) -> PipelineResult<(Option<BoundingBox>, Option<PathBuf>)> {
        let empty = Graph::new();
        match anchor_at_origin(largest.unwrap_or(&empty)) {
            Ok((bbox, shifted)) => {
                let path = self.output_dir.join(&self.config.output.shifted);
                write_graph_file(&shifted, &path, &self.write_options())?;
                info!(
                    min_x = bbox.min.x(),
                    min_y = bbox.min.y(),
                    width = bbox.width(),
                    height = bbox.height(),
                    "largest component shifted to origin"
                );
                Ok((Some(bbox), Some(path)))
            }
            Err(e) => {
                warn!("not writing shifted component: {}", e);
                Ok((None, None))
            }
        }
    }

    fn report(
        &self,
        geometries: usize,
        graph: &Graph,
        components: &[Graph],
        build: BuildReport,
        bounding_box: Option<BoundingBox>,
        files: Vec<PathBuf>,
    ) -> RunReport {
        RunReport {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            geometries,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            components: components.iter().map(ComponentSize::from).collect(),
            bounding_box,
            skipped_count: build.skipped.len(),
            skipped: build.skipped,
            degenerate_segments: build.degenerate_segments,
            files,
        }
    }
}

/// Summary of a table pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
    pub largest: Option<ComponentSize>,
    pub skipped: Vec<SkippedRecord>,
    pub output: PathBuf,
}

/// Loads a vertex/edge table pair and keeps only the largest component
#[derive(Debug, Clone)]
pub struct TablePipeline {
    pub vertices: PathBuf,
    pub edges: PathBuf,
    pub output_dir: PathBuf,
}

impl TablePipeline {
    /// Name of the written file
    pub const OUTPUT_FILE: &'static str = "main.wkt";

    pub fn run(&self) -> PipelineResult<TableReport> {
        for path in [&self.vertices, &self.edges] {
            if !path.is_file() {
                return Err(PipelineError::InputNotFound(path.clone()));
            }
        }

        let table = TableGraph::load(&self.vertices, &self.edges)?;
        for skip in &table.skipped {
            warn!(row = skip.record, "edge skipped: {}", skip.reason);
        }
        let components = partition(&table.graph);
        info!("there are {} connected components", components.len());

        let empty = Graph::new();
        let largest = components.first().unwrap_or(&empty);
        info!("largest component has {} nodes", largest.node_count());

        std::fs::create_dir_all(&self.output_dir)?;
        let output = self.output_dir.join(Self::OUTPUT_FILE);
        let options = WriteOptions {
            isolated_points: false,
            normalize_spacing: true,
        };
        write_graph_file(largest, &output, &options)?;

        Ok(TableReport {
            nodes: table.graph.node_count(),
            edges: table.graph.edge_count(),
            components: components.len(),
            largest: components.first().map(ComponentSize::from),
            skipped: table.skipped,
            output,
        })
    }
}
