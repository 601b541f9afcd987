//! Text in, artifact out

use kgraph_core::{BuildStats, GraphBuilder};
use kgraph_render::{RenderOutcome, Renderer};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::extractor::Extractor;
use crate::Result;

/// What one pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Documents returned by extraction; only the first is rendered
    pub documents: usize,
    pub build: BuildStats,
    pub render: RenderOutcome,
}

/// Extract, validate, render - one text at a time
pub struct Pipeline {
    extractor: Extractor,
    renderer: Renderer,
}

impl Pipeline {
    pub fn new(extractor: Extractor, renderer: Renderer) -> Self {
        Self {
            extractor,
            renderer,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn run(&self, text: &str) -> Result<PipelineReport> {
        let documents = self.extractor.extract(text).await?;
        let (graph, build) = GraphBuilder::build_with_stats(&documents)?;

        debug!("Build stats: {:?}", build);
        info!(
            "Kept {} of {} relationships, {} nodes",
            build.kept_relationships,
            build.input_relationships,
            graph.node_count()
        );

        let render = self.renderer.render(&graph)?;

        Ok(PipelineReport {
            documents: documents.len(),
            build,
            render,
        })
    }
}
