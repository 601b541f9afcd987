//! Renderer - lays out a graph and persists the artifact

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kgraph_core::RenderableGraph;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::layout::{Layout, LayoutConfig};
use crate::network::{Network, NetworkOptions};
use crate::physics::PhysicsConfig;
use crate::{RenderError, Result};

/// Artifact location used when none is configured
pub const DEFAULT_OUTPUT_FILE: &str = "knowledge_graph.html";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Overwritten on every render
    pub output_path: PathBuf,
    pub network: NetworkOptions,
    pub physics: PhysicsConfig,
    pub layout: LayoutConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            network: NetworkOptions::default(),
            physics: PhysicsConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Builder: set the output path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Builder: set the page heading
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.network.heading = Some(heading.into());
        self
    }
}

/// Summary of one render
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub nodes_rendered: usize,
    pub edges_rendered: usize,
    /// Nodes the network refused (blank label, repeated id)
    pub skipped_nodes: usize,
    /// Edges the network refused (missing endpoint)
    pub skipped_edges: usize,
    pub generated_at: DateTime<Utc>,
}

impl RenderOutcome {
    pub fn is_complete(&self) -> bool {
        self.skipped_nodes == 0 && self.skipped_edges == 0
    }
}

/// Network plus the number of elements it refused
pub struct NetworkBuild {
    pub network: Network,
    pub skipped_nodes: usize,
    pub skipped_edges: usize,
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Lay out `graph` and add every element the network accepts
    pub fn build_network(&self, graph: &RenderableGraph) -> NetworkBuild {
        let layout = Layout::compute(graph, &self.config.layout);
        let mut network = Network::new(self.config.network.clone(), self.config.physics.clone());
        network.register_groups(graph.groups());
        let mut skipped_nodes = 0;
        let mut skipped_edges = 0;

        for node in graph.nodes() {
            if let Err(e) = network.add_node(node, layout.position(&node.id)) {
                warn!("Skipping node: {}", e);
                skipped_nodes += 1;
            }
        }

        for edge in graph.edges() {
            if let Err(e) = network.add_edge(edge) {
                warn!("Skipping edge: {}", e);
                skipped_edges += 1;
            }
        }

        NetworkBuild {
            network,
            skipped_nodes,
            skipped_edges,
        }
    }

    /// Render `graph` to the configured path, replacing any previous artifact
    #[instrument(skip(self, graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
    pub fn render(&self, graph: &RenderableGraph) -> Result<RenderOutcome> {
        let build = self.build_network(graph);
        let html = build.network.to_html()?;

        let path = self.config.output_path.clone();
        debug!("Writing {} bytes", html.len());
        std::fs::write(&path, html).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Graph saved to {}", absolute_display(&path));

        Ok(RenderOutcome {
            path,
            nodes_rendered: build.network.node_count(),
            edges_rendered: build.network.edge_count(),
            skipped_nodes: build.skipped_nodes,
            skipped_edges: build.skipped_edges,
            generated_at: Utc::now(),
        })
    }

    /// Render to a string without touching the filesystem
    pub fn render_to_string(&self, graph: &RenderableGraph) -> Result<String> {
        self.build_network(graph).network.to_html()
    }
}

fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::{GraphBuilder, GraphDocument, Node, Relationship};
    use tempfile::TempDir;

    fn works_at_graph() -> RenderableGraph {
        let a = Node::new("Alice", "Person");
        let b = Node::new("Acme", "Organization");
        let doc = GraphDocument::new(
            vec![a.clone(), b.clone()],
            vec![Relationship::new(a, b, "WORKS_AT")],
        );
        GraphBuilder::build_document(&doc)
    }

    #[test]
    fn test_render_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.html");
        let renderer = Renderer::new(RenderConfig::default().with_output_path(&path));

        let outcome = renderer.render(&works_at_graph()).unwrap();

        assert_eq!(outcome.path, path);
        assert_eq!(outcome.nodes_rendered, 2);
        assert_eq!(outcome.edges_rendered, 1);
        assert!(outcome.is_complete());
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("\"works_at\""));
    }

    #[test]
    fn test_render_overwrites_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.html");
        std::fs::write(&path, "stale content").unwrap();
        let renderer = Renderer::new(RenderConfig::default().with_output_path(&path));

        renderer.render(&works_at_graph()).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(!html.contains("stale content"));
        assert!(html.contains("Alice"));
    }

    #[test]
    fn test_blank_node_skipped_with_its_edges() {
        let blank = Node::new("", "Person");
        let a = Node::new("Alice", "Person");
        let b = Node::new("Acme", "Organization");
        let doc = GraphDocument::new(
            vec![blank.clone(), a.clone(), b.clone()],
            vec![
                Relationship::new(blank, a.clone(), "KNOWS"),
                Relationship::new(a, b, "WORKS_AT"),
            ],
        );
        let graph = GraphBuilder::build_document(&doc);
        let renderer = Renderer::new(RenderConfig::default());

        let build = renderer.build_network(&graph);

        assert_eq!(build.skipped_nodes, 1);
        assert_eq!(build.skipped_edges, 1);
        assert_eq!(build.network.node_count(), 2);
        assert_eq!(build.network.edge_count(), 1);
    }

    #[test]
    fn test_legend_follows_graph_groups() {
        let acme = Node::new("Acme", "Organization");
        let alice = Node::new("Alice", "Person");
        let doc = GraphDocument::new(
            vec![alice.clone(), acme.clone()],
            vec![Relationship::new(acme, alice, "EMPLOYS")],
        );
        let graph = GraphBuilder::build_document(&doc);
        assert_eq!(graph.groups(), vec!["Organization", "Person"]);

        let html = Renderer::new(RenderConfig::default())
            .render_to_string(&graph)
            .unwrap();
        let legend = html
            .lines()
            .find(|line| line.starts_with("var legend = "))
            .unwrap();
        let organization = legend.find("\"Organization\"").unwrap();
        let person = legend.find("\"Person\"").unwrap();
        assert!(organization < person);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("graph.html");
        let renderer = Renderer::new(RenderConfig::default().with_output_path(&path));

        let result = renderer.render(&works_at_graph());

        match result {
            Err(RenderError::Io { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected write failure, got {:?}", other.map(|o| o.path)),
        }
    }

    #[test]
    fn test_render_empty_graph() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.html");
        let renderer = Renderer::new(RenderConfig::default().with_output_path(&path));

        let outcome = renderer.render(&RenderableGraph::default()).unwrap();

        assert_eq!(outcome.nodes_rendered, 0);
        assert!(path.exists());
    }

    #[test]
    fn test_render_to_string_is_stable() {
        let renderer = Renderer::new(RenderConfig::default().with_heading("Knowledge Graph"));
        let graph = works_at_graph();

        let first = renderer.render_to_string(&graph).unwrap();
        let second = renderer.render_to_string(&graph).unwrap();

        assert_eq!(first, second);
        assert!(first.contains("<h1>Knowledge Graph</h1>"));
    }
}
