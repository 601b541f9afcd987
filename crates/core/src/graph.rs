//! The validated graph handed to the renderer

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::node::{Node, Relationship};

/// A node ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderNode {
    pub id: String,
    /// Text drawn on the node
    pub label: String,
    /// Legend group, drives the colour
    pub group: String,
    /// Hover text
    pub title: String,
}

impl RenderNode {
    /// Display attributes for a raw node: labelled by id, grouped by type
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.id.clone(),
            group: node.node_type.clone(),
            title: node.node_type.clone(),
        }
    }
}

/// A directed, labelled edge ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    /// Lowercased relationship type
    pub label: String,
}

impl RenderEdge {
    pub fn from_relationship(relationship: &Relationship) -> Self {
        Self {
            source: relationship.source.id.clone(),
            target: relationship.target.id.clone(),
            label: relationship.rel_type.to_lowercase(),
        }
    }
}

/// Validated graph: every edge endpoint is in the node set and every
/// node is touched by at least one edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawGraph")]
pub struct RenderableGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
}

/// Unchecked wire shape, validated on the way in
#[derive(Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<RenderNode>,
    #[serde(default)]
    edges: Vec<RenderEdge>,
}

impl TryFrom<RawGraph> for RenderableGraph {
    type Error = CoreError;

    fn try_from(raw: RawGraph) -> Result<Self> {
        Self::new(raw.nodes, raw.edges)
    }
}

impl RenderableGraph {
    /// Assemble a graph from parts, checking both invariants
    pub fn new(nodes: Vec<RenderNode>, edges: Vec<RenderEdge>) -> Result<Self> {
        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        if ids.len() != nodes.len() {
            return Err(CoreError::Validation("duplicate node id".into()));
        }

        let mut touched = HashSet::new();
        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "edge {} -> {} references unknown node {}",
                        edge.source, edge.target, endpoint
                    )));
                }
                touched.insert(endpoint.as_str());
            }
        }

        if let Some(isolated) = nodes.iter().find(|n| !touched.contains(n.id.as_str())) {
            return Err(CoreError::Validation(format!(
                "node {} has no edges",
                isolated.id
            )));
        }

        Ok(Self::from_parts_unchecked(nodes, edges))
    }

    pub(crate) fn from_parts_unchecked(nodes: Vec<RenderNode>, edges: Vec<RenderEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RenderEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Distinct node groups in first-appearance order
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|n| n.group.as_str())
            .filter(|g| seen.insert(*g))
            .collect()
    }
}
