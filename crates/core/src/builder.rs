//! Graph builder - deduplicates nodes and drops dangling relationships

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::document::GraphDocument;
use crate::error::{CoreError, Result};
use crate::graph::{RenderEdge, RenderNode, RenderableGraph};
use crate::node::Node;

/// Counters collected while building a graph
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BuildStats {
    pub input_nodes: usize,
    /// Distinct node ids after deduplication
    pub unique_nodes: usize,
    pub input_relationships: usize,
    pub kept_relationships: usize,
    /// Relationships with at least one endpoint missing from the node list
    pub dropped_relationships: usize,
    /// Unique nodes not touched by any kept relationship
    pub isolated_nodes: usize,
}

/// Turns raw extraction output into a [`RenderableGraph`]
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build from the first document; any further documents are ignored
    pub fn build(documents: &[GraphDocument]) -> Result<RenderableGraph> {
        Self::build_with_stats(documents).map(|(graph, _)| graph)
    }

    pub fn build_with_stats(documents: &[GraphDocument]) -> Result<(RenderableGraph, BuildStats)> {
        let document = documents.first().ok_or(CoreError::NoGraphDocuments)?;
        Ok(Self::build_document_with_stats(document))
    }

    pub fn build_document(document: &GraphDocument) -> RenderableGraph {
        Self::build_document_with_stats(document).0
    }

    pub fn build_document_with_stats(document: &GraphDocument) -> (RenderableGraph, BuildStats) {
        // Later duplicates overwrite earlier ones
        let node_index: HashMap<&str, &Node> = document
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node))
            .collect();

        let mut edges = Vec::new();
        let mut touched: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for relationship in &document.relationships {
            let source = relationship.source_id();
            let target = relationship.target_id();
            if !node_index.contains_key(source) || !node_index.contains_key(target) {
                continue;
            }

            edges.push(RenderEdge::from_relationship(relationship));
            for id in [source, target] {
                if seen.insert(id) {
                    touched.push(id);
                }
            }
        }

        let nodes: Vec<RenderNode> = touched
            .iter()
            .filter_map(|id| node_index.get(id))
            .map(|node| RenderNode::from_node(node))
            .collect();

        let stats = BuildStats {
            input_nodes: document.nodes.len(),
            unique_nodes: node_index.len(),
            input_relationships: document.relationships.len(),
            kept_relationships: edges.len(),
            dropped_relationships: document.relationships.len() - edges.len(),
            isolated_nodes: node_index.len() - nodes.len(),
        };

        (RenderableGraph::from_parts_unchecked(nodes, edges), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Relationship;

    fn rel(source: &Node, target: &Node, rel_type: &str) -> Relationship {
        Relationship::new(source.clone(), target.clone(), rel_type)
    }

    #[test]
    fn test_single_valid_relationship() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Org");
        let doc = GraphDocument::new(vec![a.clone(), b.clone()], vec![rel(&a, &b, "works_at")]);

        let graph = GraphBuilder::build_document(&doc);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].label, "works_at");
        assert_eq!(graph.edges()[0].source, "A");
        assert_eq!(graph.edges()[0].target, "B");
    }

    #[test]
    fn test_dangling_target_dropped() {
        let a = Node::new("A", "Person");
        let z = Node::new("Z", "Person");
        let doc = GraphDocument::new(vec![a.clone()], vec![rel(&a, &z, "knows")]);

        let (graph, stats) = GraphBuilder::build_document_with_stats(&doc);

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(stats.dropped_relationships, 1);
        assert_eq!(stats.isolated_nodes, 1);
    }

    #[test]
    fn test_no_relationships_yields_empty_graph() {
        let doc = GraphDocument::new(
            vec![Node::new("A", "Person"), Node::new("B", "Org")],
            Vec::new(),
        );

        let graph = GraphBuilder::build_document(&doc);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_uppercase_type_lowercased() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Org");
        let doc = GraphDocument::new(vec![a.clone(), b.clone()], vec![rel(&a, &b, "WORKS_AT")]);

        let graph = GraphBuilder::build_document(&doc);
        assert_eq!(graph.edges()[0].label, "works_at");
    }

    #[test]
    fn test_isolated_nodes_excluded() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Org");
        let c = Node::new("C", "Place");
        let doc = GraphDocument::new(vec![a.clone(), b.clone(), c], vec![rel(&a, &b, "works_at")]);

        let graph = GraphBuilder::build_document(&doc);
        assert!(graph.contains_node("A"));
        assert!(graph.contains_node("B"));
        assert!(!graph.contains_node("C"));
    }

    #[test]
    fn test_duplicate_ids_last_writer_wins() {
        let first = Node::new("A", "Person");
        let second = Node::new("A", "Author");
        let b = Node::new("B", "Book");
        let doc = GraphDocument::new(
            vec![first.clone(), b.clone(), second],
            vec![rel(&first, &b, "wrote")],
        );

        let (graph, stats) = GraphBuilder::build_document_with_stats(&doc);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.nodes()[0].group, "Author");
        assert_eq!(stats.input_nodes, 3);
        assert_eq!(stats.unique_nodes, 2);
    }

    #[test]
    fn test_shared_endpoint_listed_once() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Person");
        let c = Node::new("C", "Org");
        let doc = GraphDocument::new(
            vec![a.clone(), b.clone(), c.clone()],
            vec![rel(&a, &c, "works_at"), rel(&b, &c, "works_at"), rel(&a, &b, "knows")],
        );

        let graph = GraphBuilder::build_document(&doc);
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C", "B"]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_every_edge_endpoint_present() {
        let nodes: Vec<Node> = (0..6).map(|i| Node::new(format!("N{i}"), "Thing")).collect();
        let ghost = Node::new("Ghost", "Thing");
        let mut relationships = Vec::new();
        for i in 0..6 {
            relationships.push(rel(&nodes[i], &nodes[(i + 2) % 6], "next"));
            relationships.push(rel(&nodes[i], &ghost, "haunts"));
            relationships.push(rel(&ghost, &nodes[i], "haunted_by"));
        }
        let doc = GraphDocument::new(nodes, relationships);

        let (graph, stats) = GraphBuilder::build_document_with_stats(&doc);

        assert_eq!(graph.edge_count(), 6);
        assert_eq!(stats.dropped_relationships, 12);
        for edge in graph.edges() {
            assert!(graph.contains_node(&edge.source));
            assert!(graph.contains_node(&edge.target));
        }
        for node in graph.nodes() {
            assert!(graph
                .edges()
                .iter()
                .any(|e| e.source == node.id || e.target == node.id));
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Org");
        let c = Node::new("C", "Org");
        let doc = GraphDocument::new(
            vec![a.clone(), b.clone(), c.clone()],
            vec![rel(&a, &b, "WORKS_AT"), rel(&a, &c, "FOUNDED")],
        );

        let first = GraphBuilder::build_document(&doc);
        let second = GraphBuilder::build_document(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_only_first_document_used() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Org");
        let docs = vec![
            GraphDocument::new(vec![a.clone(), b.clone()], vec![rel(&a, &b, "works_at")]),
            GraphDocument::new(vec![a.clone(), b.clone()], vec![rel(&b, &a, "employs")]),
        ];

        let graph = GraphBuilder::build(&docs).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].label, "works_at");
    }

    #[test]
    fn test_no_documents_is_error() {
        let result = GraphBuilder::build(&[]);
        assert!(matches!(result, Err(CoreError::NoGraphDocuments)));
    }

    #[test]
    fn test_built_graph_passes_validation() {
        let a = Node::new("A", "Person");
        let b = Node::new("B", "Org");
        let doc = GraphDocument::new(vec![a.clone(), b.clone()], vec![rel(&a, &b, "works_at")]);

        let graph = GraphBuilder::build_document(&doc);
        let rebuilt = RenderableGraph::new(graph.nodes().to_vec(), graph.edges().to_vec()).unwrap();
        assert_eq!(graph, rebuilt);
    }
}
