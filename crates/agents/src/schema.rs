//! Allowed node and relationship types for extraction

use kgraph_core::{GraphDocument, Node, Relationship};

/// Restricts what the extraction service may return
///
/// The allowed lists are always sent to the service as guidance. With
/// `strict` set they are also enforced on the response. An empty list
/// places no restriction on that kind of element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionSchema {
    pub allowed_nodes: Vec<String>,
    pub allowed_relationships: Vec<String>,
    pub strict: bool,
}

impl ExtractionSchema {
    pub fn new(allowed_nodes: Vec<String>, allowed_relationships: Vec<String>) -> Self {
        Self {
            allowed_nodes,
            allowed_relationships,
            strict: true,
        }
    }

    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.allowed_nodes.is_empty() && self.allowed_relationships.is_empty()
    }

    pub fn allows_node_type(&self, node_type: &str) -> bool {
        allowed(&self.allowed_nodes, node_type)
    }

    pub fn allows_relationship_type(&self, rel_type: &str) -> bool {
        allowed(&self.allowed_relationships, rel_type)
    }

    fn allows_relationship(&self, relationship: &Relationship) -> bool {
        self.allows_relationship_type(&relationship.rel_type)
            && self.allows_node_type(&relationship.source.node_type)
            && self.allows_node_type(&relationship.target.node_type)
    }

    /// Drop disallowed elements when strict; otherwise return unchanged
    pub fn apply(&self, document: GraphDocument) -> GraphDocument {
        if !self.strict || self.is_unrestricted() {
            return document;
        }

        let nodes: Vec<Node> = document
            .nodes
            .into_iter()
            .filter(|node| self.allows_node_type(&node.node_type))
            .collect();
        let relationships: Vec<Relationship> = document
            .relationships
            .into_iter()
            .filter(|rel| self.allows_relationship(rel))
            .collect();

        GraphDocument {
            nodes,
            relationships,
            source: document.source,
        }
    }

    /// Prompt lines describing the allowed types, if any
    pub fn prompt_hint(&self) -> Option<String> {
        let mut lines = Vec::new();
        if !self.allowed_nodes.is_empty() {
            lines.push(format!(
                "- Only use these node types: {}",
                self.allowed_nodes.join(", ")
            ));
        }
        if !self.allowed_relationships.is_empty() {
            lines.push(format!(
                "- Only use these relationship types: {}",
                self.allowed_relationships.join(", ")
            ));
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

fn allowed(list: &[String], value: &str) -> bool {
    if list.is_empty() {
        return true;
    }
    let value = value.trim().replace(' ', "_");
    list.iter()
        .any(|entry| entry.trim().replace(' ', "_").eq_ignore_ascii_case(&value))
}
