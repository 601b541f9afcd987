//! Graph documents - one extraction result per input text

use serde::{Deserialize, Serialize};

use crate::node::{Node, Relationship};

/// The text a graph document was extracted from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceText {
    pub content: String,
}

/// Raw nodes and relationships as returned by the extraction service
///
/// Nothing here is validated: ids may repeat and relationships may point
/// at nodes that were never listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub relationships: Vec<Relationship>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceText>,
}

impl GraphDocument {
    /// Create a document from raw parts
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
            source: None,
        }
    }

    /// Builder: record the source text
    pub fn with_source(mut self, content: impl Into<String>) -> Self {
        self.source = Some(SourceText {
            content: content.into(),
        });
        self
    }

    /// Normalize every node and relationship
    pub fn normalized(self) -> Self {
        Self {
            nodes: self.nodes.into_iter().map(Node::normalized).collect(),
            relationships: self
                .relationships
                .into_iter()
                .map(Relationship::normalized)
                .collect(),
            source: self.source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Parse a saved extraction: either a list of documents or a single one
    pub fn list_from_json(json: &str) -> crate::Result<Vec<GraphDocument>> {
        if let Ok(documents) = serde_json::from_str::<Vec<GraphDocument>>(json) {
            return Ok(documents);
        }

        let document: GraphDocument = serde_json::from_str(json)?;
        Ok(vec![document])
    }
}
