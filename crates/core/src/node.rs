//! Node and relationship types - the raw output of extraction

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type assigned to nodes the extraction service left untyped
pub const DEFAULT_NODE_TYPE: &str = "Node";

/// An entity extracted from text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique identifier, also used as the display label
    pub id: String,

    /// Category label (Person, Organization, ...)
    #[serde(rename = "type", alias = "node_type", default)]
    pub node_type: String,

    /// Free-form attributes attached by the extraction service
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Node {
    /// Create a new node
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: Map::new(),
        }
    }

    /// Builder: attach a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Normalize id and type in place of the raw values
    pub fn normalized(mut self) -> Self {
        self.id = Self::normalize_id(&self.id);
        self.node_type = Self::normalize_type(&self.node_type);
        self
    }

    /// Title-case the id and collapse whitespace: "marie  CURIE" -> "Marie Curie".
    /// A new word starts after any non-letter, so "o'brien" -> "O'Brien".
    pub fn normalize_id(id: &str) -> String {
        id.split_whitespace()
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Capitalize a type label, falling back to [`DEFAULT_NODE_TYPE`]
    pub fn normalize_type(node_type: &str) -> String {
        let trimmed = node_type.trim();
        if trimmed.is_empty() {
            return DEFAULT_NODE_TYPE.to_string();
        }
        capitalize(trimmed)
    }
}

/// A directed, typed relationship between two nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    /// The "from" node
    pub source: Node,

    /// The "to" node
    pub target: Node,

    /// Relationship label (WORKS_AT, KNOWS, ...)
    #[serde(rename = "type", alias = "rel_type")]
    pub rel_type: String,

    /// Free-form attributes attached by the extraction service
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(source: Node, target: Node, rel_type: impl Into<String>) -> Self {
        Self {
            source,
            target,
            rel_type: rel_type.into(),
            properties: Map::new(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source.id
    }

    pub fn target_id(&self) -> &str {
        &self.target.id
    }

    /// Normalize the label and both endpoints
    pub fn normalized(mut self) -> Self {
        self.source = self.source.normalized();
        self.target = self.target.normalized();
        self.rel_type = Self::normalize_type(&self.rel_type);
        self
    }

    /// Upper snake case: "works at" -> "WORKS_AT"
    pub fn normalize_type(rel_type: &str) -> String {
        rel_type
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_uppercase()
    }
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut word_start = true;
    for c in word.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        word_start = !c.is_alphabetic();
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new("Marie Curie", "Person").with_property("born", 1867);

        assert_eq!(node.id, "Marie Curie");
        assert_eq!(node.node_type, "Person");
        assert_eq!(node.properties.get("born"), Some(&Value::from(1867)));
    }

    #[test]
    fn test_id_normalization() {
        assert_eq!(Node::normalize_id("  marie   CURIE "), "Marie Curie");
        assert_eq!(Node::normalize_id("university of paris"), "University Of Paris");
        assert_eq!(Node::normalize_id(""), "");
    }

    #[test]
    fn test_id_normalization_after_punctuation() {
        assert_eq!(Node::normalize_id("jean-paul sartre"), "Jean-Paul Sartre");
        assert_eq!(Node::normalize_id("o'brien"), "O'Brien");
        assert_eq!(Node::normalize_id("MARIE SKŁODOWSKA-CURIE"), "Marie Skłodowska-Curie");
    }

    #[test]
    fn test_type_normalization() {
        assert_eq!(Node::normalize_type("PERSON"), "Person");
        assert_eq!(Node::normalize_type(" organization "), "Organization");
        assert_eq!(Node::normalize_type("   "), DEFAULT_NODE_TYPE);
    }

    #[test]
    fn test_relationship_normalization() {
        let rel = Relationship::new(
            Node::new("marie curie", "person"),
            Node::new("sorbonne", "organization"),
            "works at",
        )
        .normalized();

        assert_eq!(rel.source_id(), "Marie Curie");
        assert_eq!(rel.target.node_type, "Organization");
        assert_eq!(rel.rel_type, "WORKS_AT");
    }

    #[test]
    fn test_serde_uses_type_key() {
        let json = r#"{"id": "Alice", "type": "Person"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.node_type, "Person");
        assert!(node.properties.is_empty());

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["type"], "Person");
        assert!(out.get("properties").is_none());
    }
}
