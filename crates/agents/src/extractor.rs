//! Extractor - sends text to the oracle and tidies its answer

use kgraph_core::GraphDocument;
use tracing::{info, instrument};

use crate::oracle::GraphOracle;
use crate::schema::ExtractionSchema;
use crate::{AgentError, Result};

pub struct Extractor {
    oracle: Box<dyn GraphOracle>,
    schema: ExtractionSchema,
}

impl Extractor {
    pub fn new(oracle: impl GraphOracle + 'static) -> Self {
        Self {
            oracle: Box::new(oracle),
            schema: ExtractionSchema::default(),
        }
    }

    pub fn with_schema(mut self, schema: ExtractionSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Extract raw graph documents from `text`
    ///
    /// Oracle failures are returned as-is; there is no retry.
    #[instrument(skip(self, text))]
    pub async fn extract(&self, text: &str) -> Result<Vec<GraphDocument>> {
        if text.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        info!(
            "Extracting graph from text ({} chars) via {}",
            text.chars().count(),
            self.oracle.name()
        );
        let documents = self.oracle.extract_graph(text, &self.schema).await?;

        let documents: Vec<GraphDocument> = documents
            .into_iter()
            .map(|document| self.schema.apply(document.normalized()))
            .collect();

        info!("Extraction returned {} graph documents", documents.len());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;
    use kgraph_core::{Node, Relationship};
    use std::sync::Arc;

    fn raw_document() -> GraphDocument {
        GraphDocument::new(
            vec![Node::new("alice", "person"), Node::new("acme", "organization")],
            vec![Relationship::new(
                Node::new("alice", "person"),
                Node::new("acme", "organization"),
                "works at",
            )],
        )
    }

    #[tokio::test]
    async fn test_extract_normalizes_output() {
        let extractor = Extractor::new(StaticOracle::documents(vec![raw_document()]));

        let documents = extractor.extract("Alice works at Acme.").await.unwrap();

        assert_eq!(documents.len(), 1);
        let doc = &documents[0];
        assert_eq!(doc.nodes[0].id, "Alice");
        assert_eq!(doc.nodes[1].node_type, "Organization");
        assert_eq!(doc.relationships[0].rel_type, "WORKS_AT");
        assert_eq!(doc.relationships[0].target_id(), "Acme");
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_oracle() {
        let oracle = Arc::new(StaticOracle::documents(vec![raw_document()]));
        let extractor = Extractor::new(Arc::clone(&oracle));

        let result = extractor.extract("   \n").await;

        assert!(matches!(result, Err(AgentError::EmptyInput)));
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_oracle_error_propagates() {
        let extractor = Extractor::new(StaticOracle::failing("rate limited"));

        let result = extractor.extract("Alice works at Acme.").await;

        assert!(matches!(result, Err(AgentError::Oracle(_))));
    }

    #[tokio::test]
    async fn test_schema_applied_after_normalization() {
        let schema = ExtractionSchema::new(vec!["PERSON".into()], Vec::new());
        let extractor =
            Extractor::new(StaticOracle::documents(vec![raw_document()])).with_schema(schema);

        let documents = extractor.extract("Alice works at Acme.").await.unwrap();

        assert_eq!(documents[0].nodes.len(), 1);
        assert!(documents[0].relationships.is_empty());
    }

    #[tokio::test]
    async fn test_extract_multibyte_text() {
        let curie = Node::new("maria skłodowska-curie", "person");
        let paris = Node::new("paryż", "location");
        let doc = GraphDocument::new(
            vec![curie.clone(), paris.clone()],
            vec![Relationship::new(curie, paris, "lived in")],
        );
        let extractor = Extractor::new(StaticOracle::documents(vec![doc]));

        let documents = extractor
            .extract("Maria Skłodowska-Curie mieszkała w Paryżu.")
            .await
            .unwrap();

        assert_eq!(documents[0].nodes[0].id, "Maria Skłodowska-Curie");
        assert_eq!(documents[0].relationships[0].target_id(), "Paryż");
    }

    #[tokio::test]
    async fn test_no_documents_passed_through() {
        let extractor = Extractor::new(StaticOracle::documents(Vec::new()));
        let documents = extractor.extract("Nothing here.").await.unwrap();
        assert!(documents.is_empty());
    }
}
