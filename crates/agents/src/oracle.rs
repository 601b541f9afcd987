//! The extraction service seam

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kgraph_core::GraphDocument;

use crate::schema::ExtractionSchema;
use crate::{AgentError, Result};

/// Anything that turns text into raw graph documents
#[async_trait]
pub trait GraphOracle: Send + Sync {
    /// Extract nodes and relationships from `text`
    async fn extract_graph(
        &self,
        text: &str,
        schema: &ExtractionSchema,
    ) -> Result<Vec<GraphDocument>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: GraphOracle + ?Sized> GraphOracle for Arc<T> {
    async fn extract_graph(
        &self,
        text: &str,
        schema: &ExtractionSchema,
    ) -> Result<Vec<GraphDocument>> {
        (**self).extract_graph(text, schema).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Canned reply for [`StaticOracle`]
#[derive(Debug, Clone)]
pub enum StaticResponse {
    Documents(Vec<GraphDocument>),
    Failure(String),
}

/// Offline oracle that always gives the same answer
#[derive(Debug)]
pub struct StaticOracle {
    response: StaticResponse,
    calls: AtomicUsize,
}

impl StaticOracle {
    pub fn new(response: StaticResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn documents(documents: Vec<GraphDocument>) -> Self {
        Self::new(StaticResponse::Documents(documents))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(StaticResponse::Failure(message.into()))
    }

    /// Number of extraction requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphOracle for StaticOracle {
    async fn extract_graph(
        &self,
        _text: &str,
        _schema: &ExtractionSchema,
    ) -> Result<Vec<GraphDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StaticResponse::Documents(documents) => Ok(documents.clone()),
            StaticResponse::Failure(message) => Err(AgentError::Oracle(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
