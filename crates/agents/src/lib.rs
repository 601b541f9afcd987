//! Extraction agents for the knowledge graph generator
//!
//! This crate contains:
//! - the oracle seam and its chat-completions implementation
//! - the Extractor, which normalizes and filters oracle output
//! - the Pipeline, which runs extraction, validation and rendering in order

pub mod config;
pub mod error;
pub mod extractor;
pub mod groq;
pub mod oracle;
pub mod pipeline;
pub mod schema;

pub use config::OracleConfig;
pub use error::{AgentError, Result};
pub use extractor::Extractor;
pub use groq::GroqOracle;
pub use oracle::{GraphOracle, StaticOracle, StaticResponse};
pub use pipeline::{Pipeline, PipelineReport};
pub use schema::ExtractionSchema;
