//! Core domain types for the knowledge graph generator
//!
//! This crate defines the raw graph documents returned by the extraction
//! service, the validator that turns them into a [`RenderableGraph`], and
//! the shared error type.

pub mod builder;
pub mod document;
pub mod error;
pub mod graph;
pub mod node;

pub use builder::{BuildStats, GraphBuilder};
pub use document::{GraphDocument, SourceText};
pub use error::{CoreError, Result};
pub use graph::{RenderEdge, RenderNode, RenderableGraph};
pub use node::{Node, Relationship};
