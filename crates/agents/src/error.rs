//! Agent error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("No text provided")]
    EmptyInput,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction service error: {0}")]
    Oracle(String),

    #[error("Invalid extraction response: {0}")]
    InvalidResponse(String),

    #[error("Graph error: {0}")]
    Core(#[from] kgraph_core::CoreError),

    #[error("Render error: {0}")]
    Render(#[from] kgraph_render::RenderError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
