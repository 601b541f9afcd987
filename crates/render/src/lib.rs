//! Rendering for the knowledge graph generator
//!
//! Lays out a [`kgraph_core::RenderableGraph`] with a deterministic
//! force-directed simulation and writes it as a self-contained interactive
//! HTML document.

pub mod error;
pub mod layout;
pub mod network;
pub mod physics;
pub mod renderer;

pub use error::{RenderError, Result};
pub use layout::{Layout, LayoutConfig, Position};
pub use network::{Network, NetworkOptions};
pub use physics::PhysicsConfig;
pub use renderer::{NetworkBuild, RenderConfig, RenderOutcome, Renderer, DEFAULT_OUTPUT_FILE};
