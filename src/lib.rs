//! Cairn - pipeline structure analysis over HTTP.
//!
//! Accepts a directed-graph description of a pipeline (nodes and edges)
//! and reports node and edge counts plus whether the graph is acyclic.

pub mod config;
pub mod graph;
pub mod server;
pub mod types;

pub use config::{Config, CorsConfig};
pub use graph::{NodeId, PipelineGraph, analyze};
pub use server::ParseServer;
pub use types::{EdgeSpec, NodeSpec, PipelineMetrics, PipelineSpec};
