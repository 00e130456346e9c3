//! Wire types for the parse endpoint.

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Decoded contents of the `pipeline` form field.
///
/// A missing `nodes` or `edges` key is treated as an empty list, and
/// unknown fields on the payload are ignored, matching the reference
/// frontend's output.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// A pipeline node. Only the id matters for structural analysis; the
/// frontend attaches presentation fields we drop on decode.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeSpec {
    pub source: NodeId,
    pub target: NodeId,
}

/// Structural metrics reported for a parsed pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineMetrics {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
}

/// Error payload. Delivered with HTTP 200: the caller expects a uniform
/// response shape rather than status-code precision.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Fixed liveness payload for `GET /`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(rename = "Ping")]
    pub ping: &'static str,
}

impl HealthResponse {
    pub fn pong() -> Self {
        Self { ping: "Pong" }
    }
}
