//! Pipeline graph model and acyclicity checking.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::types::{EdgeSpec, NodeSpec, PipelineMetrics};

/// Opaque node identifier. Pipelines may key their nodes by string or
/// integer, so both deserialize (untagged) and remain distinct: `3` and
/// `"3"` are different nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}

/// Directed pipeline graph built from a request payload.
///
/// Duplicate node ids collapse into a single node. Edges referencing an
/// id outside the node set are dropped at construction, so the check
/// only ever sees edges with both endpoints present.
#[derive(Debug, Clone)]
pub struct PipelineGraph {
    nodes: HashSet<NodeId>,
    successors: HashMap<NodeId, Vec<NodeId>>,
    in_degree: HashMap<NodeId, usize>,
}

impl PipelineGraph {
    /// Build a graph from node ids and (source, target) pairs.
    pub fn build(node_ids: &[NodeId], edges: &[(NodeId, NodeId)]) -> Self {
        let nodes: HashSet<NodeId> = node_ids.iter().cloned().collect();

        let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut in_degree: HashMap<NodeId, usize> =
            nodes.iter().map(|id| (id.clone(), 0)).collect();

        for (source, target) in edges {
            // Dangling edge: skip rather than error.
            if !nodes.contains(source) || !nodes.contains(target) {
                continue;
            }
            successors
                .entry(source.clone())
                .or_default()
                .push(target.clone());
            if let Some(count) = in_degree.get_mut(target) {
                *count += 1;
            }
        }

        Self {
            nodes,
            successors,
            in_degree,
        }
    }

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges retained after dropping dangling references.
    pub fn edge_count(&self) -> usize {
        self.successors.values().map(Vec::len).sum()
    }

    /// Whether the graph contains no directed cycle.
    ///
    /// Kahn's algorithm: repeatedly remove nodes whose in-degree has
    /// reached zero. If every node gets removed the graph is acyclic;
    /// nodes on a cycle never reach in-degree zero and stay behind.
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<NodeId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| id.clone())
            .collect();

        let mut processed = 0;
        while let Some(id) = queue.pop_front() {
            processed += 1;
            let Some(successors) = self.successors.get(&id) else {
                continue;
            };
            for successor in successors {
                if let Some(degree) = in_degree.get_mut(successor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(successor.clone());
                    }
                }
            }
        }

        processed == self.nodes.len()
    }
}

/// Compute the metrics reported for a parsed pipeline.
///
/// Counts reflect the raw request payload (duplicates and dangling
/// edges included) while the DAG verdict runs on the deduplicated,
/// filtered graph. Callers of the original service rely on the raw
/// counts, so the asymmetry is kept.
pub fn analyze(nodes: &[NodeSpec], edges: &[EdgeSpec]) -> PipelineMetrics {
    let node_ids: Vec<NodeId> = nodes.iter().map(|node| node.id.clone()).collect();
    let pairs: Vec<(NodeId, NodeId)> = edges
        .iter()
        .map(|edge| (edge.source.clone(), edge.target.clone()))
        .collect();
    let graph = PipelineGraph::build(&node_ids, &pairs);

    PipelineMetrics {
        num_nodes: nodes.len(),
        num_edges: edges.len(),
        is_dag: graph.is_acyclic(),
    }
}
