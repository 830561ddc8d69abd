//! Cycle detection via Kahn's algorithm
//!
//! The node set comes from the node list alone. Edges whose endpoints are
//! not in that set are dropped from the analysis but still show up in the
//! raw edge count of the report.

use crate::graph::{Edge, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Bookkeeping from a single Kahn pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    /// Distinct node identifiers
    pub distinct_nodes: usize,

    /// Edges with both endpoints known
    pub admitted_edges: usize,

    /// Edges dropped because an endpoint is unknown
    pub dangling_edges: usize,

    /// Nodes removed from the queue
    pub visited: usize,
}

impl Analysis {
    /// Every node was removed, so no cycle holds any of them back
    pub fn is_acyclic(&self) -> bool {
        self.visited == self.distinct_nodes
    }

    /// Pair the raw input sizes with this pass's verdict
    pub fn into_report(self, num_nodes: usize, num_edges: usize) -> ValidationReport {
        ValidationReport {
            num_nodes,
            num_edges,
            is_dag: self.is_acyclic(),
        }
    }
}

/// Result returned to the caller of `/pipelines/parse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Length of the submitted node list
    pub num_nodes: usize,

    /// Length of the submitted edge list, dangling edges included
    pub num_edges: usize,

    /// Whether the graph is acyclic
    pub is_dag: bool,
}

/// Run Kahn's algorithm over the graph
///
/// Identifiers get dense indices in first-occurrence order, so the queue
/// is seeded deterministically. The verdict does not depend on that order.
pub fn kahn(nodes: &[Node], edges: &[Edge]) -> Analysis {
    let mut index: HashMap<&NodeId, usize> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let next = index.len();
        index.entry(&node.id).or_insert(next);
    }

    let distinct_nodes = index.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); distinct_nodes];
    let mut in_degree: Vec<usize> = vec![0; distinct_nodes];
    let mut dangling_edges = 0;

    for edge in edges {
        match (index.get(&edge.source), index.get(&edge.target)) {
            (Some(&source), Some(&target)) => {
                adjacency[source].push(target);
                in_degree[target] += 1;
            }
            _ => dangling_edges += 1,
        }
    }

    let mut queue: VecDeque<usize> = (0..distinct_nodes)
        .filter(|&node| in_degree[node] == 0)
        .collect();
    let mut visited = 0;

    while let Some(node) = queue.pop_front() {
        visited += 1;
        for &neighbor in &adjacency[node] {
            in_degree[neighbor] -= 1;
            if in_degree[neighbor] == 0 {
                queue.push_back(neighbor);
            }
        }
    }

    let analysis = Analysis {
        distinct_nodes,
        admitted_edges: edges.len() - dangling_edges,
        dangling_edges,
        visited,
    };

    debug!(
        distinct_nodes = analysis.distinct_nodes,
        admitted_edges = analysis.admitted_edges,
        dangling_edges = analysis.dangling_edges,
        visited = analysis.visited,
        "Kahn pass complete"
    );

    analysis
}

/// Whether the graph contains no cycle among its known nodes
pub fn is_dag(nodes: &[Node], edges: &[Edge]) -> bool {
    kahn(nodes, edges).is_acyclic()
}

/// Count the raw input and attach the acyclicity verdict
pub fn analyze(nodes: &[Node], edges: &[Edge]) -> ValidationReport {
    kahn(nodes, edges).into_report(nodes.len(), edges.len())
}
