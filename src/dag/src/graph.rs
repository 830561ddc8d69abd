//! Pipeline graph records
//!
//! Nodes and edges as they arrive from the editor. Only the identifier
//! fields matter to the validator; everything else the editor sends
//! (positions, handles, display data) rides along in `metadata`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque node identifier
///
/// Editors send either strings or integers. The two spaces are disjoint:
/// `"1"` and `1` name different nodes.
///
/// Integers that fit in `i64` are always `Integer`; `Unsigned` only holds
/// values above `i64::MAX`, so each integer has one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Integer(i64),
    Unsigned(u64),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Integer(id) => write!(f, "{}", id),
            NodeId::Unsigned(id) => write!(f, "{}", id),
            NodeId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::Text(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId::Text(id)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId::Integer(id)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        match i64::try_from(id) {
            Ok(id) => NodeId::Integer(id),
            Err(_) => NodeId::Unsigned(id),
        }
    }
}

/// Pipeline node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier
    pub id: NodeId,

    /// Remaining fields of the node object, untouched
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Node {
    /// Create a node with no metadata
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            metadata: Map::new(),
        }
    }
}

/// Directed pipeline edge: `source` must run before `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,

    /// Remaining fields of the edge object, untouched
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Edge {
    /// Create an edge with no metadata
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            metadata: Map::new(),
        }
    }

    /// Whether the edge points back at its own source
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
