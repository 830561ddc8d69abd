//! # Pipeline DAG Module
//!
//! Acyclicity checking for pipeline graphs submitted by the editor.
//!
//! ## Features
//!
//! - **Graph Records**: `Node` / `Edge` records that keep unknown payload fields opaque
//! - **Kahn's Algorithm**: In-degree tracking with a FIFO work queue
//! - **Defensive Input Handling**: Dangling edges and duplicate node ids are absorbed, never rejected
//!
//! ## Module Structure
//!
//! ```text
//! dag/
//! ├── graph/      - Node, Edge and NodeId records
//! └── validator/  - Kahn's algorithm and the validation report
//! ```
//!
//! ## Example
//!
//! ```
//! use pipeline_dag::{analyze, Edge, Node};
//!
//! let nodes = vec![Node::new("a"), Node::new("b")];
//! let edges = vec![Edge::new("a", "b"), Edge::new("b", "a")];
//!
//! let report = analyze(&nodes, &edges);
//! assert_eq!(report.num_nodes, 2);
//! assert_eq!(report.num_edges, 2);
//! assert!(!report.is_dag);
//! ```

pub mod graph;
pub mod validator;

pub use graph::{Edge, Node, NodeId};
pub use validator::{analyze, is_dag, kahn, Analysis, ValidationReport};
