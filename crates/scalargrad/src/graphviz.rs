//! Graph tracing and Graphviz DOT rendering.
//!
//! Read-only introspection of a computation graph: nothing here is needed for
//! the numeric results, it only walks producer links.
//!
//! In the rendered graph every node becomes a record box
//! `label | data v | grad g`, and every derived node additionally gets an
//! ellipse tagged with its op label, wired as producers → op → node.
//!
//! # Example
//!
//! ```
//! use scalargrad::Node;
//! use scalargrad::graphviz::to_dot;
//!
//! let x = Node::labeled(0.5, "x");
//! let y = x.tanh().with_label("y");
//! y.backward();
//!
//! let dot = to_dot(&y);
//! assert!(dot.starts_with("digraph"));
//! assert!(dot.contains("tanh"));
//! ```

use crate::engine::{Node, NodeId};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

/// Reachable nodes and producer → consumer edges of a graph.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Every reachable node, producers before consumers.
    pub nodes: Vec<Node>,
    /// `(producer, consumer)` pairs, one per operand slot.
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Trace {
    /// Number of traced nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the trace is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Collect every node reachable from `root` and the edges between them.
pub fn trace(root: &Node) -> Trace {
    let nodes = root.topological_order();
    let edges = nodes
        .iter()
        .flat_map(|node| {
            node.producers()
                .iter()
                .map(move |producer| (producer.id(), node.id()))
        })
        .collect();

    Trace { nodes, edges }
}

/// Vertex of the rendered graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEntry {
    /// A computation-graph node.
    Data {
        id: NodeId,
        label: String,
        value: f64,
        grad: f64,
    },
    /// The operation that produced node `output`.
    Operation { output: NodeId, op: String },
}

impl fmt::Display for GraphEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphEntry::Data {
                label, value, grad, ..
            } => write!(f, "{{ {label} | data {value:.4} | grad {grad:.4} }}"),
            GraphEntry::Operation { op, .. } => f.write_str(op),
        }
    }
}

/// Build a petgraph graph with separate vertices for data and operations.
///
/// Edge weights are empty strings; only the direction carries meaning.
pub fn to_graph(root: &Node) -> DiGraph<GraphEntry, &'static str> {
    let Trace { nodes, .. } = trace(root);
    let mut graph = DiGraph::new();
    let mut data_index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());

    // producers come first in `nodes`, so their indices exist when needed
    for node in &nodes {
        let index = graph.add_node(GraphEntry::Data {
            id: node.id(),
            label: node.label(),
            value: node.value(),
            grad: node.grad(),
        });
        data_index.insert(node.id(), index);

        if node.is_leaf() {
            continue;
        }

        let op_index = graph.add_node(GraphEntry::Operation {
            output: node.id(),
            op: node.op_label(),
        });
        graph.add_edge(op_index, index, "");
        for producer in node.producers() {
            graph.add_edge(data_index[&producer.id()], op_index, "");
        }
    }

    graph
}

/// Render the graph reachable from `root` as Graphviz DOT text.
pub fn to_dot(root: &Node) -> String {
    let graph = to_graph(root);

    format!(
        "{}",
        Dot::with_attr_getters(
            &graph,
            &[Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (_, entry)| match entry {
                GraphEntry::Data { .. } => "shape = record".to_string(),
                GraphEntry::Operation { .. } => "shape = ellipse".to_string(),
            },
        )
    )
}
