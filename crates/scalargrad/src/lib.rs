//! scalargrad - scalar reverse-mode automatic differentiation
//!
//! Every arithmetic operation on a [`Node`] records how its result was
//! produced, building a DAG on the fly. Calling [`Node::backward`] on any node
//! fills in the gradient of that node with respect to everything it was
//! computed from.
//!
//! # Modules
//!
//! ```text
//! engine    → Node, Op, operators, backward pass
//! nn        → Neuron / Layer / Mlp built from engine nodes   (feature "nn")
//! graphviz  → trace a graph, render it as Graphviz DOT       (feature "graphviz")
//! ```
//!
//! # Example
//!
//! ```
//! use scalargrad::Node;
//!
//! let a = Node::new(3.0);
//! let b = Node::new(4.0);
//!
//! let out = (&a * &b + 1.0) / 2.0 - &a;
//! out.backward();
//!
//! assert_eq!(out.value(), 3.5);
//! assert_eq!(a.grad(), 1.0); // b / 2 - 1
//! assert_eq!(b.grad(), 1.5); // a / 2
//! ```

pub mod engine;
pub mod error;
#[cfg(feature = "graphviz")]
pub mod graphviz;
#[cfg(feature = "nn")]
pub mod nn;

pub use engine::{Exponent, Node, NodeId, Op};
pub use error::{EngineError, Result};
