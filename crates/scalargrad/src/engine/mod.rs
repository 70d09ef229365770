//! Scalar reverse-mode automatic differentiation.
//!
//! The graph is built as a side effect of ordinary arithmetic on [`Node`]
//! handles and differentiated with [`Node::backward`].
//!
//! # Architecture
//!
//! ```text
//! Node (Rc handle)  ──producers──►  Node ... ──►  leaf Node
//!   │
//!   ├── value / grad  (Cell<f64>, shared by every clone of the handle)
//!   └── Op tag        ──dispatch──►  backward_step (local derivative rule)
//! ```
//!
//! # Example
//!
//! ```
//! use scalargrad::Node;
//!
//! let x1 = Node::labeled(2.0, "x1");
//! let w1 = Node::labeled(-3.0, "w1");
//! let b = Node::labeled(6.881375870195432, "b");
//!
//! let o = (&x1 * &w1 + &b).tanh();
//! o.backward();
//!
//! let local = 1.0 - o.value().powi(2);
//! assert!((x1.grad() - w1.value() * local).abs() < 1e-12);
//! ```
//!
//! # Design Notes
//!
//! - Derivative rules are an [`Op`] tag per node, not a boxed closure.
//! - Gradients accumulate with `+=`; callers reset them between passes.
//! - Handles are `Rc`-based and therefore neither `Send` nor `Sync`.

mod backward;
mod node;
mod op;
mod ops;

pub use node::{Node, NodeId};
pub use op::Op;
pub use ops::Exponent;
