//! Operation tags and their local derivative rules.

use super::node::Node;
use std::fmt;

/// The operation that produced a node.
///
/// Every derived node carries one of these tags; the backward pass dispatches
/// on it instead of storing a closure per node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// Constructed directly from a number.
    Leaf,
    /// `a + b`
    Add,
    /// `a * b`
    Mul,
    /// `a ^ k` for a constant exponent `k`.
    Pow(f64),
    /// `e ^ a`
    Exp,
    /// `tanh(a)`
    Tanh,
}

impl Op {
    /// Number of producers a node with this tag has.
    pub fn arity(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Add | Op::Mul => 2,
            Op::Pow(_) | Op::Exp | Op::Tanh => 1,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Leaf => Ok(()),
            Op::Add => f.write_str("+"),
            Op::Mul => f.write_str("*"),
            Op::Pow(k) => write!(f, "**{k}"),
            Op::Exp => f.write_str("exp"),
            Op::Tanh => f.write_str("tanh"),
        }
    }
}

/// Push `node`'s current gradient into its producers.
///
/// Contributions are added, never assigned, so a producer reached along
/// several paths ends up with the sum over all of them.
pub(crate) fn backward_step(node: &Node) {
    let out_grad = node.grad();

    match (node.op(), node.producers()) {
        (Op::Leaf, _) => {}
        (Op::Add, [a, b]) => {
            a.accumulate_grad(out_grad);
            b.accumulate_grad(out_grad);
        }
        (Op::Mul, [a, b]) => {
            a.accumulate_grad(b.value() * out_grad);
            b.accumulate_grad(a.value() * out_grad);
        }
        (Op::Pow(k), [a]) => {
            a.accumulate_grad(k * a.value().powf(k - 1.0) * out_grad);
        }
        (Op::Exp, [a]) => {
            a.accumulate_grad(node.value() * out_grad);
        }
        (Op::Tanh, [a]) => {
            let t = node.value();
            a.accumulate_grad((1.0 - t * t) * out_grad);
        }
        (op, producers) => unreachable!(
            "{op:?} node built with {} producers, expected {}",
            producers.len(),
            op.arity()
        ),
    }
}
