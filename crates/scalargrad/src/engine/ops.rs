//! Operators that build derived nodes.
//!
//! Only addition, multiplication, constant powers, `exp` and `tanh` carry
//! their own derivative rule. Negation, subtraction and division are rewritten
//! in terms of those:
//!
//! ```text
//! -a     = a * (-1)
//! a - b  = a + (-b)
//! a / b  = a * b^-1
//! ```
//!
//! Every infix operator accepts `Node`, `&Node` or `f64` on either side; a
//! bare number is wrapped in a fresh leaf before combining.

use super::node::Node;
use super::op::Op;
use crate::error::{EngineError, Result};
use smallvec::smallvec;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Exponent argument of [`Node::pow`].
///
/// Only constant exponents are differentiable by this engine; the `Node`
/// variant exists so that passing a graph node is reported as an error
/// instead of silently detaching it.
#[derive(Debug, Clone)]
pub enum Exponent {
    Constant(f64),
    Node(Node),
}

impl From<f64> for Exponent {
    fn from(k: f64) -> Self {
        Exponent::Constant(k)
    }
}

impl From<i32> for Exponent {
    fn from(k: i32) -> Self {
        Exponent::Constant(f64::from(k))
    }
}

impl From<Node> for Exponent {
    fn from(node: Node) -> Self {
        Exponent::Node(node)
    }
}

impl From<&Node> for Exponent {
    fn from(node: &Node) -> Self {
        Exponent::Node(node.clone())
    }
}

impl Node {
    /// Raise to a constant power.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] if the exponent is a graph
    /// node or is not a finite real number.
    ///
    /// # Example
    ///
    /// ```
    /// use scalargrad::Node;
    ///
    /// let a = Node::new(2.0);
    /// let cube = a.pow(3.0).unwrap();
    /// cube.backward();
    /// assert_eq!(cube.value(), 8.0);
    /// assert_eq!(a.grad(), 12.0);
    ///
    /// assert!(a.pow(&Node::new(2.0)).is_err());
    /// ```
    pub fn pow(&self, exponent: impl Into<Exponent>) -> Result<Node> {
        match exponent.into() {
            Exponent::Constant(k) if k.is_finite() => Ok(self.raise(k)),
            Exponent::Constant(k) => Err(EngineError::invalid_argument(
                "pow",
                format!("exponent must be a finite real number, got {k}"),
            )),
            Exponent::Node(node) => Err(EngineError::invalid_argument(
                "pow",
                format!("exponent must be a constant, got graph node {}", node.id()),
            )),
        }
    }

    /// Raise to an integer power. Integer exponents are always valid.
    pub fn powi(&self, n: i32) -> Node {
        self.raise(f64::from(n))
    }

    /// Natural exponential.
    pub fn exp(&self) -> Node {
        Node::from_op(self.value().exp(), Op::Exp, smallvec![self.clone()])
    }

    /// Hyperbolic tangent.
    pub fn tanh(&self) -> Node {
        Node::from_op(self.value().tanh(), Op::Tanh, smallvec![self.clone()])
    }

    fn raise(&self, k: f64) -> Node {
        Node::from_op(self.value().powf(k), Op::Pow(k), smallvec![self.clone()])
    }
}

fn add_nodes(a: &Node, b: &Node) -> Node {
    Node::from_op(a.value() + b.value(), Op::Add, smallvec![a.clone(), b.clone()])
}

fn mul_nodes(a: &Node, b: &Node) -> Node {
    Node::from_op(a.value() * b.value(), Op::Mul, smallvec![a.clone(), b.clone()])
}

fn neg_node(a: &Node) -> Node {
    mul_nodes(a, &Node::new(-1.0))
}

fn sub_nodes(a: &Node, b: &Node) -> Node {
    add_nodes(a, &neg_node(b))
}

fn div_nodes(a: &Node, b: &Node) -> Node {
    mul_nodes(a, &b.raise(-1.0))
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $build:ident) => {
        impl $trait<&Node> for &Node {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                $build(self, rhs)
            }
        }

        impl $trait<Node> for &Node {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $build(self, &rhs)
            }
        }

        impl $trait<&Node> for Node {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                $build(&self, rhs)
            }
        }

        impl $trait<Node> for Node {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $build(&self, &rhs)
            }
        }

        impl $trait<f64> for &Node {
            type Output = Node;

            fn $method(self, rhs: f64) -> Node {
                $build(self, &Node::new(rhs))
            }
        }

        impl $trait<f64> for Node {
            type Output = Node;

            fn $method(self, rhs: f64) -> Node {
                $build(&self, &Node::new(rhs))
            }
        }

        impl $trait<&Node> for f64 {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                $build(&Node::new(self), rhs)
            }
        }

        impl $trait<Node> for f64 {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $build(&Node::new(self), &rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, add_nodes);
impl_binary_op!(Sub, sub, sub_nodes);
impl_binary_op!(Mul, mul, mul_nodes);
impl_binary_op!(Div, div, div_nodes);

impl Neg for &Node {
    type Output = Node;

    fn neg(self) -> Node {
        neg_node(self)
    }
}

impl Neg for Node {
    type Output = Node;

    fn neg(self) -> Node {
        neg_node(&self)
    }
}

/// Left fold with `+`. An empty iterator sums to a zero leaf.
impl Sum for Node {
    fn sum<I: Iterator<Item = Node>>(mut iter: I) -> Node {
        match iter.next() {
            Some(first) => iter.fold(first, |acc, x| add_nodes(&acc, &x)),
            None => Node::new(0.0),
        }
    }
}

impl<'a> Sum<&'a Node> for Node {
    fn sum<I: Iterator<Item = &'a Node>>(iter: I) -> Node {
        iter.cloned().sum()
    }
}
