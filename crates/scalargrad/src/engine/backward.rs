//! Backward pass execution for reverse-mode automatic differentiation.

use super::node::{Node, NodeId};
use super::op::backward_step;
use std::collections::HashSet;

impl Node {
    /// Compute the gradient of this node with respect to every node it was
    /// built from.
    ///
    /// Seeds this node's gradient with 1.0 and replays the local derivative
    /// rules from the output back to the leaves. Gradients are accumulated
    /// with `+=`: every node other than `self` should hold 0.0 beforehand
    /// (see [`Node::set_grad`]); the pass never resets them itself.
    ///
    /// # Example
    ///
    /// ```
    /// use scalargrad::Node;
    ///
    /// let a = Node::new(-4.0);
    /// let out = &a + &a;
    /// out.backward();
    /// assert_eq!(a.grad(), 2.0);
    /// ```
    pub fn backward(&self) {
        let order = topological_sort(self);

        self.set_grad(1.0);
        for node in order.iter().rev() {
            backward_step(node);
        }
    }

    /// All nodes reachable from this one, each listed after its producers.
    ///
    /// The last element is `self`; leaves come first.
    pub fn topological_order(&self) -> Vec<Node> {
        topological_sort(self)
    }
}

/// Depth-first post-order from `root`.
///
/// Each node is visited once (tracked by id) and appended only after all of
/// its producers, so the reversed list runs consumers before producers.
/// Uses an explicit stack so long chains cannot overflow the call stack.
fn topological_sort(root: &Node) -> Vec<Node> {
    let mut order = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<(Node, usize)> = Vec::new();

    visited.insert(root.id());
    stack.push((root.clone(), 0));

    while let Some((node, cursor)) = stack.last_mut() {
        match node.producers().get(*cursor).cloned() {
            Some(producer) => {
                *cursor += 1;
                if visited.insert(producer.id()) {
                    stack.push((producer, 0));
                }
            }
            None => {
                if let Some((finished, _)) = stack.pop() {
                    order.push(finished);
                }
            }
        }
    }

    order
}
