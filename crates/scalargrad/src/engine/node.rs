//! Scalar graph nodes.
//!
//! A [`Node`] is a cheap, clonable handle to one vertex of the computation
//! graph. Cloning a handle never copies the vertex: every clone addresses the
//! same value and the same gradient accumulator, which is what lets a weight
//! feed several consumers and still collect a single gradient.

use super::op::Op;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Unique identifier for a node in the computation graph.
///
/// Identifiers are assigned from a per-thread counter at construction and are
/// never reused on that thread, so two live nodes never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Thread-local counter for unique node IDs
thread_local! {
    static NEXT_ID: Cell<usize> = const { Cell::new(0) };
}

fn next_node_id() -> NodeId {
    NEXT_ID.with(|id| {
        let current = id.get();
        id.set(current + 1);
        NodeId(current)
    })
}

/// Direct inputs of a node. No operation takes more than two.
pub(crate) type Producers = SmallVec<[Node; 2]>;

struct NodeInner {
    id: NodeId,
    value: Cell<f64>,
    grad: Cell<f64>,
    op: Op,
    producers: Producers,
    label: RefCell<String>,
}

// Release producer chains iteratively; the default recursive drop can
// overflow the stack on graphs that are a few hundred thousand nodes deep.
impl Drop for NodeInner {
    fn drop(&mut self) {
        let mut pending: Vec<Node> = self.producers.drain(..).collect();
        while let Some(node) = pending.pop() {
            if let Ok(mut inner) = Rc::try_unwrap(node.inner) {
                pending.extend(inner.producers.drain(..));
            }
        }
    }
}

/// A scalar vertex of the computation graph.
///
/// Leaves are created from raw numbers with [`Node::new`]; every arithmetic
/// operation on nodes (see the `ops` module) yields a new derived node that
/// remembers its producers and the [`Op`] that combined them.
///
/// Equality and hashing are by identity, not by value.
///
/// # Example
///
/// ```
/// use scalargrad::Node;
///
/// let a = Node::new(3.0);
/// let b = Node::new(4.0);
/// let c = &a * &b;
///
/// c.backward();
/// assert_eq!(c.value(), 12.0);
/// assert_eq!(a.grad(), 4.0);
/// assert_eq!(b.grad(), 3.0);
/// ```
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl Node {
    /// Create a leaf node holding `value`.
    pub fn new(value: f64) -> Self {
        Self::from_op(value, Op::Leaf, Producers::new())
    }

    /// Create a leaf node with a display label.
    pub fn labeled(value: f64, label: impl Into<String>) -> Self {
        Self::new(value).with_label(label)
    }

    /// Create a derived node (used by the operators).
    pub(crate) fn from_op(value: f64, op: Op, producers: Producers) -> Self {
        debug_assert_eq!(op.arity(), producers.len());
        Self {
            inner: Rc::new(NodeInner {
                id: next_node_id(),
                value: Cell::new(value),
                grad: Cell::new(0.0),
                op,
                producers,
                label: RefCell::new(String::new()),
            }),
        }
    }

    /// Get the node ID.
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Get the scalar payload.
    pub fn value(&self) -> f64 {
        self.inner.value.get()
    }

    /// Overwrite the scalar payload.
    ///
    /// Meant for parameter leaves (gradient-descent updates). Nodes already
    /// derived from this one keep the value computed when they were built;
    /// rebuild the expression to see the change.
    pub fn set_value(&self, value: f64) {
        self.inner.value.set(value);
    }

    /// Get the accumulated gradient.
    pub fn grad(&self) -> f64 {
        self.inner.grad.get()
    }

    /// Overwrite the accumulated gradient (typically to reset it to zero).
    pub fn set_grad(&self, grad: f64) {
        self.inner.grad.set(grad);
    }

    pub(crate) fn accumulate_grad(&self, delta: f64) {
        self.inner.grad.set(self.inner.grad.get() + delta);
    }

    /// Get the operation that produced this node.
    pub fn op(&self) -> Op {
        self.inner.op
    }

    /// Diagnostic tag of the producing operation ("+", "*", "tanh", ...).
    pub fn op_label(&self) -> String {
        self.inner.op.to_string()
    }

    /// Direct inputs, in operand order. Empty for leaves.
    pub fn producers(&self) -> &[Node] {
        &self.inner.producers
    }

    /// Check if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.inner.producers.is_empty()
    }

    /// Get the display label (empty if none was set).
    pub fn label(&self) -> String {
        self.inner.label.borrow().clone()
    }

    /// Set the display label.
    pub fn set_label(&self, label: impl Into<String>) {
        *self.inner.label.borrow_mut() = label.into();
    }

    /// Set the display label and return the same node.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    /// Check whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::new(value)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let producer_ids: Vec<NodeId> = self.producers().iter().map(Node::id).collect();
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("grad", &self.grad())
            .field("op", &self.op())
            .field("producers", &producer_ids)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(value={})", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_leaf_defaults() {
        let x = Node::new(2.5);

        assert_eq!(x.value(), 2.5);
        assert_eq!(x.grad(), 0.0);
        assert_eq!(x.op(), Op::Leaf);
        assert_eq!(x.op_label(), "");
        assert!(x.is_leaf());
        assert!(x.producers().is_empty());
        assert_eq!(x.label(), "");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Node::new(1.0);
        let b = Node::new(1.0);

        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_identity_equality() {
        let a = Node::new(1.0);
        let same = a.clone();
        let twin = Node::new(1.0);

        assert_eq!(a, same);
        assert_ne!(a, twin);

        let set: HashSet<Node> = [a.clone(), same, twin].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_clone_shares_gradient() {
        let a = Node::new(1.0);
        let alias = a.clone();

        alias.set_grad(3.0);
        assert_eq!(a.grad(), 3.0);

        a.accumulate_grad(0.5);
        assert_eq!(alias.grad(), 3.5);
    }

    #[test]
    fn test_labels() {
        let x = Node::labeled(2.0, "x1");
        assert_eq!(x.label(), "x1");

        x.set_label("renamed");
        assert_eq!(x.label(), "renamed");

        let y = Node::new(0.0).with_label("y");
        assert_eq!(y.label(), "y");
    }

    #[test]
    fn test_set_value() {
        let w = Node::new(0.5);
        w.set_value(0.25);
        assert_eq!(w.value(), 0.25);
    }

    #[test]
    fn test_display() {
        let x = Node::from(1.5);
        assert_eq!(x.to_string(), "Node(value=1.5)");
        assert_eq!(x.id().to_string(), format!("#{}", x.id().index()));
    }
}
