//! Build a single tanh neuron, backpropagate, and print the graph as DOT.
//!
//! Pipe the output through `dot -Tsvg` to render it.

use scalargrad::Node;
use scalargrad::graphviz::to_dot;

fn main() {
    let x1 = Node::labeled(2.0, "x1");
    let x2 = Node::labeled(0.0, "x2");
    let w1 = Node::labeled(-3.0, "w1");
    let w2 = Node::labeled(1.0, "w2");
    let b = Node::labeled(6.881375870195432, "b");

    let x1w1 = (&x1 * &w1).with_label("x1*w1");
    let x2w2 = (&x2 * &w2).with_label("x2*w2");
    let n = (&x1w1 + &x2w2 + &b).with_label("n");
    let o = n.tanh().with_label("o");

    o.backward();

    eprintln!("o = {:.4}", o.value());
    for leaf in [&x1, &x2, &w1, &w2, &b] {
        eprintln!("d o / d {} = {:.4}", leaf.label(), leaf.grad());
    }

    println!("{}", to_dot(&o));
}
