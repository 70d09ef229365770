//! Integration tests for the scalar engine.
//!
//! Covers the differentiation rules end to end and checks analytic gradients
//! against central differences.

use approx::assert_relative_eq;
use proptest::prelude::*;
use scalargrad::{EngineError, Node};

/// Compute numerical gradient using central difference.
///
/// grad_i ≈ (f(x + eps*e_i) - f(x - eps*e_i)) / (2*eps)
fn numerical_gradient<F>(f: F, x: &[f64], eps: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut grad = vec![0.0; x.len()];
    let mut x_plus = x.to_vec();
    let mut x_minus = x.to_vec();

    for i in 0..x.len() {
        x_plus[i] = x[i] + eps;
        x_minus[i] = x[i] - eps;

        grad[i] = (f(&x_plus) - f(&x_minus)) / (2.0 * eps);

        x_plus[i] = x[i];
        x_minus[i] = x[i];
    }
    grad
}

/// Builds `tanh(x1*w1 + x2*w2 + b)` and returns (output, leaves).
fn neuron_expression(x1: f64, x2: f64, w1: f64, w2: f64, b: f64) -> (Node, [Node; 5]) {
    let x1 = Node::labeled(x1, "x1");
    let x2 = Node::labeled(x2, "x2");
    let w1 = Node::labeled(w1, "w1");
    let w2 = Node::labeled(w2, "w2");
    let b = Node::labeled(b, "b");

    let x1w1 = (&x1 * &w1).with_label("x1*w1");
    let x2w2 = (&x2 * &w2).with_label("x2*w2");
    let n = (&x1w1 + &x2w2 + &b).with_label("n");
    let o = n.tanh().with_label("o");

    (o, [x1, x2, w1, w2, b])
}

#[test]
fn test_additive_gradient_law() {
    let a = Node::new(3.0);
    let out = &a + &a;

    out.backward();
    assert_eq!(a.grad(), 2.0);
}

#[test]
fn test_shared_node_in_two_sums() {
    // a feeds two independent sums that are multiplied together
    let a = Node::new(-2.0);
    let b = Node::new(3.0);
    let d = &a * &b;
    let e = &a + &b;
    let f = &d * &e;

    f.backward();

    // f = a*b*(a + b); df/da = b*(a+b) + a*b, df/db = a*(a+b) + a*b
    assert_eq!(a.grad(), 3.0 * 1.0 + (-6.0));
    assert_eq!(b.grad(), -2.0 * 1.0 + (-6.0));
}

#[test]
fn test_product_rule() {
    let a = Node::new(3.0);
    let b = Node::new(4.0);
    let out = &a * &b;

    out.backward();
    assert_eq!(a.grad(), 4.0);
    assert_eq!(b.grad(), 3.0);
    assert_eq!(out.grad(), 1.0);
}

#[test]
fn test_power_rule() {
    let a = Node::new(2.0);
    let out = a.pow(3.0).unwrap();

    out.backward();
    assert_eq!(out.value(), 8.0);
    assert_eq!(a.grad(), 12.0);
}

#[test]
fn test_tanh_at_zero() {
    let x = Node::new(0.0);
    let out = x.tanh();

    out.backward();
    assert_eq!(out.value(), 0.0);
    assert_eq!(x.grad(), 1.0);
}

#[test]
fn test_exp_gradient() {
    let x = Node::new(0.7);
    let out = x.exp();

    out.backward();
    assert_relative_eq!(x.grad(), 0.7_f64.exp(), epsilon = 1e-12);
}

#[test]
fn test_division_gradients() {
    let a = Node::new(3.0);
    let b = Node::new(4.0);
    let out = &a / &b;

    out.backward();
    assert_relative_eq!(out.value(), 0.75, epsilon = 1e-12);
    assert_relative_eq!(a.grad(), 0.25, epsilon = 1e-12);
    assert_relative_eq!(b.grad(), -3.0 / 16.0, epsilon = 1e-12);
}

#[test]
fn test_literal_left_operands() {
    let x = Node::new(2.0);
    let out = 1.0 - 3.0 / &x;

    out.backward();
    assert_relative_eq!(out.value(), -0.5, epsilon = 1e-12);
    assert_relative_eq!(x.grad(), 3.0 / 4.0, epsilon = 1e-12);
}

#[test]
fn test_end_to_end_neuron() {
    let b_value = 6.881375870195432;
    let (o, [x1, x2, w1, w2, b]) = neuron_expression(2.0, 0.0, -3.0, 1.0, b_value);

    o.backward();

    let expected = (2.0 * -3.0 + 0.0 * 1.0 + b_value).tanh();
    assert!((o.value() - expected).abs() < 1e-9);

    let local = 1.0 - o.value().powi(2);
    assert!((x1.grad() - w1.value() * local).abs() < 1e-9);
    assert!((w1.grad() - x1.value() * local).abs() < 1e-9);
    assert!((x2.grad() - w2.value() * local).abs() < 1e-9);
    assert!((w2.grad() - x2.value() * local).abs() < 1e-9);
    assert!((b.grad() - local).abs() < 1e-9);
    assert_eq!(o.label(), "o");
}

#[test]
fn test_tanh_matches_exp_composition() {
    // tanh(n) written out as (e^2n - 1) / (e^2n + 1)
    let n1 = Node::new(0.8813735870195432);
    let direct = n1.tanh();
    direct.backward();

    let n2 = Node::new(0.8813735870195432);
    let e = (2.0 * &n2).exp();
    let composed = (&e - 1.0) / (&e + 1.0);
    composed.backward();

    assert_relative_eq!(direct.value(), composed.value(), epsilon = 1e-12);
    assert_relative_eq!(n1.grad(), n2.grad(), epsilon = 1e-12);
}

#[test]
fn test_rebuilt_graphs_are_independent() {
    let (o1, leaves1) = neuron_expression(2.0, 0.0, -3.0, 1.0, 6.881375870195432);
    let (o2, leaves2) = neuron_expression(2.0, 0.0, -3.0, 1.0, 6.881375870195432);

    assert_eq!(o1.value(), o2.value());
    assert_ne!(o1, o2);

    o1.backward();
    for leaf in &leaves2 {
        assert_eq!(leaf.grad(), 0.0);
    }

    leaves1[0].set_grad(100.0);
    o2.backward();
    assert_eq!(leaves1[0].grad(), 100.0);
    for (first, second) in leaves1.iter().zip(&leaves2).skip(1) {
        assert_eq!(first.grad(), second.grad());
    }
}

#[test]
fn test_numerical_gradient_composite() {
    let eps = 1e-6;
    let point = [0.4, -1.3, 2.2];

    // f(x, y, z) = exp(x * y) / z + tanh(x - z)^3 - y^2
    let f = |v: &[f64]| -> f64 {
        let (x, y, z) = (v[0], v[1], v[2]);
        (x * y).exp() / z + (x - z).tanh().powi(3) - y * y
    };
    let expected = numerical_gradient(f, &point, eps);

    let x = Node::new(point[0]);
    let y = Node::new(point[1]);
    let z = Node::new(point[2]);
    let out = (&x * &y).exp() / &z + (&x - &z).tanh().powi(3) - y.powi(2);
    out.backward();

    assert_relative_eq!(out.value(), f(&point), epsilon = 1e-12);
    for (analytical, numerical) in [x.grad(), y.grad(), z.grad()].iter().zip(&expected) {
        assert_relative_eq!(analytical, numerical, epsilon = 1e-6);
    }
}

#[test]
fn test_pow_errors() {
    let x = Node::new(2.0);

    let err = x.pow(&Node::new(2.0)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument { op: "pow", .. }));
    assert!(err.to_string().contains("constant"));

    assert!(matches!(
        x.pow(f64::NAN),
        Err(EngineError::InvalidArgument { .. })
    ));
}

#[test]
fn test_floating_point_specials_propagate() {
    let x = Node::new(1000.0);
    let big = x.exp();
    big.backward();
    assert!(big.value().is_infinite());
    assert!(x.grad().is_infinite());

    let zero = Node::new(0.0);
    let q = 1.0 / &zero;
    assert_eq!(q.value(), f64::INFINITY);
}

proptest! {
    #[test]
    fn prop_sub_matches_add_of_negated(a in -1.0e6..1.0e6f64, b in -1.0e6..1.0e6f64) {
        let a1 = Node::new(a);
        let b1 = Node::new(b);
        let lhs = &a1 - &b1;
        lhs.backward();

        let a2 = Node::new(a);
        let b2 = Node::new(b);
        let rhs = &a2 + &(&b2 * -1.0);
        rhs.backward();

        prop_assert_eq!(lhs.value(), rhs.value());
        prop_assert_eq!(a1.grad(), a2.grad());
        prop_assert_eq!(b1.grad(), b2.grad());
    }

    #[test]
    fn prop_div_matches_mul_by_reciprocal(a in -1.0e3..1.0e3f64, b in 0.1..1.0e3f64) {
        let a1 = Node::new(a);
        let b1 = Node::new(b);
        let lhs = &a1 / &b1;
        lhs.backward();

        let a2 = Node::new(a);
        let b2 = Node::new(b);
        let rhs = &a2 * &b2.powi(-1);
        rhs.backward();

        prop_assert_eq!(lhs.value(), rhs.value());
        prop_assert_eq!(a1.grad(), a2.grad());
        prop_assert_eq!(b1.grad(), b2.grad());
    }
}
