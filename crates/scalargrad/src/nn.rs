//! A small multi-layer perceptron built from engine nodes.
//!
//! Nothing here adds a new derivative rule: a neuron is `tanh(Σ wᵢ·xᵢ + b)`
//! written with ordinary node arithmetic, and training is forward pass, loss,
//! [`Module::zero_grad`], [`Node::backward`], [`Sgd::step`].
//!
//! Random initialization always draws from a caller-supplied generator, so a
//! seeded [`rand::rngs::StdRng`] gives reproducible networks.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use scalargrad::nn::{Mlp, Module};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let model = Mlp::new(3, &[4, 4, 1], &mut rng);
//! assert_eq!(model.parameters().len(), 41);
//!
//! let out = model.forward_values(&[2.0, 3.0, -1.0]).unwrap();
//! assert_eq!(out.len(), 1);
//! assert!(out[0].value().abs() < 1.0);
//! ```

use crate::engine::Node;
use crate::error::{EngineError, Result};
use rand::Rng;

/// Anything that owns trainable parameters.
pub trait Module {
    /// Parameter leaves, in a stable order.
    fn parameters(&self) -> Vec<Node>;

    /// Reset every parameter gradient to zero.
    fn zero_grad(&self) {
        for p in self.parameters() {
            p.set_grad(0.0);
        }
    }
}

/// A single tanh unit.
#[derive(Debug, Clone)]
pub struct Neuron {
    weights: Vec<Node>,
    bias: Node,
}

impl Neuron {
    /// Create a neuron with weights and bias drawn uniformly from `[-1, 1)`.
    pub fn new<R: Rng + ?Sized>(in_features: usize, rng: &mut R) -> Self {
        let weights = (0..in_features)
            .map(|_| Node::new(rng.random_range(-1.0..1.0)))
            .collect();
        let bias = Node::new(rng.random_range(-1.0..1.0));
        Self { weights, bias }
    }

    /// Create a neuron from explicit parameter values.
    pub fn from_parameters(weights: &[f64], bias: f64) -> Self {
        Self {
            weights: weights.iter().copied().map(Node::new).collect(),
            bias: Node::new(bias),
        }
    }

    /// Number of inputs this neuron expects.
    pub fn in_features(&self) -> usize {
        self.weights.len()
    }

    /// Get the weight leaves.
    pub fn weights(&self) -> &[Node] {
        &self.weights
    }

    /// Get the bias leaf.
    pub fn bias(&self) -> &Node {
        &self.bias
    }

    /// Compute `tanh(Σ wᵢ·xᵢ + b)`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LengthMismatch`] if `inputs.len()` differs from
    /// [`Neuron::in_features`].
    pub fn forward(&self, inputs: &[Node]) -> Result<Node> {
        check_len(self.weights.len(), inputs.len())?;

        let activation: Node = std::iter::once(self.bias.clone())
            .chain(self.weights.iter().zip(inputs).map(|(w, x)| w * x))
            .sum();
        Ok(activation.tanh())
    }
}

impl Module for Neuron {
    fn parameters(&self) -> Vec<Node> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }
}

/// A fully connected layer of independent neurons.
#[derive(Debug, Clone)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    /// Create a layer of `out_features` neurons with `in_features` inputs each.
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let neurons = (0..out_features)
            .map(|_| Neuron::new(in_features, rng))
            .collect();
        Self { neurons }
    }

    /// Build a layer from existing neurons.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LengthMismatch`] if the neurons disagree on
    /// their number of inputs.
    pub fn from_neurons(neurons: Vec<Neuron>) -> Result<Self> {
        if let Some(first) = neurons.first() {
            let expected = first.in_features();
            for neuron in &neurons {
                check_len(expected, neuron.in_features())?;
            }
        }
        Ok(Self { neurons })
    }

    /// Get the neurons.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// One output per neuron.
    pub fn forward(&self, inputs: &[Node]) -> Result<Vec<Node>> {
        self.neurons.iter().map(|n| n.forward(inputs)).collect()
    }
}

impl Module for Layer {
    fn parameters(&self) -> Vec<Node> {
        self.neurons.iter().flat_map(Neuron::parameters).collect()
    }
}

/// A stack of layers.
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    /// Create a network taking `in_features` inputs, with one layer per entry
    /// of `layer_sizes`.
    pub fn new<R: Rng + ?Sized>(in_features: usize, layer_sizes: &[usize], rng: &mut R) -> Self {
        let mut layers = Vec::with_capacity(layer_sizes.len());
        let mut fan_in = in_features;
        for &size in layer_sizes {
            layers.push(Layer::new(fan_in, size, rng));
            fan_in = size;
        }
        Self { layers }
    }

    /// Get the layers.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Thread `inputs` through every layer.
    pub fn forward(&self, inputs: &[Node]) -> Result<Vec<Node>> {
        let mut activations = inputs.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations)?;
        }
        Ok(activations)
    }

    /// Like [`Mlp::forward`], wrapping raw numbers as fresh leaves.
    pub fn forward_values(&self, inputs: &[f64]) -> Result<Vec<Node>> {
        let leaves: Vec<Node> = inputs.iter().copied().map(Node::new).collect();
        self.forward(&leaves)
    }
}

impl Module for Mlp {
    fn parameters(&self) -> Vec<Node> {
        self.layers.iter().flat_map(Layer::parameters).collect()
    }
}

/// Mean squared error between predictions and targets.
///
/// # Errors
///
/// Returns [`EngineError::LengthMismatch`] if the lengths differ and
/// [`EngineError::InvalidArgument`] if both are empty.
pub fn mse_loss(predictions: &[Node], targets: &[f64]) -> Result<Node> {
    check_len(predictions.len(), targets.len())?;
    if predictions.is_empty() {
        return Err(EngineError::invalid_argument(
            "mse_loss",
            "cannot average over an empty batch",
        ));
    }

    let total: Node = predictions
        .iter()
        .zip(targets)
        .map(|(y, &target)| (y - target).powi(2))
        .sum();
    Ok(total / predictions.len() as f64)
}

/// Plain stochastic gradient descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// Apply `value -= learning_rate * grad` to every parameter.
    pub fn step(&self, module: &impl Module) {
        for p in module.parameters() {
            p.set_value(p.value() - self.learning_rate * p.grad());
        }
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Self::new(TrainConfig::default().learning_rate)
    }
}

/// Hyperparameters for [`train`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            epochs: 100,
        }
    }
}

/// Full-batch training of a single-output network under MSE loss.
///
/// Each epoch rebuilds the graph from the current parameters, zeroes the
/// parameter gradients, back-propagates and takes one SGD step.
///
/// Returns the loss of every epoch, measured before that epoch's update.
///
/// # Errors
///
/// Returns an error if `inputs` and `targets` differ in length, the batch is
/// empty, an input has the wrong width, or the network has no outputs.
pub fn train(
    model: &Mlp,
    inputs: &[Vec<f64>],
    targets: &[f64],
    config: &TrainConfig,
) -> Result<Vec<f64>> {
    check_len(inputs.len(), targets.len())?;
    let optimizer = Sgd::new(config.learning_rate);
    let mut history = Vec::with_capacity(config.epochs);

    for _ in 0..config.epochs {
        let mut predictions = Vec::with_capacity(inputs.len());
        for x in inputs {
            let out = model.forward_values(x)?;
            let first = out.into_iter().next().ok_or_else(|| {
                EngineError::invalid_argument("train", "network produced no outputs")
            })?;
            predictions.push(first);
        }

        let loss = mse_loss(&predictions, targets)?;
        model.zero_grad();
        loss.backward();
        optimizer.step(model);

        history.push(loss.value());
    }

    Ok(history)
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::LengthMismatch { expected, actual })
    }
}
