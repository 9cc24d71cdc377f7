//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that all layer types must implement.
//! The trait provides a common interface for forward propagation, backward propagation,
//! and parameter updates.

use crate::error::Result;
use crate::matrix::Matrix2d;

/// Core trait for neural network layers.
///
/// Every layer kind (convolutional, dense, pooling, ...) implements this trait so
/// a network driver can chain them as `Box<dyn Layer>`. A training step calls
/// [`feedforward`](Layer::feedforward), [`backpropagate`](Layer::backpropagate) and
/// [`optimize`](Layer::optimize) in that order for each sample.
///
/// Failed operations return an error and leave the layer exactly as it was.
///
/// # Example
///
/// ```
/// use conv_layer_nn::layers::{ConvLayer, Layer};
/// use conv_layer_nn::matrix::Matrix2d;
/// use conv_layer_nn::utils::{ActFunc, SimpleRng};
///
/// let mut rng = SimpleRng::new(42);
/// let mut layer: Box<dyn Layer> =
///     Box::new(ConvLayer::with_initializer(4, 3, ActFunc::Relu, &mut rng).unwrap());
///
/// let input = Matrix2d::zeros(4);
/// layer.feedforward(&input).unwrap();
///
/// let mut grads = Matrix2d::zeros(4);
/// grads.fill(1.0);
/// layer.backpropagate(&grads).unwrap();
/// layer.optimize(0.01).unwrap();
/// ```
pub trait Layer {
    /// Side length of the square input the layer accepts.
    fn input_size(&self) -> usize;

    /// Side length of the square output the layer produces.
    fn output_size(&self) -> usize;

    /// Output of the most recent forward pass.
    fn output(&self) -> &Matrix2d;

    /// Gradients with respect to the input, from the most recent backward pass.
    fn input_gradients(&self) -> &Matrix2d;

    /// Forward propagation through the layer.
    ///
    /// Stores whatever the backward pass needs from `input`.
    fn feedforward(&mut self, input: &Matrix2d) -> Result<()>;

    /// Backward propagation through the layer.
    ///
    /// `output_gradients` holds the gradient of the loss with respect to this
    /// layer's output. Must follow a feedforward call on the same sample.
    fn backpropagate(&mut self, output_gradients: &Matrix2d) -> Result<()>;

    /// Apply one gradient descent step using the gradients from the last backward pass:
    /// parameter = parameter - learning_rate * gradient
    fn optimize(&mut self, learning_rate: f64) -> Result<()>;

    /// Get the number of trainable parameters in the layer.
    fn parameter_count(&self) -> usize;
}
