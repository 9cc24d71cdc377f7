//! 2D convolutional layer implementation
//!
//! This module provides a single-kernel ConvLayer that correlates a square input
//! with a square kernel. The input is zero padded by `kernel_size / 2` on every
//! side, so the output has the same size as the input.

use crate::error::{LayerError, Result};
use crate::layers::Layer;
use crate::matrix::Matrix2d;
use crate::utils::activations::{relu, ActFunc};
use crate::utils::rng::{Initializer, SimpleRng};
use crate::utils::validation::{check_learning_rate, check_square_size};
use log::{debug, trace};

/// Convolutional layer with one trainable kernel and a shared bias.
///
/// The forward pass computes, for every output position,
/// `relu(bias + Σ input_padded[i + ki][j + kj] * kernel[ki][kj])`
/// (cross-correlation, the kernel is not flipped).
///
/// # Example
///
/// ```
/// use conv_layer_nn::layers::{ConvLayer, Layer};
/// use conv_layer_nn::matrix::Matrix2d;
/// use conv_layer_nn::utils::ActFunc;
///
/// // center-only 3x3 kernel, zero bias
/// let mut values = (0..10).map(|n| if n == 4 { 1.0 } else { 0.0 });
/// let mut init = || values.next().unwrap_or(0.0);
/// let mut layer = ConvLayer::with_initializer(3, 3, ActFunc::None, &mut init).unwrap();
///
/// let input = Matrix2d::from_rows(vec![
///     vec![1.0, 2.0, 3.0],
///     vec![4.0, 5.0, 6.0],
///     vec![7.0, 8.0, 9.0],
/// ])
/// .unwrap();
/// layer.feedforward(&input).unwrap();
/// assert_eq!(layer.output(), &input);
/// ```
#[derive(Debug, Clone)]
pub struct ConvLayer {
    input_padded: Matrix2d,
    input_gradients_padded: Matrix2d,
    input_gradients: Matrix2d,
    kernel: Matrix2d,
    kernel_gradients: Matrix2d,
    output: Matrix2d,
    bias: f64,
    bias_gradient: f64,
    // Stored for callers; the forward pass always rectifies.
    act_func: ActFunc,
}

impl ConvLayer {
    pub const MIN_KERNEL_SIZE: usize = 1;
    pub const MAX_KERNEL_SIZE: usize = 11;

    /// Create a layer with kernel and bias drawn from a time-seeded [`SimpleRng`].
    ///
    /// # Errors
    ///
    /// [`LayerError::InvalidKernelSize`] if `kernel_size` is outside `[1, 11]`,
    /// [`LayerError::KernelExceedsInput`] if it is greater than `input_size`.
    pub fn new(input_size: usize, kernel_size: usize, act_func: ActFunc) -> Result<Self> {
        Self::with_initializer(input_size, kernel_size, act_func, &mut SimpleRng::from_time())
    }

    /// Create a layer with start values taken from `init`.
    ///
    /// The kernel is filled row by row first, then the bias takes the next value.
    pub fn with_initializer<I>(
        input_size: usize,
        kernel_size: usize,
        act_func: ActFunc,
        init: &mut I,
    ) -> Result<Self>
    where
        I: Initializer + ?Sized,
    {
        if !(Self::MIN_KERNEL_SIZE..=Self::MAX_KERNEL_SIZE).contains(&kernel_size) {
            return Err(LayerError::InvalidKernelSize {
                size: kernel_size,
                min: Self::MIN_KERNEL_SIZE,
                max: Self::MAX_KERNEL_SIZE,
            });
        }
        if input_size < kernel_size {
            return Err(LayerError::KernelExceedsInput {
                kernel_size,
                input_size,
            });
        }

        let pad_offset = kernel_size / 2;
        let padded_size = input_size + 2 * pad_offset;

        let mut kernel = Matrix2d::zeros(kernel_size);
        for ki in 0..kernel_size {
            for kj in 0..kernel_size {
                kernel[(ki, kj)] = init.next_value();
            }
        }
        let bias = init.next_value();

        debug!(
            "Created convolutional layer: input {input_size}x{input_size}, kernel \
             {kernel_size}x{kernel_size}, pad offset {pad_offset}, activation {act_func}"
        );

        Ok(Self {
            input_padded: Matrix2d::zeros(padded_size),
            input_gradients_padded: Matrix2d::zeros(padded_size),
            input_gradients: Matrix2d::zeros(input_size),
            kernel,
            kernel_gradients: Matrix2d::zeros(kernel_size),
            output: Matrix2d::zeros(input_size),
            bias,
            bias_gradient: 0.0,
            act_func,
        })
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel.size()
    }

    /// Number of zero rows/columns added on each side of the input.
    pub fn pad_offset(&self) -> usize {
        self.kernel.size() / 2
    }

    pub fn kernel(&self) -> &Matrix2d {
        &self.kernel
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Kernel gradients from the last backward pass.
    pub fn kernel_gradients(&self) -> &Matrix2d {
        &self.kernel_gradients
    }

    /// Bias gradient from the last backward pass.
    pub fn bias_gradient(&self) -> f64 {
        self.bias_gradient
    }

    /// Activation selected at construction. Not applied by the forward pass.
    pub fn act_func(&self) -> ActFunc {
        self.act_func
    }

    /// Replace kernel and bias, e.g. with previously trained values.
    ///
    /// The kernel must be square with the layer's kernel size; on error nothing changes.
    pub fn set_parameters(&mut self, kernel: Matrix2d, bias: f64) -> Result<()> {
        const OP: &str = "parameter loading in convolutional layer";
        check_square_size(&kernel, self.kernel.size(), OP)?;
        self.kernel = kernel;
        self.bias = bias;
        Ok(())
    }

    /// Copy `input` into the interior of the padded buffer, leaving a zero border.
    fn pad_input(&mut self, input: &Matrix2d) {
        let pad_offset = self.pad_offset();
        self.input_padded.fill(0.0);

        for (i, row) in input.rows().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                self.input_padded[(i + pad_offset, j + pad_offset)] = value;
            }
        }
    }

    /// Crop the padded input gradients to the unpadded input region.
    fn extract_input_gradients(&mut self) {
        let pad_offset = self.pad_offset();
        let size = self.input_gradients.size();

        for i in 0..size {
            for j in 0..size {
                self.input_gradients[(i, j)] =
                    self.input_gradients_padded[(i + pad_offset, j + pad_offset)];
            }
        }
    }
}

impl Layer for ConvLayer {
    fn input_size(&self) -> usize {
        self.input_gradients.size()
    }

    fn output_size(&self) -> usize {
        self.output.size()
    }

    fn output(&self) -> &Matrix2d {
        &self.output
    }

    fn input_gradients(&self) -> &Matrix2d {
        &self.input_gradients
    }

    fn feedforward(&mut self, input: &Matrix2d) -> Result<()> {
        const OP: &str = "feedforward in convolutional layer";
        check_square_size(input, self.output.size(), OP)?;

        self.pad_input(input);

        let size = self.output.size();
        let kernel_size = self.kernel.size();

        for i in 0..size {
            for j in 0..size {
                let mut sum = self.bias;

                for ki in 0..kernel_size {
                    for kj in 0..kernel_size {
                        sum += self.input_padded[(i + ki, j + kj)] * self.kernel[(ki, kj)];
                    }
                }

                self.output[(i, j)] = relu(sum);
            }
        }

        Ok(())
    }

    // The incoming deltas are used as-is: they are not multiplied by the
    // rectifier derivative at the pre-activation value.
    fn backpropagate(&mut self, output_gradients: &Matrix2d) -> Result<()> {
        const OP: &str = "backpropagation in convolutional layer";
        check_square_size(output_gradients, self.output.size(), OP)?;

        self.input_gradients_padded.fill(0.0);
        self.input_gradients.fill(0.0);
        self.kernel_gradients.fill(0.0);
        self.bias_gradient = 0.0;

        let size = self.output.size();
        let kernel_size = self.kernel.size();

        for i in 0..size {
            for j in 0..size {
                let delta = output_gradients[(i, j)];

                self.bias_gradient += delta;

                for ki in 0..kernel_size {
                    for kj in 0..kernel_size {
                        self.kernel_gradients[(ki, kj)] +=
                            self.input_padded[(i + ki, j + kj)] * delta;

                        self.input_gradients_padded[(i + ki, j + kj)] +=
                            self.kernel[(ki, kj)] * delta;
                    }
                }
            }
        }

        self.extract_input_gradients();
        Ok(())
    }

    fn optimize(&mut self, learning_rate: f64) -> Result<()> {
        const OP: &str = "optimization in convolutional layer";
        check_learning_rate(learning_rate, OP)?;

        self.bias -= self.bias_gradient * learning_rate;

        let kernel_size = self.kernel.size();
        for ki in 0..kernel_size {
            for kj in 0..kernel_size {
                self.kernel[(ki, kj)] -= self.kernel_gradients[(ki, kj)] * learning_rate;
            }
        }

        trace!(
            "Optimized convolutional layer with learning rate {learning_rate}: bias {}",
            self.bias
        );
        Ok(())
    }

    /// Kernel weights plus the shared bias.
    fn parameter_count(&self) -> usize {
        self.kernel.size() * self.kernel.size() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f64) -> impl FnMut() -> f64 {
        move || value
    }

    #[test]
    fn test_conv_initialization() {
        let mut rng = SimpleRng::new(42);
        let layer = ConvLayer::with_initializer(28, 3, ActFunc::Relu, &mut rng).unwrap();

        assert_eq!(layer.input_size(), 28);
        assert_eq!(layer.output_size(), 28);
        assert_eq!(layer.kernel_size(), 3);
        assert_eq!(layer.pad_offset(), 1);
        assert_eq!(layer.act_func(), ActFunc::Relu);
        assert_eq!(layer.input_padded.size(), 30);
        assert_eq!(layer.input_gradients_padded.size(), 30);
    }

    #[test]
    fn test_conv_parameter_count() {
        let mut rng = SimpleRng::new(42);
        let layer = ConvLayer::with_initializer(10, 5, ActFunc::None, &mut rng).unwrap();
        assert_eq!(layer.parameter_count(), 26);
    }

    #[test]
    fn test_conv_start_values_in_unit_range() {
        let mut rng = SimpleRng::new(7);
        let layer = ConvLayer::with_initializer(11, 11, ActFunc::None, &mut rng).unwrap();

        for &w in layer.kernel().as_slice() {
            assert!((0.0..1.0).contains(&w));
        }
        assert!((0.0..1.0).contains(&layer.bias()));
    }

    #[test]
    fn test_conv_deterministic_initialization() {
        let mut rng1 = SimpleRng::new(12345);
        let layer1 = ConvLayer::with_initializer(8, 5, ActFunc::None, &mut rng1).unwrap();

        let mut rng2 = SimpleRng::new(12345);
        let layer2 = ConvLayer::with_initializer(8, 5, ActFunc::None, &mut rng2).unwrap();

        assert_eq!(layer1.kernel(), layer2.kernel());
        assert_eq!(layer1.bias(), layer2.bias());
    }

    #[test]
    fn test_conv_initializer_order_kernel_then_bias() {
        let mut next = 0.0;
        let mut init = || {
            next += 1.0;
            next
        };
        let layer = ConvLayer::with_initializer(2, 2, ActFunc::None, &mut init).unwrap();

        assert_eq!(layer.kernel().to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(layer.bias(), 5.0);
    }

    #[test]
    fn test_conv_buffers_start_zeroed() {
        let layer = ConvLayer::with_initializer(4, 3, ActFunc::None, &mut constant(0.5)).unwrap();

        assert!(layer.output().as_slice().iter().all(|&v| v == 0.0));
        assert!(layer.input_gradients().as_slice().iter().all(|&v| v == 0.0));
        assert!(layer.kernel_gradients().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(layer.bias_gradient(), 0.0);
    }

    #[test]
    fn test_conv_invalid_kernel_sizes() {
        let mut init = constant(0.1);
        assert!(matches!(
            ConvLayer::with_initializer(5, 0, ActFunc::None, &mut init),
            Err(LayerError::InvalidKernelSize { size: 0, .. })
        ));
        assert!(matches!(
            ConvLayer::with_initializer(20, 12, ActFunc::None, &mut init),
            Err(LayerError::InvalidKernelSize { size: 12, .. })
        ));
        assert!(matches!(
            ConvLayer::with_initializer(2, 3, ActFunc::None, &mut init),
            Err(LayerError::KernelExceedsInput {
                kernel_size: 3,
                input_size: 2
            })
        ));
    }

    #[test]
    fn test_conv_zero_input_size_rejected() {
        assert!(ConvLayer::with_initializer(0, 1, ActFunc::None, &mut constant(0.0)).is_err());
    }

    #[test]
    fn test_pad_input_places_interior() {
        // 2x2 kernel: pad offset 1, padded size 4
        let mut layer = ConvLayer::with_initializer(2, 2, ActFunc::None, &mut constant(0.0)).unwrap();
        let input = Matrix2d::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();

        layer.pad_input(&input);

        assert_eq!(
            layer.input_padded.to_rows(),
            vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 2.0, 0.0],
                vec![0.0, 3.0, 4.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0],
            ]
        );
    }

    #[test]
    fn test_feedforward_rejection_keeps_padded_input() {
        let mut layer = ConvLayer::with_initializer(3, 3, ActFunc::None, &mut constant(1.0)).unwrap();
        let mut input = Matrix2d::zeros(3);
        input.fill(2.0);
        layer.feedforward(&input).unwrap();
        let padded_before = layer.input_padded.clone();

        assert!(layer.feedforward(&Matrix2d::zeros(4)).is_err());
        assert!(layer.feedforward(&Matrix2d::zeros_rect(3, 2)).is_err());
        assert_eq!(layer.input_padded, padded_before);
    }

    #[test]
    fn test_backpropagate_full_correlation_1x1_kernel() {
        // 1x1 kernel: no padding, input gradients are kernel * delta
        let mut layer = ConvLayer::with_initializer(2, 1, ActFunc::None, &mut constant(3.0)).unwrap();
        let input = Matrix2d::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let grads = Matrix2d::from_rows(vec![vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();

        layer.feedforward(&input).unwrap();
        layer.backpropagate(&grads).unwrap();

        assert_eq!(layer.bias_gradient(), 3.0);
        assert_eq!(layer.kernel_gradients()[(0, 0)], 1.0 * 1.0 + 4.0 * 2.0);
        assert_eq!(
            layer.input_gradients().to_rows(),
            vec![vec![3.0, 0.0], vec![0.0, 6.0]]
        );
    }

    #[test]
    fn test_backpropagate_discards_border_gradients() {
        // Uniform 3x3 kernel on a 1-cell corner delta: only the 2x2 interior part survives
        let mut layer = ConvLayer::with_initializer(3, 3, ActFunc::None, &mut constant(1.0)).unwrap();
        layer.feedforward(&Matrix2d::zeros(3)).unwrap();

        let mut grads = Matrix2d::zeros(3);
        grads[(0, 0)] = 1.0;
        layer.backpropagate(&grads).unwrap();

        let padded_total: f64 = layer.input_gradients_padded.as_slice().iter().sum();
        let cropped_total: f64 = layer.input_gradients().as_slice().iter().sum();
        assert_eq!(padded_total, 9.0);
        assert_eq!(cropped_total, 4.0);
        assert_eq!(
            layer.input_gradients().to_rows(),
            vec![vec![1.0, 1.0, 0.0], vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn test_backpropagate_resets_accumulators() {
        let mut layer = ConvLayer::with_initializer(3, 3, ActFunc::None, &mut constant(0.5)).unwrap();
        let mut input = Matrix2d::zeros(3);
        input.fill(1.0);
        let mut grads = Matrix2d::zeros(3);
        grads.fill(1.0);

        layer.feedforward(&input).unwrap();
        layer.backpropagate(&grads).unwrap();
        let first_kernel_grads = layer.kernel_gradients().clone();
        let first_input_grads = layer.input_gradients().clone();

        layer.backpropagate(&grads).unwrap();
        assert_eq!(layer.bias_gradient(), 9.0);
        assert_eq!(layer.kernel_gradients(), &first_kernel_grads);
        assert_eq!(layer.input_gradients(), &first_input_grads);
    }

    #[test]
    fn test_optimize_does_not_clear_gradients() {
        let mut layer = ConvLayer::with_initializer(2, 1, ActFunc::None, &mut constant(1.0)).unwrap();
        let mut grads = Matrix2d::zeros(2);
        grads.fill(1.0);
        layer.feedforward(&Matrix2d::zeros(2)).unwrap();
        layer.backpropagate(&grads).unwrap();

        layer.optimize(0.5).unwrap();
        assert_eq!(layer.bias_gradient(), 4.0);
        assert_eq!(layer.bias(), 1.0 - 0.5 * 4.0);

        layer.optimize(0.5).unwrap();
        assert_eq!(layer.bias(), 1.0 - 2.0 * 0.5 * 4.0);
    }

    #[test]
    fn test_set_parameters() {
        let mut layer = ConvLayer::with_initializer(4, 3, ActFunc::None, &mut constant(0.2)).unwrap();

        assert!(layer.set_parameters(Matrix2d::zeros(2), 1.0).is_err());
        assert_eq!(layer.bias(), 0.2);

        layer.set_parameters(Matrix2d::zeros(3), -1.0).unwrap();
        assert_eq!(layer.bias(), -1.0);
        assert!(layer.kernel().as_slice().iter().all(|&w| w == 0.0));
    }
}
