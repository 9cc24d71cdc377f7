//! Activation functions for neural network layers
//!
//! This module provides the activation selector layers accept at construction
//! ([`ActFunc`]) and the scalar rectifier used by the convolutional layer.

use crate::error::LayerError;
use std::fmt;
use std::str::FromStr;

/// Activation function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActFunc {
    /// Identity, no activation.
    #[default]
    None,
    Relu,
    Sigmoid,
    Tanh,
}

impl ActFunc {
    /// Names accepted by [`FromStr`], as used in configuration files.
    pub const NAMES: [&'static str; 4] = ["none", "relu", "sigmoid", "tanh"];

    /// Apply the activation to a pre-activation value.
    pub fn output(self, x: f64) -> f64 {
        match self {
            ActFunc::None => x,
            ActFunc::Relu => relu(x),
            ActFunc::Sigmoid => sigmoid(x),
            ActFunc::Tanh => x.tanh(),
        }
    }

    /// Derivative of the activation at pre-activation value `x`.
    pub fn delta(self, x: f64) -> f64 {
        match self {
            ActFunc::None => 1.0,
            ActFunc::Relu => relu_derivative(x),
            ActFunc::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActFunc::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActFunc::None => "none",
            ActFunc::Relu => "relu",
            ActFunc::Sigmoid => "sigmoid",
            ActFunc::Tanh => "tanh",
        }
    }
}

impl fmt::Display for ActFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActFunc {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ActFunc::None),
            "relu" => Ok(ActFunc::Relu),
            "sigmoid" => Ok(ActFunc::Sigmoid),
            "tanh" => Ok(ActFunc::Tanh),
            other => Err(LayerError::Config(format!(
                "Invalid activation function '{}'. Must be one of: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// Rectifier: `max(0, x)`.
pub fn relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// ReLU derivative: 1 for positive input, 0 otherwise.
pub fn relu_derivative(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
