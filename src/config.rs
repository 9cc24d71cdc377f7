//! Configuration structures for convolutional layers
//!
//! This module lets a convolutional layer be described in a JSON file and
//! built from it, so experiments can change sizes and seeds without code changes.

use crate::error::LayerError;
use crate::layers::ConvLayer;
use crate::utils::activations::ActFunc;
use crate::utils::rng::SimpleRng;
use serde::Deserialize;
use std::error::Error;
use std::fs;

/// Configuration for a single convolutional layer.
///
/// `activation_function` is one of "none", "relu", "sigmoid" or "tanh"
/// (default "none"). When `seed` is present the start values are reproducible;
/// otherwise the generator is seeded from the current time.
///
/// # Example
///
/// ```json
/// {
///   "input_size": 28,
///   "kernel_size": 3,
///   "activation_function": "relu",
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConvLayerConfig {
    /// Side length of the square input
    pub input_size: usize,

    /// Side length of the square kernel, in [1, 11] and not above `input_size`
    pub kernel_size: usize,

    /// Activation function name
    pub activation_function: Option<String>,

    /// Seed for the start-value generator
    pub seed: Option<u64>,
}

impl ConvLayerConfig {
    /// Parsed activation selector, defaulting to [`ActFunc::None`].
    pub fn act_func(&self) -> Result<ActFunc, LayerError> {
        self.activation_function
            .as_deref()
            .map_or(Ok(ActFunc::None), |name| name.parse())
    }
}

/// Loads a layer configuration from a JSON file.
///
/// Reads the file at `path` and deserializes its JSON contents into a `ConvLayerConfig`.
///
/// # Returns
///
/// `Ok(ConvLayerConfig)` on success, or an error if the file cannot be read, the JSON is
/// invalid or the values describe a layer that cannot be built.
///
/// # Examples
///
/// ```no_run
/// use conv_layer_nn::config::load_config;
///
/// let cfg = load_config("config/conv_3x3.json").unwrap();
/// assert_eq!(cfg.kernel_size, 3);
/// ```
pub fn load_config(path: &str) -> Result<ConvLayerConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: ConvLayerConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Builds a convolutional layer from a configuration.
pub fn build_layer(config: &ConvLayerConfig) -> Result<ConvLayer, Box<dyn Error>> {
    let act_func = config.act_func()?;
    let layer = match config.seed {
        Some(seed) => ConvLayer::with_initializer(
            config.input_size,
            config.kernel_size,
            act_func,
            &mut SimpleRng::new(seed),
        )?,
        None => ConvLayer::new(config.input_size, config.kernel_size, act_func)?,
    };
    Ok(layer)
}

fn validate_config(config: &ConvLayerConfig) -> Result<(), LayerError> {
    if config.input_size == 0 {
        return Err(LayerError::Config("input_size must be positive".to_string()));
    }

    if !(ConvLayer::MIN_KERNEL_SIZE..=ConvLayer::MAX_KERNEL_SIZE).contains(&config.kernel_size) {
        return Err(LayerError::Config(format!(
            "kernel_size must be in range [{}, {}]",
            ConvLayer::MIN_KERNEL_SIZE,
            ConvLayer::MAX_KERNEL_SIZE
        )));
    }

    if config.kernel_size > config.input_size {
        return Err(LayerError::Config(
            "kernel_size cannot be greater than input_size".to_string(),
        ));
    }

    config.act_func()?;
    Ok(())
}
