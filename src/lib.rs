//! Convolutional layer for a small feed-forward neural network library
//!
//! This library provides a single-kernel, same-padded 2D convolutional layer
//! together with the pieces it is built on.
//!
//! # Modules
//!
//! - `layers`: Layer trait and the convolutional layer
//! - `matrix`: 2D matrix container exchanged between layers
//! - `utils`: Shared utilities (RNG, activation functions, argument checks)
//! - `config`: JSON layer configuration
//! - `error`: Error type for construction and layer operations

pub mod config;
pub mod error;
pub mod layers;
pub mod matrix;
pub mod utils;

pub use error::{LayerError, Result};
