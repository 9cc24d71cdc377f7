//! Shared utilities for layer implementations
//!
//! This module provides random parameter initialization, the activation
//! selector and the argument checks used by layer operations.

pub mod activations;
pub mod rng;
pub mod validation;

pub use activations::ActFunc;
pub use rng::{Initializer, SimpleRng};
