//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait and the convolutional layer that
//! implements it.

mod r#trait;
pub mod conv;

// Re-export the Layer trait for convenience
pub use conv::ConvLayer;
pub use r#trait::Layer;
