//! Content normalization applied to accumulated answer text before rendering.

pub mod normalizer;

pub use normalizer::normalize;
