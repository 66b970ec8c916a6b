//! Synthetic sample data for Kendall tau runs, and `.npy` storage for it.

pub mod generate;
pub mod npy;
pub mod source;

pub use generate::{generate, GeneratorSettings};
pub use source::NpySource;
