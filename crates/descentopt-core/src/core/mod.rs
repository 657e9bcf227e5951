//! Core traits and types for descent optimization.

pub mod cost_function;
pub mod error;
pub mod types;

// Re-export core types
pub use cost_function::*;
pub use error::*;
pub use types::*;
