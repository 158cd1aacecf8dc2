// src/processing/mod.rs
pub mod engine;
pub mod indices;
pub mod normalize;
pub mod parallel;

// Re-export main components
pub use engine::{compute_indices, computable_indices, standard_indices, IndexCalculator};
pub use normalize::{Normalization, Rescale};
pub use parallel::SeriesProcessor;
