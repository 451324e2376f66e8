//! Discriminative learning rates for fine-tuning.
//!
//! Walks a model's named parameters from the output-facing layers towards the input and
//! decays the learning rate every time it crosses into a different top-level group.

pub mod assign;
pub mod config;
pub mod error;
pub mod manifest;
pub mod optimization;
pub mod params;
pub mod report;

pub use assign::{GroupBinding, LayerLrAssigner, Traversal};
pub use config::{DecayConfig, RunConfig};
pub use error::{LrErr, Result};
