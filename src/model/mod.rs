//! Classifier loading and inference

pub mod adapter;
pub mod loader;

pub use adapter::InferenceAdapter;
pub use loader::{LoadedModel, ModelLoader};
