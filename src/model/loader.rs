//! ONNX classifier loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX classifier with discovered tensor names.
pub struct LoadedModel {
    /// Model name, for logs
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input tensor name
    pub input_name: String,
    /// Output carrying the predicted class, if the model exposes one
    pub label_output: Option<String>,
    /// Output carrying class probabilities, if the model exposes one
    pub probability_output: Option<String>,
}

/// Loader for the classifier artifact.
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader with default settings (1 thread).
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a loader with the given ONNX intra-op thread count.
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit();
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the classifier from a serialized ONNX artifact.
    ///
    /// Absence or corruption of the artifact surfaces here, once, at
    /// startup; the inference path never retries the load.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "classifier".to_string());

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "float_input".to_string());

        let label_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("label"))
            .map(|o| o.name().to_string());

        let probability_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("prob") || o.name().contains("output"))
            .map(|o| o.name().to_string());

        info!(
            model = %name,
            input = %input_name,
            label_output = ?label_output,
            probability_output = ?probability_output,
            "Classifier loaded"
        );

        Ok(LoadedModel {
            name,
            session,
            input_name,
            label_output,
            probability_output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_artifact_fails() {
        let loader = ModelLoader::with_threads(1).unwrap();
        assert!(loader.load("/nonexistent/fraud_model.onnx").is_err());
    }
}
