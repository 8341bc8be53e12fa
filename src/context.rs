//! Long-lived screening context shared by the request handlers

use anyhow::Result;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::encoder::{FeatureEncoder, FeatureSchema};
use crate::error::ScreeningError;
use crate::model::{InferenceAdapter, ModelLoader};
use crate::types::{TransactionInput, Verdict};

/// Immutable per-process context: the encoder, its lookup tables, and the
/// classifier handle, built once at startup and shared read-only.
///
/// Handlers receive this explicitly instead of reaching for ambient
/// globals; nothing in it mutates after construction.
pub struct ScreeningContext {
    encoder: FeatureEncoder,
    adapter: InferenceAdapter,
}

impl ScreeningContext {
    pub fn new(encoder: FeatureEncoder, adapter: InferenceAdapter) -> Self {
        Self { encoder, adapter }
    }

    /// Build the context from configuration: load the schema artifact and
    /// the classifier, construct the encoder tables.
    ///
    /// A missing classifier artifact disables screening but does not abort
    /// startup; the summary surface still works and every screening call
    /// reports `ModelUnavailable`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let schema = match &config.artifacts.schema_path {
            Some(path) => FeatureSchema::load(path)?,
            None => FeatureSchema::default(),
        };

        let encoder = FeatureEncoder::from_config(schema, &config.encoder);
        info!(
            features = encoder.schema().len(),
            categories = encoder.categories().len(),
            states = encoder.states().len(),
            "Feature encoder initialized"
        );

        let loader = ModelLoader::with_threads(config.artifacts.onnx_threads)?;
        let adapter = match loader.load(&config.artifacts.model_path) {
            Ok(model) => InferenceAdapter::new(model),
            Err(e) => {
                error!(
                    path = %config.artifacts.model_path,
                    error = %e,
                    "Failed to load classifier, screening disabled"
                );
                InferenceAdapter::disabled()
            }
        };

        Ok(Self { encoder, adapter })
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn model_available(&self) -> bool {
        self.adapter.is_available()
    }

    /// Run the encode-then-classify chain for one submission.
    ///
    /// An encoding failure short-circuits before any classifier call.
    pub fn screen(&self, input: &TransactionInput) -> Result<Verdict, ScreeningError> {
        let features = self.encoder.encode(input)?;
        let verdict = self.adapter.classify(&features)?;
        Ok(verdict)
    }
}
