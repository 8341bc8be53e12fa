//! Inference adapter wrapping the loaded classifier

use crate::error::ClassifyError;
use crate::model::loader::LoadedModel;
use crate::types::{Label, Verdict};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Uniform `classify` contract over the opaque classifier handle.
///
/// The adapter isolates the rest of the service from the concrete model
/// format: tensor-output models (XGBoost, Random Forest exports) and
/// sklearn-style `seq(map)` probability outputs are both handled. One
/// synchronous call per submission, deterministic, no retries.
pub struct InferenceAdapter {
    /// Loaded classifier (RwLock for interior mutability; `run` needs `&mut`)
    model: Option<RwLock<LoadedModel>>,
}

impl InferenceAdapter {
    /// Wrap a loaded classifier.
    pub fn new(model: LoadedModel) -> Self {
        info!(model = %model.name, "Inference adapter initialized");
        Self {
            model: Some(RwLock::new(model)),
        }
    }

    /// Adapter with no classifier handle. Every `classify` call fails with
    /// `ModelUnavailable` without attempting inference; the rest of the
    /// service keeps running.
    pub fn disabled() -> Self {
        warn!("Inference adapter running without a classifier; all screening calls will fail");
        Self { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Classify a feature vector.
    ///
    /// A positive (class 1) output maps to `Fraud`, anything else to
    /// `Legitimate`. Confidence is the positive-class probability when the
    /// model exposes one, clamped to [0,1].
    pub fn classify(&self, features: &[f32]) -> Result<Verdict, ClassifyError> {
        use ort::value::Tensor;

        let lock = self.model.as_ref().ok_or(ClassifyError::ModelUnavailable)?;
        let mut model = lock.write().map_err(|_| ClassifyError::LockPoisoned)?;

        let model_name = model.name.clone();
        let input_name = model.input_name.clone();
        let label_output = model.label_output.clone();
        let probability_output = model.probability_output.clone();

        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))?;

        let outputs = model.session.run(ort::inputs![&input_name => input_tensor])?;

        let confidence =
            extract_probability(&outputs, probability_output.as_deref(), &model_name)?;
        let class = extract_class(&outputs, label_output.as_deref(), confidence)?;

        debug!(
            model = %model_name,
            class = class,
            confidence = ?confidence,
            "Classifier call complete"
        );

        Ok(Verdict::new(Label::from_class(class), confidence))
    }
}

/// Extract the predicted class from the model outputs.
///
/// Prefers the dedicated label output; falls back to thresholding the
/// probability when only probabilities are exposed.
fn extract_class(
    outputs: &ort::session::SessionOutputs,
    label_output: Option<&str>,
    confidence: Option<f64>,
) -> Result<i64, ClassifyError> {
    if let Some(name) = label_output {
        if let Some(output) = outputs.get(name) {
            if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                if let Some(&class) = data.first() {
                    return Ok(class);
                }
            }
        }
    }

    for (name, output) in outputs.iter() {
        if !name.contains("label") {
            continue;
        }
        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            if let Some(&class) = data.first() {
                return Ok(class);
            }
        }
    }

    class_from_confidence(confidence)
}

/// Last resort when the model exposes probabilities but no label output.
fn class_from_confidence(confidence: Option<f64>) -> Result<i64, ClassifyError> {
    match confidence {
        Some(prob) => Ok(i64::from(prob >= 0.5)),
        None => Err(ClassifyError::MalformedOutput),
    }
}

/// Extract the positive-class probability from the model outputs.
///
/// Handles tensor outputs (XGBoost, RandomForest) and seq(map) outputs
/// (CatBoost, LightGBM). Returns `None` when the model exposes no
/// probability at all; a confidence is never fabricated.
fn extract_probability(
    outputs: &ort::session::SessionOutputs,
    probability_output: Option<&str>,
    model_name: &str,
) -> Result<Option<f64>, ClassifyError> {
    if let Some(name) = probability_output {
        if let Some(output) = outputs.get(name) {
            let dtype = output.dtype();

            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let prob = positive_class_prob(&shape, data);
                debug!(model = %model_name, prob = ?prob, "Probability extracted from tensor");
                return Ok(prob.map(|p| p.clamp(0.0, 1.0)));
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(output) {
                    return Ok(Some(prob.clamp(0.0, 1.0)));
                }
            }
        }
    }

    // Fallback: scan all non-label outputs
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let prob = positive_class_prob(&shape, data);
            debug!(model = %model_name, output = %name, prob = ?prob, "Probability extracted from tensor (fallback)");
            return Ok(prob.map(|p| p.clamp(0.0, 1.0)));
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = extract_from_sequence_map(&output) {
                return Ok(Some(prob.clamp(0.0, 1.0)));
            }
        }
    }

    Ok(None)
}

/// Probability of class 1 from seq(map(int64, float)), the format used by
/// CatBoost and LightGBM ONNX exports.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64, ClassifyError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(ClassifyError::Inference)?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().ok_or(ClassifyError::MalformedOutput)?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }

    // Binary model that only reports class 0
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    Err(ClassifyError::MalformedOutput)
}

/// Positive-class probability from tensor data of shape [batch, classes],
/// [batch, 1], [classes], or [1].
fn positive_class_prob(shape: &ort::tensor::Shape, data: &[f32]) -> Option<f64> {
    let dims: Vec<i64> = shape.iter().copied().collect();

    let num_classes = match dims.len() {
        2 => dims[1] as usize,
        1 => dims[0] as usize,
        _ => return None,
    };

    if num_classes >= 2 {
        data.get(1).map(|&v| v as f64)
    } else {
        data.first().map(|&v| v as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_adapter_fails_without_calling() {
        let adapter = InferenceAdapter::disabled();
        assert!(!adapter.is_available());

        let err = adapter.classify(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable));
    }

    #[test]
    fn test_class_fallback_thresholds_probability() {
        assert_eq!(class_from_confidence(Some(0.9)).unwrap(), 1);
        assert_eq!(class_from_confidence(Some(0.5)).unwrap(), 1);
        assert_eq!(class_from_confidence(Some(0.2)).unwrap(), 0);
        assert!(matches!(
            class_from_confidence(None),
            Err(ClassifyError::MalformedOutput)
        ));
    }
}
