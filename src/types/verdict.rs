//! Screening verdict and wire response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScreeningError;

/// Binary classification label.
///
/// The mapping is total: a positive (class 1) classifier output is `Fraud`,
/// everything else is `Legitimate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Fraud,
    Legitimate,
}

impl Label {
    /// Map a raw classifier class output to a label.
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Label::Fraud
        } else {
            Label::Legitimate
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Label::Fraud)
    }
}

/// Result of one classifier invocation.
///
/// Confidence is the positive-class probability when the model exposes one;
/// it is never fabricated when the model does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Fraud probability in [0,1], when the model exposes one
    pub confidence: Option<f64>,
}

impl Verdict {
    pub fn new(label: Label, confidence: Option<f64>) -> Self {
        Self { label, confidence }
    }
}

/// Outcome of a screening request as rendered back to the front end.
///
/// Pipeline failures are recovered here and carried as a visible message,
/// never collapsed into a default label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Scored {
        label: Label,
        confidence: Option<f64>,
    },
    Failed {
        message: String,
    },
}

/// Response published for every screening submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResponse {
    /// Unique response identifier
    pub response_id: String,

    /// Request id echoed from the submission
    pub request_id: String,

    pub outcome: Outcome,

    /// Response generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl ScreeningResponse {
    /// Build a response for a successful classification.
    pub fn scored(request_id: impl Into<String>, verdict: &Verdict) -> Self {
        Self {
            response_id: uuid::Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            outcome: Outcome::Scored {
                label: verdict.label,
                confidence: verdict.confidence,
            },
            timestamp: Utc::now(),
        }
    }

    /// Build a response for a recovered pipeline failure.
    pub fn failed(request_id: impl Into<String>, error: &ScreeningError) -> Self {
        Self {
            response_id: uuid::Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            outcome: Outcome::Failed {
                message: error.to_string(),
            },
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    #[test]
    fn test_label_mapping_is_total_and_binary() {
        assert_eq!(Label::from_class(1), Label::Fraud);
        assert_eq!(Label::from_class(0), Label::Legitimate);
        assert_eq!(Label::from_class(-1), Label::Legitimate);
        assert_eq!(Label::from_class(2), Label::Legitimate);
    }

    #[test]
    fn test_scored_response_serialization() {
        let verdict = Verdict::new(Label::Fraud, Some(0.93));
        let response = ScreeningResponse::scored("req_42", &verdict);

        let json = serde_json::to_string(&response).unwrap();
        let deserialized: ScreeningResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(response.request_id, deserialized.request_id);
        assert_eq!(
            deserialized.outcome,
            Outcome::Scored {
                label: Label::Fraud,
                confidence: Some(0.93),
            }
        );
        assert!(json.contains("\"status\":\"scored\""));
    }

    #[test]
    fn test_failed_response_carries_message() {
        let err = EncodeError::UnknownCategory {
            field: "category",
            label: "Crypto".to_string(),
        }
        .into();
        let response = ScreeningResponse::failed("req_43", &err);

        match response.outcome {
            Outcome::Failed { ref message } => assert!(message.contains("Crypto")),
            _ => panic!("expected failed outcome"),
        }
    }
}
