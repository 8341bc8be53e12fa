//! Raw transaction submission as collected by the front-end form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// One atomic form submission to be screened for fraud.
///
/// Fields carry the raw, human-facing values: amounts in the submitted
/// currency, categorical fields as labels. Index resolution and unit
/// normalization happen in the encoder, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Request identifier assigned by the submitting front end
    pub request_id: String,

    /// Transaction amount in `currency`
    pub amount: f64,

    /// ISO currency code of `amount`
    #[serde(default = "default_currency")]
    pub currency: String,

    /// City population, raw count or pre-scaled to [0,1] depending on
    /// the encoder's population setting
    pub city_pop: f64,

    /// Cardholder age in years
    pub age: u32,

    /// Hour of the transaction (0-23)
    pub trans_hour: u8,

    /// Day of week (1=Sun .. 7=Sat)
    pub trans_dayofweek: u8,

    /// Month of the transaction (1-12)
    pub trans_month: u8,

    /// Cardholder gender label
    pub gender: String,

    /// Merchant category label
    pub category: String,

    /// State label
    pub state: String,

    /// Distance between cardholder and merchant
    pub distance: f64,

    /// Submission timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl TransactionInput {
    /// Create a submission with neutral defaults for the optional fields.
    pub fn new(request_id: impl Into<String>, amount: f64, age: u32) -> Self {
        Self {
            request_id: request_id.into(),
            amount,
            currency: default_currency(),
            city_pop: 0.0,
            age,
            trans_hour: 12,
            trans_dayofweek: 3,
            trans_month: 6,
            gender: "Female".to_string(),
            category: "Food".to_string(),
            state: "CA".to_string(),
            distance: 0.0,
            timestamp: Utc::now(),
        }
    }

    /// Check every numeric field against the bounds the form declares.
    ///
    /// The front end enforces these too, but submissions arrive over the
    /// wire and a form/schema mismatch must fail loudly rather than feed
    /// the classifier out-of-range values.
    pub fn validate(&self) -> Result<(), EncodeError> {
        check_range("amount", self.amount, 0.0, f64::MAX)?;
        check_range("city_pop", self.city_pop, 0.0, f64::MAX)?;
        check_range("age", self.age as f64, 10.0, 120.0)?;
        check_range("trans_hour", self.trans_hour as f64, 0.0, 23.0)?;
        check_range("trans_dayofweek", self.trans_dayofweek as f64, 1.0, 7.0)?;
        check_range("trans_month", self.trans_month as f64, 1.0, 12.0)?;
        check_range("distance", self.distance, 0.0, f64::MAX)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), EncodeError> {
    if !value.is_finite() || value < min || value > max {
        return Err(EncodeError::InvalidField {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_serialization() {
        let input = TransactionInput::new("req_123", 250.0, 34);

        let json = serde_json::to_string(&input).unwrap();
        let deserialized: TransactionInput = serde_json::from_str(&json).unwrap();

        assert_eq!(input.request_id, deserialized.request_id);
        assert_eq!(input.amount, deserialized.amount);
        assert_eq!(input.currency, deserialized.currency);
        assert_eq!(input.age, deserialized.age);
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let json = r#"{
            "request_id": "req_1",
            "amount": 10.0,
            "city_pop": 0.5,
            "age": 40,
            "trans_hour": 9,
            "trans_dayofweek": 2,
            "trans_month": 3,
            "gender": "Male",
            "category": "Food",
            "state": "CA",
            "distance": 1.2
        }"#;
        let input: TransactionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.currency, "USD");
    }

    #[test]
    fn test_validate_accepts_in_bounds_values() {
        let input = TransactionInput::new("req_1", 250.0, 34);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_hour() {
        let mut input = TransactionInput::new("req_1", 250.0, 34);
        input.trans_hour = 24;

        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            EncodeError::InvalidField {
                field: "trans_hour",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_dow_zero() {
        let mut input = TransactionInput::new("req_1", 250.0, 34);
        input.trans_dayofweek = 0;
        assert!(input.validate().is_err());
    }
}
