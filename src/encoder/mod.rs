//! Feature encoding for fraud model inference.
//!
//! Turns a raw form submission into the numeric feature vector the model
//! was trained on, matching the preprocessing of the training pipeline.
//! Encoding is a pure function of the submission and the tables built at
//! startup; vector order follows the feature schema exactly.

pub mod lookup;
pub mod schema;

pub use lookup::LookupTable;
pub use schema::FeatureSchema;

use std::collections::HashMap;

use crate::config::EncoderConfig;
use crate::error::EncodeError;
use crate::types::TransactionInput;

/// Encoder from raw submissions to model-ready feature vectors.
pub struct FeatureEncoder {
    schema: FeatureSchema,
    genders: LookupTable,
    categories: LookupTable,
    states: LookupTable,
    /// Static conversion rates to USD, keyed by currency code
    currency_rates: HashMap<String, f64>,
    /// When set, raw city population counts are scaled by this maximum
    /// into [0,1]; when unset the form already supplies a scaled value
    population_max: Option<f64>,
}

impl FeatureEncoder {
    /// Build an encoder from the schema artifact and the encoder settings.
    pub fn from_config(schema: FeatureSchema, config: &EncoderConfig) -> Self {
        Self {
            schema,
            genders: LookupTable::from_labels(config.genders.iter().cloned()),
            categories: LookupTable::from_labels(config.categories.iter().cloned()),
            states: LookupTable::from_labels(config.states.iter().cloned()),
            currency_rates: config.currency_rates.clone(),
            population_max: config.population_max,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Vocabulary tables, for front ends that render the choice lists.
    pub fn categories(&self) -> &LookupTable {
        &self.categories
    }

    pub fn states(&self) -> &LookupTable {
        &self.states
    }

    /// Encode a submission into a feature vector in exact schema order.
    ///
    /// Fails without producing a partial vector: the first out-of-range
    /// field, unknown label, or unsatisfiable schema name aborts encoding.
    pub fn encode(&self, input: &TransactionInput) -> Result<Vec<f32>, EncodeError> {
        input.validate()?;

        let mut vector = Vec::with_capacity(self.schema.len());
        for name in self.schema.names() {
            vector.push(self.resolve(name, input)?);
        }
        Ok(vector)
    }

    /// Resolve one schema name against the submission.
    fn resolve(&self, name: &str, input: &TransactionInput) -> Result<f32, EncodeError> {
        match name {
            "amt" => {
                let rate = self.currency_rates.get(&input.currency).copied().ok_or(
                    EncodeError::UnknownCategory {
                        field: "currency",
                        label: input.currency.clone(),
                    },
                )?;
                Ok((input.amount * rate) as f32)
            }
            "city_pop" => match self.population_max {
                Some(max) => Ok(((input.city_pop / max).clamp(0.0, 1.0)) as f32),
                None => Ok(input.city_pop as f32),
            },
            "age" => Ok(input.age as f32),
            "trans_hour" => Ok(input.trans_hour as f32),
            "trans_dayofweek" => Ok(input.trans_dayofweek as f32),
            "trans_month" => Ok(input.trans_month as f32),
            "gender_index" => {
                self.genders
                    .index_of(&input.gender)
                    .ok_or(EncodeError::UnknownCategory {
                        field: "gender",
                        label: input.gender.clone(),
                    })
            }
            "category_index" => {
                self.categories
                    .index_of(&input.category)
                    .ok_or(EncodeError::UnknownCategory {
                        field: "category",
                        label: input.category.clone(),
                    })
            }
            "state_index" => {
                self.states
                    .index_of(&input.state)
                    .ok_or(EncodeError::UnknownCategory {
                        field: "state",
                        label: input.state.clone(),
                    })
            }
            "distance" => Ok(input.distance as f32),
            other => Err(EncodeError::MissingFeature(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> FeatureEncoder {
        FeatureEncoder::from_config(FeatureSchema::default(), &EncoderConfig::default())
    }

    fn sample_input() -> TransactionInput {
        TransactionInput {
            request_id: "req_1".to_string(),
            amount: 250.0,
            currency: "USD".to_string(),
            city_pop: 0.42,
            age: 34,
            trans_hour: 14,
            trans_dayofweek: 3,
            trans_month: 6,
            gender: "Male".to_string(),
            category: "Travel".to_string(),
            state: "TX".to_string(),
            distance: 0.08,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_encode_matches_schema_order() {
        let vector = encoder().encode(&sample_input()).unwrap();

        assert_eq!(
            vector,
            vec![250.0, 0.42, 34.0, 14.0, 3.0, 6.0, 1.0, 1.0, 1.0, 0.08]
        );
    }

    #[test]
    fn test_every_default_schema_name_resolves() {
        let enc = encoder();
        let input = sample_input();

        // No name of the training schema may fall through to the
        // MissingFeature arm for an in-bounds submission.
        for name in enc.schema().names() {
            assert!(
                enc.resolve(name, &input).is_ok(),
                "feature {name:?} failed to resolve"
            );
        }
        assert_eq!(enc.encode(&input).unwrap()[9], 0.08);
    }

    #[test]
    fn test_encode_length_equals_schema_length() {
        let enc = encoder();
        let vector = enc.encode(&sample_input()).unwrap();
        assert_eq!(vector.len(), enc.schema().len());
    }

    #[test]
    fn test_unknown_category_label_fails() {
        let mut input = sample_input();
        input.category = "Crypto".to_string();

        let err = encoder().encode(&input).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnknownCategory {
                field: "category",
                label: "Crypto".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_state_fails() {
        let mut input = sample_input();
        input.state = "ZZ".to_string();

        assert!(matches!(
            encoder().encode(&input),
            Err(EncodeError::UnknownCategory { field: "state", .. })
        ));
    }

    #[test]
    fn test_unknown_currency_fails() {
        let mut input = sample_input();
        input.currency = "BTC".to_string();

        assert!(matches!(
            encoder().encode(&input),
            Err(EncodeError::UnknownCategory {
                field: "currency",
                ..
            })
        ));
    }

    #[test]
    fn test_currency_conversion_to_usd() {
        let mut input = sample_input();
        input.currency = "EUR".to_string();

        let vector = encoder().encode(&input).unwrap();
        assert!((vector[0] - 270.0).abs() < 1e-3); // 250 * 1.08
    }

    #[test]
    fn test_population_scaling() {
        let mut config = EncoderConfig::default();
        config.population_max = Some(1_000_000.0);
        let enc = FeatureEncoder::from_config(FeatureSchema::default(), &config);

        let mut input = sample_input();
        input.city_pop = 420_000.0;

        let vector = enc.encode(&input).unwrap();
        assert!((vector[1] - 0.42).abs() < 1e-6);

        // Counts above the maximum clamp to 1.0 instead of leaving [0,1]
        input.city_pop = 2_000_000.0;
        assert_eq!(enc.encode(&input).unwrap()[1], 1.0);
    }

    #[test]
    fn test_unsatisfiable_schema_name_fails() {
        let schema = FeatureSchema::new(vec!["amt".to_string(), "merchant_index".to_string()]);
        let enc = FeatureEncoder::from_config(schema, &EncoderConfig::default());

        let err = enc.encode(&sample_input()).unwrap_err();
        assert_eq!(err, EncodeError::MissingFeature("merchant_index".to_string()));
    }

    #[test]
    fn test_out_of_bounds_input_fails_before_resolution() {
        let mut input = sample_input();
        input.trans_month = 13;

        assert!(matches!(
            encoder().encode(&input),
            Err(EncodeError::InvalidField {
                field: "trans_month",
                ..
            })
        ));
    }
}
