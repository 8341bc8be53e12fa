//! Feature schema artifact

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Ordered list of feature names fixed at model-training time.
///
/// The schema is shipped alongside the model artifact and defines the
/// positional contract between the encoder's output and the classifier's
/// input: vector length and order must match it exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load the schema from a JSON array of feature names.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open feature schema {}", path.display()))?;
        let names: Vec<String> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse feature schema {}", path.display()))?;

        info!(
            path = %path.display(),
            features = names.len(),
            "Feature schema loaded"
        );

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a feature name in the vector, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl Default for FeatureSchema {
    /// Schema the bundled model was trained with.
    fn default() -> Self {
        Self::new(
            [
                "amt",
                "city_pop",
                "age",
                "trans_hour",
                "trans_dayofweek",
                "trans_month",
                "gender_index",
                "category_index",
                "state_index",
                "distance",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_schema_order() {
        let schema = FeatureSchema::default();
        assert_eq!(schema.len(), 10);
        assert_eq!(schema.names()[0], "amt");
        assert_eq!(schema.position("distance"), Some(9));
        assert_eq!(schema.position("merchant_index"), None);
    }

    #[test]
    fn test_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["amt", "age", "distance"]"#).unwrap();

        let schema = FeatureSchema::load(file.path()).unwrap();
        assert_eq!(schema.names(), ["amt", "age", "distance"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(FeatureSchema::load("/nonexistent/features.json").is_err());
    }
}
