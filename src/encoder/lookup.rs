//! Categorical label lookup tables

use std::collections::HashMap;

/// Bidirectional mapping between a human-readable category label and the
/// numeric index the model was trained on.
///
/// Built once at startup and read-only afterwards. The index of a label is
/// its position in the training vocabulary, so construction order matters.
#[derive(Debug, Clone)]
pub struct LookupTable {
    labels: Vec<String>,
    indices: HashMap<String, f32>,
}

impl LookupTable {
    /// Build a table from the training vocabulary, in index order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let indices = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as f32))
            .collect();
        Self { labels, indices }
    }

    /// Resolve a label to its trained index. `None` means the label is not
    /// part of the vocabulary; callers must not substitute a default.
    pub fn index_of(&self, label: &str) -> Option<f32> {
        self.indices.get(label).copied()
    }

    /// Reverse lookup: label at a trained index.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_follows_vocabulary_order() {
        let table = LookupTable::from_labels(["Food", "Travel", "Shopping"]);

        assert_eq!(table.index_of("Food"), Some(0.0));
        assert_eq!(table.index_of("Travel"), Some(1.0));
        assert_eq!(table.index_of("Shopping"), Some(2.0));
    }

    #[test]
    fn test_unknown_label_resolves_to_none() {
        let table = LookupTable::from_labels(["Female", "Male"]);
        assert_eq!(table.index_of("Crypto"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        let table = LookupTable::from_labels(["CA", "TX", "NY"]);
        assert_eq!(table.label_of(1), Some("TX"));
        assert_eq!(table.label_of(3), None);
    }
}
