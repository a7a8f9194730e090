//! DestinationBatch - descriptors handed to the firing pipeline
//!
//! The pipeline never inspects descriptors; fire executors interpret them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque list of destination descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationBatch(Vec<Value>);

impl DestinationBatch {
    pub fn new(destinations: Vec<Value>) -> Self {
        Self(destinations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for DestinationBatch {
    fn from(destinations: Vec<Value>) -> Self {
        Self(destinations)
    }
}

impl<'a> IntoIterator for &'a DestinationBatch {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_deserializes_from_array() {
        let batch: DestinationBatch =
            serde_json::from_value(json!([{ "type": "url", "url": "https://a.test" }])).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
    }
}
