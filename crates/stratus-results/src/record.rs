//! Flat result records keyed by field name.

use serde::{Deserialize, Serialize};

/// Ordered field -> value mapping for one parsed result.
///
/// Insertion order is preserved so that the first record of a batch fixes
/// the column order of the aggregate table. Re-inserting an existing field
/// replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultRecord {
    fields: Vec<(String, String)>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut record = ResultRecord::new();
        record.insert("runType", "budget");
        record.insert("runId", "0");
        record.insert("train_objective", "1250.5");
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, ["runType", "runId", "train_objective"]);
    }

    #[test]
    fn reinsertion_replaces_in_place() {
        let mut record = ResultRecord::new();
        record.insert("runId", "0");
        record.insert("train_mean", "30");
        record.insert("runId", "7");
        assert_eq!(record.get("runId"), Some("7"));
        assert_eq!(record.keys().next(), Some("runId"));
        assert_eq!(record.len(), 2);
    }
}
