//! Per-instance relationship values

use std::collections::HashMap;

use crate::value::RelationValue;

static EMPTY_VALUE: RelationValue = RelationValue::empty();

/// Current value of each relationship on one model instance
///
/// Names that were never populated or set read as the empty value. Only
/// the lifecycle dispatcher and the writer store values.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    values: HashMap<String, RelationValue>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> &RelationValue {
        self.values.get(name).unwrap_or(&EMPTY_VALUE)
    }

    /// Returns true if a non-empty value is stored under `name`
    pub fn is_set(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &str, value: RelationValue) -> Option<RelationValue> {
        self.values.insert(name.to_string(), value)
    }
}
