use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidRequest;

/// Caller-supplied parameters shared by every step of one run.
///
/// The same request is handed mutably to every rule of a run, in execution
/// order. Rules read the entries meant for them and may add entries for
/// later steps, so a step observes everything earlier steps wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleEngineRequest {
    parameters: IndexMap<String, Value>,
}

impl RuleEngineRequest {
    /// Create a request without parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.parameters.insert(key.into(), value.into())
    }

    /// Serialize `value` and insert it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be represented as JSON.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Option<Value>, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.parameters.insert(key.into(), value))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Deserialize the parameter stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value does not deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.parameters
            .get(key)
            .map(T::deserialize)
            .transpose()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.parameters.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// All parameters in insertion order.
    #[must_use]
    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }
}

impl From<IndexMap<String, Value>> for RuleEngineRequest {
    fn from(parameters: IndexMap<String, Value>) -> Self {
        Self { parameters }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RuleEngineRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            parameters: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl TryFrom<Value> for RuleEngineRequest {
    type Error = InvalidRequest;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        match payload {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Err(InvalidRequest::Missing),
            Value::Bool(_) => Err(InvalidRequest::NotAnObject("a boolean")),
            Value::Number(_) => Err(InvalidRequest::NotAnObject("a number")),
            Value::String(_) => Err(InvalidRequest::NotAnObject("a string")),
            Value::Array(_) => Err(InvalidRequest::NotAnObject("an array")),
        }
    }
}
