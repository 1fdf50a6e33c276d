//! Named, heterogeneously typed argument bag.
//!
//! Reads never fail: an absent slot, or one holding another type than the
//! parameter now expects, yields the parameter type's zero value. Stale slots
//! are kept so re-selecting the same method recovers the old configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::runtime::value::Value;
use crate::types::identity::ValueType;
use crate::types::registry::ParamDesc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentStore {
    slots: BTreeMap<String, Value>,
}

impl ArgumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value for `name` if it is of type `expected`, otherwise the type's default.
    pub fn get(&self, name: &str, expected: &ValueType) -> Value {
        match self.slots.get(name) {
            Some(v) if v.is_of(expected) => v.clone(),
            Some(v) => {
                tracing::debug!(
                    target: "latecall",
                    argument = name,
                    expected = %expected,
                    stored = %v.value_type(),
                    "argument type mismatch; using default",
                );
                expected.default_value()
            }
            None => expected.default_value(),
        }
    }

    /// Store `value` under `name`, replacing whatever was there.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.slots.insert(name.into(), value.into());
    }

    pub fn get_float(&self, name: &str) -> f64 {
        self.get(name, &ValueType::Float).as_float().unwrap_or_default()
    }

    pub fn get_int(&self, name: &str) -> i64 {
        self.get(name, &ValueType::Int).as_int().unwrap_or_default()
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name, &ValueType::Bool).as_bool().unwrap_or_default()
    }

    pub fn get_text(&self, name: &str) -> String {
        match self.get(name, &ValueType::Text) {
            Value::Text(s) => s,
            _ => String::new(),
        }
    }

    /// Raw slot, whatever its type.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.slots.remove(name)
    }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Slots in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Give every parameter a slot of its declared type. Slots that already
    /// match are left alone; mismatched ones are overwritten with the default,
    /// slots for other names are untouched.
    pub fn populate_defaults(&mut self, params: &[ParamDesc]) {
        for p in params {
            let fits = self.slots.get(p.name).is_some_and(|v| v.is_of(&p.ty));
            if !fits {
                self.slots.insert(p.name.to_string(), p.ty.default_value());
            }
        }
    }
}
