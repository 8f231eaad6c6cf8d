use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{Dictionary, Value};

/// Error returned when removing a property that is not present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingKey(String);

impl fmt::Display for MissingKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no such property: {:?}", self.0)
    }
}

impl std::error::Error for MissingKey {}

static NULL: Value = Value::Null;

/// A property container with null-coalescing semantics, as used by the
/// graph-shape layer above the codec.
///
/// Null is the signal for absence in both directions: reading a missing key
/// yields `Null` rather than an error, and writing `Null` deletes the key.
/// A stored property is therefore never `Null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDict {
    entries: Dictionary,
}

impl PropertyDict {
    pub fn new() -> PropertyDict {
        PropertyDict {
            entries: Dictionary::new(),
        }
    }

    /// The value under `key`, or `Null` when absent.
    pub fn get(&self, key: &str) -> &Value {
        self.entries.get(key).unwrap_or(&NULL)
    }

    /// Store a value under `key`. Storing `Null` deletes the key; deleting
    /// an absent key this way is a no-op.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if value.is_null() {
            self.entries.shift_remove(key.as_str());
        } else {
            self.entries.insert(key, value);
        }
    }

    /// Return the value under `key` if present; otherwise insert `default`
    /// and return it. A `Null` default is not inserted, leaving the
    /// container unchanged.
    pub fn set_default(&mut self, key: impl Into<String>, default: impl Into<Value>) -> Value {
        let key = key.into();
        if let Some(existing) = self.entries.get(&key) {
            return existing.clone();
        }
        let default = default.into();
        if !default.is_null() {
            self.entries.insert(key, default.clone());
        }
        default
    }

    /// Remove and return the value under `key`. Unlike [`set`][Self::set]
    /// with `Null`, removing an absent key is an error.
    pub fn remove(&mut self, key: &str) -> Result<Value, MissingKey> {
        self.entries
            .shift_remove(key)
            .ok_or_else(|| MissingKey(key.to_string()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    /// View the defined entries as a plain dictionary.
    pub fn as_dictionary(&self) -> &Dictionary {
        &self.entries
    }

    /// Unwrap into the underlying dictionary.
    pub fn into_dictionary(self) -> Dictionary {
        self.entries
    }
}

impl FromIterator<(String, Value)> for PropertyDict {
    /// Collects entries, applying the null rule: `Null` values are dropped.
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> PropertyDict {
        let mut properties = PropertyDict::new();
        for (key, value) in iter {
            properties.set(key, value);
        }
        properties
    }
}

impl From<Dictionary> for PropertyDict {
    fn from(dict: Dictionary) -> PropertyDict {
        dict.into_iter().collect()
    }
}

impl From<PropertyDict> for Dictionary {
    fn from(properties: PropertyDict) -> Dictionary {
        properties.entries
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn alice() -> PropertyDict {
        [
            ("name".to_string(), Value::from("Alice")),
            ("age".to_string(), Value::from(33)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(alice(), alice());
        let mut bob = alice();
        bob.set("name", "Bob");
        assert_ne!(alice(), bob);
    }

    #[test]
    fn missing_keys_read_as_null() {
        let properties = alice();
        assert_eq!(properties.get("name"), &Value::from("Alice"));
        assert_eq!(properties.get("shoe_size"), &Value::Null);
    }

    #[test]
    fn setting_null_deletes() {
        let mut properties = alice();
        properties.set("age", Value::Null);
        assert_eq!(properties.len(), 1);
        assert!(!properties.contains_key("age"));
    }

    #[test]
    fn setting_null_on_missing_key_is_a_no_op() {
        let mut properties = alice();
        properties.set("shoe_size", Value::Null);
        assert_eq!(properties.len(), 2);
    }

    #[test]
    fn set_default_with_existing_key() {
        let mut properties = alice();
        assert_eq!(properties.set_default("age", 34), Value::from(33));
        assert_eq!(properties.get("age"), &Value::from(33));
    }

    #[test]
    fn set_default_with_missing_key() {
        let mut properties = alice();
        assert_eq!(properties.set_default("shoe_size", 38), Value::from(38));
        assert_eq!(properties.get("shoe_size"), &Value::from(38));
    }

    #[test]
    fn set_default_null_leaves_container_unchanged() {
        let mut properties = alice();
        assert_eq!(properties.set_default("shoe_size", Value::Null), Value::Null);
        assert_eq!(properties.len(), 2);
        assert!(!properties.contains_key("shoe_size"));
    }

    #[test]
    fn remove_existing_key() {
        let mut properties = alice();
        assert_eq!(properties.remove("age").unwrap(), Value::from(33));
        assert_eq!(properties.len(), 1);
    }

    #[test]
    fn remove_missing_key_is_an_error() {
        let mut properties = alice();
        assert_eq!(
            properties.remove("shoe_size"),
            Err(MissingKey("shoe_size".to_string()))
        );
    }

    #[test]
    fn nulls_are_dropped_on_collect() {
        let properties: PropertyDict = [
            ("name".to_string(), Value::from("Alice")),
            ("age".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get("age"), &Value::Null);
    }
}
