//! Channel properties: the per-call configuration map handed over by the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Target MarkLogic host name.
pub const PROP_HOST: &str = "marklogic:host";
/// Target MarkLogic port (integer).
pub const PROP_PORT: &str = "marklogic:port";
/// Channel username, encrypted at rest.
pub const PROP_USERNAME: &str = "pub:channelUsername";
/// Channel password, encrypted at rest.
pub const PROP_PASSWORD: &str = "pub:channelPassword";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Text(String),
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Integer(n)
    }
}

impl From<u16> for PropertyValue {
    fn from(n: u16) -> Self {
        PropertyValue::Integer(i64::from(n))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(n) => write!(f, "{n}"),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

/// Mapping from property keys to values. Supplied fresh for every publish/unpublish call and
/// never persisted by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelProperties(BTreeMap<String, PropertyValue>);

impl ChannelProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Text value for `key`; `None` when absent or not text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(PropertyValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer value for `key`; `None` when absent or not an integer.
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(PropertyValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
