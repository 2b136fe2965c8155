//! Declared state of a single resource instance
//!
//! A [`DeclaredState`] is what the caller wants a resource to look like,
//! plus the identifier the remote service assigned once the resource was
//! created. An empty identifier means the resource does not exist remotely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::SemanticType;

/// A typed field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    String(String),
    List(Vec<String>),
}

impl Value {
    /// The semantic type this value carries
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Boolean(_) => SemanticType::Boolean,
            Self::Integer(_) => SemanticType::Integer,
            Self::String(_) => SemanticType::String,
            Self::List(_) => SemanticType::StringList,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to the JSON shape sent to the remote API
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| serde_json::Value::String(item.clone()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Field changes requested for an in-place update, keyed by field name
pub type Changes = BTreeMap<String, Value>;

/// Local representation of one resource instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredState {
    /// Remote-assigned identifier, empty until the resource exists
    #[serde(default)]
    id: String,
    /// Field values keyed by descriptor name
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl DeclaredState {
    /// Create an empty state (not present remotely)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state bound to an existing remote identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the resource exists remotely
    ///
    /// A non-empty identifier is the only signal of remote existence.
    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a string field
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Iterate fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
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
    fn test_new_state_is_absent() {
        let state = DeclaredState::new();
        assert!(!state.exists());
        assert_eq!(state.id(), "");
        assert!(state.is_empty());
    }

    #[test]
    fn test_id_lifecycle() {
        let mut state = DeclaredState::new().with("hostname", "web-1");
        state.set_id("srv-1");
        assert!(state.exists());

        state.clear_id();
        assert!(!state.exists());
        // Fields survive clearing the identifier
        assert_eq!(state.get_str("hostname"), Some("web-1"));
    }

    #[test]
    fn test_value_semantic_types() {
        assert_eq!(Value::from("a").semantic_type(), SemanticType::String);
        assert_eq!(Value::from(3_i64).semantic_type(), SemanticType::Integer);
        assert_eq!(Value::from(true).semantic_type(), SemanticType::Boolean);
        assert_eq!(
            Value::from(vec!["a", "b"]).semantic_type(),
            SemanticType::StringList
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("web-1").to_string(), "web-1");
        assert_eq!(Value::from(vec!["k1", "k2"]).to_string(), "[k1, k2]");
        assert_eq!(Value::from(false).to_string(), "false");
    }

    #[test]
    fn test_state_serde_untagged_values() {
        let state = DeclaredState::with_id("srv-1")
            .with("hostname", "web-1")
            .with("ssh_keys", vec!["k1"])
            .with("vid", 1200_i64)
            .with("in_stock", true);

        let json = serde_json::to_string(&state).unwrap();
        let back: DeclaredState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
