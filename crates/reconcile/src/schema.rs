//! Schema definitions for resource kinds
//!
//! A [`Schema`] is the static, ordered description of a resource kind's
//! fields. Everything else in the crate is driven by it: validation of
//! caller input, the attribute codec, and the merge rule applied on Read.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::{FlexibleId, json_kind};
use crate::error::{Error, Result, Violation, ViolationKind};
use crate::state::{Changes, DeclaredState, Value};

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    String,
    Integer,
    Boolean,
    StringList,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringList => "list<string>",
        };
        f.write_str(name)
    }
}

/// Who supplies a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Caller must supply it
    Required,
    /// Caller may supply it
    Optional,
    /// Only the remote system sets it
    Computed,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Computed => "computed",
        };
        f.write_str(name)
    }
}

/// Static description of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub semantic_type: SemanticType,
    pub presence: Presence,
    /// Changing this field after creation requires delete + create
    pub force_replace: bool,
    pub description: &'static str,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, semantic_type: SemanticType, presence: Presence) -> Self {
        Self {
            name,
            semantic_type,
            presence,
            force_replace: false,
            description: "",
        }
    }

    pub fn required(name: &'static str, semantic_type: SemanticType) -> Self {
        Self::new(name, semantic_type, Presence::Required)
    }

    pub fn optional(name: &'static str, semantic_type: SemanticType) -> Self {
        Self::new(name, semantic_type, Presence::Optional)
    }

    pub fn computed(name: &'static str, semantic_type: SemanticType) -> Self {
        Self::new(name, semantic_type, Presence::Computed)
    }

    /// Mark the field as replace-on-change
    pub fn force_replace(mut self) -> Self {
        self.force_replace = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_computed(&self) -> bool {
        self.presence == Presence::Computed
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    /// Whether the caller supplies this field (required or optional)
    pub fn is_input(&self) -> bool {
        !self.is_computed()
    }

    /// Type a raw JSON value (config file, request body) against this field
    ///
    /// Lists accept heterogeneous scalars and coerce each element to a string,
    /// keeping order. Numbers are accepted for string fields and rendered
    /// canonically so `42` and `42.0` both become `"42"`.
    pub fn coerce(&self, raw: &serde_json::Value) -> std::result::Result<Value, ViolationKind> {
        let wrong_type = || ViolationKind::WrongType {
            expected: self.semantic_type,
            found: json_kind(raw).to_string(),
        };

        match self.semantic_type {
            SemanticType::String => match raw {
                serde_json::Value::String(s) => Ok(Value::String(s.clone())),
                serde_json::Value::Number(_) => FlexibleId::from_json(raw)
                    .map(|id| Value::String(id.canonical()))
                    .ok_or_else(wrong_type),
                _ => Err(wrong_type()),
            },
            SemanticType::Integer => integer_from_json(raw).map(Value::Integer).ok_or_else(wrong_type),
            SemanticType::Boolean => raw.as_bool().map(Value::Boolean).ok_or_else(wrong_type),
            SemanticType::StringList => {
                let items = raw.as_array().ok_or_else(wrong_type)?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        FlexibleId::from_json(item)
                            .map(|id| id.canonical())
                            .ok_or_else(|| {
                                ViolationKind::Invalid(format!(
                                    "list element {} is {}, expected string",
                                    i,
                                    json_kind(item)
                                ))
                            })
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(Value::List)
            }
        }
    }

    /// Type a command-line `key=value` text against this field
    ///
    /// Lists are comma-separated; blank elements are dropped.
    pub fn parse(&self, text: &str) -> std::result::Result<Value, ViolationKind> {
        match self.semantic_type {
            SemanticType::String => Ok(Value::String(text.to_string())),
            SemanticType::Integer => text
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| ViolationKind::Invalid(format!("'{text}' is not an integer"))),
            SemanticType::Boolean => match text.trim() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                other => Err(ViolationKind::Invalid(format!(
                    "'{other}' is not a boolean (true/false)"
                ))),
            },
            SemanticType::StringList => Ok(Value::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

/// Accept JSON integers, and floats with no fractional part
pub(crate) fn integer_from_json(raw: &serde_json::Value) -> Option<i64> {
    let number = raw.as_number()?;
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0)
        .map(|f| f as i64)
}

/// How a kind can be brought under management from an existing remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// External identifier becomes the state identifier as-is
    Passthrough,
    Unsupported,
}

/// Ordered field descriptors for one resource kind
#[derive(Debug, Clone)]
pub struct Schema {
    kind: &'static str,
    fields: Vec<FieldDescriptor>,
    import_mode: ImportMode,
    touch_field: Option<&'static str>,
}

impl Schema {
    /// Create an empty schema for a kind
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            import_mode: ImportMode::Unsupported,
            touch_field: None,
        }
    }

    /// Append a field descriptor, replacing one with the same name
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.retain(|f| f.name != descriptor.name);
        self.fields.push(descriptor);
        self
    }

    pub fn passthrough_import(mut self) -> Self {
        self.import_mode = ImportMode::Passthrough;
        self
    }

    /// Computed field stamped with the current time after each successful update
    pub fn touch_on_update(mut self, field: &'static str) -> Self {
        self.touch_field = Some(field);
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn import_mode(&self) -> ImportMode {
        self.import_mode
    }

    pub fn supports_import(&self) -> bool {
        self.import_mode == ImportMode::Passthrough
    }

    pub fn touch_field(&self) -> Option<&'static str> {
        self.touch_field
    }

    /// Names of force-replace input fields
    pub fn force_replace_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.force_replace && f.is_input())
            .map(|f| f.name)
    }

    fn check_value(&self, name: &str, value: &Value, violations: &mut Vec<Violation>) -> bool {
        let Some(descriptor) = self.get(name) else {
            violations.push(Violation::new(name, ViolationKind::Unknown));
            return false;
        };
        if descriptor.is_computed() {
            violations.push(Violation::new(name, ViolationKind::Computed));
            return false;
        }
        if value.semantic_type() != descriptor.semantic_type {
            violations.push(Violation::new(
                name,
                ViolationKind::WrongType {
                    expected: descriptor.semantic_type,
                    found: value.semantic_type().to_string(),
                },
            ));
            return false;
        }
        true
    }

    fn invalid(&self, violations: Vec<Violation>) -> Error {
        Error::SchemaValidation {
            kind: self.kind.to_string(),
            violations,
        }
    }

    /// Validate caller-supplied configuration before it is sent anywhere
    ///
    /// Rejects computed fields, unknown fields, wrongly typed values and
    /// missing required fields. All violations are reported together.
    pub fn validate_config(&self, state: &DeclaredState) -> Result<()> {
        let mut violations = Vec::new();

        for (name, value) in state.fields() {
            self.check_value(name, value, &mut violations);
        }

        for descriptor in self.fields.iter().filter(|f| f.is_required()) {
            if !state.contains(descriptor.name) {
                violations.push(Violation::new(descriptor.name, ViolationKind::Missing));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.invalid(violations))
        }
    }

    /// Validate an in-place change set
    ///
    /// Schema problems are reported first; a change to any force-replace
    /// field is then rejected as a conflicting update.
    pub fn validate_changes(&self, changes: &Changes) -> Result<()> {
        let mut violations = Vec::new();
        let mut replacing = Vec::new();

        for (name, value) in changes {
            if self.check_value(name, value, &mut violations)
                && self.get(name).is_some_and(|f| f.force_replace)
            {
                replacing.push(name.clone());
            }
        }

        if !violations.is_empty() {
            return Err(self.invalid(violations));
        }
        if !replacing.is_empty() {
            return Err(Error::ConflictingUpdate {
                kind: self.kind.to_string(),
                fields: replacing,
            });
        }
        Ok(())
    }

    /// Build a declared state from raw configuration values
    ///
    /// Values are typed against their descriptors; unknown fields and type
    /// errors are collected into a single schema validation error.
    pub fn declare(
        &self,
        raw: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<DeclaredState> {
        let mut state = DeclaredState::new();
        let mut violations = Vec::new();

        for (name, value) in raw {
            let Some(descriptor) = self.get(name) else {
                violations.push(Violation::new(name.as_str(), ViolationKind::Unknown));
                continue;
            };
            match descriptor.coerce(value) {
                Ok(typed) => state.set(name.as_str(), typed),
                Err(kind) => violations.push(Violation::new(name.as_str(), kind)),
            }
        }

        if violations.is_empty() {
            Ok(state)
        } else {
            Err(self.invalid(violations))
        }
    }

    /// Parse `key=value` assignments into a change set
    pub fn parse_changes<'a>(
        &self,
        assignments: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Changes> {
        let mut changes = Changes::new();
        let mut violations = Vec::new();

        for (name, text) in assignments {
            let Some(descriptor) = self.get(name) else {
                violations.push(Violation::new(name, ViolationKind::Unknown));
                continue;
            };
            match descriptor.parse(text) {
                Ok(value) => {
                    changes.insert(name.to_string(), value);
                }
                Err(kind) => violations.push(Violation::new(name, kind)),
            }
        }

        if violations.is_empty() {
            Ok(changes)
        } else {
            Err(self.invalid(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use serde_json::json;

    fn server_schema() -> Schema {
        Schema::new("test_server")
            .field(FieldDescriptor::required("project", SemanticType::String).force_replace())
            .field(FieldDescriptor::required("hostname", SemanticType::String))
            .field(
                FieldDescriptor::optional("ssh_keys", SemanticType::StringList).force_replace(),
            )
            .field(FieldDescriptor::optional("ipxe_url", SemanticType::String).force_replace())
            .field(FieldDescriptor::computed("primary_ipv4", SemanticType::String))
            .field(FieldDescriptor::computed("updated", SemanticType::String))
            .passthrough_import()
            .touch_on_update("updated")
    }

    #[test]
    fn test_field_order_is_preserved() {
        let schema = server_schema();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["project", "hostname", "ssh_keys", "ipxe_url", "primary_ipv4", "updated"]
        );
        assert!(schema.supports_import());
        assert_eq!(schema.touch_field(), Some("updated"));
    }

    #[test]
    fn test_validate_config_ok() {
        let state = DeclaredState::new()
            .with("project", "proj-1")
            .with("hostname", "web-1")
            .with("ipxe_url", "");
        assert!(server_schema().validate_config(&state).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_computed_and_missing() {
        let state = DeclaredState::new()
            .with("project", "proj-1")
            .with("primary_ipv4", "10.0.0.1");

        let err = server_schema().validate_config(&state).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::SchemaValidation);

        let violations = err.violations();
        assert!(violations.contains(&Violation::new("primary_ipv4", ViolationKind::Computed)));
        assert!(violations.contains(&Violation::new("hostname", ViolationKind::Missing)));
    }

    #[test]
    fn test_validate_config_rejects_wrong_type_and_unknown() {
        let state = DeclaredState::new()
            .with("project", "proj-1")
            .with("hostname", true)
            .with("colour", "blue");

        let err = server_schema().validate_config(&state).unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&Violation::new("colour", ViolationKind::Unknown)));
        assert!(violations.contains(&Violation::new(
            "hostname",
            ViolationKind::WrongType {
                expected: SemanticType::String,
                found: "boolean".into(),
            }
        )));
    }

    #[test]
    fn test_validate_changes_rejects_force_replace() {
        let mut changes = Changes::new();
        changes.insert("hostname".into(), "web-2".into());
        changes.insert("project".into(), "proj-2".into());

        let err = server_schema().validate_changes(&changes).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ConflictingUpdate);
        match err {
            Error::ConflictingUpdate { fields, .. } => assert_eq!(fields, vec!["project"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_changes_rejects_computed() {
        let mut changes = Changes::new();
        changes.insert("updated".into(), "yesterday".into());

        let err = server_schema().validate_changes(&changes).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::SchemaValidation);
    }

    #[test]
    fn test_coerce_heterogeneous_list() {
        let field = FieldDescriptor::optional("ssh_keys", SemanticType::StringList);
        let value = field.coerce(&json!(["key-1", 42, 7.0])).unwrap();
        assert_eq!(value, Value::from(vec!["key-1", "42", "7"]));

        let err = field.coerce(&json!(["key-1", {"id": 1}])).unwrap_err();
        assert!(matches!(err, ViolationKind::Invalid(_)));
    }

    #[test]
    fn test_coerce_scalars() {
        let id = FieldDescriptor::required("project", SemanticType::String);
        assert_eq!(id.coerce(&json!(42)).unwrap(), Value::from("42"));
        assert!(id.coerce(&json!(true)).is_err());

        let vid = FieldDescriptor::computed("vid", SemanticType::Integer);
        assert_eq!(vid.coerce(&json!(1200.0)).unwrap(), Value::Integer(1200));
        assert!(vid.coerce(&json!(1.5)).is_err());
    }

    #[test]
    fn test_parse_text() {
        let keys = FieldDescriptor::optional("ssh_keys", SemanticType::StringList);
        assert_eq!(
            keys.parse("key-1, key-2,,").unwrap(),
            Value::from(vec!["key-1", "key-2"])
        );

        let stock = FieldDescriptor::computed("in_stock", SemanticType::Boolean);
        assert_eq!(stock.parse("true").unwrap(), Value::Boolean(true));
        assert!(stock.parse("yes").is_err());
    }

    #[test]
    fn test_declare_collects_violations() {
        let raw = json!({
            "project": "proj-1",
            "hostname": 12,
            "ssh_keys": "key-1",
            "bogus": 1
        });
        let err = server_schema()
            .declare(raw.as_object().unwrap())
            .unwrap_err();
        // hostname accepts numbers as canonical strings; the list and unknown field do not
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_parse_changes() {
        let changes = server_schema()
            .parse_changes([("hostname", "web-1-renamed")])
            .unwrap();
        assert_eq!(changes.get("hostname"), Some(&Value::from("web-1-renamed")));

        assert!(server_schema().parse_changes([("nope", "x")]).is_err());
    }
}
