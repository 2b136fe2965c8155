//! Attribute codec - maps declared state to API requests and back
//!
//! The remote API uses a different shape on each side: requests carry flat
//! attributes (`"plan": "c2-small"`), responses nest related objects
//! (`"plan": {"slug": "c2-small"}`). Related-object identifiers are also
//! serialized inconsistently, sometimes as strings and sometimes as numbers.
//!
//! [`BindingCodec`] handles both with a per-field table: a request key, an
//! ordered list of response paths, and a [`DecodeRule`] saying how the raw
//! value is normalized.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{Schema, SemanticType, integer_from_json};
use crate::state::{DeclaredState, Value};

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Request body for a create or update call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Remote type name (e.g., "servers")
    pub resource_type: String,
    /// Identifier of the target object, for updates
    pub id: Option<String>,
    pub attributes: JsonMap,
}

/// A remote object with its transport envelope removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub id: String,
    pub attributes: JsonMap,
}

impl RemoteObject {
    pub fn new(id: impl Into<String>, attributes: JsonMap) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Build from a raw identifier that may be a string or a number
    pub fn from_raw_id(id: &serde_json::Value, attributes: JsonMap) -> Option<Self> {
        FlexibleId::from_json(id).map(|id| Self::new(id.canonical(), attributes))
    }
}

/// An identifier serialized as either a string or a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Text(String),
    Number(serde_json::Number),
}

impl FlexibleId {
    /// Read an identifier from JSON, `None` for any other shape
    pub fn from_json(raw: &serde_json::Value) -> Option<Self> {
        match raw {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            _ => None,
        }
    }

    /// Canonical string form
    ///
    /// Integral numbers print without a fractional part, so `42` and `42.0`
    /// both yield `"42"`.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => integer_from_json(&serde_json::Value::Number(n.clone()))
                .map(|i| i.to_string())
                .unwrap_or_else(|| n.to_string()),
        }
    }
}

/// Short name of a JSON value's shape, for error messages
pub(crate) fn json_kind(raw: &serde_json::Value) -> &'static str {
    match raw {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Bidirectional mapping between declared state and API attributes
pub trait AttributeCodec: Send + Sync {
    /// Encode every non-computed field present in `state`
    fn encode(&self, schema: &Schema, state: &DeclaredState) -> ProviderRequest;

    /// Decode a remote object into a state keyed by schema field names
    ///
    /// Response attributes with no matching field are ignored.
    fn decode(&self, schema: &Schema, object: &RemoteObject) -> Result<DeclaredState>;
}

/// How a raw response value is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeRule {
    /// Value must already have the field's JSON shape
    #[default]
    Verbatim,
    /// String or number, normalized through [`FlexibleId`]
    Identifier,
}

/// Wire mapping for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub field: &'static str,
    pub request_key: &'static str,
    /// Dotted response paths tried before the flat request key
    pub response_paths: Vec<&'static str>,
    pub rule: DecodeRule,
}

impl Binding {
    fn flat(field: &'static str) -> Self {
        Self {
            field,
            request_key: field,
            response_paths: Vec::new(),
            rule: DecodeRule::Verbatim,
        }
    }

    /// Response paths in lookup order, ending with the flat request key
    fn candidates(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.response_paths
            .iter()
            .copied()
            .chain(std::iter::once(self.request_key))
    }
}

/// Table-driven codec
///
/// Fields without an explicit binding use their own name as request key and
/// response path.
#[derive(Debug, Clone)]
pub struct BindingCodec {
    resource_type: &'static str,
    bindings: Vec<Binding>,
}

impl BindingCodec {
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            bindings: Vec::new(),
        }
    }

    fn entry(&mut self, field: &'static str) -> &mut Binding {
        let index = match self.bindings.iter().position(|b| b.field == field) {
            Some(index) => index,
            None => {
                self.bindings.push(Binding::flat(field));
                self.bindings.len() - 1
            }
        };
        &mut self.bindings[index]
    }

    /// Send `field` under a different request key
    pub fn rename(mut self, field: &'static str, request_key: &'static str) -> Self {
        self.entry(field).request_key = request_key;
        self
    }

    /// Read `field` from a nested response path such as `region.site.slug`
    pub fn nested(mut self, field: &'static str, path: &'static str) -> Self {
        self.entry(field).response_paths.push(path);
        self
    }

    /// Normalize `field` as an identifier (string or number)
    pub fn identifier(mut self, field: &'static str) -> Self {
        self.entry(field).rule = DecodeRule::Identifier;
        self
    }

    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    pub fn binding(&self, field: &'static str) -> Binding {
        self.bindings
            .iter()
            .find(|b| b.field == field)
            .cloned()
            .unwrap_or_else(|| Binding::flat(field))
    }
}

/// Resolve a dotted path; `None` if any step is missing or not an object
fn lookup<'a>(attributes: &'a JsonMap, path: &str) -> Option<&'a serde_json::Value> {
    let mut segments = path.split('.');
    let mut current = attributes.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn decode_value(
    semantic_type: SemanticType,
    rule: DecodeRule,
    raw: &serde_json::Value,
) -> std::result::Result<Value, String> {
    let unexpected = |expected: &str| format!("expected {}, found {}", expected, json_kind(raw));

    match semantic_type {
        SemanticType::String => match rule {
            DecodeRule::Identifier => FlexibleId::from_json(raw)
                .map(|id| Value::String(id.canonical()))
                .ok_or_else(|| unexpected("string or numeric identifier")),
            DecodeRule::Verbatim => raw
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| unexpected("string")),
        },
        SemanticType::Integer => integer_from_json(raw)
            .map(Value::Integer)
            .ok_or_else(|| unexpected("integer")),
        SemanticType::Boolean => raw
            .as_bool()
            .map(Value::Boolean)
            .ok_or_else(|| unexpected("boolean")),
        SemanticType::StringList => {
            let items = raw.as_array().ok_or_else(|| unexpected("array"))?;
            items
                .iter()
                .map(|item| {
                    FlexibleId::from_json(item)
                        .map(|id| id.canonical())
                        .ok_or_else(|| format!("list element is {}", json_kind(item)))
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::List)
        }
    }
}

impl AttributeCodec for BindingCodec {
    fn encode(&self, schema: &Schema, state: &DeclaredState) -> ProviderRequest {
        let mut attributes = JsonMap::new();

        for descriptor in schema.fields().iter().filter(|f| f.is_input()) {
            // Absent fields are omitted; present ones (even "") go verbatim
            if let Some(value) = state.get(descriptor.name) {
                let binding = self.binding(descriptor.name);
                attributes.insert(binding.request_key.to_string(), value.to_json());
            }
        }

        ProviderRequest {
            resource_type: self.resource_type.to_string(),
            id: state.exists().then(|| state.id().to_string()),
            attributes,
        }
    }

    fn decode(&self, schema: &Schema, object: &RemoteObject) -> Result<DeclaredState> {
        let mut state = DeclaredState::with_id(object.id.clone());

        for descriptor in schema.fields() {
            let binding = self.binding(descriptor.name);
            let raw = binding
                .candidates()
                .filter_map(|path| lookup(&object.attributes, path))
                .find(|raw| !raw.is_object());

            let Some(raw) = raw else { continue };
            if raw.is_null() {
                continue;
            }

            let value = decode_value(descriptor.semantic_type, binding.rule, raw).map_err(
                |reason| Error::MalformedResponse {
                    kind: schema.kind().to_string(),
                    field: descriptor.name.to_string(),
                    reason,
                },
            )?;
            state.set(descriptor.name, value);
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::schema::FieldDescriptor;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("test_server")
            .field(FieldDescriptor::required("project", SemanticType::String).force_replace())
            .field(FieldDescriptor::required("site", SemanticType::String).force_replace())
            .field(FieldDescriptor::required("hostname", SemanticType::String))
            .field(
                FieldDescriptor::optional("ssh_keys", SemanticType::StringList).force_replace(),
            )
            .field(FieldDescriptor::optional("ipxe_url", SemanticType::String).force_replace())
            .field(FieldDescriptor::computed("primary_ipv4", SemanticType::String))
            .field(FieldDescriptor::computed("cores", SemanticType::Integer))
            .field(FieldDescriptor::computed("locked", SemanticType::Boolean))
    }

    fn codec() -> BindingCodec {
        BindingCodec::new("servers")
            .nested("project", "project.id")
            .identifier("project")
            .nested("site", "region.site.slug")
    }

    fn object(attributes: serde_json::Value) -> RemoteObject {
        let serde_json::Value::Object(map) = attributes else {
            panic!("attributes must be an object");
        };
        RemoteObject::new("srv-1", map)
    }

    #[test]
    fn test_flexible_id_canonical() {
        assert_eq!(FlexibleId::Text("42".into()).canonical(), "42");
        let from_float = FlexibleId::from_json(&json!(42.0)).unwrap();
        assert_eq!(from_float.canonical(), "42");
        let from_int = FlexibleId::from_json(&json!(42)).unwrap();
        assert_eq!(from_int.canonical(), "42");
        let fractional = FlexibleId::from_json(&json!(4.5)).unwrap();
        assert_eq!(fractional.canonical(), "4.5");
        assert!(FlexibleId::from_json(&json!(null)).is_none());
    }

    #[test]
    fn test_flexible_id_deserializes_both_shapes() {
        let text: FlexibleId = serde_json::from_value(json!("42")).unwrap();
        let number: FlexibleId = serde_json::from_value(json!(42.0)).unwrap();
        assert_eq!(text.canonical(), number.canonical());
    }

    #[test]
    fn test_encode_skips_computed_and_absent() {
        let state = DeclaredState::new()
            .with("project", "proj-1")
            .with("hostname", "web-1")
            .with("primary_ipv4", "10.0.0.1");

        let request = codec().encode(&schema(), &state);
        assert_eq!(request.resource_type, "servers");
        assert_eq!(request.id, None);
        assert_eq!(request.attributes.len(), 2);
        assert!(!request.attributes.contains_key("primary_ipv4"));
        assert!(!request.attributes.contains_key("ssh_keys"));
    }

    #[test]
    fn test_encode_passes_empty_optional_verbatim() {
        let state = DeclaredState::new()
            .with("project", "proj-1")
            .with("hostname", "web-1")
            .with("ipxe_url", "");

        let request = codec().encode(&schema(), &state);
        assert_eq!(request.attributes.get("ipxe_url"), Some(&json!("")));
    }

    #[test]
    fn test_encode_lists_as_ordered_strings() {
        let state = DeclaredState::new().with("ssh_keys", vec!["key-2", "key-1"]);
        let request = codec().encode(&schema(), &state);
        assert_eq!(request.attributes["ssh_keys"], json!(["key-2", "key-1"]));
    }

    #[test]
    fn test_encode_carries_identifier() {
        let state = DeclaredState::with_id("srv-9").with("hostname", "web-1");
        let request = codec().encode(&schema(), &state);
        assert_eq!(request.id.as_deref(), Some("srv-9"));
    }

    #[test]
    fn test_decode_nested_response() {
        let remote = object(json!({
            "project": {"id": 42.0, "name": "Project"},
            "region": {"site": {"slug": "sao-paulo"}},
            "hostname": "web-1",
            "primary_ipv4": "10.0.0.1",
            "cores": 16,
            "locked": false
        }));

        let state = codec().decode(&schema(), &remote).unwrap();
        assert_eq!(state.id(), "srv-1");
        assert_eq!(state.get_str("project"), Some("42"));
        assert_eq!(state.get_str("site"), Some("sao-paulo"));
        assert_eq!(state.get("cores"), Some(&Value::Integer(16)));
        assert_eq!(state.get("locked"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn test_decode_identifier_invariant_under_representation() {
        let as_text = object(json!({"project": {"id": "42"}}));
        let as_number = object(json!({"project": {"id": 42.0}}));

        let a = codec().decode(&schema(), &as_text).unwrap();
        let b = codec().decode(&schema(), &as_number).unwrap();
        assert_eq!(a.get_str("project"), Some("42"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let remote = object(json!({
            "hostname": "web-1",
            "brand_new_field": {"anything": [1, 2, 3]}
        }));
        let state = codec().decode(&schema(), &remote).unwrap();
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_decode_skips_null_and_unresolvable_objects() {
        let remote = object(json!({
            "hostname": null,
            "project": {"slug": "no-id-here"}
        }));
        let state = codec().decode(&schema(), &remote).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_decode_malformed_field() {
        let remote = object(json!({"hostname": ["not", "a", "string"]}));
        let err = codec().decode(&schema(), &remote).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn test_round_trip_restores_inputs() {
        let state = DeclaredState::new()
            .with("project", "proj-1")
            .with("site", "sao-paulo")
            .with("hostname", "web-1")
            .with("ssh_keys", vec!["key-1", "key-2"])
            .with("ipxe_url", "");

        let request = codec().encode(&schema(), &state);
        let echoed = RemoteObject::new("", request.attributes);
        let decoded = codec().decode(&schema(), &echoed).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_remote_object_from_raw_id() {
        let obj = RemoteObject::from_raw_id(&json!(1200), JsonMap::new()).unwrap();
        assert_eq!(obj.id, "1200");
        assert!(RemoteObject::from_raw_id(&json!({"id": 1}), JsonMap::new()).is_none());
    }
}
