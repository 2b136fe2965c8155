//! JSON:API envelopes used by the Latitude.sh API.
//!
//! Requests wrap attributes as `{"data": {"type", "id"?, "attributes"}}`.
//! Responses carry one resource object or a list of them under `data`;
//! errors carry an `errors` array.

use serde::{Deserialize, Serialize};

use reconcile::{ProviderRequest, RemoteObject};

use crate::error::{Error, Result};

type JsonMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize)]
struct RequestData<'a> {
    #[serde(rename = "type")]
    resource_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    attributes: &'a JsonMap,
}

#[derive(Debug, Serialize)]
struct RequestDocument<'a> {
    data: RequestData<'a>,
}

/// Wrap an encoded request in a JSON:API document
pub fn request_body(request: &ProviderRequest) -> serde_json::Value {
    let document = RequestDocument {
        data: RequestData {
            resource_type: &request.resource_type,
            id: request.id.as_deref(),
            attributes: &request.attributes,
        },
    };
    serde_json::json!(document)
}

#[derive(Debug, Deserialize)]
struct ResourceObject {
    id: serde_json::Value,
    #[serde(default)]
    attributes: JsonMap,
}

impl ResourceObject {
    fn into_remote(self) -> Result<RemoteObject> {
        let id = self.id.clone();
        RemoteObject::from_raw_id(&id, self.attributes)
            .ok_or_else(|| Error::InvalidResponse(format!("resource id is not a scalar: {id}")))
    }
}

#[derive(Debug, Deserialize)]
struct SingleDocument {
    data: ResourceObject,
}

#[derive(Debug, Deserialize)]
struct ListDocument {
    #[serde(default)]
    data: Vec<ResourceObject>,
}

/// Unwrap a single resource document
pub fn parse_object(body: &str) -> Result<RemoteObject> {
    let document: SingleDocument = serde_json::from_str(body)?;
    document.data.into_remote()
}

/// Unwrap a list document
pub fn parse_list(body: &str) -> Result<Vec<RemoteObject>> {
    let document: ListDocument = serde_json::from_str(body)?;
    document
        .data
        .into_iter()
        .map(ResourceObject::into_remote)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorObject {
    fn message(&self) -> Option<String> {
        match (&self.title, &self.detail) {
            (Some(title), Some(detail)) if title != detail => Some(format!("{title}: {detail}")),
            (_, Some(detail)) => Some(detail.clone()),
            (Some(title), None) => Some(title.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ErrorObject>,
}

/// Human-readable message from an error body, if it has one
///
/// Several error objects are joined with "; ".
pub fn error_message(body: &str) -> Option<String> {
    let document: ErrorDocument = serde_json::from_str(body).ok()?;
    let messages: Vec<_> = document
        .errors
        .iter()
        .filter_map(ErrorObject::message)
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_create() {
        let mut attributes = JsonMap::new();
        attributes.insert("hostname".into(), json!("web-1"));
        let request = ProviderRequest {
            resource_type: "servers".into(),
            id: None,
            attributes,
        };

        assert_eq!(
            request_body(&request),
            json!({"data": {"type": "servers", "attributes": {"hostname": "web-1"}}})
        );
    }

    #[test]
    fn test_request_body_update_carries_id() {
        let request = ProviderRequest {
            resource_type: "projects".into(),
            id: Some("proj_1".into()),
            attributes: JsonMap::new(),
        };
        assert_eq!(request_body(&request)["data"]["id"], json!("proj_1"));
    }

    #[test]
    fn test_parse_object() {
        let body = r#"{
            "data": {
                "id": "sv_100",
                "type": "servers",
                "attributes": {"hostname": "web-1", "project": {"id": 42.0}}
            },
            "meta": {}
        }"#;
        let object = parse_object(body).unwrap();
        assert_eq!(object.id, "sv_100");
        assert_eq!(object.attributes["hostname"], json!("web-1"));
    }

    #[test]
    fn test_parse_object_numeric_id() {
        let object = parse_object(r#"{"data": {"id": 7, "attributes": {}}}"#).unwrap();
        assert_eq!(object.id, "7");
    }

    #[test]
    fn test_parse_object_rejects_missing_data() {
        let err = parse_object(r#"{"errors": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(parse_object(r#"{"data": {"id": null}}"#).is_err());
    }

    #[test]
    fn test_parse_list() {
        let body = r#"{"data": [
            {"id": "plan_1", "attributes": {"slug": "c2-small"}},
            {"id": "plan_2", "attributes": {"slug": "c3-large"}}
        ]}"#;
        let objects = parse_list(body).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1].id, "plan_2");

        assert!(parse_list(r#"{"data": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"errors": [
            {"status": "422", "title": "Invalid hostname", "detail": "must be a valid DNS label"},
            {"status": "422", "detail": "plan is out of stock"}
        ]}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Invalid hostname: must be a valid DNS label; plan is out of stock")
        );
        assert_eq!(error_message(r#"{"errors": []}"#), None);
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }
}
