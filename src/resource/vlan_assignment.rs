//! `latitudesh_vlan_assignment` - attaches a server to a virtual network
//!
//! Assignments cannot be edited or imported; any change means a new one.

use reconcile::{BindingCodec, FieldDescriptor, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_vlan_assignment";

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(
            FieldDescriptor::required("server_id", SemanticType::String)
                .force_replace()
                .describe("The id of the server"),
        )
        .field(
            FieldDescriptor::required("virtual_network_id", SemanticType::String)
                .force_replace()
                .describe("The id of the virtual network"),
        )
        .field(FieldDescriptor::computed("vid", SemanticType::Integer))
        .field(FieldDescriptor::computed("status", SemanticType::String));

    let codec = BindingCodec::new("virtual_network_assignment")
        .nested("server_id", "server.id")
        .identifier("server_id")
        .nested("virtual_network_id", "virtual_network.id")
        .identifier("virtual_network_id")
        .nested("vid", "virtual_network.vid");

    Definition::new("virtual_networks/assignments", schema, codec)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reconcile::mock::MemoryApi;
    use reconcile::{DeclaredState, ErrorCategory, Reconciler, Value};
    use serde_json::json;
    use std::sync::Arc;

    pub fn sample() -> DeclaredState {
        DeclaredState::new()
            .with("server_id", "sv_100")
            .with("virtual_network_id", "vlan_7")
    }

    #[test]
    fn test_import_is_unsupported() {
        let reconciler = Reconciler::new(Arc::new(definition()), Arc::new(MemoryApi::new()));
        let err = reconciler.import("vnasg_1").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Usage);
        assert!(err.to_string().contains("does not support import"));
    }

    #[test]
    fn test_nested_numeric_ids() {
        let api = MemoryApi::new();
        api.shape("virtual_networks/assignments", |_, _| {
            let shaped = json!({
                "server": {"id": 100.0, "hostname": "web-1"},
                "virtual_network": {"id": "vlan_7", "vid": 1200},
                "status": "connected"
            });
            shaped.as_object().cloned().unwrap_or_default()
        });
        let reconciler = Reconciler::new(Arc::new(definition()), Arc::new(api));

        let mut state = DeclaredState::new()
            .with("server_id", "100")
            .with("virtual_network_id", "vlan_7");
        reconciler.create(&mut state).unwrap();
        assert_eq!(state.get_str("server_id"), Some("100"));
        assert_eq!(state.get("vid"), Some(&Value::Integer(1200)));
        assert_eq!(state.get_str("status"), Some("connected"));
    }
}
