//! `latitudesh_virtual_network` - a private VLAN in one site

use reconcile::{BindingCodec, FieldDescriptor, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_virtual_network";

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(
            FieldDescriptor::required("project", SemanticType::String)
                .force_replace()
                .describe("The id or slug of the project"),
        )
        .field(
            FieldDescriptor::required("site", SemanticType::String)
                .force_replace()
                .describe("The site the network lives in"),
        )
        .field(
            FieldDescriptor::required("description", SemanticType::String)
                .describe("The virtual network description"),
        )
        .field(
            FieldDescriptor::computed("vid", SemanticType::Integer)
                .describe("The VLAN id assigned by the API"),
        )
        .field(FieldDescriptor::computed("assignments_count", SemanticType::Integer))
        .passthrough_import();

    let codec = BindingCodec::new("virtual_network")
        .nested("project", "project.id")
        .identifier("project")
        .nested("site", "region.site.slug");

    Definition::new("virtual_networks", schema, codec)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reconcile::mock::MemoryApi;
    use reconcile::{DeclaredState, Reconciler, Value};
    use serde_json::json;
    use std::sync::Arc;

    pub fn sample() -> DeclaredState {
        DeclaredState::new()
            .with("project", "proj-1")
            .with("site", "sao-paulo")
            .with("description", "backend")
    }

    #[test]
    fn test_vid_decoded_from_float() {
        let api = MemoryApi::new();
        api.shape("virtual_networks", |_, attrs| {
            let mut shaped = attrs.clone();
            shaped.insert("vid".into(), json!(1200.0));
            shaped.insert("assignments_count".into(), json!(0));
            shaped
        });
        let reconciler = Reconciler::new(Arc::new(definition()), Arc::new(api));

        let mut state = sample();
        reconciler.create(&mut state).unwrap();
        assert_eq!(state.get("vid"), Some(&Value::Integer(1200)));
        assert_eq!(state.get("assignments_count"), Some(&Value::Integer(0)));
    }
}
