//! `latitudesh_ssh_key` - a public key servers can be deployed with

use reconcile::{BindingCodec, FieldDescriptor, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_ssh_key";

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(
            FieldDescriptor::required("project", SemanticType::String)
                .force_replace()
                .describe("The id or slug of the project"),
        )
        .field(FieldDescriptor::required("name", SemanticType::String).describe("The SSH key name"))
        .field(
            FieldDescriptor::required("public_key", SemanticType::String)
                .force_replace()
                .describe("The SSH public key"),
        )
        .field(FieldDescriptor::computed("fingerprint", SemanticType::String))
        .field(FieldDescriptor::computed("created", SemanticType::String))
        .field(FieldDescriptor::computed("updated", SemanticType::String))
        .passthrough_import()
        .touch_on_update("updated");

    let codec = BindingCodec::new("ssh_keys")
        .nested("project", "project.id")
        .identifier("project")
        .nested("created", "created_at");

    Definition::new("ssh_keys", schema, codec)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reconcile::{Changes, DeclaredState, ErrorCategory, ResourceKind};

    pub fn sample() -> DeclaredState {
        DeclaredState::new()
            .with("project", "proj-1")
            .with("name", "laptop")
            .with("public_key", "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIE2 me@laptop")
    }

    #[test]
    fn test_public_key_requires_replacement() {
        let def = definition();
        let mut changes = Changes::new();
        changes.insert("public_key".into(), "ssh-ed25519 AAAAother".into());
        let err = def.schema().validate_changes(&changes).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ConflictingUpdate);

        let mut changes = Changes::new();
        changes.insert("name".into(), "desktop".into());
        assert!(def.schema().validate_changes(&changes).is_ok());
    }
}
