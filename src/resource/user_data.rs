//! `latitudesh_user_data` - cloud-init style content applied at deploy

use reconcile::{BindingCodec, FieldDescriptor, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_user_data";

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(
            FieldDescriptor::required("project", SemanticType::String)
                .force_replace()
                .describe("The id or slug of the project"),
        )
        .field(
            FieldDescriptor::required("description", SemanticType::String)
                .describe("The user data description"),
        )
        .field(
            FieldDescriptor::required("content", SemanticType::String)
                .describe("Base64 encoded content of the user data"),
        )
        .field(FieldDescriptor::computed("created", SemanticType::String))
        .field(FieldDescriptor::computed("updated", SemanticType::String))
        .passthrough_import()
        .touch_on_update("updated");

    let codec = BindingCodec::new("user_data")
        .nested("project", "project.id")
        .identifier("project")
        .nested("created", "created_at");

    Definition::new("user_data", schema, codec)
}
