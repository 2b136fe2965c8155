//! `latitudesh_project` - groups servers, keys and networks

use reconcile::{BindingCodec, FieldDescriptor, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_project";

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(FieldDescriptor::required("name", SemanticType::String).describe("The project name"))
        .field(
            FieldDescriptor::optional("description", SemanticType::String)
                .describe("The project description"),
        )
        .field(
            FieldDescriptor::optional("environment", SemanticType::String)
                .describe("Development, Staging or Production"),
        )
        .field(FieldDescriptor::computed("slug", SemanticType::String))
        .field(
            FieldDescriptor::computed("created", SemanticType::String)
                .describe("The timestamp for when the project was created"),
        )
        .field(
            FieldDescriptor::computed("updated", SemanticType::String)
                .describe("The timestamp for the last time the project was updated"),
        )
        .passthrough_import()
        .touch_on_update("updated");

    let codec = BindingCodec::new("projects").nested("created", "created_at");

    Definition::new("projects", schema, codec)
}
