//! `latitudesh_server` - a bare-metal server
//!
//! Placement fields (project, site, plan, operating system) and the boot
//! configuration can only be chosen at deploy time; the hostname is the one
//! field the API lets us change in place.

use reconcile::{BindingCodec, FieldDescriptor, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_server";

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
                .describe("The server site"),
        )
        .field(
            FieldDescriptor::required("plan", SemanticType::String)
                .force_replace()
                .describe("The server plan"),
        )
        .field(
            FieldDescriptor::required("operating_system", SemanticType::String)
                .force_replace()
                .describe("The server OS"),
        )
        .field(
            FieldDescriptor::required("hostname", SemanticType::String)
                .describe("The server hostname"),
        )
        .field(
            FieldDescriptor::optional("ssh_keys", SemanticType::StringList)
                .force_replace()
                .describe("List of server SSH key ids"),
        )
        .field(
            FieldDescriptor::optional("user_data", SemanticType::String)
                .force_replace()
                .describe("The id of user data to set on the server"),
        )
        .field(
            FieldDescriptor::optional("raid", SemanticType::String)
                .force_replace()
                .describe("RAID mode for the server"),
        )
        .field(
            FieldDescriptor::optional("ipxe_url", SemanticType::String)
                .force_replace()
                .describe("Url for the iPXE script that will be used"),
        )
        .field(
            FieldDescriptor::computed("primary_ipv4", SemanticType::String)
                .describe("The server IP address"),
        )
        .field(
            FieldDescriptor::computed("created", SemanticType::String)
                .describe("The timestamp for when the server was created"),
        )
        .field(
            FieldDescriptor::computed("updated", SemanticType::String)
                .describe("The timestamp for the last time the server was updated"),
        )
        .passthrough_import()
        .touch_on_update("updated");

    let codec = BindingCodec::new("servers")
        .nested("project", "project.id")
        .identifier("project")
        .nested("site", "region.site.slug")
        .nested("plan", "plan.slug")
        .nested("operating_system", "operating_system.slug")
        .identifier("user_data")
        .nested("created", "created_at");

    Definition::new("servers", schema, codec)
}
