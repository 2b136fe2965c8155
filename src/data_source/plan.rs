//! `latitudesh_plan` - server plans, looked up by slug or site

use reconcile::{BindingCodec, FieldDescriptor, FilterField, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_plan";

const FILTERS: &[FilterField] = &[
    FilterField::new("slug", "slug", "filter[slug]"),
    FilterField::new("site", "sites", "filter[location]"),
];

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(FieldDescriptor::computed("slug", SemanticType::String).describe("The plan slug"))
        .field(FieldDescriptor::computed("name", SemanticType::String).describe("The plan name"))
        .field(
            FieldDescriptor::computed("sites", SemanticType::StringList)
                .describe("Sites where the plan is offered"),
        )
        .field(
            FieldDescriptor::computed("cores", SemanticType::Integer)
                .describe("CPU cores per server"),
        )
        .field(
            FieldDescriptor::computed("in_stock", SemanticType::Boolean)
                .describe("Whether the plan can be deployed now"),
        );

    let codec = BindingCodec::new("plans")
        .nested("cores", "specs.cpu.cores")
        .nested("in_stock", "available");

    Definition::new("plans", schema, codec, FILTERS)
}
