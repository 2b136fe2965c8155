//! Latitude.sh resource kinds
//!
//! Every kind is a [`Definition`]: a registry name, the API collection it
//! lives in, a schema and a codec. The reconciliation algorithm itself is
//! shared and lives in the `reconcile` crate.

use reconcile::{AttributeCodec, BindingCodec, ResourceKind, Schema};

pub mod project;
pub mod server;
pub mod ssh_key;
pub mod user_data;
pub mod virtual_network;
pub mod vlan_assignment;

/// A resource kind described entirely by data
#[derive(Debug, Clone)]
pub struct Definition {
    name: &'static str,
    collection: &'static str,
    schema: Schema,
    codec: BindingCodec,
}

impl Definition {
    pub fn new(collection: &'static str, schema: Schema, codec: BindingCodec) -> Self {
        Self {
            name: schema.kind(),
            collection,
            schema,
            codec,
        }
    }
}

impl ResourceKind for Definition {
    fn name(&self) -> &'static str {
        self.name
    }

    fn collection(&self) -> &'static str {
        self.collection
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn codec(&self) -> &dyn AttributeCodec {
        &self.codec
    }
}

/// Every resource kind this provider manages
pub fn all() -> Vec<Definition> {
    vec![
        project::definition(),
        server::definition(),
        ssh_key::definition(),
        user_data::definition(),
        virtual_network::definition(),
        vlan_assignment::definition(),
    ]
}
