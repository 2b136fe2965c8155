//! Latitude.sh data sources
//!
//! Read-only lookups that resolve a filter to exactly one remote record,
//! e.g. a plan by slug or a region by site.

use reconcile::{AttributeCodec, BindingCodec, FilterField, LookupKind, Schema};

pub mod plan;
pub mod region;

/// A lookup kind described entirely by data
#[derive(Debug, Clone)]
pub struct Definition {
    name: &'static str,
    collection: &'static str,
    schema: Schema,
    codec: BindingCodec,
    filters: &'static [FilterField],
}

impl Definition {
    pub fn new(
        collection: &'static str,
        schema: Schema,
        codec: BindingCodec,
        filters: &'static [FilterField],
    ) -> Self {
        Self {
            name: schema.kind(),
            collection,
            schema,
            codec,
            filters,
        }
    }
}

impl LookupKind for Definition {
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

    fn filters(&self) -> &[FilterField] {
        self.filters
    }
}

/// Every data source this provider offers
pub fn all() -> Vec<Definition> {
    vec![plan::definition(), region::definition()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_point_at_schema_fields() {
        for kind in all() {
            assert!(!kind.filters().is_empty(), "{}", kind.name());
            for filter in kind.filters() {
                assert!(
                    kind.schema().get(filter.field).is_some(),
                    "{}: filter {} targets unknown field {}",
                    kind.name(),
                    filter.key,
                    filter.field
                );
            }
        }
    }
}
