//! `latitudesh_region` - a site and the country it is in

use reconcile::{BindingCodec, FieldDescriptor, FilterField, Schema, SemanticType};

use super::Definition;

pub const NAME: &str = "latitudesh_region";

const FILTERS: &[FilterField] = &[FilterField::new("site", "slug", "filter[slug]")];

pub fn definition() -> Definition {
    let schema = Schema::new(NAME)
        .field(FieldDescriptor::computed("slug", SemanticType::String).describe("The site slug"))
        .field(FieldDescriptor::computed("name", SemanticType::String).describe("The region name"))
        .field(
            FieldDescriptor::computed("country", SemanticType::String)
                .describe("The country the region is in"),
        );

    let codec = BindingCodec::new("regions").nested("country", "country.name");

    Definition::new("regions", schema, codec, FILTERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::mock::MemoryApi;
    use reconcile::{Criteria, DataLookup, RemoteObject};
    use serde_json::json;
    use std::sync::Arc;

    fn region(id: &str, slug: &str, name: &str, country: &str) -> RemoteObject {
        let attributes = json!({
            "slug": slug,
            "name": name,
            "country": {"name": country, "slug": country.to_lowercase()}
        });
        RemoteObject::new(id, attributes.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_lookup_by_site_ignores_unfiltered_results() {
        // The mock ignores filters, so every region comes back from list
        let api = MemoryApi::new();
        api.insert("regions", region("loc_1", "sao-paulo", "São Paulo", "Brazil"));
        api.insert("regions", region("loc_2", "ashburn", "Ashburn", "United States"));
        let lookup = DataLookup::new(Arc::new(definition()), Arc::new(api));

        let criteria = Criteria::from([("site".to_string(), "sao-paulo".to_string())]);
        let record = lookup.resolve(&criteria).unwrap();
        assert_eq!(record.id(), "loc_1");
        assert_eq!(record.get_str("country"), Some("Brazil"));
    }

    #[test]
    fn test_lookup_missing_site() {
        let api = MemoryApi::new();
        let lookup = DataLookup::new(Arc::new(definition()), Arc::new(api));
        let criteria = Criteria::from([("site".to_string(), "atlantis".to_string())]);
        assert!(lookup.resolve(&criteria).unwrap_err().is_not_found());
    }
}
