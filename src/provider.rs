//! Provider composition: every Latitude.sh kind behind one registry

use std::sync::Arc;

use reconcile::{Registry, RemoteApi};

use crate::{data_source, resource};

/// Build the registry with all resources and data sources bound to `client`
pub fn registry(client: Arc<dyn RemoteApi>) -> Registry {
    let registry = resource::all()
        .into_iter()
        .fold(Registry::new(client), |registry, kind| registry.resource(kind));

    data_source::all()
        .into_iter()
        .fold(registry, |registry, kind| registry.data_source(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::mock::MemoryApi;
    use reconcile::{Criteria, DeclaredState, RemoteObject};
    use serde_json::json;

    #[test]
    fn test_registers_every_kind() {
        let registry = registry(Arc::new(MemoryApi::new()));

        let mut resources: Vec<_> = registry.resource_names().collect();
        resources.sort_unstable();
        assert_eq!(
            resources,
            vec![
                "latitudesh_project",
                "latitudesh_server",
                "latitudesh_ssh_key",
                "latitudesh_user_data",
                "latitudesh_virtual_network",
                "latitudesh_vlan_assignment",
            ]
        );

        let mut data_sources: Vec<_> = registry.data_source_names().collect();
        data_sources.sort_unstable();
        assert_eq!(data_sources, vec!["latitudesh_plan", "latitudesh_region"]);
    }

    #[test]
    fn test_unknown_kind() {
        let registry = registry(Arc::new(MemoryApi::new()));
        assert!(registry.reconciler("latitudesh_firewall").is_err());
        assert!(registry.lookup("latitudesh_server").is_err());
    }

    #[test]
    fn test_shared_client() {
        let api = MemoryApi::new();
        let region = json!({"slug": "sao-paulo", "name": "São Paulo", "country": {"name": "Brazil"}});
        api.insert(
            "regions",
            RemoteObject::new("loc_1", region.as_object().cloned().unwrap_or_default()),
        );
        let registry = registry(Arc::new(api.clone()));

        let criteria = Criteria::from([("site".to_string(), "sao-paulo".to_string())]);
        let region = registry.lookup("latitudesh_region").unwrap().resolve(&criteria).unwrap();
        assert_eq!(region.id(), "loc_1");

        let mut project = DeclaredState::new().with("name", "Acme");
        registry
            .reconciler("latitudesh_project")
            .unwrap()
            .create(&mut project)
            .unwrap();
        assert!(api.object("projects", project.id()).is_some());
    }
}
