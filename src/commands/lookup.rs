use anyhow::{Context, Result};
use reconcile::{Criteria, DeclaredState};

use super::{Session, split_assignment};
use crate::{progress, ui};

/// Resolve `filters` against a data source
pub fn resolve(session: &Session, kind: &str, filters: &[String]) -> Result<DeclaredState> {
    let lookup = session.registry.lookup(kind)?;

    let mut criteria = Criteria::new();
    for filter in filters {
        let (key, value) = split_assignment(filter)?;
        criteria.insert(key.to_string(), value.to_string());
    }

    progress::with_spinner(&format!("Looking up {kind}"), session.quiet, || {
        lookup.resolve(&criteria)
    })
    .with_context(|| format!("Lookup of {kind} failed"))
}

pub fn run(session: &Session, kind: &str, filters: &[String]) -> Result<()> {
    let record = resolve(session, kind, filters)?;
    let schema = session.registry.lookup_kind(kind)?.schema();
    ui::state(kind, kind, &record, Some(schema));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateStore;
    use reconcile::mock::MemoryApi;
    use reconcile::{ErrorCategory, RemoteObject};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(api: &MemoryApi, dir: &TempDir) -> Session {
        let store = StateStore::open(dir.path().join("state.toml")).unwrap();
        Session::new(Arc::new(api.clone()), store, true)
    }

    fn plan(id: &str, slug: &str, sites: &[&str]) -> RemoteObject {
        let attributes = json!({"slug": slug, "name": slug, "sites": sites, "available": true});
        RemoteObject::new(id, attributes.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_resolve_sends_remote_filter() {
        let api = MemoryApi::new();
        api.insert("plans", plan("plan_1", "c2-small", &["sao-paulo"]));
        let dir = TempDir::new().unwrap();

        let record = resolve(
            &session(&api, &dir),
            "latitudesh_plan",
            &["slug=c2-small".to_string()],
        )
        .unwrap();
        assert_eq!(record.id(), "plan_1");

        let calls = api.calls_of(reconcile::mock::CallKind::List);
        assert_eq!(calls.len(), 1);
        let filter = calls[0].filter.as_ref().unwrap();
        assert_eq!(
            filter.terms(),
            &[("filter[slug]".to_string(), "c2-small".to_string())]
        );
    }

    #[test]
    fn test_ambiguous_site() {
        let api = MemoryApi::new();
        api.insert("plans", plan("plan_1", "c2-small", &["any-site-with-two-plans"]));
        api.insert("plans", plan("plan_2", "c3-large", &["any-site-with-two-plans"]));
        let dir = TempDir::new().unwrap();

        let err = resolve(
            &session(&api, &dir),
            "latitudesh_plan",
            &["site=any-site-with-two-plans".to_string()],
        )
        .unwrap_err();
        let cause = err.downcast_ref::<reconcile::Error>().unwrap();
        assert_eq!(cause.category(), ErrorCategory::AmbiguousMatch);
    }

    #[test]
    fn test_malformed_filter() {
        let api = MemoryApi::new();
        let dir = TempDir::new().unwrap();
        let err = resolve(&session(&api, &dir), "latitudesh_plan", &["slug".to_string()]);
        assert!(err.is_err());
        assert!(api.calls().is_empty());
    }
}
