//! Registry of resource kinds and data sources for one provider
//!
//! Kinds are registered once at startup. The registry then hands out
//! [`Reconciler`] and [`DataLookup`] values bound to the client it was built
//! with.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::client::RemoteApi;
use crate::error::{Error, Result};
use crate::lookup::{DataLookup, LookupKind};
use crate::reconciler::{Reconciler, ResourceKind};

/// Provider composition: string keys to kinds, plus the shared client
pub struct Registry {
    client: Arc<dyn RemoteApi>,
    resources: BTreeMap<&'static str, Arc<dyn ResourceKind>>,
    data_sources: BTreeMap<&'static str, Arc<dyn LookupKind>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new(client: Arc<dyn RemoteApi>) -> Self {
        Self {
            client,
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        }
    }

    /// Register a resource kind under its own name
    pub fn resource(mut self, kind: impl ResourceKind + 'static) -> Self {
        self.resources.insert(kind.name(), Arc::new(kind));
        self
    }

    /// Register a data source under its own name
    pub fn data_source(mut self, kind: impl LookupKind + 'static) -> Self {
        self.data_sources.insert(kind.name(), Arc::new(kind));
        self
    }

    /// Registered resource kind names, sorted
    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Registered data source names, sorted
    pub fn data_source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    pub fn resource_kind(&self, name: &str) -> Result<&dyn ResourceKind> {
        self.resources
            .get(name)
            .map(|kind| &**kind)
            .ok_or_else(|| Error::UnknownKind(name.to_string()))
    }

    pub fn lookup_kind(&self, name: &str) -> Result<&dyn LookupKind> {
        self.data_sources
            .get(name)
            .map(|kind| &**kind)
            .ok_or_else(|| Error::UnknownKind(name.to_string()))
    }

    /// Reconciler for a resource kind, bound to the registry's client
    pub fn reconciler(&self, name: &str) -> Result<Reconciler> {
        let kind = self
            .resources
            .get(name)
            .ok_or_else(|| Error::UnknownKind(name.to_string()))?;
        Ok(Reconciler::new(Arc::clone(kind), Arc::clone(&self.client)))
    }

    /// Lookup for a data source, bound to the registry's client
    pub fn lookup(&self, name: &str) -> Result<DataLookup> {
        let kind = self
            .data_sources
            .get(name)
            .ok_or_else(|| Error::UnknownKind(name.to_string()))?;
        Ok(DataLookup::new(Arc::clone(kind), Arc::clone(&self.client)))
    }
}
