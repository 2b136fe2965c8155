//! Resource reconciler - the generic CRUD lifecycle
//!
//! One algorithm serves every resource kind. A kind contributes only its
//! [`Schema`] and an [`AttributeCodec`]; the reconciler does the rest:
//!
//! - Create: validate, send, take the assigned id, then refresh
//! - Read: fetch, decode, merge into the local state
//! - Update: reject force-replace changes, send only the changed fields,
//!   stamp the touch field, then refresh
//! - Delete: idempotent, a missing remote object counts as deleted
//! - Import: adopt an external id and refresh
//!
//! Each call works on exactly one [`DeclaredState`], borrowed mutably for the
//! duration of the call. The reconciler itself holds no mutable state, so a
//! host may run many of them concurrently against a shared client.

use std::fmt;
use std::sync::Arc;

use crate::client::{ApiError, RemoteApi};
use crate::codec::{AttributeCodec, RemoteObject};
use crate::error::{Error, Operation, Result};
use crate::schema::Schema;
use crate::state::{Changes, DeclaredState};

/// Capabilities a resource kind provides to the reconciler
pub trait ResourceKind: Send + Sync + fmt::Debug {
    /// Registry key (e.g., "latitudesh_server")
    fn name(&self) -> &'static str;

    /// Remote collection path (e.g., "servers")
    fn collection(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn codec(&self) -> &dyn AttributeCodec;
}

/// Drives one resource kind through its lifecycle against a remote API
#[derive(Clone)]
pub struct Reconciler {
    kind: Arc<dyn ResourceKind>,
    client: Arc<dyn RemoteApi>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("kind", &self.kind.name())
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(kind: Arc<dyn ResourceKind>, client: Arc<dyn RemoteApi>) -> Self {
        Self { kind, client }
    }

    pub fn kind(&self) -> &dyn ResourceKind {
        self.kind.as_ref()
    }

    pub fn schema(&self) -> &Schema {
        self.kind.schema()
    }

    fn name(&self) -> String {
        self.kind.name().to_string()
    }

    fn remote(&self, operation: Operation, source: ApiError) -> Error {
        Error::Remote {
            operation,
            kind: self.name(),
            source,
        }
    }

    fn invalid_state(&self, operation: Operation, reason: &str) -> Error {
        Error::InvalidState {
            operation,
            kind: self.name(),
            reason: reason.to_string(),
        }
    }

    /// Create the remote object for a state that does not exist yet
    ///
    /// On success the state carries the assigned identifier and every
    /// computed field. If the create call fails the state is untouched. If
    /// the follow-up refresh fails, the identifier is kept so the host can
    /// still track the object it just created.
    pub fn create(&self, state: &mut DeclaredState) -> Result<()> {
        if state.exists() {
            return Err(self.invalid_state(
                Operation::Create,
                &format!("already exists with id {}", state.id()),
            ));
        }
        self.schema().validate_config(state)?;

        let request = self.kind.codec().encode(self.schema(), state);
        log::debug!(
            "create {}: sending {} attribute(s)",
            self.kind.name(),
            request.attributes.len()
        );

        let created = self
            .client
            .create(self.kind.collection(), &request)
            .map_err(|e| self.remote(Operation::Create, e))?;
        if created.id.is_empty() {
            return Err(Error::MalformedResponse {
                kind: self.name(),
                field: "id".to_string(),
                reason: "create response carries no identifier".to_string(),
            });
        }

        log::debug!("create {}: assigned id {}", self.kind.name(), created.id);
        state.set_id(created.id);
        self.refresh(Operation::Create, state)
    }

    /// Refresh the state from the remote object
    ///
    /// A missing remote object fails with a not-found error, leaving the
    /// state unchanged; hosts check [`Error::is_not_found`] to drop it.
    pub fn read(&self, state: &mut DeclaredState) -> Result<()> {
        if !state.exists() {
            return Err(self.invalid_state(Operation::Read, "no identifier, not created yet"));
        }
        self.refresh(Operation::Read, state)
    }

    /// Apply in-place changes to an existing object
    ///
    /// Only the changed fields are sent. A change to any force-replace field
    /// is rejected before any network call. An empty change set does nothing.
    pub fn update(&self, state: &mut DeclaredState, changes: &Changes) -> Result<()> {
        if !state.exists() {
            return Err(self.invalid_state(Operation::Update, "no identifier, not created yet"));
        }
        self.schema().validate_changes(changes)?;

        if changes.is_empty() {
            log::debug!("update {} {}: nothing to change", self.kind.name(), state.id());
            return Ok(());
        }

        let mut delta = DeclaredState::with_id(state.id());
        for (name, value) in changes {
            delta.set(name.as_str(), value.clone());
        }
        let request = self.kind.codec().encode(self.schema(), &delta);
        log::debug!(
            "update {} {}: sending {}",
            self.kind.name(),
            state.id(),
            changes.keys().cloned().collect::<Vec<_>>().join(", ")
        );

        self.client
            .update(self.kind.collection(), state.id(), &request)
            .map_err(|e| self.remote(Operation::Update, e))?;

        for (name, value) in changes {
            state.set(name.as_str(), value.clone());
        }
        if let Some(touch) = self.schema().touch_field() {
            state.set(touch, chrono::Utc::now().to_rfc3339());
        }
        self.refresh(Operation::Update, state)
    }

    /// Delete the remote object and clear the identifier
    ///
    /// Deleting a state with no identifier, or one whose remote object is
    /// already gone, succeeds.
    pub fn delete(&self, state: &mut DeclaredState) -> Result<()> {
        if !state.exists() {
            log::debug!("delete {}: no identifier, nothing to do", self.kind.name());
            return Ok(());
        }

        match self.client.delete(self.kind.collection(), state.id()) {
            Ok(()) => {}
            Err(ApiError::NotFound) => {
                log::debug!(
                    "delete {} {}: already absent remotely",
                    self.kind.name(),
                    state.id()
                );
            }
            Err(e) => return Err(self.remote(Operation::Delete, e)),
        }

        state.clear_id();
        Ok(())
    }

    /// Bring an existing remote object under management
    pub fn import(&self, id: &str) -> Result<DeclaredState> {
        if !self.schema().supports_import() {
            return Err(Error::ImportUnsupported(self.name()));
        }
        if id.trim().is_empty() {
            return Err(self.invalid_state(Operation::Import, "identifier is empty"));
        }

        let mut state = DeclaredState::with_id(id);
        self.refresh(Operation::Import, &mut state)?;
        Ok(state)
    }

    fn fetch(&self, operation: Operation, id: &str) -> Result<RemoteObject> {
        self.client
            .get(self.kind.collection(), id)
            .map_err(|e| match e {
                ApiError::NotFound => Error::NotFound {
                    kind: self.name(),
                    target: id.to_string(),
                },
                other => self.remote(operation, other),
            })
    }

    fn refresh(&self, operation: Operation, state: &mut DeclaredState) -> Result<()> {
        let object = self.fetch(operation, state.id())?;
        let remote = self.kind.codec().decode(self.schema(), &object)?;
        merge(self.schema(), state, &remote);
        log::debug!(
            "{} {} {}: refreshed {} field(s)",
            operation,
            self.kind.name(),
            state.id(),
            remote.len()
        );
        Ok(())
    }
}

/// Merge a decoded remote state into the local one
///
/// Computed fields and in-place inputs follow the remote object.
/// Force-replace inputs keep the caller's value and are only filled in when
/// the local state has none (import). Fields the remote did not return are
/// left alone.
fn merge(schema: &Schema, local: &mut DeclaredState, remote: &DeclaredState) {
    for descriptor in schema.fields() {
        let Some(value) = remote.get(descriptor.name) else {
            continue;
        };
        if descriptor.force_replace && descriptor.is_input() && local.contains(descriptor.name) {
            continue;
        }
        local.set(descriptor.name, value.clone());
    }
}
