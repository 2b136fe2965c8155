//! In-memory remote API for testing without network access.
//!
//! [`MemoryApi`] stores objects per collection, assigns identifiers, and
//! keeps a journal of every call so tests can assert exactly what was sent.
//!
//! ```
//! use reconcile::mock::MemoryApi;
//! use reconcile::{ProviderRequest, RemoteApi};
//!
//! let api = MemoryApi::new();
//! api.queue_id("servers", "srv-100");
//!
//! let request = ProviderRequest {
//!     resource_type: "servers".into(),
//!     id: None,
//!     attributes: serde_json::Map::new(),
//! };
//! let created = api.create("servers", &request).unwrap();
//! assert_eq!(created.id, "srv-100");
//! assert_eq!(api.calls().len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::{ApiError, ApiResult, Filter, RemoteApi};
use crate::codec::{ProviderRequest, RemoteObject};

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Builds the stored remote shape from the assigned id and request attributes
pub type Shaper = Arc<dyn Fn(&str, &JsonMap) -> JsonMap + Send + Sync>;

/// Kind of call recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Create,
    Get,
    Update,
    Delete,
    List,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: CallKind,
    pub collection: String,
    pub id: Option<String>,
    pub request: Option<ProviderRequest>,
    pub filter: Option<Filter>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, BTreeMap<String, RemoteObject>>,
    queued_ids: HashMap<String, VecDeque<String>>,
    failures: HashMap<String, VecDeque<ApiError>>,
    shapers: HashMap<String, Shaper>,
    calls: Vec<Call>,
    next_id: u64,
}

/// Mock remote API backed by memory.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct MemoryApi {
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for MemoryApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryApi")
            .field("collections", &inner.objects.len())
            .field("calls", &inner.calls.len())
            .finish()
    }
}

impl MemoryApi {
    /// Create a new empty mock API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object into a collection
    pub fn insert(&self, collection: &str, object: RemoteObject) {
        self.lock()
            .objects
            .entry(collection.to_string())
            .or_default()
            .insert(object.id.clone(), object);
    }

    /// Identifier handed out by the next create in `collection`
    pub fn queue_id(&self, collection: &str, id: impl Into<String>) {
        self.lock()
            .queued_ids
            .entry(collection.to_string())
            .or_default()
            .push_back(id.into());
    }

    /// Fail the next call of any kind against `collection`
    pub fn fail_next(&self, collection: &str, error: ApiError) {
        self.lock()
            .failures
            .entry(collection.to_string())
            .or_default()
            .push_back(error);
    }

    /// Install a shaper for objects created in `collection`
    ///
    /// Without one, created objects store the request attributes unchanged.
    pub fn shape<F>(&self, collection: &str, shaper: F)
    where
        F: Fn(&str, &JsonMap) -> JsonMap + Send + Sync + 'static,
    {
        self.lock()
            .shapers
            .insert(collection.to_string(), Arc::new(shaper));
    }

    /// Stored object, if any
    pub fn object(&self, collection: &str, id: &str) -> Option<RemoteObject> {
        self.lock()
            .objects
            .get(collection)
            .and_then(|objects| objects.get(id))
            .cloned()
    }

    /// Remove an object behind the engine's back
    pub fn remove(&self, collection: &str, id: &str) -> Option<RemoteObject> {
        self.lock()
            .objects
            .get_mut(collection)
            .and_then(|objects| objects.remove(id))
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Calls of one kind
    pub fn calls_of(&self, kind: CallKind) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Record a call and pop a queued failure for its collection
    fn begin(inner: &mut Inner, call: Call) -> ApiResult<()> {
        let failure = inner
            .failures
            .get_mut(&call.collection)
            .and_then(VecDeque::pop_front);
        inner.calls.push(call);
        failure.map_or(Ok(()), Err)
    }
}

impl RemoteApi for MemoryApi {
    fn create(&self, collection: &str, request: &ProviderRequest) -> ApiResult<RemoteObject> {
        let mut inner = self.lock();
        Self::begin(
            &mut inner,
            Call {
                kind: CallKind::Create,
                collection: collection.to_string(),
                id: None,
                request: Some(request.clone()),
                filter: None,
            },
        )?;

        let queued = inner
            .queued_ids
            .get_mut(collection)
            .and_then(VecDeque::pop_front);
        let id = match queued {
            Some(id) => id,
            None => {
                inner.next_id += 1;
                inner.next_id.to_string()
            }
        };

        let attributes = match inner.shapers.get(collection) {
            Some(shaper) => shaper(&id, &request.attributes),
            None => request.attributes.clone(),
        };

        let object = RemoteObject::new(id.clone(), attributes);
        inner
            .objects
            .entry(collection.to_string())
            .or_default()
            .insert(id, object.clone());
        Ok(object)
    }

    fn get(&self, collection: &str, id: &str) -> ApiResult<RemoteObject> {
        let mut inner = self.lock();
        Self::begin(
            &mut inner,
            Call {
                kind: CallKind::Get,
                collection: collection.to_string(),
                id: Some(id.to_string()),
                request: None,
                filter: None,
            },
        )?;

        inner
            .objects
            .get(collection)
            .and_then(|objects| objects.get(id))
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        request: &ProviderRequest,
    ) -> ApiResult<RemoteObject> {
        let mut inner = self.lock();
        Self::begin(
            &mut inner,
            Call {
                kind: CallKind::Update,
                collection: collection.to_string(),
                id: Some(id.to_string()),
                request: Some(request.clone()),
                filter: None,
            },
        )?;

        let object = inner
            .objects
            .get_mut(collection)
            .and_then(|objects| objects.get_mut(id))
            .ok_or(ApiError::NotFound)?;
        for (key, value) in &request.attributes {
            object.attributes.insert(key.clone(), value.clone());
        }
        Ok(object.clone())
    }

    fn delete(&self, collection: &str, id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        Self::begin(
            &mut inner,
            Call {
                kind: CallKind::Delete,
                collection: collection.to_string(),
                id: Some(id.to_string()),
                request: None,
                filter: None,
            },
        )?;

        inner
            .objects
            .get_mut(collection)
            .and_then(|objects| objects.remove(id))
            .map(|_| ())
            .ok_or(ApiError::NotFound)
    }

    /// Returns every object in the collection; filter terms are recorded only.
    fn list(&self, collection: &str, filter: &Filter) -> ApiResult<Vec<RemoteObject>> {
        let mut inner = self.lock();
        Self::begin(
            &mut inner,
            Call {
                kind: CallKind::List,
                collection: collection.to_string(),
                id: None,
                request: None,
                filter: Some(filter.clone()),
            },
        )?;

        Ok(inner
            .objects
            .get(collection)
            .map(|objects| objects.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(attributes: serde_json::Value) -> ProviderRequest {
        ProviderRequest {
            resource_type: "projects".into(),
            id: None,
            attributes: attributes.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let api = MemoryApi::new();
        let a = api.create("projects", &request(json!({"name": "a"}))).unwrap();
        let b = api.create("projects", &request(json!({"name": "b"}))).unwrap();
        assert_eq!(a.id, "1");
        assert_eq!(b.id, "2");
        assert_eq!(api.object("projects", "2").unwrap().attributes["name"], "b");
    }

    #[test]
    fn test_queued_id_and_shaper() {
        let api = MemoryApi::new();
        api.queue_id("projects", "proj-7");
        api.shape("projects", |id, attrs| {
            let mut shaped = attrs.clone();
            shaped.insert("slug".into(), json!(format!("slug-{id}")));
            shaped
        });

        let created = api.create("projects", &request(json!({"name": "a"}))).unwrap();
        assert_eq!(created.id, "proj-7");
        assert_eq!(created.attributes["slug"], "slug-proj-7");
    }

    #[test]
    fn test_get_and_delete_missing() {
        let api = MemoryApi::new();
        assert_eq!(api.get("projects", "nope"), Err(ApiError::NotFound));
        assert_eq!(api.delete("projects", "nope"), Err(ApiError::NotFound));
    }

    #[test]
    fn test_update_merges_attributes() {
        let api = MemoryApi::new();
        let created = api
            .create("projects", &request(json!({"name": "a", "description": "x"})))
            .unwrap();
        let updated = api
            .update("projects", &created.id, &request(json!({"name": "b"})))
            .unwrap();
        assert_eq!(updated.attributes["name"], "b");
        assert_eq!(updated.attributes["description"], "x");
    }

    #[test]
    fn test_fail_next_is_consumed_once() {
        let api = MemoryApi::new();
        api.fail_next("projects", ApiError::transport("connection reset"));

        assert!(api.list("projects", &Filter::new()).is_err());
        assert!(api.list("projects", &Filter::new()).is_ok());
        assert_eq!(api.calls_of(CallKind::List).len(), 2);
    }

    #[test]
    fn test_clones_share_storage() {
        let api = MemoryApi::new();
        let other = api.clone();
        api.create("projects", &request(json!({}))).unwrap();
        assert_eq!(other.calls().len(), 1);
    }
}
