//! # reconcile
//!
//! Declarative resource reconciliation against a remote REST API.
//!
//! This crate provides:
//! - Typed schemas per resource kind (required, optional, computed and
//!   force-replace fields)
//! - A table-driven attribute codec between declared state and API payloads
//! - One generic Create/Read/Update/Delete/Import lifecycle for every kind
//! - Read-only data lookups that refuse ambiguous matches
//! - A registry binding kinds to a shared [`RemoteApi`] client
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use reconcile::mock::MemoryApi;
//! use reconcile::{
//!     AttributeCodec, BindingCodec, DeclaredState, FieldDescriptor, Registry, ResourceKind,
//!     Schema, SemanticType,
//! };
//!
//! #[derive(Debug)]
//! struct Project {
//!     schema: Schema,
//!     codec: BindingCodec,
//! }
//!
//! impl ResourceKind for Project {
//!     fn name(&self) -> &'static str { "example_project" }
//!     fn collection(&self) -> &'static str { "projects" }
//!     fn schema(&self) -> &Schema { &self.schema }
//!     fn codec(&self) -> &dyn AttributeCodec { &self.codec }
//! }
//!
//! let project = Project {
//!     schema: Schema::new("example_project")
//!         .field(FieldDescriptor::required("name", SemanticType::String))
//!         .field(FieldDescriptor::computed("slug", SemanticType::String)),
//!     codec: BindingCodec::new("projects"),
//! };
//!
//! let registry = Registry::new(Arc::new(MemoryApi::new())).resource(project);
//! let reconciler = registry.reconciler("example_project").unwrap();
//!
//! let mut state = DeclaredState::new().with("name", "Acme");
//! reconciler.create(&mut state).unwrap();
//! assert!(state.exists());
//!
//! reconciler.delete(&mut state).unwrap();
//! assert!(!state.exists());
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod lookup;
pub mod mock;
pub mod reconciler;
pub mod registry;
pub mod schema;
pub mod state;

pub use client::{ApiError, ApiResult, Filter, RemoteApi};
pub use codec::{AttributeCodec, BindingCodec, DecodeRule, FlexibleId, ProviderRequest, RemoteObject};
pub use error::{Error, ErrorCategory, Operation, Result, Violation, ViolationKind};
pub use lookup::{Criteria, DataLookup, FilterField, LookupKind};
pub use reconciler::{Reconciler, ResourceKind};
pub use registry::Registry;
pub use schema::{FieldDescriptor, ImportMode, Presence, Schema, SemanticType};
pub use state::{Changes, DeclaredState, Value};
