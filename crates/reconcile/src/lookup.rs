//! Data lookups - read-only resolution of exactly one remote record
//!
//! A lookup kind names the filter keys it accepts. Filter terms are passed to
//! the remote `list` call, and every returned record is checked again locally
//! after decoding, since a service may ignore filters it does not know.
//! More than one surviving record is an error, never a silent first pick.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::client::{Filter, RemoteApi};
use crate::codec::AttributeCodec;
use crate::error::{Error, Operation, Result, Violation, ViolationKind};
use crate::schema::Schema;
use crate::state::{DeclaredState, Value};

/// Caller-supplied filter: filter key to expected value
pub type Criteria = BTreeMap<String, String>;

/// One accepted filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Key the caller uses
    pub key: &'static str,
    /// Schema field the decoded record is checked against
    pub field: &'static str,
    /// Key sent to the remote `list` call
    pub remote_key: &'static str,
}

impl FilterField {
    pub const fn new(key: &'static str, field: &'static str, remote_key: &'static str) -> Self {
        Self {
            key,
            field,
            remote_key,
        }
    }
}

/// Capabilities a data source provides to [`DataLookup`]
pub trait LookupKind: Send + Sync + fmt::Debug {
    /// Registry key (e.g., "latitudesh_plan")
    fn name(&self) -> &'static str;

    /// Remote collection path (e.g., "plans")
    fn collection(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn codec(&self) -> &dyn AttributeCodec;

    fn filters(&self) -> &[FilterField];
}

/// Resolves filters to a single record of one lookup kind
#[derive(Clone)]
pub struct DataLookup {
    kind: Arc<dyn LookupKind>,
    client: Arc<dyn RemoteApi>,
}

impl fmt::Debug for DataLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataLookup")
            .field("kind", &self.kind.name())
            .finish_non_exhaustive()
    }
}

fn describe(criteria: &Criteria) -> String {
    let terms: Vec<_> = criteria.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{{{}}}", terms.join(", "))
}

/// Whether a decoded value satisfies one filter term
fn matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::List(items)) => items.iter().any(|item| item == expected),
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

impl DataLookup {
    pub fn new(kind: Arc<dyn LookupKind>, client: Arc<dyn RemoteApi>) -> Self {
        Self { kind, client }
    }

    pub fn kind(&self) -> &dyn LookupKind {
        self.kind.as_ref()
    }

    fn filter_field(&self, key: &str) -> Option<&FilterField> {
        self.kind.filters().iter().find(|f| f.key == key)
    }

    fn validate(&self, criteria: &Criteria) -> Result<Vec<FilterField>> {
        let mut violations = Vec::new();
        let mut fields = Vec::new();

        if criteria.is_empty() {
            let accepted: Vec<_> = self.kind.filters().iter().map(|f| f.key).collect();
            violations.push(Violation::new(
                "filter",
                ViolationKind::Invalid(format!(
                    "at least one filter is required ({})",
                    accepted.join(", ")
                )),
            ));
        }

        for key in criteria.keys() {
            match self.filter_field(key) {
                Some(field) => fields.push(*field),
                None => violations.push(Violation::new(key.as_str(), ViolationKind::Unknown)),
            }
        }

        if violations.is_empty() {
            Ok(fields)
        } else {
            Err(Error::SchemaValidation {
                kind: self.kind.name().to_string(),
                violations,
            })
        }
    }

    /// Resolve `criteria` to exactly one record
    ///
    /// # Errors
    ///
    /// - `SchemaValidation` for an empty filter or an unknown filter key
    /// - `NotFound` when no record matches
    /// - `AmbiguousMatch` when more than one record matches
    pub fn resolve(&self, criteria: &Criteria) -> Result<DeclaredState> {
        let fields = self.validate(criteria)?;

        let mut filter = Filter::new();
        for field in &fields {
            filter.push(field.remote_key, criteria[field.key].as_str());
        }

        let objects = self
            .client
            .list(self.kind.collection(), &filter)
            .map_err(|source| Error::Remote {
                operation: Operation::Lookup,
                kind: self.kind.name().to_string(),
                source,
            })?;
        log::debug!(
            "lookup {} {}: {} candidate(s)",
            self.kind.name(),
            describe(criteria),
            objects.len()
        );

        let mut matched = Vec::new();
        for object in &objects {
            let record = self.kind.codec().decode(self.kind.schema(), object)?;
            let keep = fields
                .iter()
                .all(|field| matches(record.get(field.field), &criteria[field.key]));
            if keep {
                matched.push(record);
            }
        }

        match matched.len() {
            0 => Err(Error::NotFound {
                kind: self.kind.name().to_string(),
                target: describe(criteria),
            }),
            1 => Ok(matched.remove(0)),
            count => Err(Error::AmbiguousMatch {
                kind: self.kind.name().to_string(),
                filter: describe(criteria),
                count,
            }),
        }
    }
}
