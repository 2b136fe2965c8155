//! Error types for reconciliation
//!
//! Errors are categorized so a host can tell a caller mistake (schema
//! validation, conflicting update) from a remote outcome (not found,
//! ambiguous match) or a transport failure.

use std::fmt;

use crate::client::ApiError;
use crate::schema::SemanticType;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle operation an error was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
    Lookup,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Lookup => "lookup",
        };
        f.write_str(name)
    }
}

/// What is wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required field was not supplied
    Missing,
    /// Caller supplied a field only the remote system may set
    Computed,
    /// Field name is not part of the schema
    Unknown,
    /// Value does not match the descriptor's semantic type
    WrongType {
        expected: SemanticType,
        found: String,
    },
    /// Value has the right shape but cannot be used
    Invalid(String),
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{}: required field is missing", self.field),
            ViolationKind::Computed => {
                write!(f, "{}: computed field cannot be set", self.field)
            }
            ViolationKind::Unknown => write!(f, "{}: unknown field", self.field),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "{}: expected {}, found {}", self.field, expected, found)
            }
            ViolationKind::Invalid(reason) => write!(f, "{}: {}", self.field, reason),
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Categories of reconciliation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller input rejected before any network call
    SchemaValidation,
    /// Caller tried to change a force-replace field in place
    ConflictingUpdate,
    /// Target does not exist remotely
    NotFound,
    /// Lookup filter matched more than one record
    AmbiguousMatch,
    /// Remote service rejected the request as invalid
    RemoteValidation,
    /// Could not reach the remote service, or its response was malformed
    Transport,
    /// Engine misuse (wrong lifecycle phase, unknown kind, unsupported import)
    Usage,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::SchemaValidation => "Invalid resource configuration",
            Self::ConflictingUpdate => "Change requires replacing the resource",
            Self::NotFound => "Resource not found",
            Self::AmbiguousMatch => "Lookup matched several records",
            Self::RemoteValidation => "Request rejected by the remote service",
            Self::Transport => "Remote service unreachable or misbehaving",
            Self::Usage => "Invalid operation",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while reconciling a resource.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller input failed schema validation.
    #[error("{kind}: invalid configuration: {}", join_violations(.violations))]
    SchemaValidation {
        kind: String,
        violations: Vec<Violation>,
    },

    /// Update attempted to change force-replace fields.
    #[error("{kind}: {} cannot change in place, the resource must be replaced", .fields.join(", "))]
    ConflictingUpdate { kind: String, fields: Vec<String> },

    /// Target does not exist remotely.
    #[error("{kind} {target} not found")]
    NotFound { kind: String, target: String },

    /// Lookup filter matched more than one record.
    #[error("{kind}: filter {filter} matched {count} records, expected exactly one")]
    AmbiguousMatch {
        kind: String,
        filter: String,
        count: usize,
    },

    /// The remote API call failed.
    #[error("{operation} {kind} failed: {source}")]
    Remote {
        operation: Operation,
        kind: String,
        #[source]
        source: ApiError,
    },

    /// A response field could not be decoded.
    #[error("{kind}: malformed response field {field}: {reason}")]
    MalformedResponse {
        kind: String,
        field: String,
        reason: String,
    },

    /// Operation called in the wrong lifecycle phase.
    #[error("cannot {operation} {kind}: {reason}")]
    InvalidState {
        operation: Operation,
        kind: String,
        reason: String,
    },

    /// Resource kind has no passthrough import.
    #[error("{0} does not support import")]
    ImportUnsupported(String),

    /// No resource kind or data source registered under this key.
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),
}

impl Error {
    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaValidation { .. } => ErrorCategory::SchemaValidation,
            Self::ConflictingUpdate { .. } => ErrorCategory::ConflictingUpdate,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AmbiguousMatch { .. } => ErrorCategory::AmbiguousMatch,
            Self::Remote { source, .. } => match source {
                ApiError::Rejected { .. } => ErrorCategory::RemoteValidation,
                ApiError::NotFound => ErrorCategory::NotFound,
                ApiError::Transport { .. } | ApiError::Malformed(_) => ErrorCategory::Transport,
            },
            Self::MalformedResponse { .. } => ErrorCategory::Transport,
            Self::InvalidState { .. } | Self::ImportUnsupported(_) | Self::UnknownKind(_) => {
                ErrorCategory::Usage
            }
        }
    }

    /// Whether the target is gone remotely
    ///
    /// Hosts use this after a Read to drop the instance from state.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Schema violations carried by this error, if any
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaValidation { violations, .. } => violations,
            _ => &[],
        }
    }
}
