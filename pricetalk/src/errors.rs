use std::borrow::Cow;

use thiserror::Error;

use crate::types::{EntityKind, Stance};

/// Top-level error type returned by every engagement operation.
#[derive(Debug, Error)]
pub enum EngageError {
    /// No caller identity could be resolved.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller is neither the owner of the entity nor an admin.
    #[error("unauthorized action on {kind} '{id}'")]
    Unauthorized { kind: EntityKind, id: String },

    /// Target entity does not exist (or was deleted).
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// Validation failed for one or more fields.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    #[error("you have already {stance} this {kind}")]
    AlreadyVoted { kind: EntityKind, id: String, stance: Stance },

    #[error("you haven't {stance} this {kind}")]
    NotVoted { kind: EntityKind, id: String, stance: Stance },

    /// Persistence layer failed. Never retried by the core.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngageError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        EngageError::NotFound { kind, id: id.into() }
    }

    pub fn unauthorized(kind: EntityKind, id: impl Into<String>) -> Self {
        EngageError::Unauthorized { kind, id: id.into() }
    }

    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            EngageError::Unauthenticated => "unauthenticated",
            EngageError::Unauthorized { .. } => "unauthorized",
            EngageError::NotFound { .. } => "not_found",
            EngageError::Validation(_) => "validation",
            EngageError::AlreadyVoted { .. } => "already_voted",
            EngageError::NotVoted { .. } => "not_voted",
            EngageError::Store(_) => "store",
        }
    }
}

impl From<redis::RedisError> for EngageError {
    fn from(err: redis::RedisError) -> Self {
        EngageError::Store(StoreError::Redis(err))
    }
}

impl From<serde_json::Error> for EngageError {
    fn from(err: serde_json::Error) -> Self {
        EngageError::Store(StoreError::Serialization(err))
    }
}

/// Failures raised by a store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be encoded or decoded.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Optimistic writes kept losing to concurrent writers.
    #[error("write contention on '{key}' after {attempts} attempts")]
    Contention { key: String, attempts: u32 },

    /// The write script reported something it should never report.
    #[error("{message}")]
    Script { message: Cow<'static, str> },
}

/// Collection of validation issues encountered while checking one request.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
