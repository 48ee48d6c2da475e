use serde::Serialize;

use crate::{entities::Document, errors::EngageError, types::EntityKind};

/// A set of writes applied by one script invocation, all or nothing.
///
/// Guards are checked first. A missing required key aborts with `entity_not_found`;
/// a version mismatch, or a missing related key, aborts with `version_conflict`.
#[derive(Debug, Default, Serialize)]
pub struct WriteBatch {
    pub guards: Vec<VersionGuard>,
    pub sets: Vec<KeyWrite>,
    pub deletes: Vec<String>,
    pub index_add: Vec<IndexMember>,
    pub index_remove: Vec<IndexMember>,
}

#[derive(Debug, Serialize)]
pub struct VersionGuard {
    pub key: String,
    pub kind: EntityKind,
    pub entity_id: String,
    pub expected_version: u64,
    /// Set for the document the operation targets; a missing related document
    /// (parent or sibling) is reported as a conflict.
    pub required: bool,
}

#[derive(Debug, Serialize)]
pub struct KeyWrite {
    pub key: String,
    pub payload_json: String,
}

#[derive(Debug, Serialize)]
pub struct IndexMember {
    pub key: String,
    pub member: String,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the stored copy of `doc` at `key` to still be at `expected_version`.
    pub fn guard<D: Document>(&mut self, key: impl Into<String>, doc: &D, expected_version: u64) -> &mut Self {
        self.push_guard(key.into(), doc, expected_version, true)
    }

    /// Like [`guard`](Self::guard), but a missing key is a conflict rather than `NotFound`.
    pub fn guard_related<D: Document>(&mut self, key: impl Into<String>, doc: &D, expected_version: u64) -> &mut Self {
        self.push_guard(key.into(), doc, expected_version, false)
    }

    fn push_guard<D: Document>(&mut self, key: String, doc: &D, expected_version: u64, required: bool) -> &mut Self {
        self.guards.push(VersionGuard {
            key,
            kind: D::KIND,
            entity_id: doc.id().to_string(),
            expected_version,
            required,
        });
        self
    }

    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<&mut Self, EngageError> {
        self.sets.push(KeyWrite {
            key: key.into(),
            payload_json: serde_json::to_string(value)?,
        });
        Ok(self)
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.deletes.push(key.into());
        self
    }

    pub fn index_add(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.index_add.push(IndexMember {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn index_remove(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.index_remove.push(IndexMember {
            key: key.into(),
            member: member.into(),
        });
        self
    }
}
