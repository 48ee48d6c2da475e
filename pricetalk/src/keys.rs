use crate::types::EntityKind;

/// Redis key construction for one prefix/service namespace.
#[derive(Debug, Clone)]
pub struct KeyContext {
    pub prefix: String,
    pub service: String,
}

impl KeyContext {
    pub fn new(prefix: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
        }
    }

    /// `prefix:service:collection:id`
    pub fn entity(&self, kind: EntityKind, entity_id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, kind.collection(), entity_id)
    }

    pub fn profile(&self, user_id: &str) -> String {
        format!("{}:{}:profiles:{}", self.prefix, self.service, user_id)
    }

    /// Set of every live id of `kind`.
    pub fn index(&self, kind: EntityKind) -> String {
        format!("{}:{}:idx:{}", self.prefix, self.service, kind.collection())
    }

    /// Glob matching every key in this namespace.
    pub fn namespace_pattern(&self) -> String {
        format!("{}:{}:*", self.prefix, self.service)
    }
}
