//! Persistence seam.
//!
//! Stores hold three document collections (posts, comments, replies) plus author
//! profiles. They own every atomicity guarantee the engagement core relies on: a
//! per-document read-modify-write, child creation together with the parent's list
//! append, and deletions together with their cascade.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    config::CascadePolicy,
    entities::{Comment, Document, Post, Reply},
    errors::EngageError,
    types::{EntityKind, UserProfile},
};

pub mod memory;
pub mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// What a deletion removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReceipt {
    pub kind: EntityKind,
    pub id: String,
    /// Comments deleted alongside the target.
    pub deleted_comments: Vec<String>,
    /// Replies deleted alongside the target.
    pub deleted_replies: Vec<String>,
    /// Parent whose child list no longer mentions the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached_from: Option<String>,
}

impl DeleteReceipt {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            deleted_comments: Vec::new(),
            deleted_replies: Vec::new(),
            detached_from: None,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait EntityStore {
    async fn fetch<D: Document>(&self, id: &str) -> Result<Option<D>, EngageError>;

    /// Fetches `ids` in order, skipping ids with no document.
    async fn fetch_many<D: Document>(&self, ids: &[String]) -> Result<Vec<D>, EngageError>;

    async fn list_posts(&self) -> Result<Vec<Post>, EngageError>;

    async fn insert_post(&self, post: &Post) -> Result<(), EngageError>;

    /// Atomic read-modify-write of one document.
    ///
    /// `mutate` may run more than once when the store retries optimistic writes. When
    /// it fails nothing is written and its error is returned. A successful write is
    /// stamped with [`Document::touch`].
    async fn update<D, F>(&self, id: &str, mutate: F) -> Result<D, EngageError>
    where
        D: Document,
        F: FnMut(&mut D) -> Result<(), EngageError>;

    /// Stores `comment` and appends its id to the post's comment list in one step.
    async fn attach_comment(&self, post_id: &str, comment: &Comment) -> Result<Post, EngageError>;

    /// Stores `reply` and appends its id to the comment's reply list in one step.
    async fn attach_reply(&self, comment_id: &str, reply: &Reply) -> Result<Comment, EngageError>;

    /// Deletes the post and every comment it references.
    async fn delete_post(&self, post_id: &str, policy: CascadePolicy) -> Result<DeleteReceipt, EngageError>;

    async fn delete_comment(&self, comment_id: &str, policy: CascadePolicy) -> Result<DeleteReceipt, EngageError>;

    /// Deletes the reply and removes its id from the owning comment.
    async fn delete_reply(&self, reply_id: &str) -> Result<DeleteReceipt, EngageError>;

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), EngageError>;

    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<HashMap<String, UserProfile>, EngageError>;
}
