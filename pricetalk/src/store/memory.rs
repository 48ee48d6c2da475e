//! In-process store backed by `dashmap` collections of JSON documents.
//!
//! Locks are per document. Steps that touch several documents always lock the parent
//! before the child (post, then comment, then reply) and never hold a lock across an
//! await point.

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    config::CascadePolicy,
    entities::{Comment, Document, Post, Reply},
    errors::EngageError,
    store::{DeleteReceipt, EntityStore},
    types::{EntityKind, UserProfile},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: DashMap<String, Value>,
    comments: DashMap<String, Value>,
    replies: DashMap<String, Value>,
    profiles: DashMap<String, UserProfile>,
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, EngageError> {
    Ok(serde_json::from_value(value.clone())?)
}

fn encode<T: Serialize>(value: &T) -> Result<Value, EngageError> {
    Ok(serde_json::to_value(value)?)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: EntityKind) -> &DashMap<String, Value> {
        match kind {
            EntityKind::Post => &self.posts,
            EntityKind::Comment => &self.comments,
            EntityKind::Reply => &self.replies,
        }
    }

    /// Number of stored documents of `kind`.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.table(kind).len()
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.table(kind).contains_key(id)
    }

    /// Removes a comment and, when the policy asks for it, its replies.
    fn remove_comment_tree(
        &self,
        comment_id: &str,
        policy: CascadePolicy,
        receipt: &mut DeleteReceipt,
    ) -> Result<Option<Comment>, EngageError> {
        let Some((_, value)) = self.comments.remove(comment_id) else {
            return Ok(None);
        };
        let comment: Comment = decode(&value)?;
        if policy.delete_orphan_replies {
            for reply_id in &comment.replies {
                if self.replies.remove(reply_id).is_some() {
                    receipt.deleted_replies.push(reply_id.clone());
                }
            }
        }
        Ok(Some(comment))
    }

    fn owning_post(&self, comment_id: &str) -> Option<String> {
        self.posts
            .iter()
            .find(|entry| {
                entry.value()["comments"]
                    .as_array()
                    .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(comment_id)))
            })
            .map(|entry| entry.key().clone())
    }
}

impl EntityStore for MemoryStore {
    async fn fetch<D: Document>(&self, id: &str) -> Result<Option<D>, EngageError> {
        self.table(D::KIND).get(id).map(|entry| decode(entry.value())).transpose()
    }

    async fn fetch_many<D: Document>(&self, ids: &[String]) -> Result<Vec<D>, EngageError> {
        let table = self.table(D::KIND);
        ids.iter()
            .filter_map(|id| table.get(id).map(|entry| decode(entry.value())))
            .collect()
    }

    async fn list_posts(&self) -> Result<Vec<Post>, EngageError> {
        self.posts.iter().map(|entry| decode(entry.value())).collect()
    }

    async fn insert_post(&self, post: &Post) -> Result<(), EngageError> {
        self.posts.insert(post.id.clone(), encode(post)?);
        Ok(())
    }

    async fn update<D, F>(&self, id: &str, mut mutate: F) -> Result<D, EngageError>
    where
        D: Document,
        F: FnMut(&mut D) -> Result<(), EngageError>,
    {
        let mut entry = self
            .table(D::KIND)
            .get_mut(id)
            .ok_or_else(|| EngageError::not_found(D::KIND, id))?;
        let mut doc: D = decode(entry.value())?;
        mutate(&mut doc)?;
        doc.touch(Utc::now());
        *entry.value_mut() = encode(&doc)?;
        Ok(doc)
    }

    async fn attach_comment(&self, post_id: &str, comment: &Comment) -> Result<Post, EngageError> {
        let mut parent = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| EngageError::not_found(EntityKind::Post, post_id))?;
        let mut post: Post = decode(parent.value())?;
        post.comments.push(comment.id.clone());
        post.touch(Utc::now());
        let post_value = encode(&post)?;
        let comment_value = encode(comment)?;

        self.comments.insert(comment.id.clone(), comment_value);
        *parent.value_mut() = post_value;
        Ok(post)
    }

    async fn attach_reply(&self, comment_id: &str, reply: &Reply) -> Result<Comment, EngageError> {
        let mut parent = self
            .comments
            .get_mut(comment_id)
            .ok_or_else(|| EngageError::not_found(EntityKind::Comment, comment_id))?;
        let mut comment: Comment = decode(parent.value())?;
        comment.replies.push(reply.id.clone());
        comment.touch(Utc::now());
        let comment_value = encode(&comment)?;
        let reply_value = encode(reply)?;

        self.replies.insert(reply.id.clone(), reply_value);
        *parent.value_mut() = comment_value;
        Ok(comment)
    }

    async fn delete_post(&self, post_id: &str, policy: CascadePolicy) -> Result<DeleteReceipt, EngageError> {
        let (key, value) = self
            .posts
            .remove(post_id)
            .ok_or_else(|| EngageError::not_found(EntityKind::Post, post_id))?;
        let post: Post = match decode(&value) {
            Ok(post) => post,
            Err(err) => {
                self.posts.insert(key, value);
                return Err(err);
            }
        };

        let mut receipt = DeleteReceipt::new(EntityKind::Post, post_id);
        for comment_id in &post.comments {
            if self.remove_comment_tree(comment_id, policy, &mut receipt)?.is_some() {
                receipt.deleted_comments.push(comment_id.clone());
            }
        }
        Ok(receipt)
    }

    async fn delete_comment(&self, comment_id: &str, policy: CascadePolicy) -> Result<DeleteReceipt, EngageError> {
        if !self.comments.contains_key(comment_id) {
            return Err(EngageError::not_found(EntityKind::Comment, comment_id));
        }

        let mut receipt = DeleteReceipt::new(EntityKind::Comment, comment_id);
        let owner = if policy.prune_deleted_comments {
            self.owning_post(comment_id)
        } else {
            None
        };
        let mut parent = owner.as_deref().and_then(|post_id| self.posts.get_mut(post_id));
        let pruned = match parent.as_ref() {
            Some(entry) => {
                let mut post: Post = decode(entry.value())?;
                post.comments.retain(|id| id != comment_id);
                post.touch(Utc::now());
                Some(encode(&post)?)
            }
            None => None,
        };

        if self.remove_comment_tree(comment_id, policy, &mut receipt)?.is_none() {
            return Err(EngageError::not_found(EntityKind::Comment, comment_id));
        }
        if let (Some(entry), Some(value)) = (parent.as_mut(), pruned) {
            *entry.value_mut() = value;
            receipt.detached_from = owner;
        }
        Ok(receipt)
    }

    async fn delete_reply(&self, reply_id: &str) -> Result<DeleteReceipt, EngageError> {
        let parent_id = {
            let entry = self
                .replies
                .get(reply_id)
                .ok_or_else(|| EngageError::not_found(EntityKind::Reply, reply_id))?;
            decode::<Reply>(entry.value())?.comment_id
        };

        let mut parent = self.comments.get_mut(&parent_id);
        let pruned = match parent.as_ref() {
            Some(entry) => {
                let mut comment: Comment = decode(entry.value())?;
                comment.replies.retain(|id| id != reply_id);
                comment.touch(Utc::now());
                Some(encode(&comment)?)
            }
            None => None,
        };

        if self.replies.remove(reply_id).is_none() {
            return Err(EngageError::not_found(EntityKind::Reply, reply_id));
        }
        let mut receipt = DeleteReceipt::new(EntityKind::Reply, reply_id);
        if let (Some(entry), Some(value)) = (parent.as_mut(), pruned) {
            *entry.value_mut() = value;
            receipt.detached_from = Some(parent_id);
        }
        Ok(receipt)
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), EngageError> {
        self.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<HashMap<String, UserProfile>, EngageError> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|entry| (id.clone(), entry.value().clone())))
            .collect())
    }
}
