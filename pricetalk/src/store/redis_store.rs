//! Redis-backed store.
//!
//! Documents live as JSON strings under `prefix:service:collection:id`. Reads are
//! plain `GET`/`MGET`; every write is a [`WriteBatch`] applied by one Lua script,
//! guarded by the versions the batch was computed from. Lost races are retried here,
//! up to `max_write_retries`, and never by the engagement core.

use std::collections::HashMap;

use chrono::Utc;
use redis::{AsyncCommands, aio::ConnectionManager, cmd};
use serde::de::DeserializeOwned;

use crate::{
    config::{CascadePolicy, RedisSettings},
    entities::{Comment, Document, Post, Reply},
    errors::{EngageError, StoreError},
    keys::KeyContext,
    runtime::{BatchExecutor, BatchResult, RedisExecutor, WriteBatch},
    store::{DeleteReceipt, EntityStore},
    types::{EntityKind, UserProfile},
};

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    keys: KeyContext,
    max_write_retries: u32,
}

fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, EngageError> {
    Ok(serde_json::from_str(raw)?)
}

impl RedisStore {
    pub async fn connect(settings: &RedisSettings) -> Result<Self, EngageError> {
        let client = redis::Client::open(settings.url.as_str())?;
        let conn = client.get_connection_manager().await?;
        Ok(Self::with_connection(conn, settings))
    }

    pub fn with_connection(conn: ConnectionManager, settings: &RedisSettings) -> Self {
        Self {
            conn,
            keys: KeyContext::new(settings.key_prefix.clone(), settings.service.clone()),
            max_write_retries: settings.max_write_retries.max(1),
        }
    }

    /// Deletes every key in this store's namespace.
    ///
    /// Uses SCAN + DEL so Redis is never blocked on a large keyspace.
    pub async fn purge_namespace(&self) -> Result<u64, EngageError> {
        const SCAN_COUNT: usize = 1000;
        let mut conn = self.conn.clone();
        let pattern = self.keys.namespace_pattern();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                total_deleted += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }

    async fn load<D: Document>(&self, id: &str) -> Result<Option<D>, EngageError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.keys.entity(D::KIND, id)).await?;
        raw.as_deref().map(parse::<D>).transpose()
    }

    async fn load_required<D: Document>(&self, id: &str) -> Result<D, EngageError> {
        self.load(id).await?.ok_or_else(|| EngageError::not_found(D::KIND, id))
    }

    async fn load_many<D: Document>(&self, ids: &[String]) -> Result<Vec<D>, EngageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = ids.iter().map(|id| self.keys.entity(D::KIND, id)).collect();
        let mut conn = self.conn.clone();
        let raws: Vec<Option<String>> = cmd("MGET").arg(&keys).query_async(&mut conn).await?;
        raws.iter().flatten().map(|raw| parse::<D>(raw)).collect()
    }

    async fn owning_post(&self, comment_id: &str) -> Result<Option<Post>, EngageError> {
        let posts = self.list_posts().await?;
        Ok(posts.into_iter().find(|post| post.comments.iter().any(|id| id == comment_id)))
    }

    /// Runs one attempt. `Ok(true)` means applied, `Ok(false)` means a guard lost a race.
    async fn apply(&self, batch: &WriteBatch) -> Result<bool, EngageError> {
        let mut conn = self.conn.clone();
        let mut executor = RedisExecutor::new(&mut conn);
        match executor.execute(batch).await? {
            BatchResult::Applied { .. } => Ok(true),
            BatchResult::Conflict { key, expected, actual } => {
                log::warn!("version conflict on {key} (expected {expected}, actual {actual}), retrying");
                Ok(false)
            }
        }
    }

    fn contention(&self, kind: EntityKind, id: &str) -> EngageError {
        StoreError::Contention {
            key: self.keys.entity(kind, id),
            attempts: self.max_write_retries,
        }
        .into()
    }

    /// Queues deletion of `comment` (and its replies when asked) into `batch`.
    ///
    /// `target` is false under a post delete, where the comment is only a related document.
    fn delete_comment_tree(
        &self,
        batch: &mut WriteBatch,
        comment: &Comment,
        policy: CascadePolicy,
        receipt: &mut DeleteReceipt,
        target: bool,
    ) {
        let key = self.keys.entity(EntityKind::Comment, &comment.id);
        if target {
            batch.guard(key.clone(), comment, comment.version);
        } else {
            batch.guard_related(key.clone(), comment, comment.version);
        }
        batch.delete(key);
        if policy.delete_orphan_replies {
            for reply_id in &comment.replies {
                batch.delete(self.keys.entity(EntityKind::Reply, reply_id));
                receipt.deleted_replies.push(reply_id.clone());
            }
        }
    }
}

impl EntityStore for RedisStore {
    async fn fetch<D: Document>(&self, id: &str) -> Result<Option<D>, EngageError> {
        self.load(id).await
    }

    async fn fetch_many<D: Document>(&self, ids: &[String]) -> Result<Vec<D>, EngageError> {
        self.load_many(ids).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, EngageError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(self.keys.index(EntityKind::Post)).await?;
        self.load_many(&ids).await
    }

    async fn insert_post(&self, post: &Post) -> Result<(), EngageError> {
        let mut batch = WriteBatch::new();
        batch.set(self.keys.entity(EntityKind::Post, &post.id), post)?;
        batch.index_add(self.keys.index(EntityKind::Post), &post.id);
        self.apply(&batch).await?;
        Ok(())
    }

    async fn update<D, F>(&self, id: &str, mut mutate: F) -> Result<D, EngageError>
    where
        D: Document,
        F: FnMut(&mut D) -> Result<(), EngageError>,
    {
        let key = self.keys.entity(D::KIND, id);
        for _ in 0..self.max_write_retries {
            let mut doc: D = self.load_required(id).await?;
            let expected = doc.version();
            mutate(&mut doc)?;
            doc.touch(Utc::now());

            let mut batch = WriteBatch::new();
            batch.guard(key.clone(), &doc, expected);
            batch.set(key.clone(), &doc)?;
            if self.apply(&batch).await? {
                return Ok(doc);
            }
        }
        Err(self.contention(D::KIND, id))
    }

    async fn attach_comment(&self, post_id: &str, comment: &Comment) -> Result<Post, EngageError> {
        let post_key = self.keys.entity(EntityKind::Post, post_id);
        for _ in 0..self.max_write_retries {
            let mut post: Post = self.load_required(post_id).await?;
            let expected = post.version;
            post.comments.push(comment.id.clone());
            post.touch(Utc::now());

            let mut batch = WriteBatch::new();
            batch.guard(post_key.clone(), &post, expected);
            batch.set(post_key.clone(), &post)?;
            batch.set(self.keys.entity(EntityKind::Comment, &comment.id), comment)?;
            if self.apply(&batch).await? {
                return Ok(post);
            }
        }
        Err(self.contention(EntityKind::Post, post_id))
    }

    async fn attach_reply(&self, comment_id: &str, reply: &Reply) -> Result<Comment, EngageError> {
        let comment_key = self.keys.entity(EntityKind::Comment, comment_id);
        for _ in 0..self.max_write_retries {
            let mut comment: Comment = self.load_required(comment_id).await?;
            let expected = comment.version;
            comment.replies.push(reply.id.clone());
            comment.touch(Utc::now());

            let mut batch = WriteBatch::new();
            batch.guard(comment_key.clone(), &comment, expected);
            batch.set(comment_key.clone(), &comment)?;
            batch.set(self.keys.entity(EntityKind::Reply, &reply.id), reply)?;
            if self.apply(&batch).await? {
                return Ok(comment);
            }
        }
        Err(self.contention(EntityKind::Comment, comment_id))
    }

    async fn delete_post(&self, post_id: &str, policy: CascadePolicy) -> Result<DeleteReceipt, EngageError> {
        let post_key = self.keys.entity(EntityKind::Post, post_id);
        for _ in 0..self.max_write_retries {
            let post: Post = self.load_required(post_id).await?;
            let comments: Vec<Comment> = self.load_many(&post.comments).await?;

            let mut receipt = DeleteReceipt::new(EntityKind::Post, post_id);
            let mut batch = WriteBatch::new();
            batch.guard(post_key.clone(), &post, post.version);
            batch.delete(post_key.clone());
            batch.index_remove(self.keys.index(EntityKind::Post), post_id);
            for comment in &comments {
                self.delete_comment_tree(&mut batch, comment, policy, &mut receipt, false);
                receipt.deleted_comments.push(comment.id.clone());
            }

            if self.apply(&batch).await? {
                return Ok(receipt);
            }
        }
        Err(self.contention(EntityKind::Post, post_id))
    }

    async fn delete_comment(&self, comment_id: &str, policy: CascadePolicy) -> Result<DeleteReceipt, EngageError> {
        for _ in 0..self.max_write_retries {
            let comment: Comment = self.load_required(comment_id).await?;

            let mut receipt = DeleteReceipt::new(EntityKind::Comment, comment_id);
            let mut batch = WriteBatch::new();
            self.delete_comment_tree(&mut batch, &comment, policy, &mut receipt, true);

            if policy.prune_deleted_comments {
                if let Some(mut post) = self.owning_post(comment_id).await? {
                    let expected = post.version;
                    post.comments.retain(|id| id != comment_id);
                    post.touch(Utc::now());
                    let post_key = self.keys.entity(EntityKind::Post, &post.id);
                    batch.guard_related(post_key.clone(), &post, expected);
                    batch.set(post_key, &post)?;
                    receipt.detached_from = Some(post.id.clone());
                }
            }

            if self.apply(&batch).await? {
                return Ok(receipt);
            }
        }
        Err(self.contention(EntityKind::Comment, comment_id))
    }

    async fn delete_reply(&self, reply_id: &str) -> Result<DeleteReceipt, EngageError> {
        let reply_key = self.keys.entity(EntityKind::Reply, reply_id);
        for _ in 0..self.max_write_retries {
            let reply: Reply = self.load_required(reply_id).await?;

            let mut receipt = DeleteReceipt::new(EntityKind::Reply, reply_id);
            let mut batch = WriteBatch::new();
            batch.guard(reply_key.clone(), &reply, reply.version);
            batch.delete(reply_key.clone());

            if let Some(mut comment) = self.load::<Comment>(&reply.comment_id).await? {
                let expected = comment.version;
                comment.replies.retain(|id| id != reply_id);
                comment.touch(Utc::now());
                let comment_key = self.keys.entity(EntityKind::Comment, &comment.id);
                batch.guard_related(comment_key.clone(), &comment, expected);
                batch.set(comment_key, &comment)?;
                receipt.detached_from = Some(comment.id.clone());
            }

            if self.apply(&batch).await? {
                return Ok(receipt);
            }
        }
        Err(self.contention(EntityKind::Reply, reply_id))
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), EngageError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(profile)?;
        let _: () = conn.set(self.keys.profile(&profile.user_id), payload).await?;
        Ok(())
    }

    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<HashMap<String, UserProfile>, EngageError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let keys: Vec<String> = user_ids.iter().map(|id| self.keys.profile(id)).collect();
        let mut conn = self.conn.clone();
        let raws: Vec<Option<String>> = cmd("MGET").arg(&keys).query_async(&mut conn).await?;
        raws.iter()
            .flatten()
            .map(|raw| parse::<UserProfile>(raw).map(|profile| (profile.user_id.clone(), profile)))
            .collect()
    }
}
