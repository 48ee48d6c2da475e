//! Thread manager: every engagement operation, gated on the caller identity.
//!
//! Operations take the resolved caller explicitly. `None` means the identity provider
//! resolved nobody and fails with [`EngageError::Unauthenticated`] before anything
//! else is looked at. Edits and deletes then check the id shape, existence,
//! ownership and finally the new text, in that order. Creates validate their text
//! before looking up the parent.

use log::{debug, info, warn};

use crate::{
    config::{CascadePolicy, Settings, TextLimits},
    entities::{Comment, Document, Post, Reply},
    errors::{EngageError, ValidationResult},
    guard::{authenticate, ensure_can_mutate},
    store::{DeleteReceipt, EntityStore},
    types::{EntityKind, Identity, UserProfile},
    validators::{check_entity_id, validate_body, validate_new_post, validate_post_edit, validate_profile},
    views::{self, AuthorView, CommentView, PostSort, PostView, ReplyView, Thread},
    vote::{VoteAction, cast},
};

pub struct Forum<S> {
    store: S,
    cascade: CascadePolicy,
    limits: TextLimits,
}

impl<S: EntityStore> Forum<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cascade: CascadePolicy::default(),
            limits: TextLimits::default(),
        }
    }

    pub fn with_settings(store: S, settings: &Settings) -> Self {
        Self {
            store,
            cascade: settings.cascade,
            limits: settings.limits,
        }
    }

    pub fn with_cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cascade_policy(&self) -> CascadePolicy {
        self.cascade
    }

    // ---- posts ----

    pub async fn create_post(
        &self,
        caller: Option<&Identity>,
        title: &str,
        description: &str,
    ) -> Result<Post, EngageError> {
        let caller = authenticate(caller)?;
        validate_new_post(title, description, &self.limits)?;

        let post = Post::new(caller.user_id.clone(), title, description);
        self.store.insert_post(&post).await?;
        info!("user {} created post {}", caller.user_id, post.id);
        Ok(post)
    }

    /// Replaces the supplied fields; absent fields keep their value.
    pub async fn edit_post(
        &self,
        caller: Option<&Identity>,
        post_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Post, EngageError> {
        let validation = validate_post_edit(title, description, &self.limits);
        self.edit(caller, post_id, validation, |post: &mut Post| {
            if let Some(title) = title {
                post.title = title.to_string();
            }
            if let Some(description) = description {
                post.description = description.to_string();
            }
        })
        .await
    }

    pub async fn delete_post(&self, caller: Option<&Identity>, post_id: &str) -> Result<DeleteReceipt, EngageError> {
        let caller = self.authorize::<Post>(caller, post_id).await?;
        let receipt = self.store.delete_post(post_id, self.cascade).await?;
        info!(
            "user {} deleted post {} ({} comments, {} replies)",
            caller.user_id,
            post_id,
            receipt.deleted_comments.len(),
            receipt.deleted_replies.len()
        );
        Ok(receipt)
    }

    pub async fn list_posts(&self, caller: Option<&Identity>, sort: PostSort) -> Result<Vec<PostView>, EngageError> {
        authenticate(caller)?;
        let mut posts = self.store.list_posts().await?;
        sort.apply(&mut posts);

        let authors = views::author_ids(posts.iter().map(|post| post.author_id.as_str()));
        let profiles = self.store.fetch_profiles(&authors).await?;
        Ok(posts
            .into_iter()
            .map(|post| PostView {
                author: AuthorView::resolve(&post.author_id, &profiles),
                comment_count: post.comments.len(),
                post,
            })
            .collect())
    }

    /// The post with its comments and their replies expanded.
    ///
    /// Ids left on a list after their document was deleted are skipped; on the post
    /// they are reported in [`Thread::dangling_comments`].
    pub async fn read_thread(&self, caller: Option<&Identity>, post_id: &str) -> Result<Thread, EngageError> {
        authenticate(caller)?;
        check_entity_id(EntityKind::Post, post_id)?;
        let post: Post = self.require(post_id).await?;

        let comments: Vec<Comment> = self.store.fetch_many(&post.comments).await?;
        let dangling_comments: Vec<String> = post
            .comments
            .iter()
            .filter(|id| !comments.iter().any(|comment| &comment.id == *id))
            .cloned()
            .collect();
        if !dangling_comments.is_empty() {
            warn!(
                "post {} lists {} deleted comment(s), skipping",
                post.id,
                dangling_comments.len()
            );
        }

        let reply_ids: Vec<String> = comments.iter().flat_map(|comment| comment.replies.iter().cloned()).collect();
        let replies: Vec<Reply> = self.store.fetch_many(&reply_ids).await?;

        let authors = views::author_ids(
            std::iter::once(post.author_id.as_str())
                .chain(comments.iter().map(|comment| comment.author_id.as_str()))
                .chain(replies.iter().map(|reply| reply.author_id.as_str())),
        );
        let profiles = self.store.fetch_profiles(&authors).await?;

        Ok(Thread {
            author: AuthorView::resolve(&post.author_id, &profiles),
            comments: views::comment_views(comments, replies, &profiles),
            dangling_comments,
            post,
        })
    }

    // ---- comments ----

    pub async fn create_comment(
        &self,
        caller: Option<&Identity>,
        post_id: &str,
        body: &str,
    ) -> Result<Comment, EngageError> {
        let caller = authenticate(caller)?;
        validate_body("body", body, &self.limits)?;
        check_entity_id(EntityKind::Post, post_id)?;

        let comment = Comment::new(caller.user_id.clone(), body);
        self.store.attach_comment(post_id, &comment).await?;
        info!("user {} commented {} on post {}", caller.user_id, comment.id, post_id);
        Ok(comment)
    }

    pub async fn edit_comment(
        &self,
        caller: Option<&Identity>,
        comment_id: &str,
        body: &str,
    ) -> Result<Comment, EngageError> {
        let validation = validate_body("body", body, &self.limits);
        self.edit(caller, comment_id, validation, |comment: &mut Comment| {
            comment.body = body.to_string();
        })
        .await
    }

    pub async fn delete_comment(
        &self,
        caller: Option<&Identity>,
        comment_id: &str,
    ) -> Result<DeleteReceipt, EngageError> {
        let caller = self.authorize::<Comment>(caller, comment_id).await?;
        let receipt = self.store.delete_comment(comment_id, self.cascade).await?;
        info!(
            "user {} deleted comment {} ({} replies)",
            caller.user_id,
            comment_id,
            receipt.deleted_replies.len()
        );
        Ok(receipt)
    }

    pub async fn comments_for_post(
        &self,
        caller: Option<&Identity>,
        post_id: &str,
    ) -> Result<Vec<CommentView>, EngageError> {
        Ok(self.read_thread(caller, post_id).await?.comments)
    }

    pub async fn get_comment(&self, caller: Option<&Identity>, comment_id: &str) -> Result<CommentView, EngageError> {
        authenticate(caller)?;
        check_entity_id(EntityKind::Comment, comment_id)?;
        let comment: Comment = self.require(comment_id).await?;
        let replies: Vec<Reply> = self.store.fetch_many(&comment.replies).await?;

        let authors = views::author_ids(
            std::iter::once(comment.author_id.as_str()).chain(replies.iter().map(|reply| reply.author_id.as_str())),
        );
        let profiles = self.store.fetch_profiles(&authors).await?;
        let mut expanded = views::comment_views(vec![comment], replies, &profiles);
        expanded
            .pop()
            .ok_or_else(|| EngageError::not_found(EntityKind::Comment, comment_id))
    }

    // ---- replies ----

    pub async fn create_reply(
        &self,
        caller: Option<&Identity>,
        comment_id: &str,
        text: &str,
    ) -> Result<Reply, EngageError> {
        let caller = authenticate(caller)?;
        validate_body("text", text, &self.limits)?;
        check_entity_id(EntityKind::Comment, comment_id)?;

        let reply = Reply::new(comment_id, caller.user_id.clone(), text);
        self.store.attach_reply(comment_id, &reply).await?;
        info!("user {} replied {} to comment {}", caller.user_id, reply.id, comment_id);
        Ok(reply)
    }

    pub async fn edit_reply(&self, caller: Option<&Identity>, reply_id: &str, text: &str) -> Result<Reply, EngageError> {
        let validation = validate_body("text", text, &self.limits);
        self.edit(caller, reply_id, validation, |reply: &mut Reply| {
            reply.text = text.to_string();
        })
        .await
    }

    pub async fn delete_reply(&self, caller: Option<&Identity>, reply_id: &str) -> Result<DeleteReceipt, EngageError> {
        let caller = self.authorize::<Reply>(caller, reply_id).await?;
        let receipt = self.store.delete_reply(reply_id).await?;
        info!("user {} deleted reply {}", caller.user_id, reply_id);
        Ok(receipt)
    }

    pub async fn replies_for_comment(
        &self,
        caller: Option<&Identity>,
        comment_id: &str,
    ) -> Result<Vec<ReplyView>, EngageError> {
        Ok(self.get_comment(caller, comment_id).await?.replies)
    }

    // ---- votes ----

    pub async fn vote_post(&self, caller: Option<&Identity>, post_id: &str, action: VoteAction) -> Result<Post, EngageError> {
        self.vote(caller, post_id, action).await
    }

    pub async fn vote_comment(
        &self,
        caller: Option<&Identity>,
        comment_id: &str,
        action: VoteAction,
    ) -> Result<Comment, EngageError> {
        self.vote(caller, comment_id, action).await
    }

    pub async fn vote_reply(
        &self,
        caller: Option<&Identity>,
        reply_id: &str,
        action: VoteAction,
    ) -> Result<Reply, EngageError> {
        self.vote(caller, reply_id, action).await
    }

    // ---- profiles ----

    pub async fn set_profile(
        &self,
        caller: Option<&Identity>,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserProfile, EngageError> {
        let caller = authenticate(caller)?;
        validate_profile(first_name, last_name, &self.limits)?;

        let profile = UserProfile::new(caller.user_id.clone(), first_name.trim(), last_name.trim());
        self.store.put_profile(&profile).await?;
        debug!("user {} updated profile", caller.user_id);
        Ok(profile)
    }

    // ---- shared steps ----

    async fn require<D: Document>(&self, id: &str) -> Result<D, EngageError> {
        self.store
            .fetch::<D>(id)
            .await?
            .ok_or_else(|| EngageError::not_found(D::KIND, id))
    }

    /// Identity, id shape, existence and ownership, in that order.
    async fn authorize<'c, D: Document>(
        &self,
        caller: Option<&'c Identity>,
        id: &str,
    ) -> Result<&'c Identity, EngageError> {
        let caller = authenticate(caller)?;
        check_entity_id(D::KIND, id)?;
        let current: D = self.require(id).await?;
        ensure_can_mutate(&current, caller)?;
        Ok(caller)
    }

    async fn edit<D, F>(
        &self,
        caller: Option<&Identity>,
        id: &str,
        validation: ValidationResult<()>,
        mut apply: F,
    ) -> Result<D, EngageError>
    where
        D: Document,
        F: FnMut(&mut D),
    {
        let caller = self.authorize::<D>(caller, id).await?;
        validation?;

        // Ownership is re-checked against the document actually written.
        let updated = self
            .store
            .update(id, |doc: &mut D| {
                ensure_can_mutate(doc, caller)?;
                apply(doc);
                Ok(())
            })
            .await?;
        info!("user {} edited {} {}", caller.user_id, D::KIND, id);
        Ok(updated)
    }

    async fn vote<D: Document>(&self, caller: Option<&Identity>, id: &str, action: VoteAction) -> Result<D, EngageError> {
        let caller = authenticate(caller)?;
        check_entity_id(D::KIND, id)?;

        let updated = self
            .store
            .update(id, |doc: &mut D| {
                let transition = cast(doc, &caller.user_id, action).map_err(|rejection| rejection.into_error(D::KIND, id))?;
                debug!("{} {} by {}: {:?}", D::KIND, id, caller.user_id, transition);
                Ok(())
            })
            .await?;
        Ok(updated)
    }
}
