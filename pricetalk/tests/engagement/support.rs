#![allow(dead_code)]

pub(crate) use pricetalk::{
    CascadePolicy, Comment, EngageError, EntityKind, EntityStore, Forum, Identity, MemoryStore, Post, PostSort,
    Reply, Stance, VoteAction, id::generate_entity_id,
};

pub(crate) fn owner() -> Identity {
    Identity::user("u1")
}

pub(crate) fn other() -> Identity {
    Identity::user("u2")
}

pub(crate) fn moderator() -> Identity {
    Identity::admin("mod")
}

pub(crate) fn forum() -> Forum<MemoryStore> {
    Forum::new(MemoryStore::new())
}

pub(crate) fn forum_with(policy: CascadePolicy) -> Forum<MemoryStore> {
    Forum::new(MemoryStore::new()).with_cascade(policy)
}

/// A post by `owner()` with one comment and one reply, both also by `owner()`.
pub(crate) async fn seed_thread(forum: &Forum<MemoryStore>) -> (Post, Comment, Reply) {
    let me = owner();
    let post = forum
        .create_post(Some(&me), "Cheapest eggs", "Dozen free range, which store?")
        .await
        .expect("create post");
    let comment = forum
        .create_comment(Some(&me), &post.id, "Aldi had them at 4.20")
        .await
        .expect("create comment");
    let reply = forum
        .create_reply(Some(&me), &comment.id, "Still true on Sunday")
        .await
        .expect("create reply");
    (post, comment, reply)
}

pub(crate) async fn stored<D: pricetalk::Document>(forum: &Forum<MemoryStore>, id: &str) -> Option<D> {
    forum.store().fetch::<D>(id).await.expect("fetch")
}

pub(crate) fn assert_validation(err: &EngageError, field: &str, code: &str) {
    match err {
        EngageError::Validation(validation) => {
            assert!(
                validation.issues.iter().any(|issue| issue.field == field && issue.code == code),
                "expected {field}/{code}, got {:?}",
                validation.issues
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
