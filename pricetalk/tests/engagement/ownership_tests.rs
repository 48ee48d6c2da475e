use super::support::*;

fn assert_unauthorized(err: EngageError, expected: EntityKind) {
    match err {
        EngageError::Unauthorized { kind, .. } => assert_eq!(kind, expected),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn strangers_cannot_edit_anything() {
    let forum = forum();
    let (post, comment, reply) = seed_thread(&forum).await;
    let stranger = other();

    let err = forum
        .edit_post(Some(&stranger), &post.id, Some("Hijacked"), None)
        .await
        .unwrap_err();
    assert_unauthorized(err, EntityKind::Post);
    let err = forum.edit_comment(Some(&stranger), &comment.id, "spam").await.unwrap_err();
    assert_unauthorized(err, EntityKind::Comment);
    let err = forum.edit_reply(Some(&stranger), &reply.id, "spam").await.unwrap_err();
    assert_unauthorized(err, EntityKind::Reply);

    let after: Post = stored(&forum, &post.id).await.unwrap();
    assert_eq!(after.title, post.title);
    let after: Comment = stored(&forum, &comment.id).await.unwrap();
    assert_eq!(after.body, comment.body);
    let after: Reply = stored(&forum, &reply.id).await.unwrap();
    assert_eq!(after.text, reply.text);
}

#[tokio::test]
async fn strangers_cannot_delete_anything() {
    let forum = forum();
    let (post, comment, reply) = seed_thread(&forum).await;
    let stranger = other();

    let err = forum.delete_reply(Some(&stranger), &reply.id).await.unwrap_err();
    assert_unauthorized(err, EntityKind::Reply);
    let err = forum.delete_comment(Some(&stranger), &comment.id).await.unwrap_err();
    assert_unauthorized(err, EntityKind::Comment);
    let err = forum.delete_post(Some(&stranger), &post.id).await.unwrap_err();
    assert_unauthorized(err, EntityKind::Post);

    assert!(stored::<Post>(&forum, &post.id).await.is_some());
    assert!(stored::<Comment>(&forum, &comment.id).await.is_some());
    let comment: Comment = stored(&forum, &comment.id).await.unwrap();
    assert_eq!(comment.replies, vec![reply.id]);
}

#[tokio::test]
async fn admins_may_edit_and_delete_everything() {
    let forum = forum();
    let (post, comment, reply) = seed_thread(&forum).await;
    let admin = moderator();

    let edited = forum
        .edit_post(Some(&admin), &post.id, None, Some("Moderated description"))
        .await
        .unwrap();
    assert_eq!(edited.description, "Moderated description");
    assert_eq!(edited.title, post.title);
    assert_eq!(edited.author_id, "u1");

    forum.edit_comment(Some(&admin), &comment.id, "Moderated").await.unwrap();
    forum.edit_reply(Some(&admin), &reply.id, "Moderated").await.unwrap();

    forum.delete_reply(Some(&admin), &reply.id).await.unwrap();
    forum.delete_comment(Some(&admin), &comment.id).await.unwrap();
    forum.delete_post(Some(&admin), &post.id).await.unwrap();
    assert!(stored::<Post>(&forum, &post.id).await.is_none());
}

#[tokio::test]
async fn comment_owner_or_admin_can_delete_but_not_others() {
    let forum = forum();
    let (u1, u2) = (owner(), other());
    let post = forum.create_post(Some(&u2), "Coffee beans", "1kg bags").await.unwrap();
    let first = forum.create_comment(Some(&u1), &post.id, "Costco").await.unwrap();
    let second = forum.create_comment(Some(&u1), &post.id, "Online").await.unwrap();

    // u2 owns the post, not the comment.
    let err = forum.delete_comment(Some(&u2), &first.id).await.unwrap_err();
    assert_unauthorized(err, EntityKind::Comment);

    forum.delete_comment(Some(&u1), &first.id).await.unwrap();
    forum.delete_comment(Some(&moderator()), &second.id).await.unwrap();
    assert!(stored::<Comment>(&forum, &first.id).await.is_none());
    assert!(stored::<Comment>(&forum, &second.id).await.is_none());
}

#[tokio::test]
async fn edits_keep_votes_and_children() {
    let forum = forum();
    let (post, comment, reply) = seed_thread(&forum).await;
    forum.vote_post(Some(&other()), &post.id, VoteAction::Like).await.unwrap();
    forum.vote_comment(Some(&other()), &comment.id, VoteAction::Dislike).await.unwrap();

    let edited = forum
        .edit_post(Some(&owner()), &post.id, Some("Cheapest eggs (updated)"), None)
        .await
        .unwrap();
    assert_eq!(edited.votes.likes(), 1);
    assert_eq!(edited.comments, vec![comment.id.clone()]);
    assert!(edited.updated_at >= edited.created_at);

    let edited = forum.edit_comment(Some(&owner()), &comment.id, "Aldi, 4.10 now").await.unwrap();
    assert_eq!(edited.votes.dislikes(), 1);
    assert_eq!(edited.replies, vec![reply.id]);
}

#[tokio::test]
async fn edit_checks_run_in_a_fixed_order() {
    let forum = forum();
    let (post, comment, _) = seed_thread(&forum).await;

    let err = forum.edit_comment(None, "bogus", "").await.unwrap_err();
    assert!(matches!(err, EngageError::Unauthenticated));

    let err = forum.edit_comment(Some(&other()), "bogus", "").await.unwrap_err();
    assert_validation(&err, "comment_id", "validation.id");

    let err = forum
        .edit_comment(Some(&other()), &generate_entity_id(), "")
        .await
        .unwrap_err();
    assert!(matches!(err, EngageError::NotFound { .. }));

    let err = forum.edit_comment(Some(&other()), &comment.id, "").await.unwrap_err();
    assert!(matches!(err, EngageError::Unauthorized { .. }));

    let err = forum.edit_comment(Some(&owner()), &comment.id, "   ").await.unwrap_err();
    assert_validation(&err, "body", "validation.required");

    let err = forum.edit_post(Some(&owner()), &post.id, None, None).await.unwrap_err();
    assert_validation(&err, "title|description", "validation.required");
    let err = forum
        .edit_post(Some(&owner()), &post.id, Some(""), Some("fine"))
        .await
        .unwrap_err();
    assert_validation(&err, "title", "validation.required");
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
    let forum = forum();
    let (_, _, reply) = seed_thread(&forum).await;

    forum.delete_reply(Some(&owner()), &reply.id).await.unwrap();
    let err = forum.delete_reply(Some(&owner()), &reply.id).await.unwrap_err();
    assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Reply, .. }));
    let err = forum.edit_reply(Some(&owner()), &reply.id, "back?").await.unwrap_err();
    assert!(matches!(err, EngageError::NotFound { .. }));
}
