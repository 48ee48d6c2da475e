use super::support::*;

#[tokio::test]
async fn repeated_like_is_rejected_and_counts_once() {
    let forum = forum();
    let (u1, u2) = (owner(), other());
    let post = forum.create_post(Some(&u1), "Milk", "Full cream 2L").await.unwrap();

    let liked = forum.vote_post(Some(&u2), &post.id, VoteAction::Like).await.unwrap();
    assert_eq!(liked.votes.likes(), 1);
    assert!(liked.votes.liked_by().contains("u2"));

    let err = forum.vote_post(Some(&u2), &post.id, VoteAction::Like).await.unwrap_err();
    assert!(matches!(
        err,
        EngageError::AlreadyVoted {
            kind: EntityKind::Post,
            stance: Stance::Like,
            ..
        }
    ));
    assert_eq!(err.to_string(), "you have already liked this post");

    let after: Post = stored(&forum, &post.id).await.unwrap();
    assert_eq!(after.votes.likes(), 1);
    assert_eq!(after.version, liked.version, "rejected vote must not write");
}

#[tokio::test]
async fn dislike_after_like_switches_the_vote() {
    let forum = forum();
    let (u1, u2) = (owner(), other());
    let post = forum.create_post(Some(&u1), "Milk", "Full cream 2L").await.unwrap();

    forum.vote_post(Some(&u2), &post.id, VoteAction::Like).await.unwrap();
    let switched = forum.vote_post(Some(&u2), &post.id, VoteAction::Dislike).await.unwrap();

    assert_eq!(switched.votes.likes(), 0);
    assert_eq!(switched.votes.dislikes(), 1);
    assert!(switched.votes.disliked_by().contains("u2"));
    assert!(!switched.votes.liked_by().contains("u2"));
    assert!(switched.votes.is_consistent());
}

#[tokio::test]
async fn withdrawing_a_vote_that_was_never_cast_fails() {
    let forum = forum();
    let (u1, u2) = (owner(), other());
    let post = forum.create_post(Some(&u1), "Milk", "Full cream 2L").await.unwrap();

    let err = forum.vote_post(Some(&u2), &post.id, VoteAction::Unlike).await.unwrap_err();
    assert!(matches!(err, EngageError::NotVoted { stance: Stance::Like, .. }));
    assert_eq!(err.code(), "not_voted");

    forum.vote_post(Some(&u2), &post.id, VoteAction::Dislike).await.unwrap();
    let err = forum.vote_post(Some(&u2), &post.id, VoteAction::Unlike).await.unwrap_err();
    assert!(matches!(err, EngageError::NotVoted { stance: Stance::Like, .. }));

    let cleared = forum.vote_post(Some(&u2), &post.id, VoteAction::Undislike).await.unwrap();
    assert_eq!((cleared.votes.likes(), cleared.votes.dislikes()), (0, 0));
}

#[tokio::test]
async fn comments_and_replies_share_the_same_rules() {
    let forum = forum();
    let (_, comment, reply) = seed_thread(&forum).await;
    let u2 = other();

    let comment = forum.vote_comment(Some(&u2), &comment.id, VoteAction::Dislike).await.unwrap();
    assert_eq!(comment.votes.dislikes(), 1);
    let err = forum.vote_comment(Some(&u2), &comment.id, VoteAction::Dislike).await.unwrap_err();
    assert!(matches!(err, EngageError::AlreadyVoted { kind: EntityKind::Comment, .. }));

    let reply = forum.vote_reply(Some(&u2), &reply.id, VoteAction::Like).await.unwrap();
    let reply = forum.vote_reply(Some(&u2), &reply.id, VoteAction::Unlike).await.unwrap();
    assert_eq!(reply.votes.likes(), 0);
    assert!(reply.votes.liked_by().is_empty());
}

#[tokio::test]
async fn votes_leave_text_and_membership_alone() {
    let forum = forum();
    let (post, comment, _) = seed_thread(&forum).await;

    let voted = forum.vote_post(Some(&other()), &post.id, VoteAction::Like).await.unwrap();
    assert_eq!(voted.title, post.title);
    assert_eq!(voted.comments, vec![comment.id]);
}

#[tokio::test]
async fn deleted_entities_cannot_be_voted_on() {
    let forum = forum();
    let (post, comment, reply) = seed_thread(&forum).await;
    let me = owner();

    forum.delete_reply(Some(&me), &reply.id).await.unwrap();
    forum.delete_post(Some(&me), &post.id).await.unwrap();

    for action in [VoteAction::Like, VoteAction::Unlike, VoteAction::Dislike, VoteAction::Undislike] {
        let err = forum.vote_post(Some(&me), &post.id, action).await.unwrap_err();
        assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Post, .. }));
        let err = forum.vote_comment(Some(&me), &comment.id, action).await.unwrap_err();
        assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Comment, .. }));
        let err = forum.vote_reply(Some(&me), &reply.id, action).await.unwrap_err();
        assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Reply, .. }));
    }
}

#[tokio::test]
async fn voting_requires_an_identity_and_a_well_formed_id() {
    let forum = forum();
    let post = forum.create_post(Some(&owner()), "Milk", "Full cream 2L").await.unwrap();

    let err = forum.vote_post(None, &post.id, VoteAction::Like).await.unwrap_err();
    assert!(matches!(err, EngageError::Unauthenticated));

    let err = forum.vote_post(Some(&other()), "../etc/passwd", VoteAction::Like).await.unwrap_err();
    assert_validation(&err, "post_id", "validation.id");

    let missing = generate_entity_id();
    let err = forum.vote_post(Some(&other()), &missing, VoteAction::Like).await.unwrap_err();
    assert!(matches!(err, EngageError::NotFound { .. }));
}
