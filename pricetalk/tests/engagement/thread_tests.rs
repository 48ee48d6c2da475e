use super::support::*;

#[tokio::test]
async fn empty_comment_is_rejected_without_side_effects() {
    let forum = forum();
    let u1 = owner();
    let post = forum.create_post(Some(&u1), "Rice", "5kg jasmine").await.unwrap();

    let err = forum.create_comment(Some(&u1), &post.id, "").await.unwrap_err();
    assert_validation(&err, "body", "validation.required");

    let after: Post = stored(&forum, &post.id).await.unwrap();
    assert!(after.comments.is_empty());
    assert_eq!(forum.store().len(EntityKind::Comment), 0);
}

#[tokio::test]
async fn new_comment_is_listed_on_exactly_one_post() {
    let forum = forum();
    let u1 = owner();
    let target = forum.create_post(Some(&u1), "Rice", "5kg jasmine").await.unwrap();
    let bystander = forum.create_post(Some(&u1), "Pasta", "500g penne").await.unwrap();

    let comment = forum
        .create_comment(Some(&other()), &target.id, "Asian grocer on King St")
        .await
        .unwrap();

    let posts = forum.store().list_posts().await.unwrap();
    let listing: Vec<_> = posts.iter().filter(|post| post.comments.contains(&comment.id)).collect();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].id, target.id);
    let bystander: Post = stored(&forum, &bystander.id).await.unwrap();
    assert!(bystander.comments.is_empty());

    let thread = forum.read_thread(Some(&u1), &target.id).await.unwrap();
    assert_eq!(thread.comments.len(), 1);
    assert_eq!(thread.comments[0].comment.id, comment.id);
}

#[tokio::test]
async fn create_checks_text_before_the_parent() {
    let forum = forum();
    let missing = generate_entity_id();

    let err = forum.create_comment(None, &missing, "").await.unwrap_err();
    assert!(matches!(err, EngageError::Unauthenticated));

    let err = forum.create_comment(Some(&owner()), &missing, "").await.unwrap_err();
    assert!(matches!(err, EngageError::Validation(_)));

    let err = forum.create_comment(Some(&owner()), &missing, "hello").await.unwrap_err();
    assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Post, .. }));

    let err = forum.create_reply(Some(&owner()), &missing, "hello").await.unwrap_err();
    assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Comment, .. }));
    assert_eq!(forum.store().len(EntityKind::Reply), 0);
}

#[tokio::test]
async fn blank_reply_text_is_rejected_without_side_effects() {
    let forum = forum();
    let (_, comment, reply) = seed_thread(&forum).await;

    for text in ["", "  \t\n"] {
        let err = forum.create_reply(Some(&owner()), &comment.id, text).await.unwrap_err();
        assert_validation(&err, "text", "validation.required");

        let err = forum.edit_reply(Some(&owner()), &reply.id, text).await.unwrap_err();
        assert_validation(&err, "text", "validation.required");
    }

    let parent: Comment = stored(&forum, &comment.id).await.unwrap();
    assert_eq!(parent.replies, vec![reply.id.clone()]);
    assert_eq!(forum.store().len(EntityKind::Reply), 1);
    let kept: Reply = stored(&forum, &reply.id).await.unwrap();
    assert_eq!(kept.text, reply.text);
    assert_eq!(kept.version, reply.version);
}

#[tokio::test]
async fn new_post_reports_every_missing_field() {
    let forum = forum();
    let err = forum.create_post(Some(&owner()), " ", "").await.unwrap_err();
    assert_validation(&err, "title", "validation.required");
    assert_validation(&err, "description", "validation.required");
    assert_eq!(forum.store().len(EntityKind::Post), 0);

    let err = forum.create_post(Some(&owner()), &"x".repeat(201), "ok").await.unwrap_err();
    assert_validation(&err, "title", "validation.length");
}

#[tokio::test]
async fn thread_expands_comments_replies_and_authors() {
    let forum = forum();
    let (u1, u2) = (owner(), other());
    forum.set_profile(Some(&u1), "Normal", "UserOne").await.unwrap();

    let post = forum.create_post(Some(&u1), "Butter", "250g salted").await.unwrap();
    let first = forum.create_comment(Some(&u2), &post.id, "Lidl").await.unwrap();
    let second = forum.create_comment(Some(&u1), &post.id, "Tesco").await.unwrap();
    let r1 = forum.create_reply(Some(&u1), &first.id, "Thanks").await.unwrap();
    let r2 = forum.create_reply(Some(&u2), &first.id, "No problem").await.unwrap();

    let thread = forum.read_thread(Some(&u2), &post.id).await.unwrap();
    assert_eq!(thread.post.id, post.id);
    assert_eq!(thread.author.display_name.as_deref(), Some("Normal UserOne"));
    assert!(thread.dangling_comments.is_empty());

    let ids: Vec<_> = thread.comments.iter().map(|view| view.comment.id.as_str()).collect();
    assert_eq!(ids, [first.id.as_str(), second.id.as_str()]);

    let first_view = &thread.comments[0];
    assert_eq!(first_view.author.user_id, "u2");
    assert_eq!(first_view.author.display_name, None);
    let reply_ids: Vec<_> = first_view.replies.iter().map(|view| view.reply.id.as_str()).collect();
    assert_eq!(reply_ids, [r1.id.as_str(), r2.id.as_str()]);
    assert_eq!(first_view.replies[0].author.label(), "Normal UserOne");

    assert!(thread.comments[1].replies.is_empty());
}

#[tokio::test]
async fn thread_of_a_quiet_post_is_empty_not_an_error() {
    let forum = forum();
    let post = forum.create_post(Some(&owner()), "Flour", "Plain 1kg").await.unwrap();

    let thread = forum.read_thread(Some(&other()), &post.id).await.unwrap();
    assert!(thread.comments.is_empty());
    assert!(forum.comments_for_post(Some(&other()), &post.id).await.unwrap().is_empty());

    let comment = forum.create_comment(Some(&other()), &post.id, "Any brand").await.unwrap();
    assert!(forum.replies_for_comment(Some(&owner()), &comment.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleted_reply_disappears_from_its_comment() {
    let forum = forum();
    let (post, comment, reply) = seed_thread(&forum).await;

    let receipt = forum.delete_reply(Some(&owner()), &reply.id).await.unwrap();
    assert_eq!(receipt.detached_from.as_deref(), Some(comment.id.as_str()));

    assert!(stored::<Reply>(&forum, &reply.id).await.is_none());
    let err = forum.edit_reply(Some(&owner()), &reply.id, "again").await.unwrap_err();
    assert!(matches!(err, EngageError::NotFound { kind: EntityKind::Reply, .. }));

    let comment: Comment = stored(&forum, &comment.id).await.unwrap();
    assert!(!comment.replies.contains(&reply.id));
    let view = forum.get_comment(Some(&owner()), &comment.id).await.unwrap();
    assert!(view.replies.is_empty());
    let thread = forum.read_thread(Some(&owner()), &post.id).await.unwrap();
    assert!(thread.comments[0].replies.is_empty());
}

#[tokio::test]
async fn reads_need_an_identity() {
    let forum = forum();
    let (post, comment, _) = seed_thread(&forum).await;

    assert!(matches!(
        forum.read_thread(None, &post.id).await.unwrap_err(),
        EngageError::Unauthenticated
    ));
    assert!(matches!(
        forum.list_posts(None, PostSort::Newest).await.unwrap_err(),
        EngageError::Unauthenticated
    ));
    assert!(matches!(
        forum.get_comment(None, &comment.id).await.unwrap_err(),
        EngageError::Unauthenticated
    ));
}

#[tokio::test]
async fn listing_sorts_and_counts_comments() {
    let forum = forum();
    let (u1, u2) = (owner(), other());
    let quiet = forum.create_post(Some(&u1), "Quiet", "no comments").await.unwrap();
    let busy = forum.create_post(Some(&u2), "Busy", "two comments").await.unwrap();
    let loved = forum.create_post(Some(&u1), "Loved", "one like").await.unwrap();

    forum.create_comment(Some(&u1), &busy.id, "one").await.unwrap();
    forum.create_comment(Some(&u1), &busy.id, "two").await.unwrap();
    forum.vote_post(Some(&u2), &loved.id, VoteAction::Like).await.unwrap();

    let by_comments = forum.list_posts(Some(&u1), PostSort::MostComments).await.unwrap();
    assert_eq!(by_comments[0].post.id, busy.id);
    assert_eq!(by_comments[0].comment_count, 2);
    assert_eq!(by_comments[0].author.user_id, "u2");

    let by_likes = forum.list_posts(Some(&u1), PostSort::MostLikes).await.unwrap();
    assert_eq!(by_likes[0].post.id, loved.id);

    let oldest = forum.list_posts(Some(&u1), PostSort::Oldest).await.unwrap();
    assert_eq!(oldest.len(), 3);
    assert!(oldest.windows(2).all(|pair| pair[0].post.created_at <= pair[1].post.created_at));
    let newest = forum.list_posts(Some(&u1), PostSort::default()).await.unwrap();
    assert!(newest.windows(2).all(|pair| pair[0].post.created_at >= pair[1].post.created_at));
    assert!(newest.iter().any(|view| view.post.id == quiet.id));
}

#[tokio::test]
async fn profile_needs_a_first_name() {
    let forum = forum();
    let err = forum.set_profile(Some(&owner()), "", "Smith").await.unwrap_err();
    assert_validation(&err, "first_name", "validation.required");

    let profile = forum.set_profile(Some(&owner()), " Ada ", "Lovelace").await.unwrap();
    assert_eq!(profile.display_name().as_deref(), Some("Ada Lovelace"));
}
