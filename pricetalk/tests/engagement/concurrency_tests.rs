use std::collections::HashSet;
use std::thread;

use super::support::*;

/// Runs `task` on its own single-threaded runtime.
fn block_on<F: std::future::Future>(task: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(task)
}

#[test]
fn concurrent_votes_keep_counters_and_sets_in_step() {
    const VOTERS: usize = 16;
    let forum = forum();
    let post = block_on(forum.create_post(Some(&owner()), "Avocados", "Price per kg")).unwrap();

    thread::scope(|scope| {
        for n in 0..VOTERS {
            let forum = &forum;
            let post_id = post.id.as_str();
            scope.spawn(move || {
                let voter = Identity::user(format!("voter-{n}"));
                block_on(async {
                    forum.vote_post(Some(&voter), post_id, VoteAction::Like).await.unwrap();
                    if n % 2 == 0 {
                        forum.vote_post(Some(&voter), post_id, VoteAction::Dislike).await.unwrap();
                    }
                    if n % 4 == 0 {
                        forum.vote_post(Some(&voter), post_id, VoteAction::Undislike).await.unwrap();
                    }
                });
            });
        }
    });

    let after: Post = block_on(stored(&forum, &post.id)).unwrap();
    assert_eq!(after.votes.likes(), 8);
    assert_eq!(after.votes.dislikes(), 4);
    assert!(after.votes.is_consistent());
    assert!(after.votes.liked_by().is_disjoint(after.votes.disliked_by()));
}

#[test]
fn racing_duplicate_likes_count_once() {
    let forum = forum();
    let post = block_on(forum.create_post(Some(&owner()), "Avocados", "Price per kg")).unwrap();

    let accepted: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let forum = &forum;
                let post_id = post.id.as_str();
                scope.spawn(move || {
                    let voter = other();
                    block_on(forum.vote_post(Some(&voter), post_id, VoteAction::Like)).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("voter thread"))
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(accepted, 1);
    let after: Post = block_on(stored(&forum, &post.id)).unwrap();
    assert_eq!(after.votes.likes(), 1);
}

#[test]
fn concurrent_comments_are_all_listed_once() {
    const WRITERS: usize = 8;
    const PER_WRITER: usize = 5;
    let forum = forum();
    let post = block_on(forum.create_post(Some(&owner()), "Avocados", "Price per kg")).unwrap();

    thread::scope(|scope| {
        for n in 0..WRITERS {
            let forum = &forum;
            let post_id = post.id.as_str();
            scope.spawn(move || {
                let writer = Identity::user(format!("writer-{n}"));
                block_on(async {
                    for i in 0..PER_WRITER {
                        forum
                            .create_comment(Some(&writer), post_id, &format!("price #{i}"))
                            .await
                            .unwrap();
                    }
                });
            });
        }
    });

    let after: Post = block_on(stored(&forum, &post.id)).unwrap();
    assert_eq!(after.comments.len(), WRITERS * PER_WRITER);
    let distinct: HashSet<_> = after.comments.iter().collect();
    assert_eq!(distinct.len(), WRITERS * PER_WRITER);
    assert_eq!(forum.store().len(EntityKind::Comment), WRITERS * PER_WRITER);
}
