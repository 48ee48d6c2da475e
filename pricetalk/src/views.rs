//! Read compositions: documents expanded with their children and author display data.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

use serde::Serialize;

use crate::{
    entities::{Comment, Post, Reply},
    types::UserProfile,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AuthorView {
    pub fn resolve(user_id: &str, profiles: &HashMap<String, UserProfile>) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: profiles.get(user_id).and_then(UserProfile::display_name),
        }
    }

    /// Display name, falling back to the raw user id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    pub reply: Reply,
    pub author: AuthorView,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: AuthorView,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author: AuthorView,
    pub comment_count: usize,
}

/// A post with its comments and their replies, in list order.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub post: Post,
    pub author: AuthorView,
    pub comments: Vec<CommentView>,
    /// Comment ids still listed on the post whose documents are gone.
    pub dangling_comments: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    MostLikes,
    MostComments,
}

impl PostSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PostSort::Newest => "newest",
            PostSort::Oldest => "oldest",
            PostSort::MostLikes => "most_likes",
            PostSort::MostComments => "most_comments",
        }
    }

    pub fn apply(self, posts: &mut [Post]) {
        match self {
            PostSort::Newest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::Oldest => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            PostSort::MostLikes => posts.sort_by(|a, b| {
                b.votes
                    .likes()
                    .cmp(&a.votes.likes())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            PostSort::MostComments => posts.sort_by(|a, b| {
                b.comments
                    .len()
                    .cmp(&a.comments.len())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "newest" => Ok(PostSort::Newest),
            "oldest" => Ok(PostSort::Oldest),
            "most_likes" | "most-likes" => Ok(PostSort::MostLikes),
            "most_comments" | "most-comments" => Ok(PostSort::MostComments),
            other => Err(format!("unknown sort '{other}'")),
        }
    }
}

/// Distinct author ids, first occurrence order.
pub(crate) fn author_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

pub(crate) fn reply_view(reply: Reply, profiles: &HashMap<String, UserProfile>) -> ReplyView {
    let author = AuthorView::resolve(&reply.author_id, profiles);
    ReplyView { reply, author }
}

/// Expands each comment with the replies it lists. Listed ids with no reply document are skipped.
pub(crate) fn comment_views(
    comments: Vec<Comment>,
    replies: Vec<Reply>,
    profiles: &HashMap<String, UserProfile>,
) -> Vec<CommentView> {
    let mut by_id: HashMap<String, Reply> = replies.into_iter().map(|reply| (reply.id.clone(), reply)).collect();
    comments
        .into_iter()
        .map(|comment| {
            let replies = comment
                .replies
                .iter()
                .filter_map(|id| by_id.remove(id))
                .map(|reply| reply_view(reply, profiles))
                .collect();
            let author = AuthorView::resolve(&comment.author_id, profiles);
            CommentView {
                comment,
                author,
                replies,
            }
        })
        .collect()
}
