//! Persisted documents: posts own an ordered list of comment ids, comments own an
//! ordered list of reply ids, and replies point back at their comment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    id::generate_entity_id,
    types::EntityKind,
    vote::{Votable, Votes},
};

/// Anything with an owning user.
pub trait Authored {
    fn author_id(&self) -> &str;
}

/// A stored post, comment or reply.
pub trait Document: Authored + Votable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Monotonic write counter used for optimistic concurrency.
    fn version(&self) -> u64;

    /// Records a successful write at `at`.
    fn touch(&mut self, at: DateTime<Utc>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub votes: Votes,
    /// Comment ids in insertion order.
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Post {
    pub fn new(author_id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_entity_id(),
            author_id: author_id.into(),
            title: title.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            version: 1,
            votes: Votes::default(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub votes: Votes,
    /// Reply ids in insertion order.
    #[serde(default)]
    pub replies: Vec<String>,
}

impl Comment {
    pub fn new(author_id: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_entity_id(),
            author_id: author_id.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
            version: 1,
            votes: Votes::default(),
            replies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub author_id: String,
    /// Owning comment.
    pub comment_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub votes: Votes,
}

impl Reply {
    pub fn new(comment_id: impl Into<String>, author_id: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_entity_id(),
            author_id: author_id.into(),
            comment_id: comment_id.into(),
            text: text.into(),
            created_at: now,
            updated_at: now,
            version: 1,
            votes: Votes::default(),
        }
    }
}

macro_rules! impl_document {
    ($ty:ty, $kind:expr) => {
        impl Authored for $ty {
            fn author_id(&self) -> &str {
                &self.author_id
            }
        }

        impl Votable for $ty {
            fn votes(&self) -> &Votes {
                &self.votes
            }

            fn votes_mut(&mut self) -> &mut Votes {
                &mut self.votes
            }
        }

        impl Document for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn version(&self) -> u64 {
                self.version
            }

            fn touch(&mut self, at: DateTime<Utc>) {
                self.version += 1;
                self.updated_at = at;
            }
        }
    };
}

impl_document!(Post, EntityKind::Post);
impl_document!(Comment, EntityKind::Comment);
impl_document!(Reply, EntityKind::Reply);
