use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The three votable, ownable document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Post,
    Comment,
    Reply,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Post, EntityKind::Comment, EntityKind::Reply];

    /// Collection name used for storage keys.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Post => "posts",
            EntityKind::Comment => "comments",
            EntityKind::Reply => "replies",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Post => "post",
            EntityKind::Comment => "comment",
            EntityKind::Reply => "reply",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "post" | "posts" => Ok(EntityKind::Post),
            "comment" | "comments" => Ok(EntityKind::Comment),
            "reply" | "replies" => Ok(EntityKind::Reply),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Which side of the like/dislike pair a vote sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Like,
    Dislike,
}

impl Stance {
    pub fn opposite(self) -> Stance {
        match self {
            Stance::Like => Stance::Dislike,
            Stance::Dislike => Stance::Like,
        }
    }

    /// Past-tense verb, as in "already liked".
    pub fn past_tense(self) -> &'static str {
        match self {
            Stance::Like => "liked",
            Stance::Dislike => "disliked",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.past_tense())
    }
}

/// Caller identity resolved by the external identity provider.
///
/// The core trusts this value verbatim; it never derives one on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Identity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            is_admin: true,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Display data for an author, keyed by the same opaque user id the identity provider issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last", trimmed; `None` when both parts are blank.
    pub fn display_name(&self) -> Option<String> {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let trimmed = joined.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }
}
