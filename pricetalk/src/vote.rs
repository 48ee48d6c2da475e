//! Like/dislike state machine shared by posts, comments and replies.
//!
//! The liker and disliker sets are the source of truth. The `likes` and `dislikes`
//! counters are denormalised copies for cheap reads, and every counter change here is
//! paired with the matching set change so `likes == |liked_by|` and
//! `dislikes == |disliked_by|` always hold.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    errors::EngageError,
    types::{EntityKind, Stance},
};

/// Vote tallies embedded in every votable document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    dislikes: u64,
    #[serde(default)]
    liked_by: BTreeSet<String>,
    #[serde(default)]
    disliked_by: BTreeSet<String>,
}

impl Votes {
    pub fn likes(&self) -> u64 {
        self.likes
    }

    pub fn dislikes(&self) -> u64 {
        self.dislikes
    }

    pub fn liked_by(&self) -> &BTreeSet<String> {
        &self.liked_by
    }

    pub fn disliked_by(&self) -> &BTreeSet<String> {
        &self.disliked_by
    }

    /// The stance `user_id` currently holds, if any.
    pub fn stance_of(&self, user_id: &str) -> Option<Stance> {
        if self.liked_by.contains(user_id) {
            Some(Stance::Like)
        } else if self.disliked_by.contains(user_id) {
            Some(Stance::Dislike)
        } else {
            None
        }
    }

    /// Counter/set parity and like/dislike exclusivity.
    pub fn is_consistent(&self) -> bool {
        self.likes == self.liked_by.len() as u64
            && self.dislikes == self.disliked_by.len() as u64
            && self.liked_by.is_disjoint(&self.disliked_by)
    }

    fn side(&self, stance: Stance) -> &BTreeSet<String> {
        match stance {
            Stance::Like => &self.liked_by,
            Stance::Dislike => &self.disliked_by,
        }
    }

    fn side_mut(&mut self, stance: Stance) -> (&mut u64, &mut BTreeSet<String>) {
        match stance {
            Stance::Like => (&mut self.likes, &mut self.liked_by),
            Stance::Dislike => (&mut self.dislikes, &mut self.disliked_by),
        }
    }

    fn add(&mut self, stance: Stance, user_id: &str) {
        let (counter, set) = self.side_mut(stance);
        if set.insert(user_id.to_string()) {
            *counter += 1;
        }
    }

    fn remove(&mut self, stance: Stance, user_id: &str) -> bool {
        let (counter, set) = self.side_mut(stance);
        let removed = set.remove(user_id);
        if removed {
            *counter = counter.saturating_sub(1);
        }
        removed
    }
}

/// Capability of anything carrying a [`Votes`] block.
pub trait Votable {
    fn votes(&self) -> &Votes;
    fn votes_mut(&mut self) -> &mut Votes;
}

impl Votable for Votes {
    fn votes(&self) -> &Votes {
        self
    }

    fn votes_mut(&mut self) -> &mut Votes {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Like,
    Unlike,
    Dislike,
    Undislike,
}

impl VoteAction {
    pub fn stance(self) -> Stance {
        match self {
            VoteAction::Like | VoteAction::Unlike => Stance::Like,
            VoteAction::Dislike | VoteAction::Undislike => Stance::Dislike,
        }
    }

    pub fn is_retraction(self) -> bool {
        matches!(self, VoteAction::Unlike | VoteAction::Undislike)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteAction::Like => "like",
            VoteAction::Unlike => "unlike",
            VoteAction::Dislike => "dislike",
            VoteAction::Undislike => "undislike",
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "like" => Ok(VoteAction::Like),
            "unlike" => Ok(VoteAction::Unlike),
            "dislike" => Ok(VoteAction::Dislike),
            "undislike" => Ok(VoteAction::Undislike),
            other => Err(format!("unknown vote action '{other}'")),
        }
    }
}

/// What a successful vote did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Cast(Stance),
    /// The opposite vote was withdrawn before casting this one.
    Switched { from: Stance, to: Stance },
    Retracted(Stance),
}

/// A vote that conflicts with the caller's current membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyVoted(Stance),
    NotVoted(Stance),
}

impl Rejection {
    pub fn into_error(self, kind: EntityKind, id: impl Into<String>) -> EngageError {
        let id = id.into();
        match self {
            Rejection::AlreadyVoted(stance) => EngageError::AlreadyVoted { kind, id, stance },
            Rejection::NotVoted(stance) => EngageError::NotVoted { kind, id, stance },
        }
    }
}

/// Applies `action` by `user_id` to `target`.
///
/// All checks happen before the first write, so a rejection leaves `target` untouched.
pub fn cast<V>(target: &mut V, user_id: &str, action: VoteAction) -> Result<Transition, Rejection>
where
    V: Votable + ?Sized,
{
    let votes = target.votes_mut();
    let stance = action.stance();

    if action.is_retraction() {
        if !votes.remove(stance, user_id) {
            return Err(Rejection::NotVoted(stance));
        }
        return Ok(Transition::Retracted(stance));
    }

    if votes.side(stance).contains(user_id) {
        return Err(Rejection::AlreadyVoted(stance));
    }
    let switched = votes.remove(stance.opposite(), user_id);
    votes.add(stance, user_id);

    Ok(if switched {
        Transition::Switched {
            from: stance.opposite(),
            to: stance,
        }
    } else {
        Transition::Cast(stance)
    })
}
