//! Engagement core for the price comparison community: posts, comments, replies,
//! votes, and the ownership rules around them.
//!
//! [`Forum`] is the entry point. It runs over any [`EntityStore`]; [`MemoryStore`]
//! keeps everything in process and [`RedisStore`] persists documents in Redis with
//! Lua-scripted atomic writes.

pub mod config;
pub mod entities;
pub mod errors;
pub mod forum;
pub mod guard;
pub mod id;
pub mod keys;
pub mod runtime;
pub mod store;
pub mod types;
pub mod validators;
pub mod views;
pub mod vote;

pub use config::{CascadePolicy, Settings, TextLimits};
pub use entities::{Authored, Comment, Document, Post, Reply};
pub use errors::{EngageError, StoreError, ValidationError, ValidationIssue};
pub use forum::Forum;
pub use store::{DeleteReceipt, EntityStore, MemoryStore, RedisStore};
pub use types::{EntityKind, Identity, Stance, UserProfile};
pub use views::{AuthorView, CommentView, PostSort, PostView, ReplyView, Thread};
pub use vote::{Transition, VoteAction, Votes};
