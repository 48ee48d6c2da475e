pub mod comment;
pub mod post;
pub mod profile;
pub mod reply;
pub mod thread;
pub mod vote;
