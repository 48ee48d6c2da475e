//! Authentication and ownership checks.
//!
//! There are exactly two roles: the owner of an entity and an admin. Admins bypass
//! ownership for every entity kind.

use crate::{
    entities::{Authored, Document},
    errors::EngageError,
    types::Identity,
};

/// Fails closed when the identity provider resolved nobody.
pub fn authenticate(caller: Option<&Identity>) -> Result<&Identity, EngageError> {
    caller.ok_or(EngageError::Unauthenticated)
}

/// `entity.author == caller.user_id || caller.is_admin`
pub fn can_mutate<A>(entity: &A, caller: &Identity) -> bool
where
    A: Authored + ?Sized,
{
    caller.is_admin || entity.author_id() == caller.user_id
}

/// Returns `Unauthorized` unless [`can_mutate`] holds.
pub fn ensure_can_mutate<D: Document>(entity: &D, caller: &Identity) -> Result<(), EngageError> {
    if can_mutate(entity, caller) {
        Ok(())
    } else {
        log::debug!(
            "user {} denied mutation of {} {}",
            caller.user_id,
            D::KIND,
            entity.id()
        );
        Err(EngageError::unauthorized(D::KIND, entity.id()))
    }
}
