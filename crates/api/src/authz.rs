//! Ownership checks on per-customer records.

use core::fmt;

use bilemo_core::{CustomerName, Identity};
use thiserror::Error;
use tracing::info;

/// Message returned to clients on a refused action.
pub const ACCESS_DENIED: &str = "You don't have rights to do that. Please try again !";

/// What the caller wants to do with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::View => "view",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A record that belongs to one customer.
pub trait Owned {
    fn owner(&self) -> &CustomerName;
}

/// The identity does not own the record it tried to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{ACCESS_DENIED}")]
pub struct AccessDenied {
    pub action: Action,
}

/// Grants view, update and delete only to a record's owner.
pub struct OwnershipAuthorizer;

impl OwnershipAuthorizer {
    /// Check that `identity` owns `record`.
    ///
    /// The same rule applies to every action. Store errors and missing
    /// records are handled before this is called.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the owner's name differs from the
    /// identity's.
    pub fn authorize<T: Owned>(
        action: Action,
        identity: &Identity,
        record: &T,
    ) -> Result<(), AccessDenied> {
        if identity.owns(record.owner()) {
            return Ok(());
        }
        info!(
            %action,
            customer = %identity.name,
            owner = %record.owner(),
            "Access denied"
        );
        Err(AccessDenied { action })
    }
}
