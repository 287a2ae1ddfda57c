//! Business logic services for the API.
//!
//! Each service borrows the shared [`AppState`](crate::state::AppState) for
//! the length of one request and strings the core pieces together: the
//! ownership check first, then the cached read or the validated write, then
//! pagination.
//!
//! # Services
//!
//! - `phones` - Catalog listing and maintenance (no ownership)
//! - `users` - End-users of the acting customer (ownership-checked, cached per customer)
//! - `customers` - Read-only customer directory
//! - `tokens` - API token generation and hashing

pub mod customers;
pub mod phones;
pub mod tokens;
pub mod users;

pub use customers::CustomerService;
pub use phones::PhoneService;
pub use users::UserService;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::updater::UpdateError;

/// Error for a record id that resolves to nothing.
pub(crate) fn not_found(kind: &str) -> AppError {
    AppError::NotFound(format!("{kind} object not found"))
}

/// Map a store error, naming `kind` when the record is missing.
pub(crate) fn missing_as(kind: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => not_found(kind),
        other => other.into(),
    }
}

/// Map an update failure, naming `kind` when the record vanished before the
/// save.
pub(crate) fn update_missing_as(kind: &'static str) -> impl Fn(UpdateError) -> AppError {
    move |err| match err {
        UpdateError::Repository(RepositoryError::NotFound) => not_found(kind),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrors;

    #[test]
    fn test_vanished_record_is_named() {
        let err = update_missing_as("User")(UpdateError::Repository(RepositoryError::NotFound));
        assert!(matches!(err, AppError::NotFound(msg) if msg == "User object not found"));

        let err = missing_as("Phone")(RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Phone object not found"));
    }

    #[test]
    fn test_other_update_errors_pass_through() {
        let err = update_missing_as("Phone")(UpdateError::NothingToUpdate);
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = update_missing_as("Phone")(UpdateError::Invalid(ValidationErrors::new()));
        assert!(matches!(err, AppError::Validation(_)));

        let err = update_missing_as("User")(UpdateError::Repository(RepositoryError::Conflict(
            "taken".to_owned(),
        )));
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
