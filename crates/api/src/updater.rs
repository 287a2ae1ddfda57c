//! Sparse updates applied through per-kind field-setter tables.
//!
//! A client sends a JSON object with only the fields it wants to change. Each
//! key with a non-empty value is looked up in the record kind's setter table
//! (see [`Writable::setters`]); keys with no setter are ignored. The changes
//! land on a copy of the record which is validated as a whole. Only a valid
//! copy is saved, and only a saved copy replaces the caller's record, so an
//! update either applies completely or not at all.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::db::{RecordWriter, RepositoryError};
use crate::models::Writable;
use crate::validation::{Validate, ValidationErrors};

/// Message returned when a document changes nothing.
pub const NOTHING_TO_UPDATE: &str =
    "No data transmitted. Please refer to the documentation @ /api/doc";

/// One entry of a field-setter table.
pub struct FieldSetter<R> {
    /// JSON key this setter answers to.
    pub field: &'static str,
    /// Writes the value onto the record, or explains the type mismatch.
    pub apply: fn(&mut R, &Value) -> Result<(), String>,
}

/// Read a string value for a setter.
///
/// # Errors
///
/// Returns a validation message when `value` is not a JSON string.
pub fn text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| "This value should be of type string.".to_owned())
}

/// Read a 32-bit integer value for a setter.
///
/// # Errors
///
/// Returns a validation message when `value` is not an integer in range.
pub fn integer(value: &Value) -> Result<i32, String> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| "This value should be of type integer.".to_owned())
}

/// A sparse field-name → value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDocument(Map<String, Value>);

impl UpdateDocument {
    /// Wrap a decoded body. Anything other than a JSON object carries no
    /// fields.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Decode a request body.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not valid JSON.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Self::from_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Map<String, Value>> for UpdateDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Whether a value counts as "not provided".
///
/// Null, `false`, zero, `""`, `"0"` and empty arrays/objects are skipped
/// exactly like absent keys.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Why an update or creation was refused.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// No key of the document matched a setter with a non-empty value.
    #[error("{NOTHING_TO_UPDATE}")]
    NothingToUpdate,

    /// The mutated record failed validation; nothing was saved.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The store refused the commit.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Applies update documents and commits valid results through a store.
pub struct PartialUpdater<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ?Sized> PartialUpdater<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Apply `document` to a copy of `target` and validate the copy.
    ///
    /// Pure: neither `target` nor any store is touched.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::NothingToUpdate`] if no key was applied.
    /// - [`UpdateError::Invalid`] with every type mismatch and rule violation.
    pub fn apply<R: Writable>(document: &UpdateDocument, target: &R) -> Result<R, UpdateError> {
        let mut candidate = target.clone();
        let mut errors = ValidationErrors::new();
        let mut applied = 0usize;

        for (key, value) in document.iter() {
            if key.is_empty() || is_blank(value) {
                continue;
            }
            let Some(setter) = R::setters().iter().find(|s| s.field == key) else {
                debug!(field = key, "ignoring unknown field");
                continue;
            };
            applied += 1;
            if let Err(message) = (setter.apply)(&mut candidate, value) {
                errors.add(key, message);
            }
        }

        if applied == 0 {
            return Err(UpdateError::NothingToUpdate);
        }

        errors.merge(candidate.validate());
        errors.into_result()?;
        Ok(candidate)
    }

    /// Apply `document` to `target` and persist it.
    ///
    /// On success `target` holds the saved state. On any error `target` and
    /// the store are unchanged.
    ///
    /// # Errors
    ///
    /// See [`Self::apply`]; also [`UpdateError::Repository`] if the save fails.
    #[instrument(skip_all, fields(record = %target.id()))]
    pub async fn update<R>(&self, document: &UpdateDocument, target: &mut R) -> Result<(), UpdateError>
    where
        R: Writable,
        S: RecordWriter<R>,
    {
        let candidate = Self::apply(document, target)?;
        self.store.save(&candidate).await?;
        *target = candidate;
        Ok(())
    }

    /// Validate a creation payload and persist it.
    ///
    /// # Errors
    ///
    /// [`UpdateError::Invalid`] if the draft breaks a rule (nothing is
    /// written), or [`UpdateError::Repository`] if the insert fails.
    #[instrument(skip_all, fields(collection = R::COLLECTION))]
    pub async fn create<R>(&self, draft: R::Draft) -> Result<R, UpdateError>
    where
        R: Writable,
        S: RecordWriter<R>,
    {
        draft.validate().into_result()?;
        Ok(self.store.create(draft).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bilemo_core::{CustomerName, PhoneId};
    use serde_json::json;

    use super::*;
    use crate::db::{Filter, MemoryStore, RecordReader};
    use crate::models::{NewUser, Phone, PhoneDetails, User, UserProfile};

    fn doc(value: Value) -> UpdateDocument {
        UpdateDocument::from_value(value)
    }

    fn phone() -> Phone {
        Phone {
            id: PhoneId::new(1),
            details: PhoneDetails {
                name: "Galaxy".to_owned(),
                color: "Blue".to_owned(),
                price: 899,
                description: "Flagship".to_owned(),
            },
        }
    }

    #[test]
    fn test_blank_values() {
        for blank in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(is_blank(&blank), "{blank} should be blank");
        }
        for filled in [json!(true), json!(1), json!("x"), json!([0]), json!({ "a": 1 })] {
            assert!(!is_blank(&filled), "{filled} should not be blank");
        }
    }

    #[test]
    fn test_apply_sets_named_field() {
        let updated = PartialUpdater::<MemoryStore>::apply(&doc(json!({ "name": "X" })), &phone()).unwrap();
        assert_eq!(updated.details.name, "X");
        assert_eq!(updated.details.color, "Blue");
    }

    #[test]
    fn test_apply_empty_document_is_rejected() {
        let err = PartialUpdater::<MemoryStore>::apply(&doc(json!({})), &phone()).unwrap_err();
        assert!(matches!(err, UpdateError::NothingToUpdate));
    }

    #[test]
    fn test_apply_only_unknown_or_blank_keys_is_rejected() {
        let document = doc(json!({ "nickname": "X", "name": "", "price": 0 }));
        let err = PartialUpdater::<MemoryStore>::apply(&document, &phone()).unwrap_err();
        assert!(matches!(err, UpdateError::NothingToUpdate));
    }

    #[test]
    fn test_apply_non_object_body_is_rejected() {
        let err = PartialUpdater::<MemoryStore>::apply(&doc(json!([1, 2])), &phone()).unwrap_err();
        assert!(matches!(err, UpdateError::NothingToUpdate));
    }

    #[test]
    fn test_apply_unknown_keys_are_ignored_alongside_known_ones() {
        let document = doc(json!({ "color": "Red", "warranty": "2y" }));
        let updated = PartialUpdater::<MemoryStore>::apply(&document, &phone()).unwrap();
        assert_eq!(updated.details.color, "Red");
    }

    #[test]
    fn test_apply_reports_type_mismatch_and_rule_violations() {
        let document = doc(json!({ "price": "cheap", "name": "   " }));
        let err = PartialUpdater::<MemoryStore>::apply(&document, &phone()).unwrap_err();
        let UpdateError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert!(errors.field("price").is_some());
        assert!(errors.field("name").is_some());
    }

    #[test]
    fn test_apply_negative_price_is_invalid() {
        let err = PartialUpdater::<MemoryStore>::apply(&doc(json!({ "price": -5 })), &phone()).unwrap_err();
        assert!(matches!(err, UpdateError::Invalid(_)));
    }

    async fn store_with_user() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        store.insert_customer("alice", "hash-a".to_owned()).await.unwrap();
        let user = PartialUpdater::new(&store)
            .create::<User>(NewUser {
                customer: CustomerName::from("alice"),
                profile: UserProfile {
                    username: "jdupont".to_owned(),
                    name: "Jean".to_owned(),
                    surname: "Dupont".to_owned(),
                    email: "jean@orange.fr".to_owned(),
                },
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_update_commits_valid_changes() {
        let (store, mut user) = store_with_user().await;

        PartialUpdater::new(&store)
            .update(&doc(json!({ "name": "X" })), &mut user)
            .await
            .unwrap();

        assert_eq!(user.profile.name, "X");
        let stored = RecordReader::<User>::get(&store, user.id).await.unwrap().unwrap();
        assert_eq!(stored.profile.name, "X");
    }

    #[tokio::test]
    async fn test_invalid_update_commits_nothing() {
        let (store, mut user) = store_with_user().await;
        let before = user.clone();

        let document = doc(json!({ "name": "Jeanne", "email": "broken" }));
        let err = PartialUpdater::new(&store).update(&document, &mut user).await.unwrap_err();

        assert!(matches!(err, UpdateError::Invalid(_)));
        assert_eq!(user, before);
        let stored = RecordReader::<User>::get(&store, user.id).await.unwrap().unwrap();
        assert_eq!(stored, before);
    }

    #[tokio::test]
    async fn test_empty_update_leaves_record_unchanged() {
        let (store, mut user) = store_with_user().await;
        let before = user.clone();

        let err = PartialUpdater::new(&store).update(&doc(json!({})), &mut user).await.unwrap_err();

        assert!(matches!(err, UpdateError::NothingToUpdate));
        assert_eq!(user, before);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_inserted() {
        let store = MemoryStore::new();
        let err = PartialUpdater::new(&store)
            .create::<Phone>(PhoneDetails::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UpdateError::Invalid(_)));
        let phones = RecordReader::<Phone>::find(&store, &Filter::All).await.unwrap();
        assert!(phones.is_empty());
    }
}
