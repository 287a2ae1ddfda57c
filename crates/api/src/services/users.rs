//! End-user service, scoped to the acting customer.

use bilemo_core::{Identity, PageNumber, UserId, VisibilityGroup};
use serde_json::Value;
use tracing::instrument;

use crate::authz::{Action, OwnershipAuthorizer};
use crate::cache::CacheKey;
use crate::db::{Filter, RecordReader, RecordWriter};
use crate::error::Result;
use crate::models::{NewUser, Record, User, UserProfile};
use crate::pagination::{Paginator, SerializedPage};
use crate::state::AppState;
use crate::updater::{PartialUpdater, UpdateDocument};

use super::{missing_as, not_found, update_missing_as};

/// User operations on behalf of one authenticated customer.
///
/// Every single-record operation runs the ownership check before touching
/// the cache or writing to the store. Every write invalidates the acting
/// customer's list entry, which is the owner's after a passed check.
pub struct UserService<'a> {
    state: &'a AppState,
    identity: &'a Identity,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState, identity: &'a Identity) -> Self {
        Self { state, identity }
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::users(self.identity)
    }

    /// List the acting customer's users, one page at a time.
    ///
    /// # Errors
    ///
    /// `NotFound` when the page is empty, `Database` on store failure.
    #[instrument(skip(self), fields(customer = %self.identity.name))]
    pub async fn list(&self, page: PageNumber) -> Result<SerializedPage> {
        let store = self.state.store();
        let filter = Filter::OwnedBy(self.identity.name.clone());
        let users = self
            .state
            .cache()
            .get_or_compute(&self.cache_key(), || async move {
                RecordReader::<User>::find(store, &filter).await
            })
            .await?;

        Ok(Paginator::paginate(
            users.as_slice(),
            page,
            Some(self.state.paginator().page_size()),
            Some(VisibilityGroup::ListUsers),
        )?)
    }

    /// # Errors
    ///
    /// `NotFound`, or `Forbidden` if another customer owns the user.
    #[instrument(skip(self), fields(customer = %self.identity.name))]
    pub async fn get(&self, id: UserId) -> Result<Value> {
        let user = self.load(id).await?;
        OwnershipAuthorizer::authorize(Action::View, self.identity, &user)?;
        Ok(user.to_json(Some(VisibilityGroup::ListUsers))?)
    }

    /// Create a user owned by the acting customer.
    ///
    /// # Errors
    ///
    /// `Validation` if the profile breaks a rule; nothing is stored.
    #[instrument(skip_all, fields(customer = %self.identity.name))]
    pub async fn create(&self, profile: UserProfile) -> Result<User> {
        let draft = NewUser {
            customer: self.identity.name.clone(),
            profile,
        };
        let user = PartialUpdater::new(self.state.store())
            .create::<User>(draft)
            .await?;
        self.state.cache().invalidate(&self.cache_key()).await;
        Ok(user)
    }

    /// Apply a sparse update to one of the acting customer's users.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `BadRequest` for an empty document, or
    /// `Validation`.
    #[instrument(skip(self, document), fields(customer = %self.identity.name))]
    pub async fn update(&self, id: UserId, document: &UpdateDocument) -> Result<User> {
        let mut user = self.load(id).await?;
        OwnershipAuthorizer::authorize(Action::Update, self.identity, &user)?;

        PartialUpdater::new(self.state.store())
            .update(document, &mut user)
            .await
            .map_err(update_missing_as("User"))?;
        self.state.cache().invalidate(&self.cache_key()).await;
        Ok(user)
    }

    /// # Errors
    ///
    /// `NotFound`, or `Forbidden` if another customer owns the user.
    #[instrument(skip(self), fields(customer = %self.identity.name))]
    pub async fn delete(&self, id: UserId) -> Result<()> {
        let user = self.load(id).await?;
        OwnershipAuthorizer::authorize(Action::Delete, self.identity, &user)?;

        RecordWriter::<User>::delete(self.state.store(), user.id)
            .await
            .map_err(missing_as("User"))?;
        self.state.cache().invalidate(&self.cache_key()).await;
        Ok(())
    }

    async fn load(&self, id: UserId) -> Result<User> {
        RecordReader::<User>::get(self.state.store(), id)
            .await?
            .ok_or_else(|| not_found("User"))
    }
}
