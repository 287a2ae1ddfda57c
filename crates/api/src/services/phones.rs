//! Phone catalog service.

use bilemo_core::{PageNumber, PhoneId};
use serde_json::Value;
use tracing::instrument;

use crate::cache::CacheKey;
use crate::db::{Filter, RecordReader, RecordWriter};
use crate::error::Result;
use crate::models::{Phone, PhoneDetails, Record};
use crate::pagination::{Paginator, SerializedPage};
use crate::state::AppState;
use crate::updater::{PartialUpdater, UpdateDocument};

use super::{missing_as, not_found, update_missing_as};

/// Catalog operations. Phones have no owner, so no ownership checks apply.
pub struct PhoneService<'a> {
    state: &'a AppState,
}

impl<'a> PhoneService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// List the catalog.
    ///
    /// Without a page the whole catalog is returned; with one it is sliced
    /// by the configured page size.
    ///
    /// # Errors
    ///
    /// `NotFound` when the page is empty, `Database` on store failure.
    #[instrument(skip(self))]
    pub async fn list(&self, page: Option<PageNumber>) -> Result<SerializedPage> {
        let store = self.state.store();
        let phones = self
            .state
            .cache()
            .get_or_compute(&CacheKey::phones(), || async move {
                RecordReader::<Phone>::find(store, &Filter::All).await
            })
            .await?;

        let page_size = page.map(|_| self.state.paginator().page_size());
        Ok(Paginator::paginate(
            phones.as_slice(),
            page.unwrap_or_default(),
            page_size,
            None,
        )?)
    }

    /// # Errors
    ///
    /// `NotFound` if no phone has this id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: PhoneId) -> Result<Value> {
        Ok(self.load(id).await?.to_json(None)?)
    }

    /// # Errors
    ///
    /// `Validation` if the draft breaks a rule; nothing is stored.
    #[instrument(skip_all)]
    pub async fn create(&self, draft: PhoneDetails) -> Result<Phone> {
        let phone = PartialUpdater::new(self.state.store())
            .create::<Phone>(draft)
            .await?;
        self.state.cache().invalidate(&CacheKey::phones()).await;
        Ok(phone)
    }

    /// Apply a sparse update.
    ///
    /// # Errors
    ///
    /// `NotFound`, `BadRequest` for an empty document, or `Validation`.
    #[instrument(skip(self, document))]
    pub async fn update(&self, id: PhoneId, document: &UpdateDocument) -> Result<Phone> {
        let mut phone = self.load(id).await?;
        PartialUpdater::new(self.state.store())
            .update(document, &mut phone)
            .await
            .map_err(update_missing_as("Phone"))?;
        self.state.cache().invalidate(&CacheKey::phones()).await;
        Ok(phone)
    }

    /// # Errors
    ///
    /// `NotFound` if no phone has this id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: PhoneId) -> Result<()> {
        RecordWriter::<Phone>::delete(self.state.store(), id)
            .await
            .map_err(missing_as("Phone"))?;
        self.state.cache().invalidate(&CacheKey::phones()).await;
        Ok(())
    }

    async fn load(&self, id: PhoneId) -> Result<Phone> {
        RecordReader::<Phone>::get(self.state.store(), id)
            .await?
            .ok_or_else(|| not_found("Phone"))
    }
}
