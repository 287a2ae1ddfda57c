//! Read-only customer directory.

use bilemo_core::{CustomerId, PageNumber, VisibilityGroup};
use serde_json::Value;
use tracing::instrument;

use crate::db::{Filter, RecordReader};
use crate::error::Result;
use crate::models::{Customer, Record};
use crate::pagination::{Paginator, SerializedPage};
use crate::state::AppState;

use super::not_found;

/// Customer listing. Always serialized with the `list_customers` group so
/// token material and relations never leave the server.
pub struct CustomerService<'a> {
    state: &'a AppState,
}

impl<'a> CustomerService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// # Errors
    ///
    /// `NotFound` when the page is empty, `Database` on store failure.
    #[instrument(skip(self))]
    pub async fn list(&self, page: PageNumber) -> Result<SerializedPage> {
        let customers = RecordReader::<Customer>::find(self.state.store(), &Filter::All).await?;
        Ok(Paginator::paginate(
            customers.as_slice(),
            page,
            Some(self.state.paginator().page_size()),
            Some(VisibilityGroup::ListCustomers),
        )?)
    }

    /// # Errors
    ///
    /// `NotFound` if no customer has this id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: CustomerId) -> Result<Value> {
        let customer = RecordReader::<Customer>::get(self.state.store(), id)
            .await?
            .ok_or_else(|| not_found("Customer"))?;
        Ok(customer.to_json(Some(VisibilityGroup::ListCustomers))?)
    }
}
