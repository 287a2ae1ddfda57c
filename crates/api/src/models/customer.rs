//! Customers: the authenticated tenants of the API.

use bilemo_core::{CustomerId, CustomerName, Identity, VisibilityGroup};
use serde::Serialize;

use super::Record;

/// A customer account. Its API token hash lives only in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub username: CustomerName,
}

impl Customer {
    /// The identity this customer acts as once authenticated.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone())
    }
}

impl Record for Customer {
    type Id = CustomerId;
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> CustomerId {
        self.id
    }

    fn group_fields(group: VisibilityGroup) -> &'static [&'static str] {
        match group {
            VisibilityGroup::ListCustomers => &["id", "username"],
            VisibilityGroup::ListUsers => &[],
        }
    }
}
