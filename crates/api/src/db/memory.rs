//! In-memory store used by tests and local demos.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bilemo_core::{CustomerId, CustomerName, PhoneId, UserId};
use tokio::sync::RwLock;

use super::{DataStore, Filter, RecordReader, RecordWriter, RepositoryError};
use crate::models::{Customer, NewUser, Phone, PhoneDetails, User};

#[derive(Default)]
struct Tables {
    phones: BTreeMap<PhoneId, Phone>,
    users: BTreeMap<UserId, User>,
    customers: BTreeMap<CustomerId, (Customer, String)>,
    last_id: i32,
}

impl Tables {
    const fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// A [`DataStore`] backed by ordered maps behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a customer with an already-hashed API token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or token is taken.
    pub async fn insert_customer(
        &self,
        username: impl Into<CustomerName>,
        token_hash: String,
    ) -> Result<Customer, RepositoryError> {
        let username = username.into();
        let mut tables = self.tables.write().await;

        if tables
            .customers
            .values()
            .any(|(c, hash)| c.username == username || *hash == token_hash)
        {
            return Err(RepositoryError::Conflict(format!(
                "customer {username} already exists"
            )));
        }

        let customer = Customer {
            id: CustomerId::new(tables.next_id()),
            username,
        };
        tables
            .customers
            .insert(customer.id, (customer.clone(), token_hash));
        Ok(customer)
    }
}

#[async_trait]
impl RecordReader<Phone> for MemoryStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Phone>, RepositoryError> {
        match filter {
            Filter::All => Ok(self.tables.read().await.phones.values().cloned().collect()),
            Filter::OwnedBy(_) => Ok(Vec::new()),
        }
    }

    async fn get(&self, id: PhoneId) -> Result<Option<Phone>, RepositoryError> {
        Ok(self.tables.read().await.phones.get(&id).cloned())
    }
}

#[async_trait]
impl RecordWriter<Phone> for MemoryStore {
    async fn create(&self, draft: PhoneDetails) -> Result<Phone, RepositoryError> {
        let mut tables = self.tables.write().await;
        let phone = Phone {
            id: PhoneId::new(tables.next_id()),
            details: draft,
        };
        tables.phones.insert(phone.id, phone.clone());
        Ok(phone)
    }

    async fn save(&self, record: &Phone) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .phones
            .get_mut(&record.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete(&self, id: PhoneId) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .phones
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl RecordReader<User> for MemoryStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables.read().await;
        let users = tables.users.values();
        Ok(match filter {
            Filter::All => users.cloned().collect(),
            Filter::OwnedBy(owner) => users.filter(|u| u.customer == *owner).cloned().collect(),
        })
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl RecordWriter<User> for MemoryStore {
    async fn create(&self, draft: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables
            .customers
            .values()
            .any(|(c, _)| c.username == draft.customer)
        {
            return Err(RepositoryError::NotFound);
        }

        let user = User {
            id: UserId::new(tables.next_id()),
            profile: draft.profile,
            customer: draft.customer,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, record: &User) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .users
            .get_mut(&record.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl RecordReader<Customer> for MemoryStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Customer>, RepositoryError> {
        match filter {
            Filter::All => Ok(self
                .tables
                .read()
                .await
                .customers
                .values()
                .map(|(c, _)| c.clone())
                .collect()),
            Filter::OwnedBy(_) => Ok(Vec::new()),
        }
    }

    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .customers
            .get(&id)
            .map(|(c, _)| c.clone()))
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn customer_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .customers
            .values()
            .find(|(_, hash)| hash == token_hash)
            .map(|(c, _)| c.clone()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
