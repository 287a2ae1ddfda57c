//! `PostgreSQL` implementation of [`DataStore`].

use async_trait::async_trait;
use bilemo_core::{CustomerId, CustomerName, PhoneId, UserId};
use sqlx::{FromRow, PgPool};

use super::{DataStore, Filter, RecordReader, RecordWriter, RepositoryError};
use crate::models::{Customer, NewUser, Phone, PhoneDetails, User, UserProfile};

#[derive(FromRow)]
struct PhoneRow {
    id: i32,
    name: String,
    color: String,
    price: i32,
    description: String,
}

impl From<PhoneRow> for Phone {
    fn from(row: PhoneRow) -> Self {
        Self {
            id: PhoneId::new(row.id),
            details: PhoneDetails {
                name: row.name,
                color: row.color,
                price: row.price,
                description: row.description,
            },
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    username: String,
    name: String,
    surname: String,
    email: String,
    customer: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            profile: UserProfile {
                username: row.username,
                name: row.name,
                surname: row.surname,
                email: row.email,
            },
            customer: CustomerName::from(row.customer),
        }
    }
}

#[derive(FromRow)]
struct CustomerRow {
    id: i32,
    username: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: CustomerId::new(row.id),
            username: CustomerName::from(row.username),
        }
    }
}

const USER_COLUMNS: &str = r"
    SELECT u.id, u.username, u.name, u.surname, u.email, c.username AS customer
    FROM app_user u
    JOIN customer c ON c.id = u.customer_id
";

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Register a customer with an already-hashed API token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or token is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_customer(
        &self,
        username: &CustomerName,
        token_hash: &str,
    ) -> Result<Customer, RepositoryError> {
        let row: CustomerRow = sqlx::query_as(
            r"
            INSERT INTO customer (username, api_token_hash)
            VALUES ($1, $2)
            RETURNING id, username
            ",
        )
        .bind(username)
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("customer {username} already exists"));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}

fn require_row(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl RecordReader<Phone> for PgStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Phone>, RepositoryError> {
        if let Filter::OwnedBy(_) = filter {
            return Ok(Vec::new());
        }
        let rows: Vec<PhoneRow> = sqlx::query_as(
            "SELECT id, name, color, price, description FROM phone ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Phone::from).collect())
    }

    async fn get(&self, id: PhoneId) -> Result<Option<Phone>, RepositoryError> {
        let row: Option<PhoneRow> = sqlx::query_as(
            "SELECT id, name, color, price, description FROM phone WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Phone::from))
    }
}

#[async_trait]
impl RecordWriter<Phone> for PgStore {
    async fn create(&self, draft: PhoneDetails) -> Result<Phone, RepositoryError> {
        let row: PhoneRow = sqlx::query_as(
            r"
            INSERT INTO phone (name, color, price, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, color, price, description
            ",
        )
        .bind(&draft.name)
        .bind(&draft.color)
        .bind(draft.price)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn save(&self, record: &Phone) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE phone
            SET name = $2, color = $3, price = $4, description = $5
            WHERE id = $1
            ",
        )
        .bind(record.id)
        .bind(&record.details.name)
        .bind(&record.details.color)
        .bind(record.details.price)
        .bind(&record.details.description)
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected())
    }

    async fn delete(&self, id: PhoneId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM phone WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }
}

#[async_trait]
impl RecordReader<User> for PgStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<User>, RepositoryError> {
        let owner = match filter {
            Filter::All => None,
            Filter::OwnedBy(name) => Some(name.as_str()),
        };
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "{USER_COLUMNS} WHERE ($1::text IS NULL OR c.username = $1) ORDER BY u.id"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{USER_COLUMNS} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl RecordWriter<User> for PgStore {
    async fn create(&self, draft: NewUser) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            INSERT INTO app_user (customer_id, username, name, surname, email)
            SELECT c.id, $2, $3, $4, $5
            FROM customer c
            WHERE c.username = $1
            RETURNING id, username, name, surname, email, $1::text AS customer
            ",
        )
        .bind(&draft.customer)
        .bind(&draft.profile.username)
        .bind(&draft.profile.name)
        .bind(&draft.profile.surname)
        .bind(&draft.profile.email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::from).ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, record: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE app_user
            SET username = $2, name = $3, surname = $4, email = $5
            WHERE id = $1
            ",
        )
        .bind(record.id)
        .bind(&record.profile.username)
        .bind(&record.profile.name)
        .bind(&record.profile.surname)
        .bind(&record.profile.email)
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM app_user WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }
}

#[async_trait]
impl RecordReader<Customer> for PgStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Customer>, RepositoryError> {
        if let Filter::OwnedBy(_) = filter {
            return Ok(Vec::new());
        }
        let rows: Vec<CustomerRow> =
            sqlx::query_as("SELECT id, username FROM customer ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT id, username FROM customer WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Customer::from))
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn customer_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT id, username FROM customer WHERE api_token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Customer::from))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
