//! Authenticated customer identity.
//!
//! An [`Identity`] is resolved once per request by the HTTP layer and then
//! passed explicitly into every authorization check, cache key and store
//! filter. Nothing reads it from ambient state.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// A customer's stable login name.
///
/// This is the tenant key: users belong to a customer by name, and
/// per-customer cache entries are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CustomerName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for CustomerName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CustomerName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CustomerName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <String as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CustomerName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// The authenticated principal acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: CustomerId,
    pub name: CustomerName,
}

impl Identity {
    #[must_use]
    pub const fn new(id: CustomerId, name: CustomerName) -> Self {
        Self { id, name }
    }

    /// Whether this identity is the tenant named `owner`.
    #[must_use]
    pub fn owns(&self, owner: &CustomerName) -> bool {
        &self.name == owner
    }
}
