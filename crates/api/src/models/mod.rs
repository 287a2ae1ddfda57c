//! Domain records served by the API.
//!
//! Every record kind implements [`Record`], which gives the paginator and the
//! handlers one way to serialize it with an optional visibility group. Kinds
//! that clients may write also implement [`Writable`], which supplies the
//! create payload type and the field-setter table used for partial updates.

pub mod customer;
pub mod phone;
pub mod user;

use std::fmt;

use bilemo_core::VisibilityGroup;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::updater::FieldSetter;
use crate::validation::Validate;

pub use customer::Customer;
pub use phone::{Phone, PhoneDetails};
pub use user::{NewUser, User, UserProfile};

/// A persisted record with a stable identity key.
pub trait Record: Serialize + Clone + Send + Sync + 'static {
    type Id: Copy + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Collection segment used in URLs, e.g. `phones`.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Fields emitted when serializing under `group`.
    fn group_fields(group: VisibilityGroup) -> &'static [&'static str];

    fn self_href(&self) -> String {
        format!("/api/{}/{}", Self::COLLECTION, self.id())
    }

    /// Serialize to JSON, keeping only `group`'s fields when one is given,
    /// and attach the `_links.self` relation.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails.
    fn to_json(&self, group: Option<VisibilityGroup>) -> Result<Value, serde_json::Error> {
        let mut fields = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => return Ok(other),
        };

        if let Some(group) = group {
            let allowed = Self::group_fields(group);
            fields.retain(|name, _| allowed.contains(&name.as_str()));
        }

        let mut links = Map::new();
        links.insert("self".to_owned(), json!({ "href": self.self_href() }));
        fields.insert("_links".to_owned(), Value::Object(links));

        Ok(Value::Object(fields))
    }
}

/// A record kind clients may create and partially update.
pub trait Writable: Record + Validate {
    /// Payload accepted on creation.
    type Draft: Validate + Send + Sync + 'static;

    /// Field name → setter table consulted by the partial updater.
    fn setters() -> &'static [FieldSetter<Self>];
}
