//! End-users registered by a customer.

use bilemo_core::{CustomerName, UserId, VisibilityGroup};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Record, Writable};
use crate::authz::Owned;
use crate::updater::{FieldSetter, text};
use crate::validation::{MAX_STRING_LENGTH, Validate, ValidationErrors};

/// An end-user. Always belongs to exactly one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Name of the owning customer.
    pub customer: CustomerName,
}

/// The client-editable part of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub email: String,
}

/// Creation payload: a profile plus the customer it is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub customer: CustomerName,
    pub profile: UserProfile,
}

impl Validate for UserProfile {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("username", &self.username),
            ("name", &self.name),
            ("surname", &self.surname),
        ] {
            errors
                .not_blank(field, value)
                .max_length(field, value, MAX_STRING_LENGTH);
        }
        errors
            .email("email", &self.email)
            .max_length("email", &self.email, MAX_STRING_LENGTH);
        errors
    }
}

impl Validate for NewUser {
    fn validate(&self) -> ValidationErrors {
        self.profile.validate()
    }
}

impl Validate for User {
    fn validate(&self) -> ValidationErrors {
        self.profile.validate()
    }
}

impl Owned for User {
    fn owner(&self) -> &CustomerName {
        &self.customer
    }
}

impl Record for User {
    type Id = UserId;
    const COLLECTION: &'static str = "users";

    fn id(&self) -> UserId {
        self.id
    }

    fn group_fields(group: VisibilityGroup) -> &'static [&'static str] {
        match group {
            VisibilityGroup::ListUsers | VisibilityGroup::ListCustomers => {
                &["id", "username", "name", "surname", "email"]
            }
        }
    }
}

fn set_username(user: &mut User, value: &Value) -> Result<(), String> {
    user.profile.username = text(value)?;
    Ok(())
}

fn set_name(user: &mut User, value: &Value) -> Result<(), String> {
    user.profile.name = text(value)?;
    Ok(())
}

fn set_surname(user: &mut User, value: &Value) -> Result<(), String> {
    user.profile.surname = text(value)?;
    Ok(())
}

fn set_email(user: &mut User, value: &Value) -> Result<(), String> {
    user.profile.email = text(value)?;
    Ok(())
}

// No `customer` setter: ownership never changes through an update.
const SETTERS: &[FieldSetter<User>] = &[
    FieldSetter { field: "username", apply: set_username },
    FieldSetter { field: "name", apply: set_name },
    FieldSetter { field: "surname", apply: set_surname },
    FieldSetter { field: "email", apply: set_email },
];

impl Writable for User {
    type Draft = NewUser;

    fn setters() -> &'static [FieldSetter<Self>] {
        SETTERS
    }
}
