//! Phone catalog entries.

use bilemo_core::{PhoneId, VisibilityGroup};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Record, Writable};
use crate::updater::{FieldSetter, integer, text};
use crate::validation::{MAX_STRING_LENGTH, Validate, ValidationErrors};

/// A phone listed in the catalog. Phones belong to no customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phone {
    pub id: PhoneId,
    #[serde(flatten)]
    pub details: PhoneDetails,
}

/// Every phone field except the ID. Also the creation payload.
///
/// Missing fields default to empty so validation reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneDetails {
    pub name: String,
    pub color: String,
    /// Price in whole euros.
    pub price: i32,
    pub description: String,
}

impl Validate for PhoneDetails {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .not_blank("name", &self.name)
            .max_length("name", &self.name, MAX_STRING_LENGTH)
            .not_blank("color", &self.color)
            .max_length("color", &self.color, MAX_STRING_LENGTH)
            .positive("price", i64::from(self.price))
            .not_blank("description", &self.description);
        errors
    }
}

impl Validate for Phone {
    fn validate(&self) -> ValidationErrors {
        self.details.validate()
    }
}

impl Record for Phone {
    type Id = PhoneId;
    const COLLECTION: &'static str = "phones";

    fn id(&self) -> PhoneId {
        self.id
    }

    fn group_fields(_group: VisibilityGroup) -> &'static [&'static str] {
        &["id", "name", "color", "price", "description"]
    }
}

fn set_name(phone: &mut Phone, value: &Value) -> Result<(), String> {
    phone.details.name = text(value)?;
    Ok(())
}

fn set_color(phone: &mut Phone, value: &Value) -> Result<(), String> {
    phone.details.color = text(value)?;
    Ok(())
}

fn set_price(phone: &mut Phone, value: &Value) -> Result<(), String> {
    phone.details.price = integer(value)?;
    Ok(())
}

fn set_description(phone: &mut Phone, value: &Value) -> Result<(), String> {
    phone.details.description = text(value)?;
    Ok(())
}

const SETTERS: &[FieldSetter<Phone>] = &[
    FieldSetter { field: "name", apply: set_name },
    FieldSetter { field: "color", apply: set_color },
    FieldSetter { field: "price", apply: set_price },
    FieldSetter { field: "description", apply: set_description },
];

impl Writable for Phone {
    type Draft = PhoneDetails;

    fn setters() -> &'static [FieldSetter<Self>] {
        SETTERS
    }
}
