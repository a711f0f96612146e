use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use casebook_core::error::{CoreError, CoreResult};
use casebook_core::validate;

use crate::db::enums::CustomFieldKind;
use crate::db::schema;

/// One entry in a case's ordered custom-field list.
///
/// The stored JSON value must match the declared `kind`; `from_json` is the
/// only way to build a typed value, so shape mismatches are caught at write
/// time rather than surfacing as type confusion on read.
#[derive(Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::custom_field)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: uuid::Uuid,
    #[serde(skip)]
    pub case_id: uuid::Uuid,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: CustomFieldKind,
    pub value: serde_json::Value,
    pub ordinal: i32,
}

/// Insert struct for creating custom fields
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::custom_field)]
pub struct NewCustomField<'a> {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub label: &'a str,
    pub kind: CustomFieldKind,
    pub value: serde_json::Value,
    pub ordinal: i32,
}

/// A custom-field value, tagged with its declared type.
///
/// A `file`-kind value holds an opaque document reference, never inline data.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomFieldValue {
    Text(String),
    Number(f64),
    Date(chrono::NaiveDate),
    Email(String),
    Multiline(String),
    FileRef(String),
}

impl CustomFieldValue {
    /// ## Summary
    /// Parses and validates a raw JSON value against the declared kind.
    /// `field` names the offending input in the validation error.
    ///
    /// ## Errors
    /// Returns a validation error when the JSON shape does not match the kind.
    pub fn from_json(
        kind: CustomFieldKind,
        raw: &serde_json::Value,
        field: &str,
    ) -> CoreResult<Self> {
        let mismatch = |expected: &str| {
            CoreError::invalid_field(field, format!("expected a {expected} for {kind} field"))
        };

        match kind {
            CustomFieldKind::Text => raw
                .as_str()
                .map(|s| Self::Text(s.to_owned()))
                .ok_or_else(|| mismatch("string")),
            CustomFieldKind::Multiline => raw
                .as_str()
                .map(|s| Self::Multiline(s.to_owned()))
                .ok_or_else(|| mismatch("string")),
            CustomFieldKind::Number => raw
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| mismatch("number")),
            CustomFieldKind::Date => {
                let s = raw.as_str().ok_or_else(|| mismatch("ISO date string"))?;
                s.parse::<chrono::NaiveDate>()
                    .map(Self::Date)
                    .map_err(|_| mismatch("ISO date string"))
            }
            CustomFieldKind::Email => {
                let s = raw.as_str().ok_or_else(|| mismatch("email string"))?;
                if validate::is_email(s) {
                    Ok(Self::Email(s.to_owned()))
                } else {
                    Err(mismatch("well-formed email string"))
                }
            }
            CustomFieldKind::File => {
                let s = raw.as_str().ok_or_else(|| mismatch("document reference"))?;
                if s.is_empty() {
                    Err(mismatch("non-empty document reference"))
                } else {
                    Ok(Self::FileRef(s.to_owned()))
                }
            }
        }
    }

    /// The kind this value satisfies.
    #[must_use]
    pub const fn kind(&self) -> CustomFieldKind {
        match self {
            Self::Text(_) => CustomFieldKind::Text,
            Self::Number(_) => CustomFieldKind::Number,
            Self::Date(_) => CustomFieldKind::Date,
            Self::Email(_) => CustomFieldKind::Email,
            Self::Multiline(_) => CustomFieldKind::Multiline,
            Self::FileRef(_) => CustomFieldKind::File,
        }
    }

    /// Storage representation for the jsonb column.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) | Self::Email(s) | Self::Multiline(s) | Self::FileRef(s) => {
                serde_json::Value::String(s.clone())
            }
            Self::Number(n) => serde_json::json!(n),
            Self::Date(d) => serde_json::Value::String(d.to_string()),
        }
    }
}
