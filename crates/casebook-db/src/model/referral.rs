use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A referral source credited with bringing in cases.
///
/// The `cases` counter is the only field the case lifecycle mutates;
/// `success_rate` and `commission` belong to the reporting collaborator.
#[derive(
    Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::referral)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: uuid::Uuid,
    pub name: String,
    pub phone: String,
    pub cases: i32,
    pub success_rate: Option<f64>,
    pub commission: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Referral {
    /// True when the phone is the sentinel for "not supplied".
    #[must_use]
    pub fn has_unknown_phone(&self) -> bool {
        self.phone == casebook_core::constants::REFERRAL_PHONE_UNKNOWN
    }
}

/// Insert struct for creating new referrals
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::referral)]
pub struct NewReferral<'a> {
    pub id: uuid::Uuid,
    pub name: &'a str,
    pub phone: &'a str,
}
