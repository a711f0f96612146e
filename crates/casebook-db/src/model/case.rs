use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::enums::{CasePriority, CaseStatus};
use crate::db::schema;

/// A customer dispute case tracked through resolution.
///
/// Field names here are the wire contract: the record serializes to the JSON
/// shape the reporting and UI collaborators consume.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::case_record)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: uuid::Uuid,
    #[serde(rename = "name")]
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub aadhaar: Option<String>,
    pub pan: Option<String>,
    pub cibil_score: Option<i32>,
    pub problem: String,
    pub banks: Vec<String>,
    pub other_banks: Vec<String>,
    pub referral_id: Option<uuid::Uuid>,
    pub referral_name: Option<String>,
    pub referral_phone: Option<String>,
    pub created_by: uuid::Uuid,
    pub assigned_to: Option<uuid::Uuid>,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub follow_up_date: Option<chrono::DateTime<chrono::Utc>>,
    pub resolution_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CaseRecord {
    /// All banks named on the case: the structured set followed by the
    /// free-text overflow list. Computed on read, never stored.
    #[must_use]
    pub fn all_banks(&self) -> Vec<String> {
        self.banks
            .iter()
            .chain(self.other_banks.iter())
            .cloned()
            .collect()
    }

    /// True when the given bank name appears in either bank list.
    #[must_use]
    pub fn has_bank(&self, bank_name: &str) -> bool {
        self.banks.iter().any(|b| b == bank_name)
            || self.other_banks.iter().any(|b| b == bank_name)
    }
}

/// Insert struct for creating new case records
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::case_record)]
pub struct NewCaseRecord<'a> {
    pub id: uuid::Uuid,
    pub customer_name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub aadhaar: Option<&'a str>,
    pub pan: Option<&'a str>,
    pub cibil_score: Option<i32>,
    pub problem: &'a str,
    pub banks: Vec<String>,
    pub other_banks: Vec<String>,
    pub referral_id: Option<uuid::Uuid>,
    pub referral_name: Option<&'a str>,
    pub referral_phone: Option<&'a str>,
    pub created_by: uuid::Uuid,
    pub assigned_to: Option<uuid::Uuid>,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub follow_up_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// Partial update for a case record. `None` leaves a column untouched;
/// nullable columns use a nested `Option` so an explicit null can be written.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::case_record)]
pub struct CaseChangeset {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub aadhaar: Option<Option<String>>,
    pub pan: Option<Option<String>>,
    pub cibil_score: Option<Option<i32>>,
    pub problem: Option<String>,
    pub banks: Option<Vec<String>>,
    pub other_banks: Option<Vec<String>>,
    pub assigned_to: Option<Option<uuid::Uuid>>,
    pub priority: Option<CasePriority>,
    pub follow_up_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub resolution_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
