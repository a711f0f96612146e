use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::enums::{BankIssue, LoanType};
use crate::db::schema;

/// Structured dispute detail for one bank named on a case.
///
/// Invariant (enforced on the write path): `bank_name` must be present in the
/// owning case's bank set.
#[derive(Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::bank_detail)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct BankDetail {
    pub id: uuid::Uuid,
    #[serde(skip)]
    pub case_id: uuid::Uuid,
    pub bank_name: String,
    pub account_number: Option<String>,
    pub loan_type: Option<LoanType>,
    pub issues: Vec<BankIssue>,
    #[serde(skip)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating bank details
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::bank_detail)]
pub struct NewBankDetail<'a> {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub bank_name: &'a str,
    pub account_number: Option<&'a str>,
    pub loan_type: Option<LoanType>,
    pub issues: Vec<BankIssue>,
}
