//! Case record store: intake, partial update, deletion, and read projections.

pub mod delete;
pub mod intake;
pub mod read;
pub mod update;

use casebook_db::db::enums::{BankIssue, CustomFieldKind, LoanType};

/// Structured dispute detail supplied for one bank at intake/update.
#[derive(Debug, Clone)]
pub struct BankDetailInput {
    pub bank_name: String,
    pub account_number: Option<String>,
    pub loan_type: Option<LoanType>,
    pub issues: Vec<BankIssue>,
}

/// A custom field supplied at intake/update. The raw JSON value is validated
/// against `kind` before anything is written.
#[derive(Debug, Clone)]
pub struct CustomFieldInput {
    pub label: String,
    pub kind: CustomFieldKind,
    pub value: serde_json::Value,
}

/// Referral attribution supplied at intake.
#[derive(Debug, Clone)]
pub struct ReferralInput {
    pub name: String,
    pub phone: Option<String>,
}
