//! Case intake.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_core::constants::{KNOWN_BANKS, REFERRAL_PHONE_UNKNOWN};
use casebook_core::error::Violations;
use casebook_core::types::Actor;
use casebook_core::validate;

use casebook_db::db::connection::DbConnection;
use casebook_db::db::enums::{CasePriority, CaseStatus};
use casebook_db::db::query::{bank, case, custom_field};
use casebook_db::model::bank::{BankDetail, NewBankDetail};
use casebook_db::model::case::{CaseRecord, NewCaseRecord};
use casebook_db::model::custom_field::{CustomField, CustomFieldValue, NewCustomField};
use casebook_db::model::referral::Referral;

use crate::error::{ServiceError, ServiceResult};
use crate::referral::resolve_or_create;

use super::{BankDetailInput, CustomFieldInput, ReferralInput};

/// Input for case creation.
#[derive(Debug, Clone, Default)]
pub struct CreateCaseContext {
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub aadhaar: Option<String>,
    pub pan: Option<String>,
    pub cibil_score: Option<i32>,
    pub problem: String,
    pub banks: Vec<String>,
    pub other_banks: Vec<String>,
    pub bank_details: Vec<BankDetailInput>,
    pub custom_fields: Vec<CustomFieldInput>,
    pub referral: Option<ReferralInput>,
    pub priority: Option<CasePriority>,
    pub follow_up_date: Option<chrono::DateTime<chrono::Utc>>,
    pub assigned_to: Option<uuid::Uuid>,
}

/// Result of a case creation.
#[derive(Debug, Clone)]
pub struct CreatedCase {
    pub case: CaseRecord,
    pub bank_details: Vec<BankDetail>,
    pub custom_fields: Vec<CustomField>,
    pub referral: Option<Referral>,
}

/// ## Summary
/// Validates the intake input, reporting every violated constraint at once.
pub(super) fn validate_create(ctx: &CreateCaseContext) -> Violations {
    let mut violations = Violations::new();

    if ctx.customer_name.trim().is_empty() {
        violations.push("name", "must not be empty");
    }
    if !validate::is_ten_digit_phone(&ctx.phone) {
        violations.push("phone", "must be exactly 10 digits");
    }
    if ctx.problem.trim().is_empty() {
        violations.push("problem", "must not be empty");
    }
    if let Some(email) = &ctx.email
        && !validate::is_email(email)
    {
        violations.push("email", "must be a well-formed email address");
    }
    if let Some(aadhaar) = &ctx.aadhaar
        && !validate::is_aadhaar(aadhaar)
    {
        violations.push("aadhaar", "must be exactly 12 digits");
    }
    if let Some(pan) = &ctx.pan
        && !validate::is_pan(pan)
    {
        violations.push("pan", "must match the PAN format (AAAAA9999A)");
    }
    if let Some(score) = ctx.cibil_score
        && !validate::is_cibil_score(score)
    {
        violations.push("cibilScore", "must be between 300 and 900");
    }

    for bank_name in &ctx.banks {
        if !KNOWN_BANKS.contains(&bank_name.as_str()) {
            violations.push(
                "banks",
                format!("'{bank_name}' is not a known bank; list it under otherBanks"),
            );
        }
    }

    validate_bank_details(&ctx.bank_details, &ctx.banks, &ctx.other_banks, &mut violations);
    validate_custom_fields(&ctx.custom_fields, &mut violations);

    if let Some(referral) = &ctx.referral {
        if referral.name.trim().is_empty() {
            violations.push("referral.name", "must not be empty");
        }
        if let Some(phone) = &referral.phone
            && phone != REFERRAL_PHONE_UNKNOWN
            && !validate::is_ten_digit_phone(phone)
        {
            violations.push("referral.phone", "must be exactly 10 digits");
        }
    }

    violations
}

/// Checks every bank-detail key against the case's bank lists, and rejects
/// duplicate keys.
pub(super) fn validate_bank_details(
    details: &[BankDetailInput],
    banks: &[String],
    other_banks: &[String],
    violations: &mut Violations,
) {
    let mut seen: Vec<&str> = Vec::with_capacity(details.len());
    for detail in details {
        let name = detail.bank_name.as_str();
        if seen.contains(&name) {
            violations.push(
                "bankDetails",
                format!("duplicate detail for bank '{name}'"),
            );
        } else {
            seen.push(name);
        }
        let in_set = banks.iter().any(|b| b == name) || other_banks.iter().any(|b| b == name);
        if !in_set {
            violations.push(
                "bankDetails",
                format!("detail for bank '{name}' which is not in the case's bank set"),
            );
        }
    }
}

/// Checks every custom-field value against its declared kind.
pub(super) fn validate_custom_fields(fields: &[CustomFieldInput], violations: &mut Violations) {
    for (i, field) in fields.iter().enumerate() {
        let label = format!("customFields[{i}]");
        if field.label.trim().is_empty() {
            violations.push(label.clone(), "label must not be empty");
        }
        if let Err(e) = CustomFieldValue::from_json(field.kind, &field.value, &label) {
            let casebook_core::error::CoreError::Validation(inner) = e else {
                continue;
            };
            for v in inner.violations {
                violations.push(v.field, v.message);
            }
        }
    }
}

/// ## Summary
/// Creates a case record with its bank details, custom fields, and referral
/// attribution.
///
/// The case insert and the referral counter increment ride one transaction:
/// either both persist or neither does.
///
/// ## Side Effects
/// - Resolves or creates the referral and increments its `cases` counter
/// - Inserts bank-detail and custom-field rows
///
/// ## Errors
/// Returns a validation error listing every violated field constraint, or a
/// database error if any write fails.
#[tracing::instrument(skip(conn, ctx), fields(created_by = %actor.user_id))]
pub async fn create_case(
    conn: &mut DbConnection<'_>,
    actor: &Actor,
    ctx: &CreateCaseContext,
) -> ServiceResult<CreatedCase> {
    validate_create(ctx).into_result().map_err(ServiceError::from)?;

    let case_id = uuid::Uuid::new_v4();
    let created_by = actor.user_id;
    // The transaction closure may only capture owned data, so the borrowed
    // context is cloned and moved in.
    let ctx = ctx.clone();

    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let ctx = &ctx;
            let referral = match &ctx.referral {
                Some(input) => Some(resolve_referral(tx, input).await?),
                None => None,
            };

            let new_case = NewCaseRecord {
                id: case_id,
                customer_name: &ctx.customer_name,
                phone: &ctx.phone,
                email: ctx.email.as_deref(),
                aadhaar: ctx.aadhaar.as_deref(),
                pan: ctx.pan.as_deref(),
                cibil_score: ctx.cibil_score,
                problem: &ctx.problem,
                banks: ctx.banks.clone(),
                other_banks: ctx.other_banks.clone(),
                referral_id: referral.as_ref().map(|r| r.id),
                referral_name: referral.as_ref().map(|r| r.name.as_str()),
                referral_phone: referral.as_ref().map(|r| r.phone.as_str()),
                created_by,
                assigned_to: ctx.assigned_to,
                status: CaseStatus::New,
                priority: ctx.priority.unwrap_or(CasePriority::Medium),
                follow_up_date: ctx.follow_up_date,
            };

            let case = case::create_case(tx, &new_case).await?;

            let referral = match referral {
                Some(r) => {
                    Some(casebook_db::db::query::referral::increment_cases(tx, r.id).await?)
                }
                None => None,
            };

            let new_details: Vec<NewBankDetail<'_>> = ctx
                .bank_details
                .iter()
                .map(|d| NewBankDetail {
                    id: uuid::Uuid::new_v4(),
                    case_id,
                    bank_name: &d.bank_name,
                    account_number: d.account_number.as_deref(),
                    loan_type: d.loan_type,
                    issues: d.issues.clone(),
                })
                .collect();
            let bank_details = bank::insert_all(tx, &new_details).await?;

            let new_fields: Vec<NewCustomField<'_>> = ctx
                .custom_fields
                .iter()
                .enumerate()
                .map(|(i, f)| NewCustomField {
                    id: uuid::Uuid::new_v4(),
                    case_id,
                    label: &f.label,
                    kind: f.kind,
                    value: f.value.clone(),
                    ordinal: i32::try_from(i).unwrap_or(i32::MAX),
                })
                .collect();
            let custom_fields = custom_field::insert_all(tx, &new_fields).await?;

            tracing::info!(case_id = %case.id, "Case created");

            Ok(CreatedCase {
                case,
                bank_details,
                custom_fields,
                referral,
            })
        }
        .scope_boxed()
    })
    .await
}

async fn resolve_referral(
    conn: &mut DbConnection<'_>,
    input: &ReferralInput,
) -> ServiceResult<Referral> {
    let phone = input
        .phone
        .as_deref()
        .filter(|p| *p != REFERRAL_PHONE_UNKNOWN);
    resolve_or_create(conn, &input.name, phone).await
}
