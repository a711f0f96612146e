//! Partial case updates.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_core::constants::KNOWN_BANKS;
use casebook_core::error::Violations;
use casebook_core::types::Actor;
use casebook_core::validate;

use casebook_db::db::connection::DbConnection;
use casebook_db::db::enums::{CasePriority, TimelineKind};
use casebook_db::db::query::{bank, case, custom_field, timeline};
use casebook_db::model::bank::NewBankDetail;
use casebook_db::model::case::{CaseChangeset, CaseRecord};
use casebook_db::model::custom_field::NewCustomField;
use casebook_db::model::timeline::NewTimelineEntry;

use crate::error::{ServiceError, ServiceResult};

use super::intake::{validate_bank_details, validate_custom_fields};
use super::{BankDetailInput, CustomFieldInput};

/// Partial update for a case. `None` leaves a field untouched; the nested
/// `Option` on nullable fields writes an explicit null. Identity, creator,
/// creation time, and status are not patchable; status moves only through the
/// lifecycle controller.
#[derive(Debug, Clone, Default)]
pub struct CasePatch {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub aadhaar: Option<Option<String>>,
    pub pan: Option<Option<String>>,
    pub cibil_score: Option<Option<i32>>,
    pub problem: Option<String>,
    pub banks: Option<Vec<String>>,
    pub other_banks: Option<Vec<String>>,
    pub bank_details: Option<Vec<BankDetailInput>>,
    pub custom_fields: Option<Vec<CustomFieldInput>>,
    pub assigned_to: Option<Option<uuid::Uuid>>,
    pub priority: Option<CasePriority>,
    pub follow_up_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub resolution_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
}

/// Validates only the fields the patch touches.
fn validate_patch(patch: &CasePatch, current: &CaseRecord) -> Violations {
    let mut violations = Violations::new();

    if let Some(name) = &patch.customer_name
        && name.trim().is_empty()
    {
        violations.push("name", "must not be empty");
    }
    if let Some(phone) = &patch.phone
        && !validate::is_ten_digit_phone(phone)
    {
        violations.push("phone", "must be exactly 10 digits");
    }
    if let Some(Some(email)) = &patch.email
        && !validate::is_email(email)
    {
        violations.push("email", "must be a well-formed email address");
    }
    if let Some(Some(aadhaar)) = &patch.aadhaar
        && !validate::is_aadhaar(aadhaar)
    {
        violations.push("aadhaar", "must be exactly 12 digits");
    }
    if let Some(Some(pan)) = &patch.pan
        && !validate::is_pan(pan)
    {
        violations.push("pan", "must match the PAN format (AAAAA9999A)");
    }
    if let Some(Some(score)) = patch.cibil_score
        && !validate::is_cibil_score(score)
    {
        violations.push("cibilScore", "must be between 300 and 900");
    }
    if let Some(problem) = &patch.problem
        && problem.trim().is_empty()
    {
        violations.push("problem", "must not be empty");
    }

    if let Some(banks) = &patch.banks {
        for bank_name in banks {
            if !KNOWN_BANKS.contains(&bank_name.as_str()) {
                violations.push(
                    "banks",
                    format!("'{bank_name}' is not a known bank; list it under otherBanks"),
                );
            }
        }
    }

    // The detail/bank-set invariant is checked against the lists as they will
    // be after the patch.
    let effective_banks = patch.banks.as_ref().unwrap_or(&current.banks);
    let effective_other = patch.other_banks.as_ref().unwrap_or(&current.other_banks);
    if let Some(details) = &patch.bank_details {
        validate_bank_details(details, effective_banks, effective_other, &mut violations);
    }

    if let Some(fields) = &patch.custom_fields {
        validate_custom_fields(fields, &mut violations);
    }

    match patch.resolution_date {
        Some(Some(_)) if !current.status.is_settled() => {
            violations.push(
                "resolutionDate",
                format!("cannot be set while status is '{}'", current.status),
            );
        }
        Some(None) if current.status.is_settled() => {
            violations.push(
                "resolutionDate",
                format!("cannot be cleared while status is '{}'", current.status),
            );
        }
        _ => {}
    }

    violations
}

/// ## Summary
/// Applies a partial update to a case, re-validating only the touched fields.
///
/// ## Side Effects
/// - Replaces bank-detail/custom-field rows when those lists are patched
/// - Prunes bank details and dynamic document slots orphaned by the patch
/// - Appends an assignment note to the timeline when the assignee changes
///
/// ## Errors
/// Returns `NotFound` when the case does not exist, a validation error for
/// touched-field violations, or a database error.
#[tracing::instrument(skip(conn, patch), fields(actor = %actor.user_id))]
pub async fn update_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    patch: &CasePatch,
    actor: &Actor,
) -> ServiceResult<CaseRecord> {
    let actor_id = actor.user_id;
    // The transaction closure may only capture owned data, so the borrowed
    // patch is cloned and moved in.
    let patch = patch.clone();

    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let patch = &patch;
            let current = case::find_by_id(tx, case_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("case", case_id))?;

            validate_patch(patch, &current)
                .into_result()
                .map_err(ServiceError::from)?;

            let changes = CaseChangeset {
                customer_name: patch.customer_name.clone(),
                phone: patch.phone.clone(),
                email: patch.email.clone(),
                aadhaar: patch.aadhaar.clone(),
                pan: patch.pan.clone(),
                cibil_score: patch.cibil_score,
                problem: patch.problem.clone(),
                banks: patch.banks.clone(),
                other_banks: patch.other_banks.clone(),
                assigned_to: patch.assigned_to,
                priority: patch.priority,
                follow_up_date: patch.follow_up_date,
                resolution_date: patch.resolution_date,
                updated_at: Some(chrono::Utc::now()),
            };

            let updated = case::update_case(tx, case_id, &changes).await?;

            if let Some(details) = &patch.bank_details {
                bank::delete_for_case(tx, case_id).await?;
                let new_details: Vec<NewBankDetail<'_>> = details
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
                bank::insert_all(tx, &new_details).await?;
            } else if patch.banks.is_some() || patch.other_banks.is_some() {
                // Banks changed without a detail replacement: drop details for
                // banks no longer on the case.
                bank::prune_not_in(tx, case_id, &updated.all_banks()).await?;
            }

            if let Some(fields) = &patch.custom_fields {
                replace_custom_fields(tx, case_id, fields).await?;
            }

            if let Some(new_assignee) = patch.assigned_to
                && new_assignee != current.assigned_to
            {
                let note = match new_assignee {
                    Some(user) => format!("assigned to {user}"),
                    None => "unassigned".to_owned(),
                };
                timeline::append(
                    tx,
                    &NewTimelineEntry {
                        id: uuid::Uuid::new_v4(),
                        case_id,
                        entry_kind: TimelineKind::Note,
                        note: &note,
                        actor: actor_id,
                    },
                )
                .await?;
            }

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

/// Replaces the custom-field list and detaches documents whose dynamic slot
/// no longer names a file-kind field.
async fn replace_custom_fields(
    tx: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    fields: &[CustomFieldInput],
) -> ServiceResult<()> {
    custom_field::delete_for_case(tx, case_id).await?;

    let new_fields: Vec<NewCustomField<'_>> = fields
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
    let inserted = custom_field::insert_all(tx, &new_fields).await?;

    let file_slots: Vec<String> = inserted
        .iter()
        .filter(|f| matches!(f.kind, casebook_db::db::enums::CustomFieldKind::File))
        .map(|f| f.id.to_string())
        .collect();
    casebook_db::db::query::document::prune_dynamic_not_in(tx, case_id, &file_slots).await?;

    Ok(())
}
