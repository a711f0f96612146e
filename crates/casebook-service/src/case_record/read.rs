//! Read-only case projections.

use serde::Serialize;

use casebook_db::db::connection::DbConnection;
use casebook_db::db::query::case::CaseFilter;
use casebook_db::db::query::{bank, case, custom_field, document};
use casebook_db::model::bank::BankDetail;
use casebook_db::model::case::CaseRecord;
use casebook_db::model::custom_field::CustomField;
use casebook_db::model::document::CaseDocument;

use crate::error::{ServiceError, ServiceResult};

/// A case with its sub-records and the derived all-banks view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseView {
    #[serde(flatten)]
    pub case: CaseRecord,
    pub all_banks: Vec<String>,
    pub bank_details: Vec<BankDetail>,
    pub custom_fields: Vec<CustomField>,
    pub documents: Vec<CaseDocument>,
}

/// ## Summary
/// Fetches a case with its bank details, custom fields, and documents.
///
/// ## Errors
/// Returns `NotFound` when the case does not exist, or a database error.
pub async fn get_case(conn: &mut DbConnection<'_>, case_id: uuid::Uuid) -> ServiceResult<CaseView> {
    let case = case::find_by_id(conn, case_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("case", case_id))?;

    let bank_details = bank::list_for_case(conn, case_id).await?;
    let custom_fields = custom_field::list_for_case(conn, case_id).await?;
    let documents = document::list_for_case(conn, case_id).await?;

    Ok(CaseView {
        all_banks: case.all_banks(),
        case,
        bank_details,
        custom_fields,
        documents,
    })
}

/// ## Summary
/// Lists cases matching the filter. Read-only; never mutates state.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_cases(
    conn: &mut DbConnection<'_>,
    filter: &CaseFilter,
) -> ServiceResult<Vec<CaseRecord>> {
    Ok(case::list(conn, filter).await?)
}
