//! Queries for document slot associations.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::case_document;
use crate::model::document::{CaseDocument, NewCaseDocument};

/// ## Summary
/// Finds the document currently held by a (case, slot) pair.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_slot(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    slot: &str,
) -> diesel::QueryResult<Option<CaseDocument>> {
    case_document::table
        .filter(case_document::case_id.eq(case_id))
        .filter(case_document::slot.eq(slot))
        .select(CaseDocument::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a document reference into an empty slot. The unique index on
/// (case_id, slot) turns a concurrent double-attach into a unique violation
/// for the loser.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn attach_new(
    conn: &mut DbConnection<'_>,
    new_document: &NewCaseDocument<'_>,
) -> diesel::QueryResult<CaseDocument> {
    diesel::insert_into(case_document::table)
        .values(new_document)
        .returning(CaseDocument::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Replaces the reference held by an occupied slot.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the slot is empty, or any
/// other database error.
pub async fn replace_ref(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    slot: &str,
    file_ref: &str,
) -> diesel::QueryResult<CaseDocument> {
    diesel::update(
        case_document::table
            .filter(case_document::case_id.eq(case_id))
            .filter(case_document::slot.eq(slot)),
    )
    .set((
        case_document::file_ref.eq(file_ref),
        case_document::attached_at.eq(diesel::dsl::now),
    ))
    .returning(CaseDocument::as_returning())
    .get_result(conn)
    .await
}

/// ## Summary
/// Clears a slot, returning the reference it held (if any). The caller is
/// responsible for deleting the underlying file externally.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn detach(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    slot: &str,
) -> diesel::QueryResult<Option<CaseDocument>> {
    diesel::delete(
        case_document::table
            .filter(case_document::case_id.eq(case_id))
            .filter(case_document::slot.eq(slot)),
    )
    .returning(CaseDocument::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Deletes dynamic-slot documents whose slot is not in the keep list. Fixed
/// slots are never touched. Used when a custom-field replacement removes
/// file-kind fields that held attachments.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn prune_dynamic_not_in(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    keep: &[String],
) -> diesel::QueryResult<usize> {
    let fixed: Vec<&str> = casebook_core::constants::FIXED_DOCUMENT_SLOTS.to_vec();
    diesel::delete(
        case_document::table
            .filter(case_document::case_id.eq(case_id))
            .filter(case_document::slot.ne_all(fixed))
            .filter(case_document::slot.ne_all(keep)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Lists the documents attached to a case, ordered by slot name.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<CaseDocument>> {
    case_document::table
        .filter(case_document::case_id.eq(case_id))
        .order(case_document::slot.asc())
        .select(CaseDocument::as_select())
        .load(conn)
        .await
}
