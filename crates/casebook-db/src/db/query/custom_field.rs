//! Queries for custom fields.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::CustomFieldKind;
use crate::db::schema::custom_field;
use crate::model::custom_field::{CustomField, NewCustomField};

/// ## Summary
/// Inserts custom fields for a case.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_all(
    conn: &mut DbConnection<'_>,
    fields: &[NewCustomField<'_>],
) -> diesel::QueryResult<Vec<CustomField>> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }
    diesel::insert_into(custom_field::table)
        .values(fields)
        .returning(CustomField::as_returning())
        .get_results(conn)
        .await
}

/// ## Summary
/// Lists a case's custom fields in declaration order.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<CustomField>> {
    custom_field::table
        .filter(custom_field::case_id.eq(case_id))
        .order(custom_field::ordinal.asc())
        .select(CustomField::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Finds a file-kind custom field on a case by its id. Used to validate
/// dynamic document slot names.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_file_field(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    field_id: uuid::Uuid,
) -> diesel::QueryResult<Option<CustomField>> {
    custom_field::table
        .filter(custom_field::case_id.eq(case_id))
        .filter(custom_field::id.eq(field_id))
        .filter(custom_field::kind.eq(CustomFieldKind::File))
        .select(CustomField::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Deletes every custom field on a case. Used when a patch replaces the
/// field list wholesale.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<usize> {
    diesel::delete(custom_field::table.filter(custom_field::case_id.eq(case_id)))
        .execute(conn)
        .await
}
