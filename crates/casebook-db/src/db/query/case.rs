//! Queries for case records.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::{CasePriority, CaseStatus};
use crate::db::schema::case_record;
use crate::model::case::{CaseChangeset, CaseRecord, NewCaseRecord};

/// ## Summary
/// Returns a query to select all case records.
#[must_use]
pub fn all() -> case_record::BoxedQuery<'static, diesel::pg::Pg> {
    case_record::table.into_boxed()
}

/// ## Summary
/// Returns a query to find non-deleted case records.
#[must_use]
pub fn not_deleted() -> case_record::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(case_record::deleted_at.is_null())
}

/// ## Summary
/// Returns a query to find a non-deleted case by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> case_record::BoxedQuery<'static, diesel::pg::Pg> {
    not_deleted().filter(case_record::id.eq(id))
}

/// Filter for case listings. Every field is optional; unset fields do not
/// constrain the result.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub assigned_to: Option<uuid::Uuid>,
    pub priority: Option<CasePriority>,
    pub referral_id: Option<uuid::Uuid>,
    pub created_after: Option<chrono::DateTime<chrono::Utc>>,
    pub created_before: Option<chrono::DateTime<chrono::Utc>>,
}

/// ## Summary
/// Inserts a new case record and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_case(
    conn: &mut DbConnection<'_>,
    new_case: &NewCaseRecord<'_>,
) -> diesel::QueryResult<CaseRecord> {
    diesel::insert_into(case_record::table)
        .values(new_case)
        .returning(CaseRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Finds a non-deleted case by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<CaseRecord>> {
    by_id(id)
        .select(CaseRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Finds a non-deleted case by ID and locks its row for the rest of the
/// enclosing transaction. Concurrent lifecycle writers on the same case queue
/// behind the lock and re-read the committed state.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id_locked(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<CaseRecord>> {
    case_record::table
        .filter(case_record::deleted_at.is_null())
        .filter(case_record::id.eq(id))
        .select(CaseRecord::as_select())
        .for_update()
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Applies a partial update to a non-deleted case and returns the new row.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the case does not exist or is
/// deleted, or any other database error.
pub async fn update_case(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    changes: &CaseChangeset,
) -> diesel::QueryResult<CaseRecord> {
    diesel::update(
        case_record::table
            .filter(case_record::id.eq(id))
            .filter(case_record::deleted_at.is_null()),
    )
    .set(changes)
    .returning(CaseRecord::as_returning())
    .get_result(conn)
    .await
}

/// ## Summary
/// Sets the lifecycle columns of a case: status, resolution date, and the
/// updated-at stamp. Used only by the status lifecycle controller.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the case does not exist or is
/// deleted, or any other database error.
pub async fn set_status(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    status: CaseStatus,
    resolution_date: Option<chrono::DateTime<chrono::Utc>>,
) -> diesel::QueryResult<CaseRecord> {
    diesel::update(
        case_record::table
            .filter(case_record::id.eq(id))
            .filter(case_record::deleted_at.is_null()),
    )
    .set((
        case_record::status.eq(status),
        case_record::resolution_date.eq(resolution_date),
        case_record::updated_at.eq(diesel::dsl::now),
    ))
    .returning(CaseRecord::as_returning())
    .get_result(conn)
    .await
}

/// ## Summary
/// Soft-deletes a case. Returns the deleted row, or `None` when the case was
/// absent or already deleted.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn soft_delete(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<CaseRecord>> {
    diesel::update(
        case_record::table
            .filter(case_record::id.eq(id))
            .filter(case_record::deleted_at.is_null()),
    )
    .set(case_record::deleted_at.eq(diesel::dsl::now))
    .returning(CaseRecord::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Lists non-deleted cases matching the filter, newest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list(
    conn: &mut DbConnection<'_>,
    filter: &CaseFilter,
) -> diesel::QueryResult<Vec<CaseRecord>> {
    let mut query = not_deleted();

    if let Some(status) = filter.status {
        query = query.filter(case_record::status.eq(status));
    }
    if let Some(assignee) = filter.assigned_to {
        query = query.filter(case_record::assigned_to.eq(assignee));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(case_record::priority.eq(priority));
    }
    if let Some(referral_id) = filter.referral_id {
        query = query.filter(case_record::referral_id.eq(referral_id));
    }
    if let Some(after) = filter.created_after {
        query = query.filter(case_record::created_at.ge(after));
    }
    if let Some(before) = filter.created_before {
        query = query.filter(case_record::created_at.le(before));
    }

    query
        .order(case_record::created_at.desc())
        .select(CaseRecord::as_select())
        .load(conn)
        .await
}
