//! Queries for per-bank dispute details.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::bank_detail;
use crate::model::bank::{BankDetail, NewBankDetail};

/// ## Summary
/// Inserts bank details for a case.
///
/// ## Errors
/// Returns a database error if the insert fails (including a unique violation
/// when two details name the same bank).
pub async fn insert_all(
    conn: &mut DbConnection<'_>,
    details: &[NewBankDetail<'_>],
) -> diesel::QueryResult<Vec<BankDetail>> {
    if details.is_empty() {
        return Ok(Vec::new());
    }
    diesel::insert_into(bank_detail::table)
        .values(details)
        .returning(BankDetail::as_returning())
        .get_results(conn)
        .await
}

/// ## Summary
/// Lists the bank details on a case, ordered by bank name.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<BankDetail>> {
    bank_detail::table
        .filter(bank_detail::case_id.eq(case_id))
        .order(bank_detail::bank_name.asc())
        .select(BankDetail::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Deletes every bank detail on a case. Used when a patch replaces the
/// detail set wholesale.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<usize> {
    diesel::delete(bank_detail::table.filter(bank_detail::case_id.eq(case_id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes details whose bank name is no longer in the case's bank lists.
/// Keeps the detail/bank-set invariant intact when banks are removed by a
/// patch.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn prune_not_in(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    keep: &[String],
) -> diesel::QueryResult<usize> {
    diesel::delete(
        bank_detail::table
            .filter(bank_detail::case_id.eq(case_id))
            .filter(bank_detail::bank_name.ne_all(keep)),
    )
    .execute(conn)
    .await
}
