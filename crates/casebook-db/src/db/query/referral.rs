//! Queries for the referral attribution ledger.
//!
//! Counter adjustments are single UPDATE statements so concurrent case
//! creations against the same referral serialize inside the database and no
//! increment is lost.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use casebook_core::constants::REFERRAL_PHONE_UNKNOWN;

use crate::db::connection::DbConnection;
use crate::db::schema::{case_record, referral};
use crate::model::referral::{NewReferral, Referral};

/// ## Summary
/// Finds a referral by the exact (name, phone) attribution key.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_exact(
    conn: &mut DbConnection<'_>,
    name: &str,
    phone: &str,
) -> diesel::QueryResult<Option<Referral>> {
    referral::table
        .filter(referral::name.eq(name))
        .filter(referral::phone.eq(phone))
        .select(Referral::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Finds the oldest referral with the given name and no recorded phone.
/// Fallback lookup when no exact (name, phone) match exists.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_name_with_unknown_phone(
    conn: &mut DbConnection<'_>,
    name: &str,
) -> diesel::QueryResult<Option<Referral>> {
    referral::table
        .filter(referral::name.eq(name))
        .filter(referral::phone.eq(REFERRAL_PHONE_UNKNOWN))
        .order(referral::created_at.asc())
        .select(Referral::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a new referral with a zero case counter and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails (including a unique violation
/// when another caller created the same (name, phone) concurrently).
pub async fn create_referral(
    conn: &mut DbConnection<'_>,
    new_referral: &NewReferral<'_>,
) -> diesel::QueryResult<Referral> {
    diesel::insert_into(referral::table)
        .values(new_referral)
        .returning(Referral::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Finds a referral by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<Referral>> {
    referral::table
        .find(id)
        .select(Referral::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists all referrals, oldest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<Referral>> {
    referral::table
        .order(referral::created_at.asc())
        .select(Referral::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Atomically increments a referral's case counter.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the referral does not exist,
/// or any other database error.
pub async fn increment_cases(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Referral> {
    diesel::update(referral::table.find(id))
        .set((
            referral::cases.eq(referral::cases + 1),
            referral::updated_at.eq(diesel::dsl::now),
        ))
        .returning(Referral::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Atomically decrements a referral's case counter, floored at zero.
/// Over-decrement is a no-op on the value, not an error.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the referral does not exist,
/// or any other database error.
pub async fn decrement_cases(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Referral> {
    diesel::update(referral::table.find(id))
        .set((
            referral::cases
                .eq(diesel::dsl::sql::<diesel::sql_types::Int4>("GREATEST(cases - 1, 0)")),
            referral::updated_at.eq(diesel::dsl::now),
        ))
        .returning(Referral::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Counts the non-deleted case records linked to a referral. This is the
/// source of truth the `cases` counter caches.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_linked_cases(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<i64> {
    case_record::table
        .filter(case_record::referral_id.eq(id))
        .filter(case_record::deleted_at.is_null())
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Overwrites a referral's case counter. Used by the reconcile repair path
/// after detected drift.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the referral does not exist,
/// or any other database error.
pub async fn set_cases(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    cases: i32,
) -> diesel::QueryResult<Referral> {
    diesel::update(referral::table.find(id))
        .set((
            referral::cases.eq(cases),
            referral::updated_at.eq(diesel::dsl::now),
        ))
        .returning(Referral::as_returning())
        .get_result(conn)
        .await
}
