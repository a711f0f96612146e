//! Queries for request/reply threads.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::ThreadStatus;
use crate::db::schema::request_thread;
use crate::model::thread::{NewRequestThread, RequestThread};

/// ## Summary
/// Opens a new request thread.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_thread(
    conn: &mut DbConnection<'_>,
    new_thread: &NewRequestThread<'_>,
) -> diesel::QueryResult<RequestThread> {
    diesel::insert_into(request_thread::table)
        .values(new_thread)
        .returning(RequestThread::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Finds a thread by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<RequestThread>> {
    request_thread::table
        .find(id)
        .select(RequestThread::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Records an admin response on a thread: sets the response text, the
/// responding admin, the answered-at stamp, and moves status to `answered`.
/// A later call overwrites the previous response (last-write-wins) and the
/// status stays `answered`.
///
/// ## Errors
/// Returns `diesel::result::Error::NotFound` if the thread does not exist,
/// or any other database error.
pub async fn record_reply(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    admin_id: uuid::Uuid,
    response: &str,
) -> diesel::QueryResult<RequestThread> {
    diesel::update(request_thread::table.find(id))
        .set((
            request_thread::admin_response.eq(response),
            request_thread::admin_id.eq(admin_id),
            request_thread::answered_at.eq(diesel::dsl::now),
            request_thread::status.eq(ThreadStatus::Answered),
        ))
        .returning(RequestThread::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Lists the threads raised against a case, oldest first, id as tiebreak.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_by_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<RequestThread>> {
    request_thread::table
        .filter(request_thread::case_id.eq(case_id))
        .order((request_thread::created_at.asc(), request_thread::id.asc()))
        .select(RequestThread::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Lists every open thread across all cases, oldest first, id as tiebreak.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_open(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<RequestThread>> {
    request_thread::table
        .filter(request_thread::status.eq(ThreadStatus::Open))
        .order((request_thread::created_at.asc(), request_thread::id.asc()))
        .select(RequestThread::as_select())
        .load(conn)
        .await
}
