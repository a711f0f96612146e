//! Request/reply thread manager.
//!
//! A thread is a one-shot mailbox: an agent raises a question against a case,
//! exactly one admin response is held, and recording it flips the thread to
//! `answered`. A later reply overwrites the response text (last-write-wins)
//! and the status stays `answered`.

use casebook_core::error::CoreError;
use casebook_core::types::Actor;
use casebook_db::db::connection::DbConnection;
use casebook_db::db::enums::ThreadStatus;
use casebook_db::db::query::{case, thread};
use casebook_db::model::thread::{NewRequestThread, RequestThread};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Opens a request thread against a case. The message is immutable after
/// creation.
///
/// ## Errors
/// Returns a validation error for an empty message, `NotFound` when the case
/// does not exist, or a database error.
#[tracing::instrument(skip(conn, message), fields(agent = %actor.user_id))]
pub async fn open_thread(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    actor: &Actor,
    message: &str,
) -> ServiceResult<RequestThread> {
    if message.trim().is_empty() {
        return Err(CoreError::invalid_field("message", "must not be empty").into());
    }

    case::find_by_id(conn, case_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("case", case_id))?;

    let new_thread = NewRequestThread {
        id: uuid::Uuid::new_v4(),
        case_id,
        agent_id: actor.user_id,
        message,
        status: ThreadStatus::Open,
    };

    let created = thread::create_thread(conn, &new_thread).await?;
    tracing::info!(thread_id = %created.id, case_id = %case_id, "Request thread opened");
    Ok(created)
}

/// ## Summary
/// Records an admin response on a thread, moving it to `answered` and
/// stamping the responding admin and time. Replying again overwrites the
/// previous response and leaves the status `answered`.
///
/// ## Errors
/// Returns an authorization error for non-admin callers, a validation error
/// for an empty response, `NotFound` when the thread does not exist, or a
/// database error.
#[tracing::instrument(skip(conn, response), fields(admin = %actor.user_id))]
pub async fn reply(
    conn: &mut DbConnection<'_>,
    thread_id: uuid::Uuid,
    actor: &Actor,
    response: &str,
) -> ServiceResult<RequestThread> {
    if !actor.is_admin() {
        return Err(ServiceError::AuthorizationError(
            "replying to a request thread requires the admin role".to_owned(),
        ));
    }
    if response.trim().is_empty() {
        return Err(CoreError::invalid_field("response", "must not be empty").into());
    }

    thread::find_by_id(conn, thread_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("thread", thread_id))?;

    let updated = thread::record_reply(conn, thread_id, actor.user_id, response).await?;
    tracing::info!(thread_id = %thread_id, "Admin reply recorded");
    Ok(updated)
}

/// ## Summary
/// Lists the threads raised against a case, creation order, id as tiebreak.
///
/// ## Errors
/// Returns `NotFound` when the case does not exist, or a database error.
pub async fn threads_for_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> ServiceResult<Vec<RequestThread>> {
    case::find_by_id(conn, case_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("case", case_id))?;

    Ok(thread::list_by_case(conn, case_id).await?)
}

/// ## Summary
/// Lists every open thread across all cases, creation order, id as tiebreak.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn open_threads(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<RequestThread>> {
    Ok(thread::list_open(conn).await?)
}
