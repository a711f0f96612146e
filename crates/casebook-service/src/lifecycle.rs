//! Status lifecycle controller.
//!
//! Cases move `new -> in-progress -> resolved -> closed`, with backward moves
//! for rework. `closed` is terminal; the only way out is the explicit
//! administrative reopen, which is logged distinctly on the timeline.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_core::error::CoreError;
use casebook_core::types::Actor;
use casebook_db::db::connection::DbConnection;
use casebook_db::db::enums::{CaseStatus, TimelineKind};
use casebook_db::db::query::{case, timeline};
use casebook_db::model::case::CaseRecord;
use casebook_db::model::timeline::{NewTimelineEntry, TimelineEntry};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Whether a status move is in the allowed transition set. The reopen path
/// out of `closed` is not part of this set.
#[must_use]
pub const fn is_allowed(from: CaseStatus, to: CaseStatus) -> bool {
    use CaseStatus::{Closed, InProgress, New, Resolved};
    matches!(
        (from, to),
        (New, InProgress)
            | (InProgress, Resolved | Closed | New)
            | (Resolved, Closed | InProgress | New)
    )
}

fn illegal(from: CaseStatus, to: CaseStatus) -> ServiceError {
    CoreError::IllegalTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
    .into()
}

/// ## Summary
/// Moves a case to a new status.
///
/// Entering `resolved` or `closed` sets the resolution date if unset; moving
/// back out of those states clears it. Every successful transition appends a
/// timeline entry. Concurrent transitions on the same case serialise on a row
/// lock, so the loser validates against the winner's committed status.
///
/// ## Errors
/// Returns `IllegalTransition` naming the rejected (from, to) pair,
/// `NotFound` when the case does not exist, or a database error.
#[tracing::instrument(skip(conn), fields(actor = %actor.user_id))]
pub async fn transition(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    new_status: CaseStatus,
    actor: &Actor,
) -> ServiceResult<CaseRecord> {
    let actor_id = actor.user_id;

    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let current = case::find_by_id_locked(tx, case_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("case", case_id))?;

            if !is_allowed(current.status, new_status) {
                return Err(illegal(current.status, new_status));
            }

            let resolution_date = if new_status.is_settled() {
                current.resolution_date.or_else(|| Some(chrono::Utc::now()))
            } else {
                None
            };

            let updated = case::set_status(tx, case_id, new_status, resolution_date).await?;

            let note = format!("status: {} -> {}", current.status, new_status);
            timeline::append(
                tx,
                &NewTimelineEntry {
                    id: uuid::Uuid::new_v4(),
                    case_id,
                    entry_kind: TimelineKind::Transition,
                    note: &note,
                    actor: actor_id,
                },
            )
            .await?;

            tracing::info!(case_id = %case_id, from = %current.status, to = %new_status, "Case transitioned");

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Administrative reopen: the explicit escape from `closed` back to
/// `in-progress`. Requires the admin role and is logged with the distinct
/// `reopen` timeline kind.
///
/// ## Errors
/// Returns an authorization error for non-admin callers, `IllegalTransition`
/// when the case is not closed, `NotFound` when it does not exist, or a
/// database error.
#[tracing::instrument(skip(conn), fields(actor = %actor.user_id))]
pub async fn reopen(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    actor: &Actor,
) -> ServiceResult<CaseRecord> {
    if !actor.is_admin() {
        return Err(ServiceError::AuthorizationError(
            "reopening a closed case requires the admin role".to_owned(),
        ));
    }

    let actor_id = actor.user_id;

    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let current = case::find_by_id_locked(tx, case_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("case", case_id))?;

            if current.status != CaseStatus::Closed {
                return Err(illegal(current.status, CaseStatus::InProgress));
            }

            let updated = case::set_status(tx, case_id, CaseStatus::InProgress, None).await?;

            timeline::append(
                tx,
                &NewTimelineEntry {
                    id: uuid::Uuid::new_v4(),
                    case_id,
                    entry_kind: TimelineKind::Reopen,
                    note: "case reopened by administrator",
                    actor: actor_id,
                },
            )
            .await?;

            tracing::info!(case_id = %case_id, "Closed case reopened");

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Returns a case's timeline, oldest entry first.
///
/// ## Errors
/// Returns `NotFound` when the case does not exist, or a database error.
pub async fn case_timeline(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
) -> ServiceResult<Vec<TimelineEntry>> {
    case::find_by_id(conn, case_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("case", case_id))?;

    Ok(timeline::list_for_case(conn, case_id).await?)
}
