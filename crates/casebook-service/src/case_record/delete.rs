//! Case deletion.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_core::types::Actor;
use casebook_db::db::connection::DbConnection;
use casebook_db::db::query::{case, referral};
use casebook_db::model::case::CaseRecord;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Soft-deletes a case. If the case carries a referral link, the referral's
/// case counter is decremented (floored at zero) in the same transaction, so
/// the counter and the case set cannot diverge.
///
/// ## Errors
/// Returns `NotFound` when the case does not exist or was already deleted,
/// or a database error.
#[tracing::instrument(skip(conn), fields(actor = %actor.user_id))]
pub async fn delete_case(
    conn: &mut DbConnection<'_>,
    case_id: uuid::Uuid,
    actor: &Actor,
) -> ServiceResult<CaseRecord> {
    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let deleted = case::soft_delete(tx, case_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("case", case_id))?;

            if let Some(referral_id) = deleted.referral_id {
                referral::decrement_cases(tx, referral_id).await?;
            }

            tracing::info!(case_id = %case_id, "Case deleted");

            Ok(deleted)
        }
        .scope_boxed()
    })
    .await
}
