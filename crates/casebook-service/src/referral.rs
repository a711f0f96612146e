//! Referral attribution ledger.
//!
//! Referrals are created on first use and never auto-deleted. The `cases`
//! counter is maintained by case creation/deletion inside their transactions;
//! `reconcile` recomputes it from the linked cases after detected drift.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use casebook_core::constants::REFERRAL_PHONE_UNKNOWN;
use casebook_db::db::connection::DbConnection;
use casebook_db::db::query::referral;
use casebook_db::model::referral::{NewReferral, Referral};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Resolves a referral by attribution key, creating it when absent.
///
/// Lookup order is the tie-break: an exact (name, real phone) match wins over
/// a name-only match among sentinel-phone referrals, which wins over
/// creation. A concurrent create that loses the unique-index race is retried
/// once as a lookup.
///
/// ## Errors
/// Returns a database error if any query fails.
#[tracing::instrument(skip(conn))]
pub async fn resolve_or_create(
    conn: &mut DbConnection<'_>,
    name: &str,
    phone: Option<&str>,
) -> ServiceResult<Referral> {
    let phone = phone.unwrap_or(REFERRAL_PHONE_UNKNOWN);

    if phone != REFERRAL_PHONE_UNKNOWN
        && let Some(existing) = referral::find_exact(conn, name, phone).await?
    {
        return Ok(existing);
    }

    if let Some(existing) = referral::find_name_with_unknown_phone(conn, name).await? {
        return Ok(existing);
    }

    let referral_id = uuid::Uuid::new_v4();
    // The transaction closure may only capture owned data, so the borrowed
    // inputs are cloned and moved in.
    let name_for_tx = name.to_owned();
    let phone_for_tx = phone.to_owned();

    // The insert gets its own nested transaction (a savepoint when the caller
    // already holds one), so a unique violation rolls back to the savepoint
    // instead of poisoning the caller's transaction, and the lookup below
    // still runs.
    let created = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let new_referral = NewReferral {
                    id: referral_id,
                    name: &name_for_tx,
                    phone: &phone_for_tx,
                };
                Ok(referral::create_referral(tx, &new_referral).await?)
            }
            .scope_boxed()
        })
        .await;

    match created {
        Ok(created) => {
            tracing::debug!(referral_id = %created.id, "Created referral on first use");
            Ok(created)
        }
        Err(service_err) if service_err.is_unique_violation() => {
            // Another caller created the same (name, phone) first.
            referral::find_exact(conn, name, phone)
                .await?
                .ok_or(service_err)
        }
        Err(service_err) => Err(service_err),
    }
}

/// ## Summary
/// Fetches a referral by id.
///
/// ## Errors
/// Returns `NotFound` when the referral does not exist.
pub async fn get_referral(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> ServiceResult<Referral> {
    referral::find_by_id(conn, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("referral", id))
}

/// ## Summary
/// Lists all referrals.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_referrals(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<Referral>> {
    Ok(referral::list(conn).await?)
}

/// ## Summary
/// Recomputes a referral's case counter from the non-deleted cases that link
/// to it. Repair path for counter drift; success metrics are untouched.
///
/// ## Errors
/// Returns `NotFound` when the referral does not exist, or a database error.
#[tracing::instrument(skip(conn))]
pub async fn reconcile(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> ServiceResult<Referral> {
    let existing = referral::find_by_id(conn, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("referral", id))?;

    let actual = referral::count_linked_cases(conn, id).await?;
    let actual = i32::try_from(actual).unwrap_or(i32::MAX);

    if actual != existing.cases {
        tracing::warn!(
            referral_id = %id,
            cached = existing.cases,
            actual,
            "Referral case counter drifted, repairing"
        );
    }

    Ok(referral::set_cases(conn, id, actual).await?)
}
