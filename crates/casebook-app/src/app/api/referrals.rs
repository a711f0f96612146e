//! Referral ledger endpoints.

use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use casebook_db::model::referral::Referral;
use casebook_service::referral::{get_referral, list_referrals, reconcile};

use crate::app::api::uuid_param;
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;

/// GET /api/referrals
#[handler]
async fn list_handler(depot: &mut Depot) -> AppResult<Json<Vec<Referral>>> {
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(list_referrals(&mut conn).await?))
}

/// GET /api/referrals/{id}
#[handler]
async fn get_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Referral>> {
    let referral_id = uuid_param(req, "referral_id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(get_referral(&mut conn, referral_id).await?))
}

/// POST /api/referrals/{id}/reconcile
#[handler]
async fn reconcile_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Referral>> {
    let referral_id = uuid_param(req, "referral_id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(reconcile(&mut conn, referral_id).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("referrals")
        .get(list_handler)
        .push(
            Router::with_path("<referral_id>")
                .get(get_handler)
                .push(Router::with_path("reconcile").post(reconcile_handler)),
        )
}
