//! Document slot endpoints, nested under a case.
//!
//! File bytes live with the upload collaborator; these endpoints manage the
//! slot-to-reference association only.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::{Deserialize, Serialize};

use casebook_db::model::document::CaseDocument;
use casebook_service::document::{attach, detach};

use crate::app::api::uuid_param;
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachBody {
    file_ref: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachResponse {
    document: CaseDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced: Option<String>,
}

/// PUT /api/cases/{id}/documents/{slot}?overwrite=true
#[handler]
async fn attach_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<AttachResponse>> {
    let case_id = uuid_param(req, "case_id")?;
    let slot = req
        .param::<String>("slot")
        .ok_or_else(|| AppError::BadRequest("missing slot parameter".to_owned()))?;
    let overwrite = req.query::<bool>("overwrite").unwrap_or(false);
    let body: AttachBody = req
        .parse_json()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let outcome = attach(&mut conn, case_id, &slot, &body.file_ref, overwrite).await?;
    if outcome.replaced.is_none() {
        res.status_code(StatusCode::CREATED);
    }
    Ok(Json(AttachResponse {
        document: outcome.document,
        replaced: outcome.replaced,
    }))
}

/// DELETE /api/cases/{id}/documents/{slot}
#[handler]
async fn detach_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CaseDocument>> {
    let case_id = uuid_param(req, "case_id")?;
    let slot = req
        .param::<String>("slot")
        .ok_or_else(|| AppError::BadRequest("missing slot parameter".to_owned()))?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(detach(&mut conn, case_id, &slot).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("documents").push(
        Router::with_path("<slot>")
            .put(attach_handler)
            .delete(detach_handler),
    )
}
