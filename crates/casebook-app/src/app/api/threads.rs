//! Request thread endpoints.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;

use casebook_db::model::thread::RequestThread;
use casebook_service::thread::{open_thread, open_threads, reply, threads_for_case};

use crate::app::api::uuid_param;
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};
use crate::middleware::identity::get_actor_from_depot;

#[derive(Debug, Deserialize)]
struct OpenThreadBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
    response: String,
}

/// POST /api/cases/{id}/threads
#[handler]
async fn open_thread_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<RequestThread>> {
    let case_id = uuid_param(req, "case_id")?;
    let actor = get_actor_from_depot(depot)?;
    let body: OpenThreadBody = req
        .parse_json()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let thread = open_thread(&mut conn, case_id, &actor, &body.message).await?;
    res.status_code(StatusCode::CREATED);
    Ok(Json(thread))
}

/// GET /api/cases/{id}/threads
#[handler]
async fn case_threads_handler(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<RequestThread>>> {
    let case_id = uuid_param(req, "case_id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(threads_for_case(&mut conn, case_id).await?))
}

/// GET /api/threads/open
#[handler]
async fn open_threads_handler(depot: &mut Depot) -> AppResult<Json<Vec<RequestThread>>> {
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(open_threads(&mut conn).await?))
}

/// POST /api/threads/{id}/reply
#[handler]
async fn reply_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<RequestThread>> {
    let thread_id = uuid_param(req, "thread_id")?;
    let actor = get_actor_from_depot(depot)?;
    let body: ReplyBody = req
        .parse_json()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(reply(&mut conn, thread_id, &actor, &body.response).await?))
}

/// Routes nested under a case.
#[must_use]
pub fn case_routes() -> Router {
    Router::with_path("threads")
        .post(open_thread_handler)
        .get(case_threads_handler)
}

/// Top-level thread routes.
#[must_use]
pub fn routes() -> Router {
    Router::with_path("threads")
        .push(Router::with_path("open").get(open_threads_handler))
        .push(Router::with_path("<thread_id>/reply").post(reply_handler))
}
