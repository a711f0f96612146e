//! Read-only configuration surface for the upload collaborator.

use salvo::writing::Json;
use salvo::{Depot, Router, handler};

use casebook_core::config::UploadsConfig;

use crate::config::get_config_from_depot;
use crate::error::AppResult;

/// GET /api/config/uploads
#[handler]
async fn uploads_handler(depot: &mut Depot) -> AppResult<Json<UploadsConfig>> {
    let settings = get_config_from_depot(depot)?;
    Ok(Json(settings.uploads.clone()))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("config/uploads").get(uploads_handler)
}
