mod cases;
mod documents;
mod healthcheck;
mod referrals;
mod threads;
mod uploads;

use salvo::Router;

use crate::middleware::identity::IdentityMiddleware;

// Re-export route constants from core
pub use casebook_core::constants::API_ROUTE_COMPONENT;

/// ## Summary
/// Constructs the main API router. The healthcheck is reachable without
/// identity headers; everything else sits behind the identity middleware.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(
            Router::new()
                .hoop(IdentityMiddleware)
                .push(cases::routes())
                .push(referrals::routes())
                .push(threads::routes())
                .push(uploads::routes()),
        )
}

/// Extracts a uuid path parameter.
pub(crate) fn uuid_param(req: &salvo::Request, name: &str) -> crate::error::AppResult<uuid::Uuid> {
    req.param::<String>(name)
        .ok_or_else(|| crate::error::AppError::BadRequest(format!("missing {name} parameter")))?
        .parse()
        .map_err(|_| crate::error::AppError::BadRequest(format!("{name} must be a valid uuid")))
}
