use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde_json::json;

use casebook_core::types::{Actor, Role};

use crate::error::AppResult;

/// Depot keys used by the identity middleware.
pub mod depot_keys {
    pub const ACTOR: &str = "actor";
}

/// Header carrying the caller's user id, set by the authenticating proxy.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's role, set by the authenticating proxy.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// ## Summary
/// Identity middleware. Authentication happens upstream; the proxy forwards
/// the verified identity in `x-user-id` and `x-user-role` headers, which this
/// middleware turns into an [`Actor`] for downstream handlers.
///
/// ## Side Effects
/// Inserts the actor into the depot under the key "actor".
///
/// ## Errors
/// Returns an HTTP 401 Unauthorized response when either header is missing or
/// malformed.
pub struct IdentityMiddleware;

#[salvo::async_trait]
impl salvo::Handler for IdentityMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        match actor_from_headers(req) {
            Some(actor) => {
                tracing::trace!(user_id = %actor.user_id, role = %actor.role, "Caller identified");
                depot.insert(depot_keys::ACTOR, actor);
            }
            None => {
                tracing::debug!("Request missing or carrying malformed identity headers");
                res.status_code(StatusCode::UNAUTHORIZED);
                res.render(Json(json!({ "error": "identity headers required" })));
                ctrl.skip_rest();
            }
        }
    }
}

fn actor_from_headers(req: &salvo::Request) -> Option<Actor> {
    let user_id = req
        .header::<String>(USER_ID_HEADER)?
        .parse::<uuid::Uuid>()
        .ok()?;
    let role = req
        .header::<String>(USER_ROLE_HEADER)?
        .parse::<Role>()
        .ok()?;
    Some(Actor::new(user_id, role))
}

/// ## Summary
/// Retrieves the caller's actor from the depot.
///
/// ## Errors
/// Returns an error if the actor is not found in the depot.
pub fn get_actor_from_depot(depot: &Depot) -> AppResult<Actor> {
    depot
        .get::<Actor>(depot_keys::ACTOR)
        .cloned()
        .map_err(|_err| {
            casebook_core::error::CoreError::InvariantViolation("Actor not found in depot").into()
        })
}
