use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use casebook_core::error::CoreError;
use casebook_db::db::DbProvider;

/// Hoop that shares the connection pool with every handler below it through
/// the depot.
pub struct DbProviderHandler<T: DbProvider + Send + Sync + Clone> {
    pub provider: T,
}

#[async_trait]
impl<T: DbProvider + Send + Sync + Clone + 'static> salvo::Handler for DbProviderHandler<T> {
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        let provider: Arc<dyn DbProvider + Send + Sync> = Arc::new(self.provider.clone());
        depot.inject(provider);
    }
}

/// ## Summary
/// Pulls the pooled database provider back out of the depot.
///
/// ## Errors
/// Returns an invariant violation when the hoop above did not inject one;
/// every route below `DbProviderHandler` can rely on it being present.
pub fn get_db_from_depot(
    depot: &salvo::Depot,
) -> AppResult<Arc<dyn DbProvider + Send + Sync + 'static>> {
    depot
        .obtain::<Arc<dyn DbProvider + Send + Sync>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("database provider missing from depot").into())
}
