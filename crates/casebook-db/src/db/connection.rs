use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// ## Summary
/// Builds the bb8 pool the case services draw connections from.
///
/// One idle connection is kept warm; the rest are opened on demand up to
/// `max_size`. Checked-out connections are not re-verified: a broken one
/// surfaces as a query error and is discarded when returned.
///
/// ## Errors
/// Returns an error when no connection can be established with the given
/// database URL.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

    let pool = Pool::builder()
        .max_size(max_size)
        .min_idle(Some(1))
        .test_on_check_out(false)
        .build(manager)
        .await?;

    tracing::info!(max_size, "Connection pool ready");

    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move { Ok(self.get().await?) })
    }
}
