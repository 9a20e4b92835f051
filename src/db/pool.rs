use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::error::StoreError;
use super::retry::RetryPolicy;
use crate::config::Config;

/// Connect the shared pool, retrying with backoff while the database is
/// unreachable.
pub async fn create_pool(config: &Config) -> Result<PgPool, StoreError> {
    let policy = RetryPolicy::with_attempts(config.db_connect_attempts);
    let mut attempt = 1;

    loop {
        let result = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await;

        match result.map_err(StoreError::from) {
            Ok(pool) => return Ok(pool),
            Err(err) if err.is_connectivity() && policy.should_retry(attempt) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    error = %err,
                    attempt,
                    max_attempts = policy.max_attempts,
                    retry_in_ms = delay.as_millis() as u64,
                    "Database unreachable, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
