//! PostgreSQL pool for the campus store
//!
//! Every request holds exactly one connection for the life of its
//! transaction, so the pool size caps how many requests touch the
//! database at once. Requests beyond that wait up to
//! [`DEFAULT_ACQUIRE_TIMEOUT`] for a free connection and then fail with a
//! database error (500) instead of running into the HTTP timeout.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Pool size used by `campus migrate` and by `campus serve` unless
/// `--max-connections` / `CAMPUS_MAX_CONNECTIONS` says otherwise.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect with the default sizing.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Connect with `max_connections` slots (at least one).
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    pool_options(max_connections).connect(database_url).await
}

fn pool_options(max_connections: u32) -> PgPoolOptions {
    // zero slots would park every request until the acquire timeout
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(DEFAULT_ACQUIRE_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_use_campus_sizing() {
        let options = pool_options(DEFAULT_MAX_CONNECTIONS);
        assert_eq!(options.get_max_connections(), 5);
        assert_eq!(options.get_acquire_timeout(), DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[test]
    fn zero_connections_is_raised_to_one() {
        assert_eq!(pool_options(0).get_max_connections(), 1);
    }

    // Run with: DATABASE_URL=postgres://... cargo test -p campus-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }
}
