//! Database migration command.
//!
//! Applies `crates/server/migrations/` and creates the tower-sessions
//! table used by the server's session store.

use tower_sessions_sqlx_store::PostgresStore;

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Preparing session store...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
