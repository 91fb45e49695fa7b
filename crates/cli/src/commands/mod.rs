//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

use stock_home_server::db;

/// Load `.env` and connect to the database named by
/// `STOCK_HOME_DATABASE_URL` (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOCK_HOME_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "STOCK_HOME_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");
    Ok(pool)
}
