//! Account management commands.

use stock_home_core::Email;
use stock_home_server::db::UserRepository;
use stock_home_server::services::auth::AuthService;

/// Environment variable read when `--password` is not given.
const PASSWORD_ENV: &str = "STOCK_HOME_USER_PASSWORD";

/// Create an account with the same validation as sign-up.
///
/// # Errors
///
/// Returns an error if no password is available, validation fails, the
/// email is already registered, or a database operation fails.
pub async fn create(
    email: &str,
    name: &str,
    password: Option<String>,
    verified: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let password = match password {
        Some(p) => p,
        None => std::env::var(PASSWORD_ENV)
            .map_err(|_| format!("pass --password or set {PASSWORD_ENV}"))?,
    };

    let user = AuthService::new(&pool)
        .sign_up(email, &password, name)
        .await
        .map_err(|e| e.user_message())?;

    if verified {
        UserRepository::new(&pool).verify_email(&user.email).await?;
    }

    tracing::info!(user_id = %user.id, email = %user.email, verified, "User created");
    Ok(())
}

/// Mark an account's email as confirmed.
///
/// # Errors
///
/// Returns an error if the email is invalid, no account uses it, or the
/// update fails.
pub async fn confirm(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let pool = super::connect().await?;

    UserRepository::new(&pool).verify_email(&email).await?;

    tracing::info!(email = %email, "Email confirmed");
    Ok(())
}
