//! Admin user bootstrap command.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use super::{CommandError, connect};

/// Create an admin user, or promote the account if the username already
/// exists.
///
/// # Errors
///
/// Returns an error when the database is unreachable or hashing fails.
pub async fn create_user(username: &str, email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string();

    let result = sqlx::query(
        r"
        INSERT INTO users (username, email, password_hash, role_id)
        VALUES ($1, $2, $3, (SELECT id FROM roles WHERE name = 'admin'))
        ON CONFLICT (username) DO UPDATE
        SET role_id = (SELECT id FROM roles WHERE name = 'admin'),
            updated_at = NOW()
        ",
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!("Admin user '{username}' is ready");
    }
    Ok(())
}
