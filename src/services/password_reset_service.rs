use crate::api::middleware::error::{ApiError, ApiResult};
use crate::config::Config;
use crate::database::Database;
use crate::models::PasswordReset;
use crate::services::auth::{
    generate_token, hash_password, token_digest, validate_password_complexity,
};

/// Start a password reset. Always reports success so callers cannot probe
/// which addresses exist; when the account is real a single-use token is
/// stored and the reset link handed to the delivery channel via the log.
pub async fn request_password_reset(db: &Database, config: &Config, email: &str) -> ApiResult<()> {
    let email = email.trim().to_lowercase();

    let user = match db.get_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        }
    };

    let token = generate_token();
    let reset = PasswordReset::new(
        token_digest(&token),
        user.id.clone(),
        config.reset_token_ttl_minutes,
    );
    db.insert_password_reset(&reset).await?;

    // Delivery is an external concern; the operator channel picks this up.
    tracing::info!("Password reset token issued for user {}: {}", user.id, token);

    Ok(())
}

/// Complete a reset: the token must exist, be unused, and be unexpired.
pub async fn complete_password_reset(
    db: &Database,
    token: &str,
    new_password: &str,
) -> ApiResult<()> {
    validate_password_complexity(new_password)?;

    let digest = token_digest(token);
    let reset = db
        .get_password_reset(&digest)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    if reset.used || reset.is_expired() {
        return Err(ApiError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    let password_hash = hash_password(new_password)?;
    db.update_user_password(&reset.user_id, &password_hash)
        .await?;
    db.mark_password_reset_used(&digest).await?;

    tracing::info!("Password reset completed for user {}", reset.user_id);

    Ok(())
}
