use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use sha2::{Digest, Sha256};

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::config::Config;
use crate::database::Database;
use crate::models::{
    Professional, RegisterProfessionalRequest, RegisterStudentRequest, Student, User, UserRole,
};

/// Validates password complexity requirements
/// - 10-72 characters long
/// - Contains uppercase letter
/// - Contains lowercase letter
/// - Contains digit
/// - Contains special character
pub fn validate_password_complexity(password: &str) -> ApiResult<()> {
    let len = password.len();
    if !(10..=72).contains(&len) {
        return Err(ApiError::BadRequest(
            "Password must be 10-72 characters long".to_string(),
        ));
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_special = password
        .chars()
        .any(|c| "!@#$%^&*()_+-=[]{}|;:,.<>?".contains(c));

    if !has_uppercase {
        return Err(ApiError::BadRequest(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !has_lowercase {
        return Err(ApiError::BadRequest(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !has_digit {
        return Err(ApiError::BadRequest(
            "Password must contain at least one digit".to_string(),
        ));
    }

    if !has_special {
        return Err(ApiError::BadRequest(
            "Password must contain at least one special character (!@#$%^&*()_+-=[]{}|;:,.<>?)"
                .to_string(),
        ));
    }

    Ok(())
}

/// Hash password using Argon2id with parameters:
/// - m_cost = 19456 KiB (19 MiB)
/// - t_cost = 2 iterations
/// - p_cost = 1 thread
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19456)
        .t_cost(2)
        .p_cost(1)
        .build()
        .map_err(|_| ApiError::Internal("Failed to build Argon2 params".to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify password against Argon2id hash
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate secure random token (32 bytes = 64 hex characters)
pub fn generate_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Tokens are stored only as digests; a leaked table cannot be replayed.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// NRE: the student registration number, 7 or 8 digits.
pub fn validate_nre(nre: &str) -> ApiResult<()> {
    let re = regex::Regex::new(r"^[0-9]{7,8}$").expect("valid NRE pattern");
    if !re.is_match(nre) {
        return Err(ApiError::BadRequest(
            "NRE must be 7-8 digits".to_string(),
        ));
    }
    Ok(())
}

/// Student addresses are derived, never free-form.
pub fn derive_student_email(nre: &str, domain: &str) -> String {
    format!("{}@{}", nre, domain).to_lowercase()
}

pub fn validate_professional_email(email: &str, domain: &str) -> ApiResult<String> {
    let email = email.trim().to_lowercase();
    if !email_address::EmailAddress::is_valid(&email) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    let expected_suffix = format!("@{}", domain);
    if !email.ends_with(&expected_suffix) {
        return Err(ApiError::BadRequest(format!(
            "Professional email must belong to {}",
            domain
        )));
    }
    Ok(email)
}

/// Register a student account. The email is derived from the NRE and the
/// institutional student domain.
pub async fn register_student(
    db: &Database,
    config: &Config,
    request: RegisterStudentRequest,
) -> ApiResult<User> {
    let nre = request.nre.trim().to_string();
    validate_nre(&nre)?;
    validate_password_complexity(&request.password)?;

    if request.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("display_name is required".to_string()));
    }

    if db.get_student_by_nre(&nre).await?.is_some() {
        return Err(ApiError::Conflict(
            "A student with this NRE already exists".to_string(),
        ));
    }

    let email = derive_student_email(&nre, &config.student_email_domain);
    if db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user = User::new(
        email,
        UserRole::Student,
        request.display_name.trim().to_string(),
        password_hash,
    );
    let student = Student::new(
        user.id.clone(),
        nre,
        request.course,
        request.gender,
        request.birth_year,
    );

    db.create_user(&user).await?;
    db.create_student(&student).await?;

    tracing::info!("Student registered: user_id={}", user.id);

    Ok(user)
}

/// Register a professional account. The email must carry the institutional
/// professional domain.
pub async fn register_professional(
    db: &Database,
    config: &Config,
    request: RegisterProfessionalRequest,
) -> ApiResult<User> {
    let email = validate_professional_email(&request.email, &config.professional_email_domain)?;
    validate_password_complexity(&request.password)?;

    if request.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("display_name is required".to_string()));
    }
    if request.center_id.trim().is_empty() {
        return Err(ApiError::BadRequest("center_id is required".to_string()));
    }

    if db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user = User::new(
        email,
        UserRole::Professional,
        request.display_name.trim().to_string(),
        password_hash,
    );
    let professional = Professional::new(
        user.id.clone(),
        request.center_id.trim().to_string(),
        request.specialty,
    );

    db.create_user(&user).await?;
    db.create_professional(&professional).await?;

    tracing::info!("Professional registered: user_id={}", user.id);

    Ok(user)
}

/// Authenticate with email and password. The failure message never reveals
/// whether the account exists.
pub async fn authenticate(db: &Database, email: &str, password: &str) -> ApiResult<User> {
    let email = email.trim().to_lowercase();

    let user = db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid email or password".to_string()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(ApiError::BadRequest(
            "Invalid email or password".to_string(),
        ));
    }

    Ok(user)
}
