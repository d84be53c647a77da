//! User account service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use scisync_common::{AppError, AppResult, IdGenerator};
use scisync_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Input for creating a user account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    /// Username (3-30 characters).
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,

    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Password (policy checked separately).
    pub password: String,

    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    /// Institutional affiliation.
    #[serde(default)]
    #[validate(length(max = 200, message = "Affiliation too long"))]
    pub affiliation: String,

    /// Short biography.
    #[serde(default)]
    #[validate(length(max = 500, message = "Bio too long"))]
    pub bio: String,

    /// Research interests.
    #[serde(default)]
    pub research_interests: Vec<String>,
}

/// Input for logging in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// User service for account management and authentication.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user account.
    ///
    /// Usernames are unique case-insensitively; emails are stored lowercased.
    /// A fresh API token is issued on signup.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;
        validate_password(&input.password)?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email.to_lowercase()),
            password_hash: Set(password_hash),
            token: Set(Some(token)),
            full_name: Set(input.full_name),
            affiliation: Set(input.affiliation),
            bio: Set(input.bio),
            research_interests: Set(json!(input.research_interests)),
            is_verified: Set(false),
            is_admin: Set(false),
            research_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(created)
    }

    /// Authenticate by email and password, rotating the API token.
    ///
    /// Wrong email and wrong password report the same generic message.
    pub async fn authenticate(&self, input: &LoginInput) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid email or password".to_string()))?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::BadRequest(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token));
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Authenticate by API token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List all users, newest first.
    pub async fn list(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.list().await
    }

    /// Grant or revoke the admin role.
    pub async fn set_admin(&self, id: &str, is_admin: bool) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(id).await?;

        let mut active: user::ActiveModel = user.into();
        active.is_admin = Set(is_admin);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.user_repo.update(active).await?;
        tracing::info!(user_id = %updated.id, is_admin, "User role changed");
        Ok(updated)
    }

    /// Mark a user as verified (or clear the flag).
    pub async fn set_verified(&self, id: &str, is_verified: bool) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(id).await?;

        let mut active: user::ActiveModel = user.into();
        active.is_verified = Set(is_verified);
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        self.user_repo.count().await
    }

    /// Count administrators.
    pub async fn count_admins(&self) -> AppResult<u64> {
        self.user_repo.count_admins().await
    }
}

/// Special characters accepted by the password policy.
const PASSWORD_SPECIAL_CHARS: &str = "@#$%^&*!?";

/// Check the password policy: at least 8 characters with an uppercase
/// letter, a lowercase letter, a digit, and a special character.
fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain a lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain a digit".to_string(),
        ));
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(AppError::Validation(format!(
            "Password must contain a special character ({PASSWORD_SPECIAL_CHARS})"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
