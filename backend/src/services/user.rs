//! User service for authentication and account management
//!
//! Password hashing and verification run on the blocking thread pool;
//! JWT keys are pre-computed in [`JwtService`].

use crate::auth::{JwtService, PasswordService};
use crate::db;
use crate::error::ApiError;
use crate::pagination::{PageRequest, Paged};
use crate::repositories::{CreateUser, UserRepository, UserView};
use foodgram_shared::types::{
    AuthTokens, LoginRequest, RegisterRequest, SetPasswordRequest, UserResponse,
};
use foodgram_shared::validation::{validate_email, validate_password, validate_username};
use foodgram_shared::Role;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

impl From<UserView> for UserResponse {
    fn from(view: UserView) -> Self {
        UserResponse {
            id: view.id,
            email: view.email,
            username: view.username,
            first_name: view.first_name,
            last_name: view.last_name,
            is_subscribed: view.is_subscribed,
            avatar: view.avatar,
        }
    }
}

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Register a new user and sign them in
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        request: RegisterRequest,
    ) -> Result<AuthTokens, ApiError> {
        let email = request.email.trim().to_lowercase();
        validate_email(&email)?;
        validate_username(&request.username)?;
        request.validate()?;
        validate_password(&request.password)?;

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
        if UserRepository::username_exists(pool, &request.username)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        let password_hash = PasswordService::hash_async(request.password)
            .await
            .map_err(ApiError::Internal)?;

        // A concurrent registration can still win between the checks and the insert.
        let user = UserRepository::create(
            pool,
            CreateUser {
                email,
                username: request.username,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
            },
        )
        .await
        .map_err(|e| {
            if e.downcast_ref::<sqlx::Error>().is_some_and(db::is_unique_violation) {
                ApiError::Conflict("Email or username already registered".to_string())
            } else {
                ApiError::Internal(e)
            }
        })?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        jwt_service.issue_tokens(user.id).map_err(ApiError::Internal)
    }

    /// Login with email and password
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        request: LoginRequest,
    ) -> Result<AuthTokens, ApiError> {
        let email = request.email.trim().to_lowercase();
        let user = UserRepository::find_by_email(pool, &email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = PasswordService::verify_async(request.password, user.password_hash)
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        jwt_service.issue_tokens(user.id).map_err(ApiError::Internal)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate_refresh_token(refresh_token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        if !UserRepository::exists(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Unauthorized("User not found".to_string()));
        }

        jwt_service.issue_tokens(user_id).map_err(ApiError::Internal)
    }

    /// Load a user as seen by `viewer`
    pub async fn get_user(
        pool: &PgPool,
        user_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<UserResponse, ApiError> {
        UserRepository::find_view(pool, user_id, viewer)
            .await
            .map_err(ApiError::Internal)?
            .map(UserResponse::from)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn list_users(
        pool: &PgPool,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<UserResponse>, ApiError> {
        let count = UserRepository::count(pool).await.map_err(ApiError::Internal)?;
        let users = UserRepository::list_views(pool, viewer, page.limit, page.offset())
            .await
            .map_err(ApiError::Internal)?;

        Ok(Paged {
            count,
            results: users.into_iter().map(UserResponse::from).collect(),
        })
    }

    /// Store an avatar reference; `None` clears it
    pub async fn set_avatar(
        pool: &PgPool,
        user_id: Uuid,
        avatar: Option<String>,
    ) -> Result<Option<String>, ApiError> {
        if let Some(reference) = avatar.as_deref() {
            if reference.trim().is_empty() {
                return Err(ApiError::Validation {
                    message: "avatar cannot be empty".to_string(),
                    field: Some("avatar".to_string()),
                });
            }
        }

        let updated = UserRepository::set_avatar(pool, user_id, avatar.as_deref())
            .await
            .map_err(ApiError::Internal)?;
        if !updated {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        Ok(avatar)
    }

    /// Change the password after checking the current one
    pub async fn set_password(
        pool: &PgPool,
        user_id: Uuid,
        request: SetPasswordRequest,
    ) -> Result<(), ApiError> {
        validate_password(&request.new_password)?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let valid = PasswordService::verify_async(request.current_password, user.password_hash)
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            return Err(ApiError::Validation {
                message: "Current password is incorrect".to_string(),
                field: Some("current_password".to_string()),
            });
        }

        let password_hash = PasswordService::hash_async(request.new_password)
            .await
            .map_err(ApiError::Internal)?;
        UserRepository::update_password(pool, user_id, &password_hash)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Role of an existing user
    pub async fn role(pool: &PgPool, user_id: Uuid) -> Result<Role, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        // Unknown role strings fall back to the least privileged role.
        Ok(user.role.parse().unwrap_or_default())
    }
}
