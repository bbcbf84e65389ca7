//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: signup, login, profile, and the claim flow
//! that folds a guest's analysis history into a freshly authenticated
//! account.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::middleware::CallerIdentity;
use crate::web::state::AppState;
use venture_lens_core::domain::User;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserBody,
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimProfileRequest {
    pub session_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimProfileResponse {
    pub claimed_count: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: UserBody,
    pub total_analyses: u64,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing field or short password"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    let name = req.name.trim();

    if email.is_empty() {
        return Err(ApiError::validation("Email is required", Some("email")));
    }
    if name.is_empty() {
        return Err(ApiError::validation("Name is required", Some("name")));
    }
    if req.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters long",
            Some("password"),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("password hashing failed".to_string())
        })?
        .to_string();

    // The database enforces email uniqueness; a duplicate comes back as a
    // Conflict through the PortError conversion.
    let user = state.db.create_user(&email, name, &password_hash).await?;

    let token = state.tokens.issue(user.id).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        ApiError::Internal("token signing failed".to_string())
    })?;

    info!(user_id = %user.id, "account created");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /auth/login - Login with existing account
///
/// Unknown email and wrong password produce the identical 401 response, so
/// the endpoint cannot be used to enumerate accounts.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    let creds = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Stored password hash is unparseable: {:?}", e);
        ApiError::Internal("credential verification failed".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens.issue(creds.user_id).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        ApiError::Internal("token signing failed".to_string())
    })?;

    Ok(Json(AuthResponse {
        user: creds.to_user().into(),
        token,
    }))
}

/// POST /auth/claim-profile - Transfer guest analyses to this account
///
/// Atomically takes ownership of every record still tagged with the given
/// guest session id. Retrying after a successful claim updates zero records
/// and still succeeds, so clients can safely re-send after a timeout.
#[utoipa::path(
    post,
    path = "/auth/claim-profile",
    request_body = ClaimProfileRequest,
    responses(
        (status = 200, description = "Claim processed", body = ClaimProfileResponse),
        (status = 400, description = "Missing session id"),
        (status = 401, description = "Not logged in")
    ),
    tag = "auth"
)]
pub async fn claim_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    Json(req): Json<ClaimProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.0.ok_or(ApiError::Unauthorized)?;

    let session_id = req.session_id.trim();
    if session_id.is_empty() {
        return Err(ApiError::validation(
            "Session ID is required",
            Some("sessionId"),
        ));
    }

    let claimed_count = state.db.claim_guest_records(session_id, user_id).await?;
    info!(user_id = %user_id, claimed_count, "guest profile claim processed");

    Ok(Json(ClaimProfileResponse { claimed_count }))
}

/// GET /auth/profile - Current user's profile with analysis count
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Not logged in")
    ),
    tag = "auth"
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.0.ok_or(ApiError::Unauthorized)?;

    let user = state.db.find_user_by_id(user_id).await?;
    let total_analyses = state.db.count_analyses_for_user(user_id).await?;

    Ok(Json(ProfileResponse {
        user: user.into(),
        total_analyses,
    }))
}
