/// Account endpoints
///
/// Registration, login, email confirmation, the password-reset pair, and
/// the authenticated profile actions.
///
/// # Endpoints
///
/// - `POST /api/account/register` - Register and sign in
/// - `POST /api/account/login` - Sign in with lockout tracking
/// - `POST /api/account/confirm-email` - Redeem an emailed confirmation code
/// - `POST /api/account/forgot-password` - Request a reset code by email
/// - `POST /api/account/reset-password` - Redeem a reset code
/// - `GET  /api/account/users` - All usernames
/// - `GET  /api/account/user-info` - Caller's role and email
/// - `POST /api/account/update-profile` - Change email (and username with it)
/// - `POST /api/account/change-password` - Change password with the old one
///
/// Unknown emails on the confirmation/reset endpoints return 404; this
/// leaks account existence and is kept deliberately; the documented
/// client contract depends on it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tickstack_shared::{
    auth::{
        codes::{CodePurpose, SecurityCode},
        jwt::{create_token, Claims},
        middleware::AuthContext,
        password::{hash_password, validate_password_strength, verify_password},
        signin::{password_sign_in, SignInOutcome},
    },
    models::{
        role::Role,
        user::{CreateUser, User},
    },
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address; doubles as the username
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (strength-checked beyond the length floor)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Requested tier; empty or unknown names fall back to FREE
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Email confirmation request
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password-reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// The caller's profile summary
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// "FREE" or "PRO"
    pub role: String,

    /// Email address
    pub email: String,
}

/// Successful register/login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token (HS256 JWT, one-day expiry)
    pub token: String,

    /// Profile summary
    pub user_info: UserInfo,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: User creation or role assignment failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // Reject duplicates before creating anything
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = hash_password(&req.password)?;

    // A concurrent registration can slip past the pre-check; the unique
    // index on email surfaces it as the same 409.
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            password_hash,
        },
    )
    .await?;

    // Roles are seeded at startup; registration only resolves and assigns.
    let role_to_add = Role::resolve_registration_role(&state.db, req.role.as_deref()).await?;
    let assigned = Role::add_user(&state.db, user.id, &role_to_add).await?;
    if !assigned {
        return Err(ApiError::OperationFailed(vec![
            "Role assignment failed.".to_string(),
        ]));
    }

    send_confirmation_email(&state, &user).await;

    // Registration signs the user in immediately
    let user = User::record_successful_login(&state.db, user.id)
        .await?
        .unwrap_or(user);

    auth_ok_with_token(&state, &user).await
}

/// Login
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
/// - `403 Forbidden`: Account locked out
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    match password_sign_in(&state.db, &req.email, &req.password, true).await? {
        SignInOutcome::Success(user) => auth_ok_with_token(&state, &user).await,
        SignInOutcome::LockedOut => Err(ApiError::Forbidden(
            "User is locked out due to too many failed attempts.".to_string(),
        )),
        SignInOutcome::InvalidCredentials => Err(ApiError::Unauthorized(
            "Incorrect username or password.".to_string(),
        )),
    }
}

/// Confirm an email address with an emailed one-time code
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Wrong or expired code (flag left unchanged)
/// - `404 Not Found`: Unknown email
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(req): Json<ConfirmEmailRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let redeemed =
        SecurityCode::consume(&state.db, user.id, CodePurpose::EmailConfirmation, &req.code)
            .await?;
    if !redeemed {
        return Err(ApiError::Forbidden(
            "Invalid or expired confirmation code.".to_string(),
        ));
    }

    User::confirm_email(&state.db, user.id).await?;

    Ok(StatusCode::OK)
}

/// Request a password-reset code by email
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Unknown email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let code = SecurityCode::issue(&state.db, user.id, CodePurpose::PasswordReset).await?;

    if let Err(e) = state
        .email
        .send_email(
            &user.email,
            "Reset Password",
            &format!("Please reset your password by using this code: {}", code),
        )
        .await
    {
        tracing::warn!(user_id = %user.id, "Failed to send reset email: {}", e);
    }

    Ok(StatusCode::OK)
}

/// Reset a password with an emailed one-time code
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Unknown email
/// - `500 Internal Server Error`: Wrong/expired code or store failure
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let redeemed =
        SecurityCode::consume(&state.db, user.id, CodePurpose::PasswordReset, &req.code).await?;
    if !redeemed {
        return Err(ApiError::OperationFailed(vec![
            "Invalid or expired reset code.".to_string(),
        ]));
    }

    validate_password_strength(&req.password)
        .map_err(|e| ApiError::OperationFailed(vec![e]))?;

    let password_hash = hash_password(&req.password)?;
    User::set_password_hash(&state.db, user.id, &password_hash).await?;

    Ok(StatusCode::OK)
}

/// All usernames
pub async fn users(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let usernames = User::list_usernames(&state.db).await?;
    Ok(Json(usernames))
}

/// The caller's role and email
///
/// # Errors
///
/// - `404 Not Found`: The token's user no longer exists
pub async fn user_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserInfo>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(get_user_info(&state, &user).await?))
}

/// Change the caller's email (username follows it)
///
/// An unchanged email is a no-op: no store write happens at all.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: The token's user no longer exists
/// - `500 Internal Server Error`: The store rejected the update
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if req.email.eq_ignore_ascii_case(&user.email) {
        return Ok(StatusCode::OK);
    }

    User::change_email(&state.db, user.id, &req.email)
        .await
        .map_err(|e| ApiError::OperationFailed(vec![e.to_string()]))?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(StatusCode::OK)
}

/// Change the caller's password, authorizing with the old one
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Wrong old password or rejected new password
/// - `404 Not Found`: The token's user no longer exists
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if !verify_password(&req.old_password, &user.password_hash)? {
        return Err(ApiError::Forbidden("Incorrect password.".to_string()));
    }

    validate_password_strength(&req.new_password).map_err(ApiError::Forbidden)?;

    let password_hash = hash_password(&req.new_password)?;
    User::set_password_hash(&state.db, user.id, &password_hash).await?;

    Ok(StatusCode::OK)
}

// -- Helpers ---------------------------------------------------------------

/// Builds the profile summary: PRO iff the user holds the PRO role
async fn get_user_info(state: &AppState, user: &User) -> Result<UserInfo, ApiError> {
    let tier = Role::tier_for_user(&state.db, user.id).await?;

    Ok(UserInfo {
        role: tier.as_str().to_string(),
        email: user.email.clone(),
    })
}

/// 200 + bearer token + profile summary
async fn auth_ok_with_token(state: &AppState, user: &User) -> ApiResult<Json<AuthResponse>> {
    let user_info = get_user_info(state, user).await?;

    let claims = Claims::new(&user.email, user.id, state.token_config());
    let token = create_token(&claims, state.token_config())?;

    Ok(Json(AuthResponse { token, user_info }))
}

/// Issues and mails the email-confirmation code; failures are logged only
async fn send_confirmation_email(state: &AppState, user: &User) {
    let code = match SecurityCode::issue(&state.db, user.id, CodePurpose::EmailConfirmation).await
    {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Failed to issue confirmation code: {}", e);
            return;
        }
    };

    if let Err(e) = state
        .email
        .send_email(
            &user.email,
            "Confirm your email",
            &format!("Please confirm your account with this code: {}", code),
        )
        .await
    {
        tracing::warn!(user_id = %user.id, "Failed to send confirmation email: {}", e);
    }
}
