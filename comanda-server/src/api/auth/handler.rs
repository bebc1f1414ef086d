//! Authentication Handlers
//!
//! Handles login, token refresh, current-user lookup and logout

use std::time::Duration;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{password, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::{dining_table, user};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::UserResource;
use shared::ApiResponse;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPayload {
    pub access_token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResource>,
}

#[derive(Debug, Deserialize)]
pub struct LogoutQuery {
    /// Table number to release on the way out (floor kiosk flow)
    pub number: Option<i64>,
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPayload>>> {
    validation::login(&req.username, &req.password)?;

    let found = user::find_by_username(&state.pool, &req.username)
        .await
        .map_err(AppError::from)?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let found = match found {
        Some(u) => {
            let password_valid = password::verify_password(&u.password, &req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            u
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(found.id, &found.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    let roles = user::roles_of(&state.pool, found.id)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        user_id = found.id,
        username = %found.username,
        "User logged in successfully"
    );

    Ok(ok(
        "Success to authenticated user.",
        TokenPayload {
            access_token: token,
            token_type: "Bearer",
            expires_in: jwt_service.expires_in(),
            user: Some(UserResource::from(found).with_roles(roles)),
        },
    ))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<UserResource>>> {
    let found = user::find_by_id(&state.pool, current_user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User not found."))?;

    let roles = user::roles_of(&state.pool, found.id)
        .await
        .map_err(AppError::from)?;

    Ok(ok(
        "Success to get user details.",
        UserResource::from(found).with_roles(roles),
    ))
}

/// POST /api/auth/refresh - 刷新令牌
pub async fn refresh(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<TokenPayload>>> {
    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(current_user.id, &current_user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    Ok(ok(
        "Success to refresh token.",
        TokenPayload {
            access_token: token,
            token_type: "Bearer",
            expires_in: jwt_service.expires_in(),
            user: None,
        },
    ))
}

/// POST /api/auth/logout - 登出
///
/// Tokens are stateless; logging out optionally frees the table the
/// client was seated at (`?number=`), release is idempotent.
pub async fn logout(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<LogoutQuery>,
) -> AppResult<Json<ApiResponse<()>>> {
    if let Some(number) = query.number {
        dining_table::release(&state.pool, number)
            .await
            .map_err(AppError::from)?;
    }

    tracing::info!(
        user_id = current_user.id,
        username = %current_user.username,
        "User logged out"
    );

    Ok(ok_empty("Success to logged out user."))
}
