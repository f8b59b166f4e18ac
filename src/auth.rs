//! Caller identification and the admin gate on mutations.
//!
//! Session storage lives in the client: after login it echoes the user id
//! back in the `x-user-id` header.

use crate::{db, error::AppError, models::User, state::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))?;

        let user = db::find_user_by_id(&state.pool, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;
        Ok(CurrentUser(user))
    }
}

/// Only administrators may create, edit or delete appointments.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user = %user.username, "non-admin attempted to modify appointments");
            return Err(AppError::Forbidden(
                "only an administrator can modify appointments".to_string(),
            ));
        }
        Ok(RequireAdmin(user))
    }
}
