use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::repo_types::User;
use crate::{error::AppError, state::AppState};

/// Resolves the caller from a bearer token, yielding the stored user row.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized("Not authenticated"))?;

        let claims = state.keys.decode(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthorized("Invalid token")
        })?;

        let email = claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(AppError::Unauthorized("Invalid token payload"))?;

        let mut conn = state.db.acquire().await?;
        let user = User::find_by_email(&mut conn, &email)
            .await?
            .ok_or_else(|| {
                warn!(%email, "token subject has no user");
                AppError::Unauthorized("User not found")
            })?;

        Ok(CurrentUser(user))
    }
}

// Expect "Bearer <token>", scheme case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
