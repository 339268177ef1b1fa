use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        extractors::CurrentUser,
        repo_types::User,
        services::{hash_password, verify_password},
    },
    error::{is_unique_violation, AppError, AppResult},
    state::AppState,
    validation::ValidJson,
};

const USER_EXISTS: &str = "User already exists";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let mut tx = state.db.begin().await?;

    if User::find_by_email(&mut tx, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict(USER_EXISTS));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&mut tx, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err(AppError::Conflict(USER_EXISTS));
        }
        Err(e) => return Err(e.into()),
    };

    let access_token = state.keys.issue(&user.email)?;
    tx.commit().await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: TokenResponse::bearer(access_token),
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = {
        let mut tx = state.db.begin().await?;
        let user = User::find_by_email(&mut tx, &payload.email).await?;
        tx.commit().await?;
        user
    };

    let user = match user {
        Some(u) if verify_password(&payload.password, &u.hashed_password) => u,
        Some(u) => {
            warn!(email = %payload.email, user_id = u.id, "login invalid password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
        }
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
        }
    };

    let access_token = state.keys.issue(&user.email)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token: TokenResponse::bearer(access_token),
        user: user.into(),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}
