use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{CreateDayRequest, DayResponse};
use super::repo;
use crate::{
    auth::extractors::CurrentUser,
    error::{is_unique_violation, AppError, AppResult},
    state::AppState,
    validation::ValidJson,
};

const DAY_EXISTS: &str = "Day already saved";

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/days", get(list_days))
        .route("/days/", get(list_days))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/days", post(create_day))
        .route("/days/", post(create_day))
}

// --- handlers ---

#[instrument(skip_all)]
pub async fn list_days(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<DayResponse>>> {
    let mut tx = state.db.begin().await?;
    let rows = repo::list_by_user(&mut tx, user.id).await?;
    tx.commit().await?;

    let items = rows
        .into_iter()
        .map(DayResponse::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(items))
}

#[instrument(skip_all)]
pub async fn create_day(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(body): ValidJson<CreateDayRequest>,
) -> AppResult<(StatusCode, Json<DayResponse>)> {
    let mut tx = state.db.begin().await?;

    if repo::exists_for_date(&mut tx, user.id, &body.date).await? {
        warn!(user_id = user.id, date = %body.date, "day already saved");
        return Err(AppError::Conflict(DAY_EXISTS));
    }

    let payload = serde_json::to_string(&body.payload).map_err(|e| AppError::Internal(e.into()))?;

    let row = match repo::insert(&mut tx, user.id, &body.date, &payload).await {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            warn!(user_id = user.id, date = %body.date, "day saved concurrently");
            return Err(AppError::Conflict(DAY_EXISTS));
        }
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    info!(user_id = user.id, day_id = row.id, date = %row.date, "day saved");
    let created = DayResponse::try_from(row).map_err(|e| AppError::Internal(e.into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}
