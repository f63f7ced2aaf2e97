use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{MessageResponse, RegisteredResponse, UserForm};
use super::repo_types::User;
use super::services;
use crate::{error::ApiError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users", get(list_users))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    form: UserForm,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let id = services::register_user(&state, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            id,
            message: "User registered successfully!",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(services::list_users(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(services::get_user(&state, &id).await?))
}

#[instrument(skip(state, form))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: UserForm,
) -> Result<Json<MessageResponse>, ApiError> {
    services::update_user(&state, &id, form).await?;
    Ok(Json(MessageResponse {
        message: "User updated successfully!",
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_user(&state, &id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully!",
    }))
}
