use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{AnimeList, ProfileResponse},
    services::user_service,
};

pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ProfileResponse>> {
    let user = user_service::get_user_by_id(&state.db, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}

pub async fn add_watched(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(anime_id): Path<String>,
) -> Result<StatusCode> {
    add_to_list(&state, &auth_user, AnimeList::Watched, &anime_id).await
}

pub async fn add_favorite(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(anime_id): Path<String>,
) -> Result<StatusCode> {
    add_to_list(&state, &auth_user, AnimeList::Favorite, &anime_id).await
}

async fn add_to_list(
    state: &AppState,
    auth_user: &AuthUser,
    list: AnimeList,
    anime_id: &str,
) -> Result<StatusCode> {
    let anime_id = anime_id.trim();
    if anime_id.is_empty() {
        return Err(AppError::Validation("anime_id is required".to_string()));
    }

    user_service::add_to_list(&state.db, auth_user.user_id, list, anime_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
