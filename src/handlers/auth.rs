use axum::{extract::State, http::StatusCode, response::Json};
use validator::Validate;

use crate::{
    AppState,
    auth::Claims,
    error::Result,
    extract::JsonBody,
    models::{LoginRequest, ProfileResponse, RegisterRequest, TokenResponse},
    services::user_service,
};

pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>)> {
    payload.validate()?;

    let user = user_service::register(&state.db, &payload.email, &payload.password).await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    payload.validate()?;

    let user = user_service::authenticate(&state.db, &payload.email, &payload.password).await?;

    let (token, _claims) = Claims::new(
        user.id,
        user.email,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse { token }))
}
