use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::{AppError, Result},
    extract::JsonBody,
    models::{
        Comment, CommentView, CreateCommentRequest, UpdateCommentRequest, VoteRequest,
        VoteSummary,
    },
};

// `/api/comments/{id}` is keyed by anime id for create/list and by comment id
// for everything else, so comment ids are parsed here.
fn parse_comment_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("invalid comment_id".to_string()))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(anime_id): Path<String>,
    JsonBody(payload): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    payload.validate()?;

    let comment = state
        .comments
        .create_comment(
            &anime_id,
            auth_user.user_id,
            &payload.content,
            payload.parent_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Path(anime_id): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<Vec<CommentView>>> {
    let comments = state
        .comments
        .get_comments(&anime_id, auth_user.user_id())
        .await?;

    Ok(Json(comments))
}

pub async fn update_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateCommentRequest>,
) -> Result<StatusCode> {
    payload.validate()?;
    let comment_id = parse_comment_id(&comment_id)?;

    state
        .comments
        .update_comment(comment_id, auth_user.user_id, &payload.content)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<StatusCode> {
    let comment_id = parse_comment_id(&comment_id)?;

    state
        .comments
        .delete_comment(comment_id, auth_user.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn vote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
    JsonBody(payload): JsonBody<VoteRequest>,
) -> Result<StatusCode> {
    let comment_id = parse_comment_id(&comment_id)?;

    state
        .comments
        .vote_comment(comment_id, auth_user.user_id, payload.is_upvote)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_vote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<StatusCode> {
    let comment_id = parse_comment_id(&comment_id)?;

    state
        .comments
        .remove_vote(comment_id, auth_user.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_vote_summary(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<VoteSummary>> {
    let comment_id = parse_comment_id(&comment_id)?;

    let summary = state
        .comments
        .vote_summary(comment_id, auth_user.user_id())
        .await?;

    Ok(Json(summary))
}
