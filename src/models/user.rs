use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub watched_anime_ids: Vec<String>,
    pub favorite_anime_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "must be between 6 and 128 characters"))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub watched_anime_ids: Vec<String>,
    pub favorite_anime_ids: Vec<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            watched_anime_ids: user.watched_anime_ids,
            favorite_anime_ids: user.favorite_anime_ids,
        }
    }
}

/// Which per-user anime list an id is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimeList {
    Watched,
    Favorite,
}

impl AnimeList {
    pub fn column(self) -> &'static str {
        match self {
            AnimeList::Watched => "watched_anime_ids",
            AnimeList::Favorite => "favorite_anime_ids",
        }
    }
}
