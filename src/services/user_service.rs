use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    error::{AppError, Result},
    models::{AnimeList, User},
};

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn get_user_by_id(db: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn get_user_by_email(db: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn register(db: &PgPool, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email);

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = hash_password(password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, password_hash, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(password_hash)
    .fetch_optional(db)
    .await?
    // Lost a race with a concurrent registration of the same address.
    .ok_or_else(|| AppError::Conflict("Email is already registered".to_string()))?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(user)
}

/// Returns the user when the credentials match.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<User> {
    let invalid = || AppError::Authentication("Invalid credentials".to_string());

    let user = get_user_by_email(db, email).await?.ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(invalid());
    }

    Ok(user)
}

/// Appends an anime id to one of the user's lists; already present ids are left alone.
pub async fn add_to_list(db: &PgPool, user_id: Uuid, list: AnimeList, anime_id: &str) -> Result<()> {
    let column = list.column();
    let query = format!(
        r#"
        UPDATE users
        SET {column} = CASE
            WHEN $2 = ANY({column}) THEN {column}
            ELSE array_append({column}, $2)
        END
        WHERE id = $1
        "#
    );

    let result = sqlx::query(&query)
        .bind(user_id)
        .bind(anime_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(())
}
