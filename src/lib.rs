pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, services::comment_service::CommentService};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub comments: CommentService,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    // Account routes
    let user_routes = Router::new()
        .route("/api/users/me", get(handlers::users::get_current_user))
        .route(
            "/api/users/me/watched/{anime_id}",
            post(handlers::users::add_watched),
        )
        .route(
            "/api/users/me/favorite/{anime_id}",
            post(handlers::users::add_favorite),
        );

    // Comment routes; `{id}` is the anime id for GET/POST and the comment id otherwise
    let comment_routes = Router::new()
        .route(
            "/api/comments/{id}",
            get(handlers::comments::get_comments)
                .post(handlers::comments::create_comment)
                .put(handlers::comments::update_comment)
                .delete(handlers::comments::delete_comment),
        )
        .route(
            "/api/comments/{id}/vote",
            get(handlers::comments::get_vote_summary)
                .put(handlers::comments::vote_comment)
                .delete(handlers::comments::remove_vote),
        );

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(comment_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
