#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anime_catalog::database::run_migrations;
use anime_catalog::services::comment_service::CommentService;
use anime_catalog::services::moderation_service::ModerationGate;
use anime_catalog::store::MemoryCommentStore;
use axum::{Json, Router, routing::post};
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Texts the fake oracle has been asked to classify.
pub type Seen = Arc<Mutex<Vec<String>>>;

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Fake moderation oracle answering every request with `verdict`.
pub async fn spawn_oracle(verdict: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let recorded = seen.clone();

    let app = Router::new().route(
        "/moderate",
        post(move |Json(body): Json<Value>| {
            let verdict = verdict.clone();
            let recorded = recorded.clone();
            async move {
                if let Some(text) = body["text"].as_str() {
                    recorded.lock().unwrap().push(text.to_string());
                }
                Json(verdict)
            }
        }),
    );

    (format!("http://{}", serve(app).await), seen)
}

/// Oracle that answers with a body that is not a verdict.
pub async fn spawn_garbage_oracle() -> String {
    let app = Router::new().route("/moderate", post(|| async { "model warming up" }));
    format!("http://{}", serve(app).await)
}

/// Oracle that takes longer than any reasonable timeout.
pub async fn spawn_slow_oracle(delay: Duration) -> String {
    let app = Router::new().route(
        "/moderate",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!({ "is_approved": true, "toxicity_score": 0.0, "details": {} }))
        }),
    );
    format!("http://{}", serve(app).await)
}

/// Address nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn toxic_verdict() -> Value {
    json!({
        "is_approved": false,
        "toxicity_score": 0.9,
        "details": { "insult": 0.8, "non-toxic": 0.1 }
    })
}

pub fn gate(url: Option<String>) -> ModerationGate {
    ModerationGate::new(url, Duration::from_secs(5)).unwrap()
}

pub fn service_with(store: Arc<MemoryCommentStore>, moderation: ModerationGate) -> CommentService {
    CommentService::new(store, moderation)
}

pub fn unmoderated() -> (Arc<MemoryCommentStore>, CommentService) {
    let store = Arc::new(MemoryCommentStore::new());
    let service = service_with(store.clone(), ModerationGate::disabled());
    (store, service)
}

/// Migrated pool on `DATABASE_URL`, or `None` (after saying so) when it isn't set.
pub async fn pg_pool(test: &str) -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping {test}: DATABASE_URL not set");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    run_migrations(&pool).await.expect("run migrations");
    Some(pool)
}

/// Inserts a bare account row so comments and votes satisfy their foreign keys.
pub async fn pg_user(db: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, 'unused')")
        .bind(id)
        .bind(format!("{id}@example.com"))
        .execute(db)
        .await
        .expect("insert user");
    id
}

/// Catalog id no other test run will collide with.
pub fn fresh_anime_id() -> String {
    format!("anime-{}", Uuid::new_v4())
}
