use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (comment, user); removing a vote deletes the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CommentVote {
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub is_upvote: bool,
    pub created_at: DateTime<Utc>,
}

/// Live (upvotes, downvotes) pair derived from vote rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub is_upvote: bool,
}

// Vote summary for a single comment
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VoteSummary {
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_vote: Option<bool>,
}
