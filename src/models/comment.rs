use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    /// Catalog identifier of the anime this comment is attached to.
    pub content_id: String,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input to `CommentStore::create`; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content_id: String,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub is_approved: bool,
}

/// A comment as listed to a viewer, with live vote tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CommentView {
    pub id: Uuid,
    pub content_id: String,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub is_approved: bool,
    pub author_email: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_vote: Option<bool>,
}

// Create comment request
#[derive(Debug, Validate, Deserialize)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "must be between 1 and 1000 characters"))]
    pub content: String,
    pub parent_id: Option<Uuid>,
}

// Update comment request
#[derive(Debug, Validate, Deserialize)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "must be between 1 and 1000 characters"))]
    pub content: String,
}
