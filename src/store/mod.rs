pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{Comment, CommentView, NewComment, VoteTally},
};

pub use memory::MemoryCommentStore;
pub use postgres::PgCommentStore;

/// Persistent comments and votes.
///
/// `update` and `delete` take the author alongside the id and only touch a
/// row matching both; a miss is reported as `AppError::NotFound`. Vote
/// mutations keep at most one row per (comment, user).
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment>;

    async fn get_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Approved comments for a catalog item, newest first, each with its
    /// tally. `user_vote` is only filled in when a viewer is given.
    async fn get_by_content(
        &self,
        content_id: &str,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<CommentView>>;

    async fn update(&self, comment_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment>;

    async fn delete(&self, comment_id: Uuid, author_id: Uuid) -> Result<()>;

    /// Replaces any previous vote by this user on this comment.
    async fn add_vote(&self, comment_id: Uuid, user_id: Uuid, is_upvote: bool) -> Result<()>;

    /// Idempotent.
    async fn remove_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<()>;

    async fn tally(&self, comment_id: Uuid) -> Result<VoteTally>;

    async fn user_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<Option<bool>>;
}
