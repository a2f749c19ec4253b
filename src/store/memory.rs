use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::CommentStore;
use crate::{
    error::{AppError, Result},
    models::{Comment, CommentView, CommentVote, NewComment, VoteTally},
    services::vote_aggregator,
};

/// In-process store with the same contract as `PgCommentStore`.
#[derive(Default)]
pub struct MemoryCommentStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    // Insertion order doubles as the tie-breaker for equal timestamps.
    comments: Vec<Comment>,
    votes: HashMap<(Uuid, Uuid), CommentVote>,
    emails: HashMap<Uuid, String>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers display info for an author, standing in for the users table.
    pub fn insert_user(&self, user_id: Uuid, email: impl Into<String>) -> Result<()> {
        self.lock()?.emails.insert(user_id, email.into());
        Ok(())
    }

    /// Number of stored vote rows for a comment.
    pub fn vote_rows(&self, comment_id: Uuid) -> Result<usize> {
        Ok(self
            .lock()?
            .votes
            .keys()
            .filter(|(id, _)| *id == comment_id)
            .count())
    }

    /// Every stored comment, approved or not.
    pub fn all_comments(&self) -> Result<Vec<Comment>> {
        Ok(self.lock()?.comments.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("comment store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let now = Utc::now();
        let created = Comment {
            id: Uuid::new_v4(),
            content_id: comment.content_id,
            author_id: comment.author_id,
            content: comment.content,
            parent_id: comment.parent_id,
            is_approved: comment.is_approved,
            created_at: now,
            updated_at: now,
        };

        self.lock()?.comments.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self
            .lock()?
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned())
    }

    async fn get_by_content(
        &self,
        content_id: &str,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<CommentView>> {
        let state = self.lock()?;

        let mut matching: Vec<&Comment> = state
            .comments
            .iter()
            .rev()
            .filter(|c| c.content_id == content_id && c.is_approved)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let views = matching
            .into_iter()
            .map(|comment| {
                let votes: Vec<&CommentVote> = state
                    .votes
                    .values()
                    .filter(|v| v.comment_id == comment.id)
                    .collect();
                vote_aggregator::enrich(
                    comment.clone(),
                    state.emails.get(&comment.author_id).cloned(),
                    &votes,
                    viewer_id,
                )
            })
            .collect();

        Ok(views)
    }

    async fn update(&self, comment_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment> {
        let mut state = self.lock()?;

        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id && c.author_id == author_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete(&self, comment_id: Uuid, author_id: Uuid) -> Result<()> {
        let mut state = self.lock()?;

        let position = state
            .comments
            .iter()
            .position(|c| c.id == comment_id && c.author_id == author_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        state.comments.remove(position);
        state.votes.retain(|(id, _), _| *id != comment_id);
        for reply in state
            .comments
            .iter_mut()
            .filter(|c| c.parent_id == Some(comment_id))
        {
            reply.parent_id = None;
        }

        Ok(())
    }

    async fn add_vote(&self, comment_id: Uuid, user_id: Uuid, is_upvote: bool) -> Result<()> {
        let mut state = self.lock()?;

        if !state.comments.iter().any(|c| c.id == comment_id) {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        state.votes.insert(
            (comment_id, user_id),
            CommentVote {
                comment_id,
                user_id,
                is_upvote,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn remove_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<()> {
        self.lock()?.votes.remove(&(comment_id, user_id));
        Ok(())
    }

    async fn tally(&self, comment_id: Uuid) -> Result<VoteTally> {
        let state = self.lock()?;
        Ok(vote_aggregator::tally(
            state.votes.values().filter(|v| v.comment_id == comment_id),
        ))
    }

    async fn user_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<Option<bool>> {
        Ok(self
            .lock()?
            .votes
            .get(&(comment_id, user_id))
            .map(|v| v.is_upvote))
    }
}
