use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, CommentView, MAX_COMMENT_CHARS, NewComment, VoteSummary},
    services::{moderation_service::ModerationGate, vote_aggregator},
    store::CommentStore,
};

/// Orchestrates validation, moderation and persistence of comments and votes.
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
    moderation: ModerationGate,
    retain_rejected: bool,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>, moderation: ModerationGate) -> Self {
        Self {
            store,
            moderation,
            retain_rejected: false,
        }
    }

    /// Keep rejected attempts as `is_approved = false` rows instead of
    /// discarding them. They never show up in listings.
    pub fn retain_rejected(mut self, retain: bool) -> Self {
        self.retain_rejected = retain;
        self
    }

    pub async fn create_comment(
        &self,
        content_id: &str,
        author_id: Uuid,
        text: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        if content_id.trim().is_empty() {
            return Err(AppError::Validation("anime id is required".to_string()));
        }
        validate_content(text)?;

        // A reply's parent must already exist, which rules out cycles.
        if let Some(parent_id) = parent_id {
            let parent = self
                .store
                .get_by_id(parent_id)
                .await?
                .filter(|parent| parent.is_approved)
                .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

            if parent.content_id != content_id {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different anime".to_string(),
                ));
            }
        }

        let verdict = self.moderation.moderate(text).await?;

        let new_comment = NewComment {
            content_id: content_id.to_string(),
            author_id,
            content: text.to_string(),
            parent_id,
            is_approved: verdict.is_approved,
        };

        if !verdict.is_approved {
            tracing::warn!(
                %author_id,
                content_id,
                toxicity = verdict.toxicity_score,
                "Comment rejected by moderation"
            );
            // The caller still gets the rejection if the audit row can't be written.
            if self.retain_rejected {
                if let Err(err) = self.store.create(new_comment).await {
                    tracing::error!(
                        %author_id,
                        content_id,
                        error = %err,
                        "Failed to retain rejected comment"
                    );
                }
            }
            return Err(AppError::ModerationRejected(verdict.rejection_reason()));
        }

        let comment = self.store.create(new_comment).await?;
        tracing::info!(comment_id = %comment.id, %author_id, content_id, "Comment created");

        Ok(comment)
    }

    pub async fn get_comments(
        &self,
        content_id: &str,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<CommentView>> {
        self.store.get_by_content(content_id, viewer_id).await
    }

    /// Edits are not sent through moderation again.
    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment> {
        validate_content(text)?;
        self.authorize_author(comment_id, author_id).await?;

        self.store.update(comment_id, author_id, text).await
    }

    pub async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<()> {
        self.authorize_author(comment_id, author_id).await?;

        self.store.delete(comment_id, author_id).await?;
        tracing::info!(%comment_id, %author_id, "Comment deleted");

        Ok(())
    }

    pub async fn vote_comment(&self, comment_id: Uuid, user_id: Uuid, is_upvote: bool) -> Result<()> {
        self.require_visible_comment(comment_id).await?;
        self.store.add_vote(comment_id, user_id, is_upvote).await
    }

    pub async fn remove_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<()> {
        self.store.remove_vote(comment_id, user_id).await
    }

    pub async fn vote_summary(
        &self,
        comment_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<VoteSummary> {
        self.require_visible_comment(comment_id).await?;

        let tally = self.store.tally(comment_id).await?;
        let user_vote = match viewer_id {
            Some(viewer_id) => self.store.user_vote(comment_id, viewer_id).await?,
            None => None,
        };

        Ok(vote_aggregator::summarize(tally, user_vote))
    }

    async fn require_comment(&self, comment_id: Uuid) -> Result<Comment> {
        self.store
            .get_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    /// Rejected rows kept for auditing are invisible to everyone but their author.
    async fn require_visible_comment(&self, comment_id: Uuid) -> Result<Comment> {
        self.store
            .get_by_id(comment_id)
            .await?
            .filter(|comment| comment.is_approved)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    async fn authorize_author(&self, comment_id: Uuid, author_id: Uuid) -> Result<Comment> {
        let comment = self.require_comment(comment_id).await?;

        if comment.author_id != author_id {
            return Err(AppError::Forbidden(
                "You can only modify your own comments".to_string(),
            ));
        }

        Ok(comment)
    }
}

pub fn validate_content(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Comment content cannot be empty".to_string(),
        ));
    }

    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::Validation(format!(
            "Comment is too long (max {MAX_COMMENT_CHARS} characters)"
        )));
    }

    Ok(())
}
