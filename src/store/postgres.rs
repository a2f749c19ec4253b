use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::CommentStore;
use crate::{
    error::{AppError, Result},
    models::{Comment, CommentView, NewComment, VoteTally},
};

#[derive(Clone)]
pub struct PgCommentStore {
    db: PgPool,
}

impl PgCommentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (
                id, content_id, author_id, content, parent_id,
                is_approved, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, content_id, author_id, content, parent_id,
                      is_approved, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&comment.content_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.parent_id)
        .bind(comment.is_approved)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, content_id, author_id, content, parent_id,
                   is_approved, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(comment)
    }

    async fn get_by_content(
        &self,
        content_id: &str,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<CommentView>> {
        // Tallies and the viewer's vote come back pre-aggregated, one row per comment.
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT
                c.id, c.content_id, c.author_id, c.content, c.parent_id,
                c.is_approved, c.created_at, c.updated_at,
                u.email AS author_email,
                COUNT(v.user_id) FILTER (WHERE v.is_upvote) AS upvotes,
                COUNT(v.user_id) FILTER (WHERE NOT v.is_upvote) AS downvotes,
                BOOL_OR(v.is_upvote) FILTER (WHERE v.user_id = $2) AS user_vote
            FROM comments c
            LEFT JOIN users u ON u.id = c.author_id
            LEFT JOIN comment_votes v ON v.comment_id = c.id
            WHERE c.content_id = $1 AND c.is_approved
            GROUP BY c.id, u.email
            ORDER BY c.created_at DESC, c.id
            "#,
        )
        .bind(content_id)
        .bind(viewer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(comments)
    }

    async fn update(&self, comment_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment> {
        let mut tx = self.db.begin().await?;

        let updated = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $1, updated_at = $2
            WHERE id = $3 AND author_id = $4
            RETURNING id, content_id, author_id, content, parent_id,
                      is_approved, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(Utc::now())
        .bind(comment_id)
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, comment_id: Uuid, author_id: Uuid) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM comment_votes
            WHERE comment_id = (SELECT id FROM comments WHERE id = $1 AND author_id = $2)
            "#,
        )
        .bind(comment_id)
        .bind(author_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        tx.commit().await?;

        Ok(())
    }

    async fn add_vote(&self, comment_id: Uuid, user_id: Uuid, is_upvote: bool) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM comment_votes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // A concurrent caller for the same pair may have inserted between our
        // delete and insert; the primary key turns that into an overwrite.
        sqlx::query(
            r#"
            INSERT INTO comment_votes (comment_id, user_id, is_upvote, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (comment_id, user_id)
            DO UPDATE SET is_upvote = EXCLUDED.is_upvote, created_at = NOW()
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(is_upvote)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn remove_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM comment_votes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn tally(&self, comment_id: Uuid) -> Result<VoteTally> {
        let tally = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_upvote) AS upvotes,
                COUNT(*) FILTER (WHERE NOT is_upvote) AS downvotes
            FROM comment_votes
            WHERE comment_id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_one(&self.db)
        .await?;

        Ok(tally)
    }

    async fn user_vote(&self, comment_id: Uuid, user_id: Uuid) -> Result<Option<bool>> {
        let vote = sqlx::query_scalar::<_, bool>(
            "SELECT is_upvote FROM comment_votes WHERE comment_id = $1 AND user_id = $2",
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(vote)
    }
}
