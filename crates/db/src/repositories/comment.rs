//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use scisync_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List comments for a research item, newest first.
    ///
    /// Soft-deleted comments are excluded unless `include_deleted` is set.
    pub async fn list_by_research(
        &self,
        research_id: &str,
        limit: u64,
        include_deleted: bool,
    ) -> AppResult<Vec<comment::Model>> {
        let mut query = Comment::find()
            .filter(comment::Column::ResearchId.eq(research_id))
            .order_by_desc(comment::Column::CreatedAt);

        if !include_deleted {
            query = query.filter(comment::Column::IsDeleted.eq(false));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all comments, newest first (moderation view).
    pub async fn list_all(&self) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write recomputed vote counters, guarded by the entity revision.
    ///
    /// Returns the number of rows updated: zero means the revision moved
    /// under us and the caller must retry against a fresh read.
    pub async fn update_vote_counts_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        upvotes: i32,
        downvotes: i32,
        expected_version: i32,
    ) -> AppResult<u64> {
        let result = Comment::update_many()
            .col_expr(comment::Column::Upvotes, Expr::value(upvotes))
            .col_expr(comment::Column::Downvotes, Expr::value(downvotes))
            .col_expr(
                comment::Column::Version,
                Expr::col(comment::Column::Version).add(1),
            )
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::Version.eq(expected_version))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count all comments.
    pub async fn count(&self) -> AppResult<u64> {
        Comment::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count soft-deleted comments.
    pub async fn count_deleted(&self) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::IsDeleted.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
