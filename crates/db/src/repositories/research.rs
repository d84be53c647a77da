//! Research repository.

use std::sync::Arc;

use crate::entities::{Research, research};
use scisync_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, sea_query::Expr,
};

/// Research repository for database operations.
#[derive(Clone)]
pub struct ResearchRepository {
    db: Arc<DatabaseConnection>,
}

impl ResearchRepository {
    /// Create a new research repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a research item by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<research::Model>> {
        Research::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a research item by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<research::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResearchNotFound(id.to_string()))
    }

    /// Create a new research item.
    pub async fn create(&self, model: research::ActiveModel) -> AppResult<research::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a research item.
    pub async fn update(&self, model: research::ActiveModel) -> AppResult<research::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List research items, newest first.
    ///
    /// Soft-deleted items are excluded unless `include_deleted` is set.
    pub async fn list(&self, include_deleted: bool) -> AppResult<Vec<research::Model>> {
        let mut query = Research::find().order_by_desc(research::Column::CreatedAt);

        if !include_deleted {
            query = query.filter(research::Column::IsDeleted.eq(false));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the view counter.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        Research::update_many()
            .col_expr(
                research::Column::ViewCount,
                Expr::col(research::Column::ViewCount).add(1),
            )
            .filter(research::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment the comment counter.
    pub async fn increment_comment_count(&self, id: &str) -> AppResult<()> {
        Research::update_many()
            .col_expr(
                research::Column::CommentCount,
                Expr::col(research::Column::CommentCount).add(1),
            )
            .filter(research::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
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
        let result = Research::update_many()
            .col_expr(research::Column::Upvotes, Expr::value(upvotes))
            .col_expr(research::Column::Downvotes, Expr::value(downvotes))
            .col_expr(
                research::Column::Version,
                Expr::col(research::Column::Version).add(1),
            )
            .filter(research::Column::Id.eq(id))
            .filter(research::Column::Version.eq(expected_version))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count all research items.
    pub async fn count(&self) -> AppResult<u64> {
        Research::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count soft-deleted research items.
    pub async fn count_deleted(&self) -> AppResult<u64> {
        Research::find()
            .filter(research::Column::IsDeleted.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
