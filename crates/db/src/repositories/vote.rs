//! Vote repository.
//!
//! Vote rows are read and mutated inside the vote transaction, so the
//! mutating methods are generic over [`ConnectionTrait`] and accept either
//! the pooled connection or an open transaction.

use std::sync::Arc;

use crate::entities::{
    Vote,
    vote::{self, TargetKind, VoteKind},
};
use scisync_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

/// Returns true when a database error is a unique-index violation.
///
/// Used to turn a concurrent duplicate vote insert into a retryable
/// conflict instead of a generic database error.
fn is_unique_violation(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("duplicate key") || message.contains("unique constraint")
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All votes on a target, in stable insertion order.
    pub async fn find_for_target_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::TargetKind.eq(target_kind))
            .filter(vote::Column::TargetId.eq(target_id))
            .order_by_asc(vote::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The caller's vote on a target, if any.
    pub async fn find_by_user_and_target(
        &self,
        user_id: &str,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetKind.eq(target_kind))
            .filter(vote::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new vote.
    ///
    /// A unique-index violation on (user, target) maps to
    /// [`AppError::Conflict`] so the caller can retry against fresh state.
    pub async fn insert_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: vote::ActiveModel,
    ) -> AppResult<vote::Model> {
        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("concurrent vote on the same target".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Update an existing vote (kind switch refreshes `cast_at`).
    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: vote::ActiveModel,
    ) -> AppResult<vote::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a vote by ID.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Vote::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Exact recount of votes on a target, by kind.
    ///
    /// Returns `(upvotes, downvotes)`. This is the authoritative count: the
    /// denormalized entity counters are always overwritten with this result,
    /// never adjusted incrementally.
    pub async fn count_by_kind_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<(u64, u64)> {
        let upvotes = Vote::find()
            .filter(vote::Column::TargetKind.eq(target_kind))
            .filter(vote::Column::TargetId.eq(target_id))
            .filter(vote::Column::Kind.eq(VoteKind::Upvote))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let downvotes = Vote::find()
            .filter(vote::Column::TargetKind.eq(target_kind))
            .filter(vote::Column::TargetId.eq(target_id))
            .filter(vote::Column::Kind.eq(VoteKind::Downvote))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((upvotes, downvotes))
    }
}
