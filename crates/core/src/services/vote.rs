//! Vote service.
//!
//! A user holds at most one vote per entity. Requesting the kind they
//! already hold removes the vote; requesting the other kind switches it.
//! Counters on the voted entity are always recomputed from the vote table
//! inside the same transaction, never adjusted incrementally, so a
//! lost-update race can skew them only until the next write.

use std::sync::Arc;

use scisync_common::{AppError, AppResult, IdGenerator, config::VotingConfig};
use scisync_db::{
    entities::vote::{self, TargetKind, VoteKind},
    repositories::{CommentRepository, ResearchRepository, VoteRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Serialize;

/// The entity a vote applies to.
#[derive(Debug, Clone)]
pub enum VoteTarget {
    /// A research item.
    Research(String),
    /// A comment.
    Comment(String),
}

impl VoteTarget {
    /// Target kind for vote-table rows.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Research(_) => TargetKind::Research,
            Self::Comment(_) => TargetKind::Comment,
        }
    }

    /// Target entity ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Research(id) | Self::Comment(id) => id,
        }
    }
}

/// What a vote request did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTransition {
    /// No prior vote; a new one was recorded.
    Cast,
    /// The same kind was requested again; the vote was removed.
    Removed,
    /// The opposite kind was requested; the vote switched kind.
    Switched,
}

/// Result of applying a vote.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    /// What happened to the caller's vote.
    pub transition: VoteTransition,
    /// The caller's vote after the request (`None` after a toggle-off).
    pub caller_vote: Option<VoteKind>,
    /// Recomputed upvote count.
    pub upvotes: i32,
    /// Recomputed downvote count.
    pub downvotes: i32,
}

/// What the ledger scan decided, before any write.
#[derive(Debug, Clone)]
enum Decision {
    /// No existing vote: insert a new one.
    Insert,
    /// Existing vote of the requested kind: remove it.
    Remove(vote::Model),
    /// Existing vote of the other kind: switch it.
    Switch(vote::Model),
}

/// Scan the target's votes for the caller's record and decide the
/// transition. Pure: no I/O, fully determined by the ledger contents.
///
/// More than one record for the same user means the ledger is corrupt
/// (the unique index should make that impossible) and is surfaced as an
/// invariant violation rather than silently picking one.
fn decide(votes: &[vote::Model], user_id: &str, requested: VoteKind) -> AppResult<Decision> {
    let mut mine = votes.iter().filter(|v| v.user_id == user_id);

    let first = mine.next();
    if mine.next().is_some() {
        return Err(AppError::InvariantViolation(format!(
            "multiple vote records for user {user_id} on one target"
        )));
    }

    Ok(match first {
        None => Decision::Insert,
        Some(existing) if existing.kind == requested => Decision::Remove(existing.clone()),
        Some(existing) => Decision::Switch(existing.clone()),
    })
}

/// Vote service: applies vote requests transactionally.
#[derive(Clone)]
pub struct VoteService {
    db: Arc<DatabaseConnection>,
    vote_repo: VoteRepository,
    research_repo: ResearchRepository,
    comment_repo: CommentRepository,
    voting: VotingConfig,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        vote_repo: VoteRepository,
        research_repo: ResearchRepository,
        comment_repo: CommentRepository,
        voting: VotingConfig,
    ) -> Self {
        Self {
            db,
            vote_repo,
            research_repo,
            comment_repo,
            voting,
            id_gen: IdGenerator::new(),
        }
    }

    /// The caller's current vote on a target, if any.
    pub async fn caller_vote(
        &self,
        user_id: &str,
        target: &VoteTarget,
    ) -> AppResult<Option<VoteKind>> {
        Ok(self
            .vote_repo
            .find_by_user_and_target(user_id, target.kind(), target.id())
            .await?
            .map(|v| v.kind))
    }

    /// Apply a vote request.
    ///
    /// Runs the scan-decide-mutate-recount sequence in a transaction. A
    /// concurrent vote on the same entity shows up either as a duplicate-key
    /// conflict on insert or as a stale entity revision on the counter
    /// write; both roll back and retry against fresh state.
    pub async fn apply(
        &self,
        user_id: &str,
        target: &VoteTarget,
        requested: VoteKind,
    ) -> AppResult<VoteOutcome> {
        if user_id.trim().is_empty() {
            return Err(AppError::BadRequest("userId is required".to_string()));
        }

        let mut attempts = 0;
        loop {
            match self.try_apply(user_id, target, requested).await {
                Err(AppError::Conflict(reason)) if attempts < self.voting.max_conflict_retries => {
                    attempts += 1;
                    tracing::debug!(
                        target_id = target.id(),
                        user_id,
                        attempt = attempts,
                        reason,
                        "Vote conflict, retrying"
                    );
                }
                other => return other,
            }
        }
    }

    /// One attempt at the vote transaction.
    async fn try_apply(
        &self,
        user_id: &str,
        target: &VoteTarget,
        requested: VoteKind,
    ) -> AppResult<VoteOutcome> {
        // Fresh entity read each attempt: the revision guards the counter write
        let expected_version = self.load_target_version(target).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let votes = self
            .vote_repo
            .find_for_target_in(&txn, target.kind(), target.id())
            .await?;

        let decision = decide(&votes, user_id, requested)?;

        let (transition, caller_vote) = match decision {
            Decision::Insert => {
                let model = vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    target_kind: Set(target.kind()),
                    target_id: Set(target.id().to_string()),
                    kind: Set(requested),
                    cast_at: Set(chrono::Utc::now().into()),
                };
                self.vote_repo.insert_in(&txn, model).await?;
                (VoteTransition::Cast, Some(requested))
            }
            Decision::Remove(existing) => {
                self.vote_repo.delete_in(&txn, &existing.id).await?;
                (VoteTransition::Removed, None)
            }
            Decision::Switch(existing) => {
                let mut active: vote::ActiveModel = existing.into();
                active.kind = Set(requested);
                active.cast_at = Set(chrono::Utc::now().into());
                self.vote_repo.update_in(&txn, active).await?;
                (VoteTransition::Switched, Some(requested))
            }
        };

        // Exact recount, never an increment
        let (up, down) = self
            .vote_repo
            .count_by_kind_in(&txn, target.kind(), target.id())
            .await?;

        let upvotes = i32::try_from(up)
            .map_err(|_| AppError::Internal("vote count overflow".to_string()))?;
        let downvotes = i32::try_from(down)
            .map_err(|_| AppError::Internal("vote count overflow".to_string()))?;

        let rows = match target {
            VoteTarget::Research(id) => {
                self.research_repo
                    .update_vote_counts_in(&txn, id, upvotes, downvotes, expected_version)
                    .await?
            }
            VoteTarget::Comment(id) => {
                self.comment_repo
                    .update_vote_counts_in(&txn, id, upvotes, downvotes, expected_version)
                    .await?
            }
        };

        if rows == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::Conflict("stale entity revision".to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(VoteOutcome {
            transition,
            caller_vote,
            upvotes,
            downvotes,
        })
    }

    /// Load the target's current revision, rejecting deleted targets
    /// unless voting on them is enabled.
    async fn load_target_version(&self, target: &VoteTarget) -> AppResult<i32> {
        match target {
            VoteTarget::Research(id) => {
                let item = self.research_repo.get_by_id(id).await?;
                if item.is_deleted && !self.voting.allow_on_deleted {
                    return Err(AppError::ResearchNotFound(id.clone()));
                }
                Ok(item.version)
            }
            VoteTarget::Comment(id) => {
                let item = self.comment_repo.get_by_id(id).await?;
                if item.is_deleted && !self.voting.allow_on_deleted {
                    return Err(AppError::CommentNotFound(id.clone()));
                }
                Ok(item.version)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use scisync_db::entities::{
        comment,
        research::{self, Category},
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use serde_json::json;

    fn ledger_vote(id: &str, user_id: &str, kind: VoteKind) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            target_kind: TargetKind::Research,
            target_id: "r1".to_string(),
            kind,
            cast_at: Utc::now().into(),
        }
    }

    fn test_research(id: &str, deleted: bool, version: i32) -> research::Model {
        research::Model {
            id: id.to_string(),
            author_id: None,
            author_name: "Ada".to_string(),
            title: "Ferrite studies".to_string(),
            abstract_text: "An abstract".to_string(),
            description: String::new(),
            link: None,
            category: Category::Physics,
            keywords: json!([]),
            upvotes: 0,
            downvotes: 0,
            comment_count: 0,
            view_count: 0,
            is_deleted: deleted,
            deleted_at: None,
            deleted_by: None,
            version,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_comment(id: &str, deleted: bool) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            research_id: "r1".to_string(),
            author_id: None,
            author_name: "Grace".to_string(),
            content: "Body".to_string(),
            parent_id: None,
            upvotes: 0,
            downvotes: 0,
            is_edited: false,
            edited_at: None,
            is_deleted: deleted,
            deleted_at: None,
            version: 0,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<DatabaseConnection>, voting: VotingConfig) -> VoteService {
        VoteService::new(
            Arc::clone(&db),
            VoteRepository::new(Arc::clone(&db)),
            ResearchRepository::new(Arc::clone(&db)),
            CommentRepository::new(db),
            voting,
        )
    }

    // ---- decide(): the pure transition function ----

    #[test]
    fn test_decide_no_prior_vote_inserts() {
        let votes = vec![ledger_vote("v1", "other", VoteKind::Upvote)];
        let decision = decide(&votes, "me", VoteKind::Upvote).unwrap();
        assert!(matches!(decision, Decision::Insert));
    }

    #[test]
    fn test_decide_same_kind_removes() {
        let votes = vec![ledger_vote("v1", "me", VoteKind::Upvote)];
        let decision = decide(&votes, "me", VoteKind::Upvote).unwrap();
        match decision {
            Decision::Remove(existing) => assert_eq!(existing.id, "v1"),
            other => panic!("Expected Remove, got {other:?}"),
        }
    }

    #[test]
    fn test_decide_opposite_kind_switches() {
        let votes = vec![ledger_vote("v1", "me", VoteKind::Upvote)];
        let decision = decide(&votes, "me", VoteKind::Downvote).unwrap();
        match decision {
            Decision::Switch(existing) => assert_eq!(existing.id, "v1"),
            other => panic!("Expected Switch, got {other:?}"),
        }
    }

    #[test]
    fn test_decide_symmetric_for_downvotes() {
        let votes = vec![ledger_vote("v1", "me", VoteKind::Downvote)];
        assert!(matches!(
            decide(&votes, "me", VoteKind::Downvote).unwrap(),
            Decision::Remove(_)
        ));
        assert!(matches!(
            decide(&votes, "me", VoteKind::Upvote).unwrap(),
            Decision::Switch(_)
        ));
    }

    #[test]
    fn test_decide_duplicate_records_is_invariant_violation() {
        let votes = vec![
            ledger_vote("v1", "me", VoteKind::Upvote),
            ledger_vote("v2", "me", VoteKind::Downvote),
        ];
        let result = decide(&votes, "me", VoteKind::Upvote);
        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }

    #[test]
    fn test_decide_ignores_other_users() {
        let votes = vec![
            ledger_vote("v1", "a", VoteKind::Upvote),
            ledger_vote("v2", "b", VoteKind::Upvote),
            ledger_vote("v3", "c", VoteKind::Downvote),
        ];
        assert!(matches!(
            decide(&votes, "me", VoteKind::Downvote).unwrap(),
            Decision::Insert
        ));
    }

    // ---- apply(): the transactional wrapper ----

    #[tokio::test]
    async fn test_apply_empty_user_id_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db, VotingConfig::default());

        let result = service
            .apply("  ", &VoteTarget::Research("r1".to_string()), VoteKind::Upvote)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_apply_unknown_research_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<research::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let result = service
            .apply("me", &VoteTarget::Research("ghost".to_string()), VoteKind::Upvote)
            .await;

        assert!(matches!(result, Err(AppError::ResearchNotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_deleted_research_rejected_by_default() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_research("r1", true, 0)]])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let result = service
            .apply("me", &VoteTarget::Research("r1".to_string()), VoteKind::Upvote)
            .await;

        assert!(matches!(result, Err(AppError::ResearchNotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_deleted_comment_rejected_by_default() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment("c1", true)]])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let result = service
            .apply("me", &VoteTarget::Comment("c1".to_string()), VoteKind::Downvote)
            .await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_duplicate_ledger_rows_surface_invariant_violation() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_research("r1", false, 0)]])
                .append_query_results([vec![
                    ledger_vote("v1", "me", VoteKind::Upvote),
                    ledger_vote("v2", "me", VoteKind::Downvote),
                ]])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let result = service
            .apply("me", &VoteTarget::Research("r1".to_string()), VoteKind::Upvote)
            .await;

        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn test_apply_cast_recounts_and_commits() {
        let inserted = ledger_vote("v-new", "me", VoteKind::Upvote);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // Entity read before the transaction
                .append_query_results([[test_research("r1", false, 3)]])
                // Ledger scan: empty
                .append_query_results([Vec::<vote::Model>::new()])
                // Insert returning
                .append_query_results([[inserted]])
                // Recount: 1 upvote, 0 downvotes
                .append_query_results([
                    vec![btreemap! { "num_items" => Value::BigInt(Some(1)) }],
                    vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }],
                ])
                // Versioned counter write succeeds
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let outcome = service
            .apply("me", &VoteTarget::Research("r1".to_string()), VoteKind::Upvote)
            .await
            .unwrap();

        assert_eq!(outcome.transition, VoteTransition::Cast);
        assert_eq!(outcome.caller_vote, Some(VoteKind::Upvote));
        assert_eq!(outcome.upvotes, 1);
        assert_eq!(outcome.downvotes, 0);
    }

    #[tokio::test]
    async fn test_apply_switch_flips_kind_and_recounts() {
        let switched = vote::Model {
            kind: VoteKind::Downvote,
            ..ledger_vote("v1", "me", VoteKind::Upvote)
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // Entity read before the transaction
                .append_query_results([[test_research("r1", false, 2)]])
                // Ledger scan: an existing upvote by the caller
                .append_query_results([vec![ledger_vote("v1", "me", VoteKind::Upvote)]])
                // Update returning the switched vote
                .append_query_results([[switched]])
                // Recount: 0 upvotes, 1 downvote
                .append_query_results([
                    vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }],
                    vec![btreemap! { "num_items" => Value::BigInt(Some(1)) }],
                ])
                // Versioned counter write succeeds
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let outcome = service
            .apply("me", &VoteTarget::Research("r1".to_string()), VoteKind::Downvote)
            .await
            .unwrap();

        assert_eq!(outcome.transition, VoteTransition::Switched);
        assert_eq!(outcome.caller_vote, Some(VoteKind::Downvote));
        assert_eq!(outcome.upvotes, 0);
        assert_eq!(outcome.downvotes, 1);
    }

    #[tokio::test]
    async fn test_apply_toggle_off_clears_caller_vote() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_research("r1", false, 0)]])
                .append_query_results([vec![ledger_vote("v1", "me", VoteKind::Upvote)]])
                .append_query_results([
                    vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }],
                    vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }],
                ])
                .append_exec_results([
                    // Delete of the existing vote
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    // Versioned counter write
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );
        let service = service_with(db, VotingConfig::default());

        let outcome = service
            .apply("me", &VoteTarget::Research("r1".to_string()), VoteKind::Upvote)
            .await
            .unwrap();

        assert_eq!(outcome.transition, VoteTransition::Removed);
        assert_eq!(outcome.caller_vote, None);
        assert_eq!(outcome.upvotes, 0);
        assert_eq!(outcome.downvotes, 0);
    }

    #[tokio::test]
    async fn test_apply_stale_revision_exhausts_retries() {
        // Every attempt sees rows_affected == 0 on the counter write.
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres);
        for _ in 0..2 {
            mock = mock
                .append_query_results([[test_research("r1", false, 5)]])
                .append_query_results([vec![ledger_vote("v1", "me", VoteKind::Upvote)]])
                .append_query_results([
                    vec![btreemap! { "num_items" => Value::BigInt(Some(0)) },],
                    vec![btreemap! { "num_items" => Value::BigInt(Some(0)) },],
                ])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ]);
        }

        let db = Arc::new(mock.into_connection());
        let service = service_with(
            db,
            VotingConfig {
                allow_on_deleted: false,
                max_conflict_retries: 1,
            },
        );

        let result = service
            .apply("me", &VoteTarget::Research("r1".to_string()), VoteKind::Upvote)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
