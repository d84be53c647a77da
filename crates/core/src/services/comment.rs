//! Comment service.

use chrono::Utc;
use scisync_common::{AppError, AppResult, IdGenerator};
use scisync_db::{
    entities::comment,
    repositories::{CommentRepository, ResearchRepository},
};
use sea_orm::Set;
use serde::Deserialize;

/// Input for posting a comment.
///
/// Older clients send `text` instead of `content` and `name` instead of
/// `authorName`; both spellings are accepted and folded together by
/// [`CreateCommentInput::normalized`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    /// Comment body.
    pub content: Option<String>,
    /// Legacy alias for `content`.
    pub text: Option<String>,
    /// Author display name.
    pub author_name: Option<String>,
    /// Legacy alias for `authorName`.
    pub name: Option<String>,
    /// Author user ID, when the commenter is a registered user.
    pub author_id: Option<String>,
    /// Parent comment ID for threaded replies.
    pub parent_id: Option<String>,
}

/// Maximum comment body length in bytes.
const MAX_CONTENT_LENGTH: usize = 1000;

/// Canonical comment fields after legacy-alias folding.
#[derive(Debug, Clone)]
pub struct NormalizedComment {
    /// Comment body.
    pub content: String,
    /// Author display name.
    pub author_name: String,
}

impl CreateCommentInput {
    /// Fold the legacy field aliases into canonical fields.
    ///
    /// `content` wins over `text` and `authorName` wins over `name` when
    /// both are present. This is the only place the aliases are interpreted.
    pub fn normalized(&self) -> AppResult<NormalizedComment> {
        let content = self
            .content
            .as_deref()
            .or(self.text.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("Comment content is required".to_string()))?;

        if content.len() > MAX_CONTENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment content must be at most {MAX_CONTENT_LENGTH} characters"
            )));
        }

        let author_name = self
            .author_name
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Anonymous");

        Ok(NormalizedComment {
            content: content.to_string(),
            author_name: author_name.to_string(),
        })
    }
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    research_repo: ResearchRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(comment_repo: CommentRepository, research_repo: ResearchRepository) -> Self {
        Self {
            comment_repo,
            research_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment on a research item.
    pub async fn create(
        &self,
        research_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        let normalized = input.normalized()?;

        let research = self.research_repo.get_by_id(research_id).await?;
        if research.is_deleted {
            return Err(AppError::ResearchNotFound(research_id.to_string()));
        }

        if let Some(parent_id) = &input.parent_id {
            let parent = self.comment_repo.get_by_id(parent_id).await?;
            if parent.research_id != research_id {
                return Err(AppError::BadRequest(
                    "Parent comment belongs to a different research item".to_string(),
                ));
            }
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            research_id: Set(research_id.to_string()),
            author_id: Set(input.author_id.clone()),
            author_name: Set(normalized.author_name),
            content: Set(normalized.content),
            parent_id: Set(input.parent_id.clone()),
            upvotes: Set(0),
            downvotes: Set(0),
            is_edited: Set(false),
            edited_at: Set(None),
            is_deleted: Set(false),
            deleted_at: Set(None),
            version: Set(0),
            created_at: Set(Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;

        self.research_repo
            .increment_comment_count(research_id)
            .await?;

        tracing::debug!(comment_id = %created.id, research_id, "Comment posted");
        Ok(created)
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// List comments for a research item, newest first.
    pub async fn list(
        &self,
        research_id: &str,
        limit: u64,
        include_deleted: bool,
    ) -> AppResult<Vec<comment::Model>> {
        // Surface a 404 for unknown research rather than an empty list
        self.research_repo.get_by_id(research_id).await?;

        self.comment_repo
            .list_by_research(research_id, limit, include_deleted)
            .await
    }

    /// List all comments, newest first (moderation view).
    pub async fn list_all(&self) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.list_all().await
    }

    /// Edit a comment's body.
    pub async fn edit(&self, id: &str, content: &str) -> AppResult<comment::Model> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Comment content is required".to_string(),
            ));
        }
        if trimmed.len() > MAX_CONTENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment content must be at most {MAX_CONTENT_LENGTH} characters"
            )));
        }

        let existing = self.comment_repo.get_by_id(id).await?;
        if existing.is_deleted {
            return Err(AppError::CommentNotFound(id.to_string()));
        }

        let mut active: comment::ActiveModel = existing.into();
        active.content = Set(trimmed.to_string());
        active.is_edited = Set(true);
        active.edited_at = Set(Some(Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Soft-delete a comment.
    pub async fn soft_delete(&self, id: &str) -> AppResult<comment::Model> {
        let existing = self.comment_repo.get_by_id(id).await?;

        if existing.is_deleted {
            return Err(AppError::BadRequest("Comment already deleted".to_string()));
        }

        let mut active: comment::ActiveModel = existing.into();
        active.is_deleted = Set(true);
        active.deleted_at = Set(Some(Utc::now().into()));

        let updated = self.comment_repo.update(active).await?;
        tracing::info!(comment_id = %updated.id, "Comment soft-deleted");
        Ok(updated)
    }

    /// Count all comments.
    pub async fn count(&self) -> AppResult<u64> {
        self.comment_repo.count().await
    }

    /// Count soft-deleted comments.
    pub async fn count_deleted(&self) -> AppResult<u64> {
        self.comment_repo.count_deleted().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scisync_db::entities::research::{self, Category};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_research(id: &str, deleted: bool) -> research::Model {
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
            version: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_normalized_canonical_fields() {
        let input = CreateCommentInput {
            content: Some("Looks solid".to_string()),
            author_name: Some("Grace".to_string()),
            ..Default::default()
        };

        let n = input.normalized().unwrap();
        assert_eq!(n.content, "Looks solid");
        assert_eq!(n.author_name, "Grace");
    }

    #[test]
    fn test_normalized_legacy_aliases() {
        let input = CreateCommentInput {
            text: Some("Legacy body".to_string()),
            name: Some("Old Client".to_string()),
            ..Default::default()
        };

        let n = input.normalized().unwrap();
        assert_eq!(n.content, "Legacy body");
        assert_eq!(n.author_name, "Old Client");
    }

    #[test]
    fn test_normalized_canonical_wins_over_legacy() {
        let input = CreateCommentInput {
            content: Some("New".to_string()),
            text: Some("Old".to_string()),
            author_name: Some("Grace".to_string()),
            name: Some("G.".to_string()),
            ..Default::default()
        };

        let n = input.normalized().unwrap();
        assert_eq!(n.content, "New");
        assert_eq!(n.author_name, "Grace");
    }

    #[test]
    fn test_normalized_missing_content() {
        let input = CreateCommentInput {
            author_name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            input.normalized(),
            Err(AppError::Validation(_))
        ));

        let whitespace = CreateCommentInput {
            content: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(whitespace.normalized().is_err());
    }

    #[test]
    fn test_normalized_missing_name_defaults_anonymous() {
        let input = CreateCommentInput {
            content: Some("Body".to_string()),
            ..Default::default()
        };
        assert_eq!(input.normalized().unwrap().author_name, "Anonymous");
    }

    #[tokio::test]
    async fn test_create_on_unknown_research() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let research_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<research::Model>::new()])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            ResearchRepository::new(research_db),
        );

        let input = CreateCommentInput {
            content: Some("Body".to_string()),
            ..Default::default()
        };
        let result = service.create("missing", input).await;

        assert!(matches!(result, Err(AppError::ResearchNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_on_deleted_research() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let research_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_research("r1", true)]])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            ResearchRepository::new(research_db),
        );

        let input = CreateCommentInput {
            content: Some("Body".to_string()),
            ..Default::default()
        };
        let result = service.create("r1", input).await;

        assert!(matches!(result, Err(AppError::ResearchNotFound(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_already_deleted() {
        let existing = comment::Model {
            id: "c1".to_string(),
            research_id: "r1".to_string(),
            author_id: None,
            author_name: "Grace".to_string(),
            content: "Body".to_string(),
            parent_id: None,
            upvotes: 0,
            downvotes: 0,
            is_edited: false,
            edited_at: None,
            is_deleted: true,
            deleted_at: Some(Utc::now().into()),
            version: 0,
            created_at: Utc::now().into(),
        };

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let research_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            ResearchRepository::new(research_db),
        );

        let result = service.soft_delete("c1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_normalized_over_length_content() {
        let input = CreateCommentInput {
            content: Some("x".repeat(MAX_CONTENT_LENGTH + 1)),
            ..Default::default()
        };
        assert!(matches!(
            input.normalized(),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_empty_content() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let research_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            ResearchRepository::new(research_db),
        );

        let result = service.edit("c1", "   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_deleted_comment() {
        let existing = comment::Model {
            id: "c1".to_string(),
            research_id: "r1".to_string(),
            author_id: None,
            author_name: "Grace".to_string(),
            content: "Body".to_string(),
            parent_id: None,
            upvotes: 0,
            downvotes: 0,
            is_edited: false,
            edited_at: None,
            is_deleted: true,
            deleted_at: Some(Utc::now().into()),
            version: 0,
            created_at: Utc::now().into(),
        };

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let research_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            ResearchRepository::new(research_db),
        );

        let result = service.edit("c1", "New body").await;
        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }
}
