//! Research submission service.

use chrono::Utc;
use scisync_common::{AppError, AppResult, IdGenerator};
use scisync_db::{
    entities::research::{self, Category},
    repositories::{ResearchRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Input for submitting a research item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResearchInput {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Abstract.
    #[serde(rename = "abstract")]
    #[validate(length(min = 1, max = 2000, message = "Abstract must be 1-2000 characters"))]
    pub abstract_text: String,

    /// Long-form description.
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description too long"))]
    pub description: String,

    /// Link to the full paper.
    #[serde(default)]
    pub link: Option<String>,

    /// Category display name.
    pub category: String,

    /// Keywords (lowercased on write).
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Author user ID, when the submitter is a registered user.
    #[serde(default)]
    pub author_id: Option<String>,

    /// Author display name.
    #[validate(length(min = 1, max = 100, message = "Author name is required"))]
    pub author_name: String,
}

/// Input for editing a research item. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResearchInput {
    /// New title.
    pub title: Option<String>,
    /// New abstract.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New link. `Some(None)` is not representable; an empty string clears it.
    pub link: Option<String>,
    /// New category display name.
    pub category: Option<String>,
    /// New keywords.
    pub keywords: Option<Vec<String>>,
}

/// Research service for submissions and moderation.
#[derive(Clone)]
pub struct ResearchService {
    research_repo: ResearchRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ResearchService {
    /// Create a new research service.
    #[must_use]
    pub fn new(research_repo: ResearchRepository, user_repo: UserRepository) -> Self {
        Self {
            research_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a research item.
    pub async fn create(&self, input: CreateResearchInput) -> AppResult<research::Model> {
        input.validate()?;

        let category = parse_category(&input.category)?;
        let link = normalize_link(input.link.as_deref())?;
        let keywords = normalize_keywords(&input.keywords);

        let model = research::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(input.author_id.clone()),
            author_name: Set(input.author_name),
            title: Set(input.title),
            abstract_text: Set(input.abstract_text),
            description: Set(input.description),
            link: Set(link),
            category: Set(category),
            keywords: Set(json!(keywords)),
            upvotes: Set(0),
            downvotes: Set(0),
            comment_count: Set(0),
            view_count: Set(0),
            is_deleted: Set(false),
            deleted_at: Set(None),
            deleted_by: Set(None),
            version: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.research_repo.create(model).await?;

        // Keep the author's submission counter in step
        if let Some(author_id) = &input.author_id {
            if let Some(author) = self.user_repo.find_by_id(author_id).await? {
                let count = author.research_count;
                let mut active: scisync_db::entities::user::ActiveModel = author.into();
                active.research_count = Set(count + 1);
                self.user_repo.update(active).await?;
            }
        }

        tracing::info!(research_id = %created.id, title = %created.title, "Research submitted");
        Ok(created)
    }

    /// Get a research item by ID, counting the view.
    ///
    /// Soft-deleted items read as not found unless `include_deleted` is set.
    pub async fn get(&self, id: &str, include_deleted: bool) -> AppResult<research::Model> {
        let item = self.research_repo.get_by_id(id).await?;

        if item.is_deleted && !include_deleted {
            return Err(AppError::ResearchNotFound(id.to_string()));
        }

        self.research_repo.increment_view_count(id).await?;

        Ok(research::Model {
            view_count: item.view_count + 1,
            ..item
        })
    }

    /// Get a research item by ID without counting a view.
    ///
    /// Returns soft-deleted items too; used for ownership checks and
    /// post-vote reads.
    pub async fn get_by_id(&self, id: &str) -> AppResult<research::Model> {
        self.research_repo.get_by_id(id).await
    }

    /// List research items, newest first.
    pub async fn list(&self, include_deleted: bool) -> AppResult<Vec<research::Model>> {
        self.research_repo.list(include_deleted).await
    }

    /// Edit a research item.
    pub async fn update(&self, id: &str, input: UpdateResearchInput) -> AppResult<research::Model> {
        let item = self.research_repo.get_by_id(id).await?;

        if item.is_deleted {
            return Err(AppError::ResearchNotFound(id.to_string()));
        }

        let mut active: research::ActiveModel = item.into();

        if let Some(title) = input.title {
            if title.is_empty() || title.len() > 200 {
                return Err(AppError::Validation(
                    "Title must be 1-200 characters".to_string(),
                ));
            }
            active.title = Set(title);
        }
        if let Some(abstract_text) = input.abstract_text {
            if abstract_text.is_empty() {
                return Err(AppError::Validation("Abstract is required".to_string()));
            }
            active.abstract_text = Set(abstract_text);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(link) = input.link {
            active.link = Set(normalize_link(Some(&link))?);
        }
        if let Some(category) = input.category {
            active.category = Set(parse_category(&category)?);
        }
        if let Some(keywords) = input.keywords {
            active.keywords = Set(json!(normalize_keywords(&keywords)));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.research_repo.update(active).await
    }

    /// Soft-delete a research item.
    ///
    /// The row stays in place with its votes and comments; it disappears
    /// from public reads until restored.
    pub async fn soft_delete(&self, id: &str, deleted_by: Option<&str>) -> AppResult<research::Model> {
        let item = self.research_repo.get_by_id(id).await?;

        if item.is_deleted {
            return Err(AppError::BadRequest("Research already deleted".to_string()));
        }

        let mut active: research::ActiveModel = item.into();
        active.is_deleted = Set(true);
        active.deleted_at = Set(Some(Utc::now().into()));
        active.deleted_by = Set(deleted_by.map(ToString::to_string));

        let updated = self.research_repo.update(active).await?;
        tracing::info!(research_id = %updated.id, "Research soft-deleted");
        Ok(updated)
    }

    /// Restore a soft-deleted research item.
    pub async fn restore(&self, id: &str) -> AppResult<research::Model> {
        let item = self.research_repo.get_by_id(id).await?;

        if !item.is_deleted {
            return Err(AppError::BadRequest("Research is not deleted".to_string()));
        }

        let mut active: research::ActiveModel = item.into();
        active.is_deleted = Set(false);
        active.deleted_at = Set(None);
        active.deleted_by = Set(None);

        let updated = self.research_repo.update(active).await?;
        tracing::info!(research_id = %updated.id, "Research restored");
        Ok(updated)
    }

    /// Count all research items.
    pub async fn count(&self) -> AppResult<u64> {
        self.research_repo.count().await
    }

    /// Count soft-deleted research items.
    pub async fn count_deleted(&self) -> AppResult<u64> {
        self.research_repo.count_deleted().await
    }
}

fn parse_category(s: &str) -> AppResult<Category> {
    Category::parse(s).ok_or_else(|| AppError::Validation(format!("Unknown category: {s}")))
}

/// Validate and normalize an optional paper link. Empty strings clear it.
fn normalize_link(link: Option<&str>) -> AppResult<Option<String>> {
    match link {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => {
            let parsed = url::Url::parse(s)
                .map_err(|_| AppError::Validation(format!("Invalid link URL: {s}")))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(AppError::Validation(
                    "Link must be an http(s) URL".to_string(),
                ));
            }
            Ok(Some(s.to_string()))
        }
    }
}

/// Lowercase, trim, and drop empty keywords.
fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
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
            keywords: json!(["magnetism"]),
            upvotes: 0,
            downvotes: 0,
            comment_count: 0,
            view_count: 4,
            is_deleted: deleted,
            deleted_at: None,
            deleted_by: None,
            version: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> ResearchService {
        ResearchService::new(
            ResearchRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[test]
    fn test_normalize_keywords() {
        let raw = vec![
            "  Magnetism ".to_string(),
            String::new(),
            "SOLID State".to_string(),
        ];
        assert_eq!(normalize_keywords(&raw), vec!["magnetism", "solid state"]);
    }

    #[test]
    fn test_normalize_link() {
        assert_eq!(normalize_link(None).unwrap(), None);
        assert_eq!(normalize_link(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_link(Some("https://example.org/paper.pdf")).unwrap(),
            Some("https://example.org/paper.pdf".to_string())
        );
        assert!(normalize_link(Some("not a url")).is_err());
        assert!(normalize_link(Some("ftp://example.org/p")).is_err());
    }

    #[test]
    fn test_parse_category_unknown() {
        assert!(matches!(
            parse_category("Alchemy"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_bumps_view_count() {
        let item = create_test_research("r1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[item]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.get("r1", false).await.unwrap();

        assert_eq!(result.view_count, 5);
    }

    #[tokio::test]
    async fn test_get_deleted_hidden_from_public() {
        let item = create_test_research("r1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[item]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.get("r1", false).await;

        assert!(matches!(result, Err(AppError::ResearchNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_category() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let input = CreateResearchInput {
            title: "T".to_string(),
            abstract_text: "A".to_string(),
            description: String::new(),
            link: None,
            category: "Alchemy".to_string(),
            keywords: vec![],
            author_id: None,
            author_name: "Ada".to_string(),
        };

        let result = service.create(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_already_deleted() {
        let item = create_test_research("r1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[item]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.soft_delete("r1", Some("admin")).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_restore_not_deleted() {
        let item = create_test_research("r1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[item]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.restore("r1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
