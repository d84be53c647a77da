//! API endpoints.

mod admin;
mod auth;
mod comments;
mod research;

use axum::Router;
use scisync_common::{AppError, AppResult};
use scisync_db::entities::{user, vote::VoteKind};
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/research", research::router())
        .nest("/comments", comments::router())
        .nest("/admin", admin::router())
}

/// Vote request body, shared by the research and comment vote endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoteRequest {
    /// `"upvote"` or `"downvote"`.
    pub vote_type: Option<String>,
    /// The voting user. Falls back to the authenticated user when absent.
    pub user_id: Option<String>,
}

impl VoteRequest {
    /// Resolve the requested kind and voting user, rejecting malformed input.
    pub(crate) fn resolve(
        &self,
        auth_user: Option<&user::Model>,
    ) -> AppResult<(VoteKind, String)> {
        let kind = match self.vote_type.as_deref() {
            Some(raw) => VoteKind::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "voteType must be \"upvote\" or \"downvote\", got \"{raw}\""
                ))
            })?,
            None => return Err(AppError::BadRequest("voteType is required".to_string())),
        };

        let user_id = self
            .user_id
            .clone()
            .or_else(|| auth_user.map(|u| u.id.clone()))
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

        Ok((kind, user_id))
    }
}
