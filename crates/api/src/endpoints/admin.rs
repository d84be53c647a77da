//! Admin moderation endpoints.
//!
//! Every route is gated by the [`AdminAuth`] extractor, which checks the
//! `x-admin-secret` header against the configured shared secret.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch},
};
use scisync_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AdminAuth,
    middleware::AppState,
    response::{CommentResponse, ResearchResponse, UserResponse},
};

/// Platform totals for the moderation dashboard.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    total_users: u64,
    total_admins: u64,
    total_research: u64,
    deleted_research: u64,
    total_comments: u64,
    deleted_comments: u64,
}

async fn stats(_: AdminAuth, State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    Ok(Json(StatsResponse {
        total_users: state.user_service.count().await?,
        total_admins: state.user_service.count_admins().await?,
        total_research: state.research_service.count().await?,
        deleted_research: state.research_service.count_deleted().await?,
        total_comments: state.comment_service.count().await?,
        deleted_comments: state.comment_service.count_deleted().await?,
    }))
}

async fn list_users(
    _: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetRoleRequest {
    is_admin: bool,
}

async fn set_role(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.set_admin(&id, req.is_admin).await?;
    Ok(Json(user.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetVerifiedRequest {
    is_verified: bool,
}

async fn set_verified(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetVerifiedRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.set_verified(&id, req.is_verified).await?;
    Ok(Json(user.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResearchQuery {
    include_deleted: Option<bool>,
}

/// List all research. Soft-deleted items are included unless
/// `includeDeleted=false` is passed.
async fn list_research(
    _: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListResearchQuery>,
) -> AppResult<Json<Vec<ResearchResponse>>> {
    let include_deleted = query.include_deleted.unwrap_or(true);
    let items = state.research_service.list(include_deleted).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

async fn delete_research(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ResearchResponse>> {
    let deleted = state
        .research_service
        .soft_delete(&id, Some("admin"))
        .await?;
    Ok(Json(deleted.into()))
}

async fn restore_research(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ResearchResponse>> {
    let restored = state.research_service.restore(&id).await?;
    Ok(Json(restored.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCommentsQuery {
    research_id: Option<String>,
}

/// List comments including soft-deleted ones, optionally scoped to one
/// research item.
async fn list_comments(
    _: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let comments = match query.research_id {
        Some(research_id) => {
            state
                .comment_service
                .list(&research_id, u64::MAX, true)
                .await?
        }
        None => state.comment_service.list_all().await?,
    };
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

async fn delete_comment(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CommentResponse>> {
    let deleted = state.comment_service.soft_delete(&id).await?;
    Ok(Json(deleted.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/{id}/role", patch(set_role))
        .route("/users/{id}/verify", patch(set_verified))
        .route("/research", get(list_research))
        .route("/research/{id}", delete(delete_research))
        .route("/research/{id}/restore", patch(restore_research))
        .route("/comments", get(list_comments))
        .route("/comments/{id}", delete(delete_comment))
}
