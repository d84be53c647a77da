//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use scisync_common::{AppError, AppResult};
use scisync_core::{CreateCommentInput, VoteTarget};
use serde::Deserialize;

use super::VoteRequest;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::CommentResponse,
};

const DEFAULT_LIST_LIMIT: u64 = 500;

/// Query parameters for listing comments.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    research_id: Option<String>,
    limit: Option<u64>,
}

/// List comments for a research item, newest first.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let research_id = query
        .research_id
        .ok_or_else(|| AppError::BadRequest("researchId is required".to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let comments = state
        .comment_service
        .list(&research_id, limit, false)
        .await?;

    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Request body for posting a comment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentRequest {
    research_id: Option<String>,
    #[serde(flatten)]
    input: CreateCommentInput,
}

/// Post a comment. An authenticated caller becomes the author.
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    let research_id = req
        .research_id
        .ok_or_else(|| AppError::BadRequest("researchId is required".to_string()))?;

    let mut input = req.input;
    if let Some(user) = auth {
        input.author_id = Some(user.id);
        input.author_name = Some(user.full_name);
    }

    let created = state.comment_service.create(&research_id, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Request body for editing a comment.
#[derive(Debug, Deserialize)]
struct EditCommentRequest {
    content: String,
}

/// Edit a comment's body (author or site admin only).
async fn edit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<EditCommentRequest>,
) -> AppResult<Json<CommentResponse>> {
    let existing = state.comment_service.get(&id).await?;
    if !user.is_admin && existing.author_id.as_deref() != Some(user.id.as_str()) {
        return Err(AppError::Forbidden(
            "Only the author or an admin may edit this comment".to_string(),
        ));
    }

    let updated = state.comment_service.edit(&id, &req.content).await?;
    Ok(Json(updated.into()))
}

/// Apply a vote to a comment and return it with fresh counters.
async fn vote(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<CommentResponse>> {
    let (kind, user_id) = req.resolve(auth.as_ref())?;

    let target = VoteTarget::Comment(id.clone());
    let outcome = state.vote_service.apply(&user_id, &target, kind).await?;

    // Re-read the entity and pin the counters to this vote's recount
    let comment = state.comment_service.get(&id).await?;
    let comment = scisync_db::entities::comment::Model {
        upvotes: outcome.upvotes,
        downvotes: outcome.downvotes,
        ..comment
    };

    Ok(Json(CommentResponse::with_user_vote(
        comment,
        outcome.caller_vote,
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(edit))
        .route("/{id}/vote", post(vote))
}
