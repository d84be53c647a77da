//! Research endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use scisync_common::{AppError, AppResult};
use scisync_core::{CreateResearchInput, UpdateResearchInput, VoteTarget};
use scisync_db::entities::user;

use super::VoteRequest;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ResearchResponse,
};

/// List research items, newest first. Soft-deleted items are hidden.
async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ResearchResponse>>> {
    let items = state.research_service.list(false).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Get a research item, counting the view. Includes the caller's vote
/// when authenticated.
async fn get_one(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ResearchResponse>> {
    let item = state.research_service.get(&id, false).await?;

    let user_vote = match &auth {
        Some(user) => {
            state
                .vote_service
                .caller_vote(&user.id, &VoteTarget::Research(id))
                .await?
        }
        None => None,
    };

    Ok(Json(ResearchResponse::with_user_vote(item, user_vote)))
}

/// Submit a research item. An authenticated caller becomes the author.
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Json(mut input): Json<CreateResearchInput>,
) -> AppResult<(StatusCode, Json<ResearchResponse>)> {
    if let Some(user) = auth {
        input.author_id = Some(user.id);
        input.author_name = user.full_name;
    }

    let created = state.research_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Edit a research item (author or site admin only).
async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateResearchInput>,
) -> AppResult<Json<ResearchResponse>> {
    let existing = state.research_service.get_by_id(&id).await?;
    ensure_author_or_admin(&user, existing.author_id.as_deref())?;

    let updated = state.research_service.update(&id, input).await?;
    Ok(Json(updated.into()))
}

/// Soft-delete a research item (author or site admin only).
async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ResearchResponse>> {
    let existing = state.research_service.get_by_id(&id).await?;
    ensure_author_or_admin(&user, existing.author_id.as_deref())?;

    let deleted = state
        .research_service
        .soft_delete(&id, Some(&user.id))
        .await?;
    Ok(Json(deleted.into()))
}

/// Restore a soft-deleted research item (author or site admin only).
async fn restore(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ResearchResponse>> {
    let existing = state.research_service.get_by_id(&id).await?;
    ensure_author_or_admin(&user, existing.author_id.as_deref())?;

    let restored = state.research_service.restore(&id).await?;
    Ok(Json(restored.into()))
}

/// Apply a vote to a research item and return it with fresh counters.
async fn vote(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<ResearchResponse>> {
    let (kind, user_id) = req.resolve(auth.as_ref())?;

    let target = VoteTarget::Research(id.clone());
    let outcome = state.vote_service.apply(&user_id, &target, kind).await?;

    // Re-read the entity and pin the counters to this vote's recount
    let item = state.research_service.get_by_id(&id).await?;
    let item = scisync_db::entities::research::Model {
        upvotes: outcome.upvotes,
        downvotes: outcome.downvotes,
        ..item
    };

    Ok(Json(ResearchResponse::with_user_vote(
        item,
        outcome.caller_vote,
    )))
}

fn ensure_author_or_admin(user: &user::Model, author_id: Option<&str>) -> AppResult<()> {
    if user.is_admin || author_id == Some(user.id.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author or an admin may modify this research".to_string(),
        ))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/restore", patch(restore))
        .route("/{id}/vote", post(vote))
}
