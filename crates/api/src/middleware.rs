//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use scisync_core::{CommentService, ResearchService, UserService, VoteService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Account management and authentication.
    pub user_service: UserService,
    /// Research submissions and moderation.
    pub research_service: ResearchService,
    /// Comments.
    pub comment_service: CommentService,
    /// Vote ledger.
    pub vote_service: VoteService,
    /// Shared secret for the `x-admin-secret` moderation header.
    pub admin_secret: Option<String>,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stashes the model in request
/// extensions; handlers opt in via the `AuthUser` / `MaybeAuthUser`
/// extractors. An invalid token is simply ignored here so public
/// endpoints keep working.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
