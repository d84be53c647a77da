//! API response shapes.
//!
//! Entities go over the wire in camelCase with internal columns
//! (password hashes, revision counters) stripped. Vote endpoints add a
//! nullable `userVote` field reflecting the caller's current vote.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};
use scisync_db::entities::{comment, research, user, vote::VoteKind};
use serde::Serialize;
use serde_json::Value;

/// Research item as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub id: String,
    pub author_id: Option<String>,
    pub author_name: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub description: String,
    pub link: Option<String>,
    pub category: String,
    pub keywords: Value,
    pub upvotes: i32,
    pub downvotes: i32,
    pub comment_count: i32,
    pub view_count: i32,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    /// The caller's current vote: `"upvote"`, `"downvote"`, or null.
    pub user_vote: Option<&'static str>,
}

impl ResearchResponse {
    /// Build from a model with the caller's vote attached.
    #[must_use]
    pub fn with_user_vote(model: research::Model, user_vote: Option<VoteKind>) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            author_name: model.author_name,
            title: model.title,
            abstract_text: model.abstract_text,
            description: model.description,
            link: model.link,
            category: model.category.as_str().to_string(),
            keywords: model.keywords,
            upvotes: model.upvotes,
            downvotes: model.downvotes,
            comment_count: model.comment_count,
            view_count: model.view_count,
            is_deleted: model.is_deleted,
            deleted_at: model.deleted_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            user_vote: user_vote.map(VoteKind::as_str),
        }
    }
}

impl From<research::Model> for ResearchResponse {
    fn from(model: research::Model) -> Self {
        Self::with_user_vote(model, None)
    }
}

/// Comment as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub research_id: String,
    pub author_id: Option<String>,
    pub author_name: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<FixedOffset>>,
    pub is_deleted: bool,
    pub created_at: DateTime<FixedOffset>,
    /// The caller's current vote: `"upvote"`, `"downvote"`, or null.
    pub user_vote: Option<&'static str>,
}

impl CommentResponse {
    /// Build from a model with the caller's vote attached.
    #[must_use]
    pub fn with_user_vote(model: comment::Model, user_vote: Option<VoteKind>) -> Self {
        Self {
            id: model.id,
            research_id: model.research_id,
            author_id: model.author_id,
            author_name: model.author_name,
            content: model.content,
            parent_id: model.parent_id,
            upvotes: model.upvotes,
            downvotes: model.downvotes,
            is_edited: model.is_edited,
            edited_at: model.edited_at,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            user_vote: user_vote.map(VoteKind::as_str),
        }
    }
}

impl From<comment::Model> for CommentResponse {
    fn from(model: comment::Model) -> Self {
        Self::with_user_vote(model, None)
    }
}

/// Public user profile. Password hash and token never appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub affiliation: String,
    pub bio: String,
    pub research_interests: Value,
    pub is_verified: bool,
    pub is_admin: bool,
    pub research_count: i32,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            affiliation: model.affiliation,
            bio: model.bio,
            research_interests: model.research_interests,
            is_verified: model.is_verified,
            is_admin: model.is_admin,
            research_count: model.research_count,
            created_at: model.created_at,
        }
    }
}
