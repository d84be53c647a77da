//! Vote entity (up/down votes on research and comments).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vote kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    #[sea_orm(string_value = "upvote")]
    Upvote,
    #[sea_orm(string_value = "downvote")]
    Downvote,
}

impl VoteKind {
    /// Parse the wire representation (`"upvote"` / `"downvote"`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upvote" => Some(Self::Upvote),
            "downvote" => Some(Self::Downvote),
            _ => None,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }
}

/// What a vote is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[sea_orm(string_value = "research")]
    Research,
    #[sea_orm(string_value = "comment")]
    Comment,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who voted
    pub user_id: String,

    /// Target entity kind (research or comment)
    pub target_kind: TargetKind,

    /// Target entity ID
    pub target_id: String,

    /// Vote kind
    pub kind: VoteKind,

    /// Set on creation, refreshed when the kind switches
    pub cast_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_kind_parse() {
        assert_eq!(VoteKind::parse("upvote"), Some(VoteKind::Upvote));
        assert_eq!(VoteKind::parse("downvote"), Some(VoteKind::Downvote));
        assert_eq!(VoteKind::parse("sideways"), None);
        assert_eq!(VoteKind::parse(""), None);
    }

    #[test]
    fn test_vote_kind_as_str() {
        assert_eq!(VoteKind::Upvote.as_str(), "upvote");
        assert_eq!(VoteKind::Downvote.as_str(), "downvote");
    }
}
