//! Comment entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Research this comment belongs to
    #[sea_orm(indexed)]
    pub research_id: String,

    /// Author user ID (optional: anonymous comments carry only a name)
    #[sea_orm(nullable, indexed)]
    pub author_id: Option<String>,

    pub author_name: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Parent comment ID (threaded replies)
    #[sea_orm(nullable, indexed)]
    pub parent_id: Option<String>,

    /// Upvote count, derived from the vote table
    #[sea_orm(default_value = 0)]
    pub upvotes: i32,

    /// Downvote count, derived from the vote table
    #[sea_orm(default_value = 0)]
    pub downvotes: i32,

    #[sea_orm(default_value = false)]
    pub is_edited: bool,

    #[sea_orm(nullable)]
    pub edited_at: Option<DateTimeWithTimeZone>,

    /// Soft-delete flag
    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    /// Optimistic-concurrency revision, bumped on every vote-counter write
    #[sea_orm(default_value = 0)]
    pub version: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::research::Entity",
        from = "Column::ResearchId",
        to = "super::research::Column::Id",
        on_delete = "Cascade"
    )]
    Research,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::research::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Research.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
