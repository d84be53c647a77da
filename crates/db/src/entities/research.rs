//! Research entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Research categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Category {
    #[sea_orm(string_value = "Computer Science")]
    ComputerScience,
    #[sea_orm(string_value = "Biology")]
    Biology,
    #[sea_orm(string_value = "Chemistry")]
    Chemistry,
    #[sea_orm(string_value = "Physics")]
    Physics,
    #[sea_orm(string_value = "Mathematics")]
    Mathematics,
    #[sea_orm(string_value = "Medicine")]
    Medicine,
    #[sea_orm(string_value = "Engineering")]
    Engineering,
    #[sea_orm(string_value = "Environmental Science")]
    EnvironmentalScience,
    #[sea_orm(string_value = "Psychology")]
    Psychology,
    #[sea_orm(string_value = "Social Sciences")]
    SocialSciences,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Category {
    /// Parse a category from its display name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Computer Science" => Some(Self::ComputerScience),
            "Biology" => Some(Self::Biology),
            "Chemistry" => Some(Self::Chemistry),
            "Physics" => Some(Self::Physics),
            "Mathematics" => Some(Self::Mathematics),
            "Medicine" => Some(Self::Medicine),
            "Engineering" => Some(Self::Engineering),
            "Environmental Science" => Some(Self::EnvironmentalScience),
            "Psychology" => Some(Self::Psychology),
            "Social Sciences" => Some(Self::SocialSciences),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Display name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ComputerScience => "Computer Science",
            Self::Biology => "Biology",
            Self::Chemistry => "Chemistry",
            Self::Physics => "Physics",
            Self::Mathematics => "Mathematics",
            Self::Medicine => "Medicine",
            Self::Engineering => "Engineering",
            Self::EnvironmentalScience => "Environmental Science",
            Self::Psychology => "Psychology",
            Self::SocialSciences => "Social Sciences",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "research")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID (optional: legacy submissions carry only a name)
    #[sea_orm(nullable, indexed)]
    pub author_id: Option<String>,

    pub author_name: String,

    pub title: String,

    /// Research abstract
    #[sea_orm(column_name = "abstract", column_type = "Text")]
    pub abstract_text: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Link to the full paper
    #[sea_orm(nullable)]
    pub link: Option<String>,

    pub category: Category,

    /// Keywords (lowercased)
    #[sea_orm(column_type = "JsonBinary")]
    pub keywords: Json,

    /// Upvote count, derived from the vote table (never independently
    /// authoritative)
    #[sea_orm(default_value = 0)]
    pub upvotes: i32,

    /// Downvote count, derived from the vote table
    #[sea_orm(default_value = 0)]
    pub downvotes: i32,

    /// Comment count (denormalized)
    #[sea_orm(default_value = 0)]
    pub comment_count: i32,

    /// View count (incremented on detail fetch)
    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    /// Soft-delete flag; rows are never physically removed by moderation
    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub deleted_by: Option<String>,

    /// Optimistic-concurrency revision, bumped on every vote-counter write
    #[sea_orm(default_value = 0)]
    pub version: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_round_trip() {
        for category in [
            Category::ComputerScience,
            Category::EnvironmentalScience,
            Category::Other,
        ] {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_category_parse_unknown() {
        assert_eq!(Category::parse("Alchemy"), None);
    }
}
