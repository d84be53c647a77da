//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC-format password hash. Plaintext is never stored.
    pub password_hash: String,

    /// API access token
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    pub full_name: String,

    pub affiliation: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    /// Research interest tags
    #[sea_orm(column_type = "JsonBinary")]
    pub research_interests: Json,

    /// Is this user verified by an administrator?
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// Is this user an admin?
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Published research count (denormalized)
    #[sea_orm(default_value = 0)]
    pub research_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::research::Entity")]
    Research,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::research::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Research.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
