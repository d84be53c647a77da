//! Create research table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Research::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Research::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Research::AuthorId).string_len(32))
                    .col(ColumnDef::new(Research::AuthorName).string_len(100).not_null())
                    .col(ColumnDef::new(Research::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Research::Abstract).text().not_null())
                    .col(ColumnDef::new(Research::Description).text().not_null())
                    .col(ColumnDef::new(Research::Link).string_len(2048))
                    .col(ColumnDef::new(Research::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Research::Keywords).json_binary().not_null())
                    .col(
                        ColumnDef::new(Research::Upvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Research::Downvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Research::CommentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Research::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Research::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Research::DeletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Research::DeletedBy).string_len(32))
                    .col(
                        ColumnDef::new(Research::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Research::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Research::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_research_author")
                            .from(Research::Table, Research::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: category (listing by category)
        manager
            .create_index(
                Index::create()
                    .name("idx_research_category")
                    .table(Research::Table)
                    .col(Research::Category)
                    .to_owned(),
            )
            .await?;

        // Index: author_id
        manager
            .create_index(
                Index::create()
                    .name("idx_research_author_id")
                    .table(Research::Table)
                    .col(Research::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest-first listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_research_created_at")
                    .table(Research::Table)
                    .col(Research::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Research::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Research {
    Table,
    Id,
    AuthorId,
    AuthorName,
    Title,
    Abstract,
    Description,
    Link,
    Category,
    Keywords,
    Upvotes,
    Downvotes,
    CommentCount,
    ViewCount,
    IsDeleted,
    DeletedAt,
    DeletedBy,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
