//! Create content reaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentReaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentReaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentReaction::ContentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContentReaction::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(ContentReaction::Kind).string_len(10).not_null())
                    .col(
                        ColumnDef::new(ContentReaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one reaction per (content, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_content_reaction_content_user")
                    .table(ContentReaction::Table)
                    .col(ContentReaction::ContentId)
                    .col(ContentReaction::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Foreign key: content_id -> content.id (reactions die with the post)
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_content_reaction_content_id")
                    .from(ContentReaction::Table, ContentReaction::ContentId)
                    .to(Content::Table, Content::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_content_reaction_user_id")
                    .from(ContentReaction::Table, ContentReaction::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentReaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContentReaction {
    Table,
    Id,
    ContentId,
    UserId,
    Kind,
    CreatedAt,
}

#[derive(Iden)]
enum Content {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
