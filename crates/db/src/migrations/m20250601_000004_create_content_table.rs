//! Create content table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Content::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Content::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Content::TopicId).string_len(32).not_null())
                    .col(ColumnDef::new(Content::Text).text().not_null())
                    .col(ColumnDef::new(Content::ImgPath).string_len(1024))
                    .col(
                        ColumnDef::new(Content::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one post per (user, topic)
        manager
            .create_index(
                Index::create()
                    .name("idx_content_user_topic")
                    .table(Content::Table)
                    .col(Content::UserId)
                    .col(Content::TopicId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (topic_id, created_at) for day views
        manager
            .create_index(
                Index::create()
                    .name("idx_content_topic_created_at")
                    .table(Content::Table)
                    .col(Content::TopicId)
                    .col(Content::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_content_user_id")
                    .from(Content::Table, Content::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: topic_id -> topic.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_content_topic_id")
                    .from(Content::Table, Content::TopicId)
                    .to(Topic::Table, Topic::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Content {
    Table,
    Id,
    UserId,
    TopicId,
    Text,
    ImgPath,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Topic {
    Table,
    Id,
}
