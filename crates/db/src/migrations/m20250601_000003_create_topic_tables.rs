//! Create topic pool and topic tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Starter prompt pool. Installations can extend the table afterwards.
const SEED_PROMPTS: &[&str] = &[
    "What made you smile today?",
    "Share a photo of your meal today.",
    "What is one thing you want to tell the family?",
    "Describe your morning in three sentences.",
    "What are you grateful for today?",
    "What was the hardest part of your day?",
    "Share something you are looking forward to.",
    "What song matched your mood today?",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TopicSet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TopicSet::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TopicSet::Body).text().not_null())
                    .col(ColumnDef::new(TopicSet::ByteLen).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Topic::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Topic::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Topic::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(Topic::IssueDate).date().not_null())
                    .col(ColumnDef::new(Topic::Body).text().not_null())
                    .col(ColumnDef::new(Topic::ByteLen).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Unique index: one topic per (group, day). Concurrent first readers
        // race on this; the loser re-reads.
        manager
            .create_index(
                Index::create()
                    .name("idx_topic_group_issue_date")
                    .table(Topic::Table)
                    .col(Topic::GroupId)
                    .col(Topic::IssueDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Foreign key: group_id -> group.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_topic_group_id")
                    .from(Topic::Table, Topic::GroupId)
                    .to(Group::Table, Group::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Seed the prompt pool
        for prompt in SEED_PROMPTS {
            let insert = Query::insert()
                .into_table(TopicSet::Table)
                .columns([TopicSet::Body, TopicSet::ByteLen])
                .values_panic([(*prompt).into(), (prompt.len() as i32).into()])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Topic::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TopicSet::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TopicSet {
    Table,
    Id,
    Body,
    ByteLen,
}

#[derive(Iden)]
enum Topic {
    Table,
    Id,
    GroupId,
    IssueDate,
    Body,
    ByteLen,
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
}
