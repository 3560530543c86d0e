//! Create group and group member tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Group::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Group::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Group::PhotoPath).string_len(1024))
                    .col(
                        ColumnDef::new(Group::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMember::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(GroupMember::GroupId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(GroupMember::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(GroupMember::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(GroupMember::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: one membership row per (user, group)
        manager
            .create_index(
                Index::create()
                    .name("idx_group_member_user_group")
                    .table(GroupMember::Table)
                    .col(GroupMember::UserId)
                    .col(GroupMember::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: group_id (member listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_group_member_group_id")
                    .table(GroupMember::Table)
                    .col(GroupMember::GroupId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_group_member_user_id")
                    .from(GroupMember::Table, GroupMember::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: group_id -> group.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_group_member_group_id")
                    .from(GroupMember::Table, GroupMember::GroupId)
                    .to(Group::Table, Group::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Group::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
    Name,
    PhotoPath,
    CreatedAt,
}

#[derive(Iden)]
enum GroupMember {
    Table,
    Id,
    UserId,
    GroupId,
    Status,
    JoinedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
