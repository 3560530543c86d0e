//! Group member entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Standing of a user within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    /// Regular member in good standing.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Banned from the group. Reads still work; all writes are blocked.
    #[sea_orm(string_value = "BANNED")]
    Banned,
    /// Left or was removed. The row is kept so history stays attributable.
    #[sea_orm(string_value = "NON_MEMBER")]
    NonMember,
}

impl Default for MembershipStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl MembershipStatus {
    /// Check if the member may create, update, or delete content.
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Group membership - tracks which users are in which groups and their standing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who is a member.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// The group they belong to.
    #[sea_orm(indexed)]
    pub group_id: String,

    /// Standing of the member in the group.
    pub status: MembershipStatus,

    /// When the user joined the group.
    pub joined_at: DateTimeWithTimeZone,

    /// When the member record was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
