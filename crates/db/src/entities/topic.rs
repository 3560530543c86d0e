//! Topic entity (the daily prompt issued to a group).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The prompt issued to one group for one calendar day.
///
/// (`group_id`, `issue_date`) is unique; concurrent first readers race on the
/// insert and the loser re-reads the winner's row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topic")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub group_id: String,

    /// The calendar day this topic was issued for.
    pub issue_date: Date,

    /// Prompt text, copied from the pool entry it was drawn from.
    pub body: String,

    pub byte_len: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,

    #[sea_orm(has_many = "super::content::Entity")]
    Content,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
