//! Group entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A journaling group. Members receive one shared topic per calendar day.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Group image path, if one was uploaded.
    #[sea_orm(nullable)]
    pub photo_path: Option<String>,

    /// Registration date. Topics cannot be viewed for days before this.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_member::Entity")]
    GroupMember,

    #[sea_orm(has_many = "super::topic::Entity")]
    Topic,
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMember.def()
    }
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
