//! Content entity (a member's post for a topic).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single user's post in response to a topic.
///
/// (`user_id`, `topic_id`) is unique - a member posts at most once per topic.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The authoring user.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// The topic this post responds to (and, transitively, the group/day).
    #[sea_orm(indexed)]
    pub topic_id: String,

    pub text: String,

    /// Public URL of the attached image, if any.
    #[sea_orm(nullable)]
    pub img_path: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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
        belongs_to = "super::topic::Entity",
        from = "Column::TopicId",
        to = "super::topic::Column::Id",
        on_delete = "Cascade"
    )]
    Topic,

    #[sea_orm(has_many = "super::content_reaction::Entity")]
    ContentReaction,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topic.def()
    }
}

impl Related<super::content_reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentReaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
