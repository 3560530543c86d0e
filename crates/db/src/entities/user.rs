//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account, keyed by the OAuth2 provider identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// OAuth2 provider name (currently always "kakao").
    pub provider: String,

    /// The id assigned by the provider. Unique per provider.
    #[sea_orm(indexed)]
    pub provider_user_id: String,

    /// Display name.
    pub username: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Profile image URL from the provider.
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Role embedded in minted access tokens ("user" or "admin").
    pub role: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_member::Entity")]
    GroupMember,

    #[sea_orm(has_many = "super::content::Entity")]
    Content,

    #[sea_orm(has_many = "super::content_reaction::Entity")]
    ContentReaction,
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMember.def()
    }
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::content_reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentReaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
