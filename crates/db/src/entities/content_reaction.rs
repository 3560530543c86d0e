//! Content reaction entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The fixed set of reaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionKind {
    #[sea_orm(string_value = "LIKE")]
    Like,
    #[sea_orm(string_value = "LOVE")]
    Love,
    #[sea_orm(string_value = "WOW")]
    Wow,
    #[sea_orm(string_value = "SAD")]
    Sad,
    #[sea_orm(string_value = "ANGRY")]
    Angry,
}

impl ReactionKind {
    /// All kinds, in a stable order.
    pub const ALL: [Self; 5] = [Self::Like, Self::Love, Self::Wow, Self::Sad, Self::Angry];

    /// Parse a label case-insensitively. Returns `None` for unknown labels.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "LIKE" => Some(Self::Like),
            "LOVE" => Some(Self::Love),
            "WOW" => Some(Self::Wow),
            "SAD" => Some(Self::Sad),
            "ANGRY" => Some(Self::Angry),
            _ => None,
        }
    }

    /// The canonical label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Love => "LOVE",
            Self::Wow => "WOW",
            Self::Sad => "SAD",
            Self::Angry => "ANGRY",
        }
    }
}

/// A user's reaction to a piece of content.
///
/// (`content_id`, `user_id`) is unique - one reaction per user per post.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_reaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The content being reacted to.
    #[sea_orm(indexed)]
    pub content_id: String,

    /// The user who reacted.
    #[sea_orm(indexed)]
    pub user_id: String,

    pub kind: ReactionKind,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content::Entity",
        from = "Column::ContentId",
        to = "super::content::Column::Id",
        on_delete = "Cascade"
    )]
    Content,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_case_insensitive() {
        assert_eq!(ReactionKind::from_label("like"), Some(ReactionKind::Like));
        assert_eq!(ReactionKind::from_label("Love"), Some(ReactionKind::Love));
        assert_eq!(ReactionKind::from_label("ANGRY"), Some(ReactionKind::Angry));
    }

    #[test]
    fn test_from_label_rejects_unknown() {
        assert_eq!(ReactionKind::from_label("meh"), None);
        assert_eq!(ReactionKind::from_label(""), None);
    }

    #[test]
    fn test_label_roundtrip() {
        for kind in ReactionKind::ALL {
            assert_eq!(ReactionKind::from_label(kind.label()), Some(kind));
        }
    }
}
