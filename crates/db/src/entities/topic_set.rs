//! Topic set entity (the prompt pool).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A candidate prompt. Read-only reference data, seeded by migration.
/// Daily topics are drawn at random from this pool.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topic_set")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Prompt text.
    pub body: String,

    /// Byte length of the prompt text, kept for layout hints on clients.
    pub byte_len: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
