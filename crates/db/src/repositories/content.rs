//! Content repository.

use std::sync::Arc;

use crate::entities::{Content, content, topic};
use maru_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Content repository for database operations.
#[derive(Clone)]
pub struct ContentRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentRepository {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find content by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<content::Model>> {
        Content::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get content by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<content::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ContentNotFound(id.to_string()))
    }

    /// Find a user's post for a topic, if any.
    pub async fn find_by_user_and_topic(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> AppResult<Option<content::Model>> {
        Content::find()
            .filter(content::Column::UserId.eq(user_id))
            .filter(content::Column::TopicId.eq(topic_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user already posted to a topic.
    pub async fn has_posted(&self, user_id: &str, topic_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_topic(user_id, topic_id)
            .await?
            .is_some())
    }

    /// Create new content.
    pub async fn create(&self, model: content::ActiveModel) -> AppResult<content::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update content.
    pub async fn update(&self, model: content::ActiveModel) -> AppResult<content::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete content. Reactions cascade at the database level.
    pub async fn delete(&self, model: content::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All posts for a topic, oldest first.
    pub async fn find_by_topic(&self, topic_id: &str) -> AppResult<Vec<content::Model>> {
        Content::find()
            .filter(content::Column::TopicId.eq(topic_id))
            .order_by_asc(content::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts in a group whose registration time falls in `[from, to)`,
    /// oldest first. Joined through the topic so the group scope is explicit.
    pub async fn find_by_group_between(
        &self,
        group_id: &str,
        from: chrono::DateTime<chrono::FixedOffset>,
        to: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<Vec<content::Model>> {
        Content::find()
            .join(JoinType::InnerJoin, content::Relation::Topic.def())
            .filter(topic::Column::GroupId.eq(group_id))
            .filter(content::Column::CreatedAt.gte(from))
            .filter(content::Column::CreatedAt.lt(to))
            .order_by_asc(content::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
