//! Content reaction repository.

use std::sync::Arc;

use crate::entities::{ContentReaction, content_reaction};
use maru_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reaction by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<content_reaction::Model>> {
        ContentReaction::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's reaction to a piece of content.
    pub async fn find_by_content_and_user(
        &self,
        content_id: &str,
        user_id: &str,
    ) -> AppResult<Option<content_reaction::Model>> {
        ContentReaction::find()
            .filter(content_reaction::Column::ContentId.eq(content_id))
            .filter(content_reaction::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new reaction.
    pub async fn create(
        &self,
        model: content_reaction::ActiveModel,
    ) -> AppResult<content_reaction::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a reaction row.
    pub async fn delete(&self, model: content_reaction::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Replace a reaction with one of a different kind.
    ///
    /// Deletes the old row and inserts the new one in a single transaction,
    /// so no observer sees the pair in a blended state.
    pub async fn replace(
        &self,
        old: content_reaction::Model,
        new: content_reaction::ActiveModel,
    ) -> AppResult<content_reaction::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        old.delete(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = new
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// All reactions on a piece of content, oldest first.
    pub async fn find_by_content(
        &self,
        content_id: &str,
    ) -> AppResult<Vec<content_reaction::Model>> {
        ContentReaction::find()
            .filter(content_reaction::Column::ContentId.eq(content_id))
            .order_by_asc(content_reaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::content_reaction::ReactionKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_reaction(
        id: &str,
        content_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> content_reaction::Model {
        content_reaction::Model {
            id: id.to_string(),
            content_id: content_id.to_string(),
            user_id: user_id.to_string(),
            kind,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_content_and_user_found() {
        let reaction = create_test_reaction("r1", "c1", "u1", ReactionKind::Like);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reaction]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo.find_by_content_and_user("c1", "u1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().kind, ReactionKind::Like);
    }

    #[tokio::test]
    async fn test_find_by_content_and_user_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<content_reaction::Model>::new()])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo.find_by_content_and_user("c1", "u1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_by_content_returns_all() {
        let r1 = create_test_reaction("r1", "c1", "u1", ReactionKind::Like);
        let r2 = create_test_reaction("r2", "c1", "u2", ReactionKind::Sad);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo.find_by_content("c1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
